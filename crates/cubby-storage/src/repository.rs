//! Durable CRUD over a user's file namespace.
//!
//! All operations take locations already resolved (and therefore validated)
//! by [`crate::PathResolver`]. Writes are atomic: content goes to a
//! dot-prefixed temp file in the same directory, is fsynced, then renamed
//! into place, so a crashed or cancelled request never leaves a partially
//! written file visible. Concurrent writes to the same location serialize on
//! the rename; the last completed write wins.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use cubby_core::{Error, FileMetadata, Result};

/// Storage seam for a user's file namespace.
///
/// Abstracted as a trait so the service layer can be exercised against
/// alternative backends in tests.
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Create a new file. Fails with `AlreadyExists` if one is present.
    async fn create(&self, location: &Path, content: &str) -> Result<FileMetadata>;

    /// Read a file's content. Fails with `NotFound` if absent.
    async fn read(&self, location: &Path) -> Result<String>;

    /// Overwrite an existing file. Fails with `NotFound` if the target does
    /// not pre-exist, distinguishing "modify" from "create".
    async fn write(&self, location: &Path, content: &str) -> Result<FileMetadata>;

    /// Delete a file. Fails with `NotFound` if absent.
    async fn delete(&self, location: &Path) -> Result<()>;

    /// List all files directly inside a user's directory, sorted by
    /// filename. An absent directory is an empty namespace, not an error.
    async fn list(&self, user_dir: &Path) -> Result<Vec<FileMetadata>>;
}

/// Filesystem-backed repository.
#[derive(Debug, Default, Clone)]
pub struct FsFileRepository;

impl FsFileRepository {
    pub fn new() -> Self {
        Self
    }

    /// Atomic write: temp file + fsync + rename.
    async fn write_atomic(&self, location: &Path, content: &str) -> Result<()> {
        let parent = location.parent().ok_or_else(|| {
            Error::Internal(format!("location has no parent: {}", location.display()))
        })?;
        let filename = location
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::Internal(format!("location has no filename: {}", location.display()))
            })?;

        fs::create_dir_all(parent).await.map_err(|e| {
            warn!(parent = %parent.display(), error = %e, "storage: create_dir_all failed");
            Error::Io(e)
        })?;

        // Dot-prefixed so a leftover temp file is invisible to list() and can
        // never collide with a user filename (validation rejects leading dots).
        let temp_path = parent.join(format!(".{}.{}.tmp", filename, Uuid::new_v4()));
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "storage: File::create failed");
            Error::Io(e)
        })?;
        file.write_all(content.as_bytes()).await.map_err(|e| {
            warn!(error = %e, "storage: write_all failed");
            Error::Io(e)
        })?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, location).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %location.display(), error = %e,
                "storage: rename failed");
            Error::Io(e)
        })?;

        // Plain data files only, never executable.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(location, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(())
    }

    async fn metadata_for(&self, location: &Path) -> Result<FileMetadata> {
        let filename = location
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::Internal(format!("location has no filename: {}", location.display()))
            })?
            .to_string();
        let meta = fs::metadata(location).await?;
        let modified_at: DateTime<Utc> = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        Ok(FileMetadata {
            filename,
            size_bytes: meta.len(),
            modified_at,
        })
    }
}

#[async_trait]
impl FileRepository for FsFileRepository {
    async fn create(&self, location: &Path, content: &str) -> Result<FileMetadata> {
        if fs::try_exists(location).await? {
            return Err(Error::AlreadyExists(location.display().to_string()));
        }
        debug!(location = %location.display(), size = content.len(), "storage: create");
        self.write_atomic(location, content).await?;
        self.metadata_for(location).await
    }

    async fn read(&self, location: &Path) -> Result<String> {
        match fs::read_to_string(location).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(location.display().to_string()))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn write(&self, location: &Path, content: &str) -> Result<FileMetadata> {
        if !fs::try_exists(location).await? {
            return Err(Error::NotFound(location.display().to_string()));
        }
        debug!(location = %location.display(), size = content.len(), "storage: overwrite");
        self.write_atomic(location, content).await?;
        self.metadata_for(location).await
    }

    async fn delete(&self, location: &Path) -> Result<()> {
        match fs::remove_file(location).await {
            Ok(()) => {
                debug!(location = %location.display(), "storage: delete");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(location.display().to_string()))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn list(&self, user_dir: &Path) -> Result<Vec<FileMetadata>> {
        let mut entries = match fs::read_dir(user_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Io(e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            // Skip internal temp files and anything else dot-prefixed.
            if name.starts_with('.') {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let modified_at: DateTime<Utc> = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            files.push(FileMetadata {
                filename: name,
                size_bytes: meta.len(),
                modified_at,
            });
        }

        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(files)
    }
}
