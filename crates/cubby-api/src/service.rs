//! File storage orchestration.
//!
//! Every operation follows the same shape: gate on identity, resolve the
//! on-disk location, act on storage, then synchronize the index. Storage is
//! the primary resource — when it succeeds and the index call fails, the
//! operation still succeeds and reports the failure in the outcome's
//! [`IndexSyncStatus`]. The next successful write of the same file replaces
//! its chunks wholesale, so a missed sync heals itself without any repair
//! machinery.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use cubby_core::defaults::NOTE_EXTENSION;
use cubby_core::{
    DeleteOutcome, Error, FileMetadata, IdentityContext, IndexSyncStatus, Result, SearchHit,
    UserIdentity, WriteOutcome,
};
use cubby_index::{IndexClient, SlidingWindowChunker};
use cubby_storage::{FileRepository, PathResolver};

static TITLE_STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());

/// Derive a note filename from a human-entered title.
///
/// A trailing `.md` is removed first so the extension is never doubled, then
/// everything outside word characters, whitespace, and hyphens is dropped and
/// spaces become underscores. A title with nothing left after sanitation is
/// rejected.
fn note_filename(title: &str) -> Result<String> {
    let trimmed = title.trim();
    let stem = trimmed.strip_suffix(NOTE_EXTENSION).unwrap_or(trimmed);
    let safe = TITLE_STRIP.replace_all(stem, "").trim().replace(' ', "_");
    if safe.is_empty() {
        return Err(Error::InvalidName(format!(
            "note title {:?} produces an empty filename",
            title
        )));
    }
    Ok(format!("{}{}", safe, NOTE_EXTENSION))
}

/// Orchestrates identity gating, storage, and index synchronization.
#[derive(Clone)]
pub struct FileStorageService {
    resolver: PathResolver,
    repo: Arc<dyn FileRepository>,
    index: Arc<dyn IndexClient>,
    chunker: SlidingWindowChunker,
}

impl FileStorageService {
    pub fn new(
        resolver: PathResolver,
        repo: Arc<dyn FileRepository>,
        index: Arc<dyn IndexClient>,
        chunker: SlidingWindowChunker,
    ) -> Self {
        Self {
            resolver,
            repo,
            index,
            chunker,
        }
    }

    /// Replace the document's index chunks with the current content.
    ///
    /// Never fails the surrounding operation: any index error is folded into
    /// the returned status.
    async fn sync_index(
        &self,
        user: &UserIdentity,
        document_id: &str,
        filename: &str,
        content: &str,
    ) -> IndexSyncStatus {
        let chunks = self.chunker.chunk(content);
        match self
            .index
            .upsert(document_id, user.as_str(), filename, &chunks)
            .await
        {
            Ok(count) => {
                debug!(
                    owner = %user,
                    document_id = document_id,
                    chunk_count = count,
                    "service: index synchronized"
                );
                IndexSyncStatus::Synced
            }
            Err(e) => {
                warn!(
                    owner = %user,
                    document_id = document_id,
                    error = %e,
                    "service: index sync failed, file stored but not searchable"
                );
                IndexSyncStatus::Failed(e.to_string())
            }
        }
    }

    /// Store a new file and index its content.
    pub async fn upload(
        &self,
        ctx: &IdentityContext,
        filename: &str,
        content: &str,
    ) -> Result<WriteOutcome> {
        let user = ctx.require()?;
        let location = self.resolver.resolve(user, filename)?;
        let document_id = self.resolver.document_id(user, filename)?;

        let meta = self.repo.create(&location, content).await?;
        info!(owner = %user, filename = filename, size_bytes = meta.size_bytes, "service: file created");

        let index = self.sync_index(user, &document_id, filename, content).await;
        Ok(WriteOutcome {
            filename: meta.filename,
            size_bytes: meta.size_bytes,
            index,
        })
    }

    /// Create a markdown note from a title and body.
    ///
    /// The stored content gets a `# {title}` heading so the note reads as a
    /// standalone document.
    pub async fn create_note(
        &self,
        ctx: &IdentityContext,
        title: &str,
        content: &str,
    ) -> Result<WriteOutcome> {
        // Gate before any title work so anonymous callers get AuthRequired,
        // not InvalidName.
        ctx.require()?;
        let filename = note_filename(title)?;
        let body = format!("# {}\n\n{}", title.trim(), content);
        self.upload(ctx, &filename, &body).await
    }

    /// Read a file's content.
    pub async fn read(&self, ctx: &IdentityContext, filename: &str) -> Result<String> {
        let user = ctx.require()?;
        let location = self.resolver.resolve(user, filename)?;
        self.repo.read(&location).await
    }

    /// Overwrite an existing file and re-index its content.
    pub async fn modify(
        &self,
        ctx: &IdentityContext,
        filename: &str,
        content: &str,
    ) -> Result<WriteOutcome> {
        let user = ctx.require()?;
        let location = self.resolver.resolve(user, filename)?;
        let document_id = self.resolver.document_id(user, filename)?;

        let meta = self.repo.write(&location, content).await?;
        info!(owner = %user, filename = filename, size_bytes = meta.size_bytes, "service: file modified");

        let index = self.sync_index(user, &document_id, filename, content).await;
        Ok(WriteOutcome {
            filename: meta.filename,
            size_bytes: meta.size_bytes,
            index,
        })
    }

    /// Delete a file and remove its chunks from the index.
    pub async fn delete(&self, ctx: &IdentityContext, filename: &str) -> Result<DeleteOutcome> {
        let user = ctx.require()?;
        let location = self.resolver.resolve(user, filename)?;
        let document_id = self.resolver.document_id(user, filename)?;

        self.repo.delete(&location).await?;
        info!(owner = %user, filename = filename, "service: file deleted");

        let index = match self.index.remove(&document_id).await {
            Ok(()) => IndexSyncStatus::Synced,
            Err(e) => {
                warn!(
                    owner = %user,
                    document_id = document_id,
                    error = %e,
                    "service: index removal failed, stale chunks remain until next write"
                );
                IndexSyncStatus::Failed(e.to_string())
            }
        };
        Ok(DeleteOutcome {
            filename: filename.to_string(),
            index,
        })
    }

    /// List the user's files sorted by filename.
    pub async fn list(&self, ctx: &IdentityContext) -> Result<Vec<FileMetadata>> {
        let user = ctx.require()?;
        let dir = self.resolver.user_dir(user)?;
        self.repo.list(&dir).await
    }

    /// Semantic search over the user's indexed files.
    ///
    /// No matches is an empty `Ok`; an unreachable index is
    /// `Error::IndexUnavailable`.
    pub async fn search(
        &self,
        ctx: &IdentityContext,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        let user = ctx.require()?;
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidName("search query is empty".to_string()));
        }

        let hits = self.index.query(user.as_str(), query, top_k).await?;
        debug!(owner = %user, result_count = hits.len(), "service: search completed");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_filename_sanitizes_punctuation() {
        assert_eq!(note_filename("Meeting: Q3/Q4 plans!").unwrap(), "Meeting_Q3Q4_plans.md");
    }

    #[test]
    fn test_note_filename_appends_extension_once() {
        assert_eq!(note_filename("todo").unwrap(), "todo.md");
        assert_eq!(note_filename("todo.md").unwrap(), "todo.md");
    }

    #[test]
    fn test_note_filename_keeps_hyphens_and_underscores() {
        assert_eq!(note_filename("my-note_v2").unwrap(), "my-note_v2.md");
    }

    #[test]
    fn test_note_filename_rejects_empty_result() {
        assert!(matches!(note_filename("!!!"), Err(Error::InvalidName(_))));
        assert!(matches!(note_filename("   "), Err(Error::InvalidName(_))));
    }

    #[test]
    fn test_note_filename_preserves_unicode_words() {
        assert_eq!(note_filename("日記 2026").unwrap(), "日記_2026.md");
    }
}
