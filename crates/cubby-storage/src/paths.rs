//! Canonical storage locations and document identifiers.
//!
//! Layout on disk: `{root}/{identity}/{filename}` — one subdirectory per
//! user, files directly inside it. The same validated components also form
//! the external document id `{identity}/{filename}` used to key index
//! chunks. `/` is forbidden inside both components, so the id is unambiguous
//! and distinct per owner even for identical filenames.

use std::path::{Path, PathBuf};

use cubby_core::defaults::FILENAME_MAX_LENGTH;
use cubby_core::{Error, Result, UserIdentity};

/// Which component is being validated, for error messages.
#[derive(Debug, Clone, Copy)]
enum Component {
    Identity,
    Filename,
}

impl Component {
    fn label(self) -> &'static str {
        match self {
            Component::Identity => "identity",
            Component::Filename => "filename",
        }
    }
}

/// Strict allow-list validation for a single path component.
///
/// Accepts only names built from alphanumerics and a small set of
/// punctuation, with no leading dot (which also excludes `.` and `..`), no
/// separators, and a bounded length. Rejection closes the whole class of
/// path-escape bugs regardless of host OS path semantics.
fn validate_component(kind: Component, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidName(format!("{} is empty", kind.label())));
    }
    if value.len() > FILENAME_MAX_LENGTH {
        return Err(Error::InvalidName(format!(
            "{} exceeds {} bytes",
            kind.label(),
            FILENAME_MAX_LENGTH
        )));
    }
    if value.starts_with('.') {
        return Err(Error::InvalidName(format!(
            "{} must not start with '.'",
            kind.label()
        )));
    }
    if value.starts_with(' ') || value.ends_with(' ') {
        return Err(Error::InvalidName(format!(
            "{} has leading or trailing whitespace",
            kind.label()
        )));
    }
    let allowed =
        |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ' | '(' | ')' | '+' | '@');
    if let Some(bad) = value.chars().find(|&c| !allowed(c)) {
        return Err(Error::InvalidName(format!(
            "{} contains disallowed character {:?}",
            kind.label(),
            bad
        )));
    }
    Ok(())
}

/// Resolves validated (identity, filename) pairs to on-disk locations and
/// external document identifiers.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver rooted at the given storage directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The configured storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding all of one user's files.
    pub fn user_dir(&self, identity: &UserIdentity) -> Result<PathBuf> {
        validate_component(Component::Identity, identity.as_str())?;
        Ok(self.root.join(identity.as_str()))
    }

    /// Canonical on-disk location for one file.
    pub fn resolve(&self, identity: &UserIdentity, filename: &str) -> Result<PathBuf> {
        let dir = self.user_dir(identity)?;
        validate_component(Component::Filename, filename)?;
        Ok(dir.join(filename))
    }

    /// Deterministic external document identifier for index chunks.
    ///
    /// Stable across content updates; distinct across identities because `/`
    /// cannot appear inside either component.
    pub fn document_id(&self, identity: &UserIdentity, filename: &str) -> Result<String> {
        validate_component(Component::Identity, identity.as_str())?;
        validate_component(Component::Filename, filename)?;
        Ok(format!("{}/{}", identity.as_str(), filename))
    }
}
