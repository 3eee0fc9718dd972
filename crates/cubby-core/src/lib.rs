//! cubby-core - Core types, error taxonomy, and identity handling for cubby.
//!
//! Shared by every crate in the workspace. Nothing here performs I/O.

pub mod defaults;
pub mod error;
pub mod identity;
pub mod logging;
pub mod models;

pub use error::{Error, Result};
pub use identity::{IdentityContext, UserIdentity};
pub use models::{DeleteOutcome, FileMetadata, IndexSyncStatus, SearchHit, WriteOutcome};
