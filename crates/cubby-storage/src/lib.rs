//! cubby-storage - Path resolution and durable file storage.
//!
//! Maps (identity, filename) pairs to canonical on-disk locations under a
//! single storage root, partitioned by identity, and provides CRUD over a
//! user's file namespace. Validation is strict allow-list: a name either
//! passes in full or the operation never reaches the filesystem.

pub mod paths;
pub mod repository;

pub use paths::PathResolver;
pub use repository::{FileRepository, FsFileRepository};
