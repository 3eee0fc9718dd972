//! Shared data types crossing crate and wire boundaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one stored file, as returned by list operations.
///
/// The owner is implied by the namespace the listing was scoped to and is
/// deliberately not part of the wire type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub filename: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

/// One ranked semantic search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub filename: String,
    pub snippet: String,
    pub score: f32,
}

/// Outcome of the index half of a storage-then-index operation.
///
/// Storage is the primary resource: when it succeeds and the paired index
/// call fails, the operation still succeeds but reports `Failed` here so the
/// caller knows the file is stored yet not (or stale in) the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum IndexSyncStatus {
    /// The index reflects the current file content.
    Synced,
    /// The paired index call failed; storage remains authoritative.
    Failed(String),
}

impl IndexSyncStatus {
    pub fn is_synced(&self) -> bool {
        matches!(self, IndexSyncStatus::Synced)
    }
}

/// Result of an upload/create-note/modify operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOutcome {
    pub filename: String,
    pub size_bytes: u64,
    pub index: IndexSyncStatus,
}

/// Result of a delete operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub filename: String,
    pub index: IndexSyncStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_sync_status_serializes_tagged() {
        let synced = serde_json::to_value(IndexSyncStatus::Synced).unwrap();
        assert_eq!(synced["state"], "synced");

        let failed =
            serde_json::to_value(IndexSyncStatus::Failed("timeout".to_string())).unwrap();
        assert_eq!(failed["state"], "failed");
        assert_eq!(failed["reason"], "timeout");
    }

    #[test]
    fn test_index_sync_status_is_synced() {
        assert!(IndexSyncStatus::Synced.is_synced());
        assert!(!IndexSyncStatus::Failed("x".to_string()).is_synced());
    }

    #[test]
    fn test_search_hit_round_trips() {
        let hit = SearchHit {
            filename: "report.txt".to_string(),
            snippet: "Q3 numbers".to_string(),
            score: 0.87,
        };
        let json = serde_json::to_string(&hit).unwrap();
        let back: SearchHit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hit);
    }
}
