//! Centralized default constants for cubby.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// CHUNKING
// =============================================================================

/// Maximum characters per chunk sent to the semantic index.
pub const CHUNK_SIZE: usize = 1500;

/// Overlap characters between adjacent chunks for context preservation.
pub const CHUNK_OVERLAP: usize = 100;

// =============================================================================
// SEARCH
// =============================================================================

/// Default maximum number of search results.
pub const SEARCH_TOP_K: usize = 5;

/// Snippet/preview length in characters for search results.
pub const SNIPPET_LENGTH: usize = 200;

// =============================================================================
// STORAGE
// =============================================================================

/// Default storage root directory.
pub const STORAGE_ROOT: &str = "/var/cubby/storage";

/// Maximum filename length in bytes (ext4/NTFS compatible).
pub const FILENAME_MAX_LENGTH: usize = 255;

/// Canonical extension appended to note filenames.
pub const NOTE_EXTENSION: &str = ".md";

// =============================================================================
// INDEX SERVICE
// =============================================================================

/// Default semantic index service endpoint.
pub const INDEX_URL: &str = "http://127.0.0.1:8100";

/// Timeout for index service requests in seconds.
pub const INDEX_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server bind address.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3400;

/// Header carrying the per-request user identity.
pub const IDENTITY_HEADER: &str = "x-cubby-user";

// =============================================================================
// ENVIRONMENT VARIABLE NAMES
// =============================================================================

/// Environment variable for the storage root path.
pub const ENV_STORAGE_ROOT: &str = "CUBBY_STORAGE_ROOT";

/// Environment variable for the index service endpoint.
pub const ENV_INDEX_URL: &str = "CUBBY_INDEX_URL";

/// Environment variable for chunk size (characters).
pub const ENV_CHUNK_SIZE: &str = "CUBBY_CHUNK_SIZE";

/// Environment variable for chunk overlap (characters).
pub const ENV_CHUNK_OVERLAP: &str = "CUBBY_CHUNK_OVERLAP";

/// Environment variable for the index request timeout in seconds.
pub const ENV_INDEX_TIMEOUT_SECS: &str = "CUBBY_INDEX_TIMEOUT_SECS";

/// Environment variable for the HTTP server bind address.
pub const ENV_HOST: &str = "CUBBY_HOST";

/// Environment variable for the HTTP server port.
pub const ENV_PORT: &str = "CUBBY_PORT";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_defaults_are_consistent() {
        const {
            assert!(CHUNK_OVERLAP < CHUNK_SIZE);
            assert!(CHUNK_SIZE > 0);
        }
    }

    #[test]
    fn note_extension_has_leading_dot() {
        assert!(NOTE_EXTENSION.starts_with('.'));
    }

    #[test]
    fn identity_header_is_lowercase() {
        // HTTP/2 requires lowercase header names; axum normalizes lookups
        // but the constant is used for exact matching in tests.
        assert_eq!(IDENTITY_HEADER, IDENTITY_HEADER.to_lowercase());
    }
}
