//! Server configuration from environment variables.

use cubby_core::defaults;

/// Runtime configuration for the API server.
///
/// Every field has a default from [`cubby_core::defaults`]; unparseable
/// values fall back rather than aborting startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for per-user file storage.
    pub storage_root: String,
    /// Base URL of the semantic index service.
    pub index_url: String,
    /// Index request timeout in seconds.
    pub index_timeout_secs: u64,
    /// Maximum characters per index chunk.
    pub chunk_size: usize,
    /// Overlap characters between adjacent chunks.
    pub chunk_overlap: usize,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: defaults::STORAGE_ROOT.to_string(),
            index_url: defaults::INDEX_URL.to_string(),
            index_timeout_secs: defaults::INDEX_TIMEOUT_SECS,
            chunk_size: defaults::CHUNK_SIZE,
            chunk_overlap: defaults::CHUNK_OVERLAP,
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            storage_root: std::env::var(defaults::ENV_STORAGE_ROOT).unwrap_or(base.storage_root),
            index_url: std::env::var(defaults::ENV_INDEX_URL).unwrap_or(base.index_url),
            index_timeout_secs: env_or(defaults::ENV_INDEX_TIMEOUT_SECS, base.index_timeout_secs),
            chunk_size: env_or(defaults::ENV_CHUNK_SIZE, base.chunk_size),
            chunk_overlap: env_or(defaults::ENV_CHUNK_OVERLAP, base.chunk_overlap),
            host: std::env::var(defaults::ENV_HOST).unwrap_or(base.host),
            port: env_or(defaults::ENV_PORT, base.port),
        }
    }
}
