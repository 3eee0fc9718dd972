//! cubby-api - HTTP API server for cubby file storage.
//!
//! Wires the storage and index crates behind an axum router. Identity is
//! carried per request by [`middleware::identity_middleware`]; handlers pass
//! the resulting context into [`service::FileStorageService`].

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod service;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use cubby_index::{ChunkerConfig, HttpIndexClient, SlidingWindowChunker};
use cubby_storage::{FsFileRepository, PathResolver};

pub use config::Config;
pub use service::FileStorageService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: FileStorageService,
}

impl AppState {
    /// Build production state from configuration.
    pub fn from_config(config: &Config) -> Self {
        let resolver = PathResolver::new(config.storage_root.clone());
        let repo = Arc::new(FsFileRepository::new());
        let index = Arc::new(HttpIndexClient::new(
            config.index_url.clone(),
            config.index_timeout_secs,
        ));
        let chunker = SlidingWindowChunker::new(ChunkerConfig {
            chunk_size: config.chunk_size,
            overlap: config.chunk_overlap,
        });
        Self {
            service: FileStorageService::new(resolver, repo, index, chunker),
        }
    }
}

/// Build the API router with identity middleware applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/v1/files",
            get(handlers::list_files).post(handlers::upload_file),
        )
        .route(
            "/api/v1/files/:filename",
            get(handlers::read_file)
                .put(handlers::modify_file)
                .delete(handlers::delete_file),
        )
        .route("/api/v1/notes", post(handlers::create_note))
        .route(
            "/api/v1/search",
            get(handlers::search_files_get).post(handlers::search_files),
        )
        .layer(axum::middleware::from_fn(middleware::identity_middleware))
        .with_state(state)
}
