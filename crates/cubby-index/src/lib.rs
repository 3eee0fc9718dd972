//! cubby-index - Chunking and the semantic search index client.
//!
//! Splits file content into overlapping fixed-size chunks and talks to the
//! external embedding index over HTTP. The index is a secondary resource:
//! every failure here maps to `Error::IndexUnavailable` so callers can
//! degrade instead of failing the whole operation.

pub mod chunking;
pub mod client;

pub use chunking::{Chunk, ChunkerConfig, SlidingWindowChunker};
pub use client::{HttpIndexClient, IndexClient};
