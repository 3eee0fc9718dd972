//! Fixed-size sliding-window chunking for embedding quality.
//!
//! File content is split into overlapping windows so that context near a
//! chunk boundary appears in both neighboring chunks. Window boundaries are
//! always adjusted to UTF-8 character boundaries.

/// Configuration for the sliding-window chunker.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Maximum size of a chunk in bytes.
    pub chunk_size: usize,
    /// Number of bytes to overlap between consecutive chunks.
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: cubby_core::defaults::CHUNK_SIZE,
            overlap: cubby_core::defaults::CHUNK_OVERLAP,
        }
    }
}

/// A text chunk with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The text content of the chunk.
    pub text: String,
    /// Starting byte offset in the original document.
    pub start_offset: usize,
    /// Ending byte offset in the original document.
    pub end_offset: usize,
}

impl Chunk {
    pub fn new(text: String, start_offset: usize, end_offset: usize) -> Self {
        Self {
            text,
            start_offset,
            end_offset,
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Find UTF-8 safe boundary at or before the given position.
fn find_char_boundary_before(text: &str, mut pos: usize) -> usize {
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Find UTF-8 safe boundary at or after the given position.
fn find_char_boundary_after(text: &str, mut pos: usize) -> usize {
    while pos < text.len() && !text.is_char_boundary(pos) {
        pos += 1;
    }
    pos
}

/// Fixed-size chunks with configurable overlap.
#[derive(Debug, Clone, Default)]
pub struct SlidingWindowChunker {
    config: ChunkerConfig,
}

impl SlidingWindowChunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk the given text. Whitespace-only input produces no chunks.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        // Overlap must leave room to advance or the window never moves.
        let overlap = self.config.overlap.min(self.config.chunk_size.saturating_sub(1));
        let step = self.config.chunk_size - overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < text.len() {
            let raw_end = (start + self.config.chunk_size).min(text.len());
            let end = find_char_boundary_before(text, raw_end);
            if end <= start {
                break;
            }

            let piece = &text[start..end];
            if !piece.trim().is_empty() {
                chunks.push(Chunk::new(piece.to_string(), start, end));
            }

            if end == text.len() {
                break;
            }
            // Snap forward, not back: snapping back past `start` when the
            // step lands inside a multibyte character would stall the window.
            start = find_char_boundary_after(text, start + step);
        }

        chunks
    }
}
