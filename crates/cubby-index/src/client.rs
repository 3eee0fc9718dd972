//! HTTP client for the external embedding index service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use cubby_core::defaults::{ENV_INDEX_TIMEOUT_SECS, ENV_INDEX_URL, INDEX_TIMEOUT_SECS, INDEX_URL, SNIPPET_LENGTH};
use cubby_core::{Error, Result, SearchHit};

use crate::chunking::Chunk;

/// Seam to the semantic index.
///
/// Implementations must map every transport and remote failure to
/// `Error::IndexUnavailable` so the service layer can distinguish "the index
/// is down" from "the index has no matches" (an empty, successful result).
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Replace all chunks for a document. Returns the number of chunks
    /// indexed.
    async fn upsert(
        &self,
        document_id: &str,
        owner: &str,
        filename: &str,
        chunks: &[Chunk],
    ) -> Result<usize>;

    /// Remove all chunks for a document. Removing a document the index has
    /// never seen succeeds.
    async fn remove(&self, document_id: &str) -> Result<()>;

    /// Rank the owner's indexed chunks against a natural-language query.
    async fn query(&self, owner: &str, query: &str, top_k: usize) -> Result<Vec<SearchHit>>;
}

#[derive(Debug, Serialize)]
struct ChunkPayload<'a> {
    seq: usize,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    document_id: &'a str,
    owner: &'a str,
    filename: &'a str,
    chunks: Vec<ChunkPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    owner: &'a str,
    query: &'a str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    filename: String,
    snippet: String,
    score: f32,
}

/// Truncate a snippet on a character boundary.
fn truncate_snippet(snippet: &str, max_len: usize) -> String {
    if snippet.len() <= max_len {
        return snippet.to_string();
    }
    let mut end = max_len;
    while end > 0 && !snippet.is_char_boundary(end) {
        end -= 1;
    }
    snippet[..end].to_string()
}

/// Index client over the embedding service's HTTP API.
pub struct HttpIndexClient {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpIndexClient {
    /// Create a client against the given base URL.
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            "Initializing index client: url={}, timeout={}s",
            base_url, timeout_secs
        );

        Self {
            client,
            base_url,
            timeout_secs,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var(ENV_INDEX_URL).unwrap_or_else(|_| INDEX_URL.to_string());
        let timeout_secs = std::env::var(ENV_INDEX_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(INDEX_TIMEOUT_SECS);
        Self::new(base_url, timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn document_url(&self, document_id: &str) -> String {
        format!(
            "{}/documents/{}",
            self.base_url,
            urlencoding::encode(document_id)
        )
    }
}

#[async_trait]
impl IndexClient for HttpIndexClient {
    async fn upsert(
        &self,
        document_id: &str,
        owner: &str,
        filename: &str,
        chunks: &[Chunk],
    ) -> Result<usize> {
        // Drop any stale chunks first so an update never leaves remnants of
        // older, longer content behind.
        self.remove(document_id).await?;

        let request = UpsertRequest {
            document_id,
            owner,
            filename,
            chunks: chunks
                .iter()
                .enumerate()
                .map(|(seq, c)| ChunkPayload { seq, text: &c.text })
                .collect(),
        };

        let response = self
            .client
            .post(format!("{}/documents", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::IndexUnavailable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::IndexUnavailable(format!(
                "Index returned {}: {}",
                status, body
            )));
        }

        debug!(
            document_id = document_id,
            chunk_count = chunks.len(),
            "index: upserted document"
        );
        Ok(chunks.len())
    }

    async fn remove(&self, document_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.document_url(document_id))
            .send()
            .await
            .map_err(|e| Error::IndexUnavailable(format!("Request failed: {}", e)))?;

        let status = response.status();
        // An unknown document is already in the desired state.
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(document_id = document_id, "index: document not present");
            return Ok(());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::IndexUnavailable(format!(
                "Index returned {}: {}",
                status, body
            )));
        }

        debug!(document_id = document_id, "index: removed document");
        Ok(())
    }

    async fn query(&self, owner: &str, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let request = QueryRequest {
            owner,
            query,
            top_k,
        };

        let response = self
            .client
            .post(format!("{}/query", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "index: query request failed");
                Error::IndexUnavailable(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::IndexUnavailable(format!(
                "Index returned {}: {}",
                status, body
            )));
        }

        let result: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::IndexUnavailable(format!("Failed to parse response: {}", e)))?;

        Ok(result
            .results
            .into_iter()
            .map(|r| SearchHit {
                filename: r.filename,
                snippet: truncate_snippet(&r.snippet, SNIPPET_LENGTH),
                score: r.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_snippet_short_unchanged() {
        assert_eq!(truncate_snippet("short", 200), "short");
    }

    #[test]
    fn test_truncate_snippet_cuts_at_limit() {
        let long = "a".repeat(500);
        assert_eq!(truncate_snippet(&long, 200).len(), 200);
    }

    #[test]
    fn test_truncate_snippet_respects_utf8() {
        let text = "é".repeat(150); // 2 bytes each, boundary falls mid-char at 201
        let out = truncate_snippet(&text, 201);
        assert_eq!(out.len(), 200);
        assert!(out.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_document_url_encodes_id() {
        let client = HttpIndexClient::new("http://localhost:8100".to_string(), 5);
        assert_eq!(
            client.document_url("alice/notes.md"),
            "http://localhost:8100/documents/alice%2Fnotes.md"
        );
    }
}
