//! End-to-end service behavior: identity gating, storage/index coupling,
//! and degraded operation when the index is down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use cubby_api::FileStorageService;
use cubby_core::{Error, IdentityContext, IndexSyncStatus, Result, SearchHit};
use cubby_index::{Chunk, ChunkerConfig, IndexClient, SlidingWindowChunker};
use cubby_storage::{FsFileRepository, PathResolver};

/// In-memory index that records calls and can be switched to failing.
#[derive(Default)]
struct RecordingIndex {
    down: AtomicBool,
    /// (document_id, owner, chunk_count) per upsert.
    upserts: Mutex<Vec<(String, String, usize)>>,
    removals: Mutex<Vec<String>>,
    /// (owner, query, top_k) per query.
    queries: Mutex<Vec<(String, String, usize)>>,
    hits: Mutex<Vec<SearchHit>>,
}

impl RecordingIndex {
    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check_up(&self) -> Result<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(Error::IndexUnavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl IndexClient for RecordingIndex {
    async fn upsert(
        &self,
        document_id: &str,
        owner: &str,
        _filename: &str,
        chunks: &[Chunk],
    ) -> Result<usize> {
        self.check_up()?;
        self.upserts.lock().unwrap().push((
            document_id.to_string(),
            owner.to_string(),
            chunks.len(),
        ));
        Ok(chunks.len())
    }

    async fn remove(&self, document_id: &str) -> Result<()> {
        self.check_up()?;
        self.removals.lock().unwrap().push(document_id.to_string());
        Ok(())
    }

    async fn query(&self, owner: &str, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        self.check_up()?;
        self.queries
            .lock()
            .unwrap()
            .push((owner.to_string(), query.to_string(), top_k));
        Ok(self.hits.lock().unwrap().clone())
    }
}

fn setup() -> (TempDir, Arc<RecordingIndex>, FileStorageService) {
    let dir = TempDir::new().unwrap();
    let index = Arc::new(RecordingIndex::default());
    let service = FileStorageService::new(
        PathResolver::new(dir.path()),
        Arc::new(FsFileRepository::new()),
        index.clone(),
        SlidingWindowChunker::new(ChunkerConfig {
            chunk_size: 50,
            overlap: 10,
        }),
    );
    (dir, index, service)
}

fn user(s: &str) -> IdentityContext {
    IdentityContext::from_header_value(Some(s))
}

#[tokio::test]
async fn test_anonymous_is_rejected_everywhere() {
    let (_dir, _index, service) = setup();
    let anon = IdentityContext::anonymous();

    let auth_required = |e: Error| matches!(e, Error::AuthRequired(_));
    assert!(auth_required(service.upload(&anon, "a.md", "x").await.unwrap_err()));
    assert!(auth_required(service.create_note(&anon, "t", "x").await.unwrap_err()));
    assert!(auth_required(service.read(&anon, "a.md").await.unwrap_err()));
    assert!(auth_required(service.modify(&anon, "a.md", "x").await.unwrap_err()));
    assert!(auth_required(service.delete(&anon, "a.md").await.unwrap_err()));
    assert!(auth_required(service.list(&anon).await.unwrap_err()));
    assert!(auth_required(service.search(&anon, "q", 5).await.unwrap_err()));
}

#[tokio::test]
async fn test_sentinel_header_is_anonymous() {
    let (_dir, _index, service) = setup();
    let ctx = IdentityContext::from_header_value(Some("{{user_id}}"));
    assert!(matches!(
        service.list(&ctx).await,
        Err(Error::AuthRequired(_))
    ));
}

#[tokio::test]
async fn test_upload_stores_and_indexes() {
    let (_dir, index, service) = setup();
    let ctx = user("alice");

    let content = "a".repeat(120); // chunk_size 50, so multiple chunks
    let outcome = service.upload(&ctx, "notes.md", &content).await.unwrap();
    assert_eq!(outcome.filename, "notes.md");
    assert_eq!(outcome.size_bytes, 120);
    assert!(outcome.index.is_synced());

    let upserts = index.upserts.lock().unwrap();
    assert_eq!(upserts.len(), 1);
    let (doc_id, owner, chunk_count) = &upserts[0];
    assert_eq!(doc_id, "alice/notes.md");
    assert_eq!(owner, "alice");
    assert!(*chunk_count > 1);

    assert_eq!(service.read(&ctx, "notes.md").await.unwrap(), content);
}

#[tokio::test]
async fn test_upload_duplicate_is_conflict() {
    let (_dir, _index, service) = setup();
    let ctx = user("alice");
    service.upload(&ctx, "notes.md", "first").await.unwrap();
    assert!(matches!(
        service.upload(&ctx, "notes.md", "second").await,
        Err(Error::AlreadyExists(_))
    ));
}

#[tokio::test]
async fn test_upload_invalid_filename_never_touches_storage() {
    let (_dir, index, service) = setup();
    let ctx = user("alice");
    assert!(matches!(
        service.upload(&ctx, "../escape.md", "x").await,
        Err(Error::InvalidName(_))
    ));
    assert!(index.upserts.lock().unwrap().is_empty());
    assert!(service.list(&ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_succeeds_degraded_when_index_down() {
    let (_dir, index, service) = setup();
    let ctx = user("alice");
    index.set_down(true);

    let outcome = service.upload(&ctx, "notes.md", "content").await.unwrap();
    match &outcome.index {
        IndexSyncStatus::Failed(reason) => assert!(reason.contains("Index unavailable")),
        other => panic!("expected Failed, got {:?}", other),
    }

    // The file is stored and readable despite the index being down.
    assert_eq!(service.read(&ctx, "notes.md").await.unwrap(), "content");
}

#[tokio::test]
async fn test_modify_reindexes_with_same_document_id() {
    let (_dir, index, service) = setup();
    let ctx = user("alice");

    service.upload(&ctx, "notes.md", "old").await.unwrap();
    let outcome = service.modify(&ctx, "notes.md", "new content").await.unwrap();
    assert!(outcome.index.is_synced());
    assert_eq!(service.read(&ctx, "notes.md").await.unwrap(), "new content");

    let upserts = index.upserts.lock().unwrap();
    assert_eq!(upserts.len(), 2);
    assert_eq!(upserts[0].0, upserts[1].0);
}

#[tokio::test]
async fn test_modify_missing_file_is_not_found() {
    let (_dir, index, service) = setup();
    let ctx = user("alice");
    assert!(matches!(
        service.modify(&ctx, "ghost.md", "x").await,
        Err(Error::NotFound(_))
    ));
    assert!(index.upserts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_next_write_heals_missed_sync() {
    let (_dir, index, service) = setup();
    let ctx = user("alice");

    index.set_down(true);
    let degraded = service.upload(&ctx, "notes.md", "v1").await.unwrap();
    assert!(!degraded.index.is_synced());

    index.set_down(false);
    let healed = service.modify(&ctx, "notes.md", "v2").await.unwrap();
    assert!(healed.index.is_synced());
    assert_eq!(index.upserts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_removes_file_and_index_entry() {
    let (_dir, index, service) = setup();
    let ctx = user("alice");

    service.upload(&ctx, "notes.md", "content").await.unwrap();
    let outcome = service.delete(&ctx, "notes.md").await.unwrap();
    assert!(outcome.index.is_synced());

    assert!(matches!(
        service.read(&ctx, "notes.md").await,
        Err(Error::NotFound(_))
    ));
    assert_eq!(
        index.removals.lock().unwrap().as_slice(),
        ["alice/notes.md"]
    );
}

#[tokio::test]
async fn test_delete_succeeds_degraded_when_index_down() {
    let (_dir, index, service) = setup();
    let ctx = user("alice");

    service.upload(&ctx, "notes.md", "content").await.unwrap();
    index.set_down(true);

    let outcome = service.delete(&ctx, "notes.md").await.unwrap();
    assert!(!outcome.index.is_synced());
    assert!(matches!(
        service.read(&ctx, "notes.md").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_create_note_derives_filename_and_heading() {
    let (_dir, _index, service) = setup();
    let ctx = user("alice");

    let outcome = service
        .create_note(&ctx, "Q3 planning: draft!", "agenda items")
        .await
        .unwrap();
    assert_eq!(outcome.filename, "Q3_planning_draft.md");

    let content = service.read(&ctx, "Q3_planning_draft.md").await.unwrap();
    assert!(content.starts_with("# Q3 planning: draft!\n\n"));
    assert!(content.ends_with("agenda items"));
}

#[tokio::test]
async fn test_create_note_rejects_unusable_title() {
    let (_dir, _index, service) = setup();
    let ctx = user("alice");
    assert!(matches!(
        service.create_note(&ctx, "???", "body").await,
        Err(Error::InvalidName(_))
    ));
}

#[tokio::test]
async fn test_list_is_scoped_to_the_caller() {
    let (_dir, _index, service) = setup();
    let alice = user("alice");
    let bob = user("bob");

    service.upload(&alice, "a.md", "x").await.unwrap();
    service.upload(&bob, "b.md", "y").await.unwrap();

    let names: Vec<String> = service
        .list(&alice)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.filename)
        .collect();
    assert_eq!(names, ["a.md"]);
}

#[tokio::test]
async fn test_same_filename_isolated_between_users() {
    let (_dir, _index, service) = setup();
    let alice = user("alice");
    let bob = user("bob");

    service.upload(&alice, "notes.md", "alice's").await.unwrap();
    service.upload(&bob, "notes.md", "bob's").await.unwrap();

    assert_eq!(service.read(&alice, "notes.md").await.unwrap(), "alice's");
    assert_eq!(service.read(&bob, "notes.md").await.unwrap(), "bob's");

    service.delete(&alice, "notes.md").await.unwrap();
    assert_eq!(service.read(&bob, "notes.md").await.unwrap(), "bob's");
}

#[tokio::test]
async fn test_search_passes_owner_filter() {
    let (_dir, index, service) = setup();
    *index.hits.lock().unwrap() = vec![SearchHit {
        filename: "notes.md".to_string(),
        snippet: "relevant text".to_string(),
        score: 0.8,
    }];

    let hits = service.search(&user("alice"), "relevant", 3).await.unwrap();
    assert_eq!(hits.len(), 1);

    let queries = index.queries.lock().unwrap();
    assert_eq!(queries.as_slice(), [("alice".to_string(), "relevant".to_string(), 3)]);
}

#[tokio::test]
async fn test_search_no_matches_is_empty() {
    let (_dir, _index, service) = setup();
    let hits = service.search(&user("alice"), "nothing", 5).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_search_index_down_is_an_error() {
    let (_dir, index, service) = setup();
    index.set_down(true);
    assert!(matches!(
        service.search(&user("alice"), "q", 5).await,
        Err(Error::IndexUnavailable(_))
    ));
}

#[tokio::test]
async fn test_search_rejects_blank_query() {
    let (_dir, _index, service) = setup();
    assert!(matches!(
        service.search(&user("alice"), "   ", 5).await,
        Err(Error::InvalidName(_))
    ));
}
