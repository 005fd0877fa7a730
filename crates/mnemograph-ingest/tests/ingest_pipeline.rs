//! End-to-end ingest scenarios over the stub providers and an in-memory
//! storage engine.

use std::sync::Arc;

use chrono::Utc;

use mnemograph_core::ids::{SourceId, UserId};
use mnemograph_core::sync_state::SyncState;
use mnemograph_core::testing::{StubEmbeddingProvider, StubLlmProvider};
use mnemograph_core::config::IngestConfig;
use mnemograph_ingest::{ingest, IngestDeps};
use mnemograph_storage::StorageEngine;

fn deps(store: Arc<StorageEngine>) -> IngestDeps {
    IngestDeps {
        embeddings: Arc::new(StubEmbeddingProvider::new(8)),
        llm: Arc::new(StubLlmProvider),
        vector_store: store,
    }
}

#[test]
fn new_journal_entry_creates_memories_and_advances_sync_state() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let deps = deps(store.clone());
    let config = IngestConfig::default();
    let user = UserId::new();
    let now = Utc::now();
    let mut sync_state = SyncState::new(user.clone(), "journal");

    let outcome = ingest(
        &deps,
        &config,
        &user,
        SourceId::new("2026-07-28.md"),
        "Had a long lunch with Priya and talked through the new roadmap.\n\nWent for a run along the river afterward.",
        now.date_naive(),
        &[],
        &[],
        &mut sync_state,
        1,
        now + chrono::Duration::seconds(300),
        now,
    )
    .unwrap();

    assert_eq!(outcome.created, 2);
    assert_eq!(outcome.reinforced, 0);
    assert_eq!(outcome.remaining_estimate, 0);
    assert!(sync_state.is_processed(&SourceId::new("2026-07-28.md")));
    assert_eq!(store.count_for_user(&user).unwrap(), 2);
}

#[test]
fn already_processed_source_is_a_no_op() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let deps = deps(store.clone());
    let config = IngestConfig::default();
    let user = UserId::new();
    let now = Utc::now();
    let source = SourceId::new("dup.md");
    let mut sync_state = SyncState::new(user.clone(), "journal");
    sync_state.mark_processed(source.clone(), now);

    let outcome = ingest(
        &deps,
        &config,
        &user,
        source,
        "this text would otherwise produce a memory if it were reprocessed",
        now.date_naive(),
        &[],
        &[],
        &mut sync_state,
        3,
        now + chrono::Duration::seconds(300),
        now,
    )
    .unwrap();

    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.remaining_estimate, 3);
    assert_eq!(store.count_for_user(&user).unwrap(), 0);
}

#[test]
fn short_entry_is_skipped_and_marked_processed() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let deps = deps(store.clone());
    let config = IngestConfig::default();
    let user = UserId::new();
    let now = Utc::now();
    let source = SourceId::new("short.md");
    let mut sync_state = SyncState::new(user.clone(), "journal");

    let outcome = ingest(
        &deps,
        &config,
        &user,
        source.clone(),
        "too short",
        now.date_naive(),
        &[],
        &[],
        &mut sync_state,
        1,
        now + chrono::Duration::seconds(300),
        now,
    )
    .unwrap();

    assert_eq!(outcome.created, 0);
    assert!(sync_state.is_processed(&source));
}

#[test]
fn repeated_entry_reinforces_instead_of_duplicating() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let deps = deps(store.clone());
    let config = IngestConfig::default();
    let user = UserId::new();
    let now = Utc::now();
    let mut sync_state = SyncState::new(user.clone(), "journal");
    let text = "Spent the evening reading on the porch with a cup of tea.";

    ingest(
        &deps,
        &config,
        &user,
        SourceId::new("a.md"),
        text,
        now.date_naive(),
        &[],
        &[],
        &mut sync_state,
        1,
        now + chrono::Duration::seconds(300),
        now,
    )
    .unwrap();
    assert_eq!(store.count_for_user(&user).unwrap(), 1);

    let outcome = ingest(
        &deps,
        &config,
        &user,
        SourceId::new("b.md"),
        text,
        now.date_naive(),
        &[],
        &[],
        &mut sync_state,
        1,
        now + chrono::Duration::seconds(300),
        now,
    )
    .unwrap();

    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.reinforced, 1);
    assert_eq!(store.count_for_user(&user).unwrap(), 1);
}

#[test]
fn insufficient_slack_before_batch_embedding_fails_fast() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let deps = deps(store.clone());
    let config = IngestConfig::default();
    let user = UserId::new();
    let now = Utc::now();
    let mut sync_state = SyncState::new(user.clone(), "journal");

    let result = ingest(
        &deps,
        &config,
        &user,
        SourceId::new("tight.md"),
        "Took the dog for a walk around the block before dinner tonight.",
        now.date_naive(),
        &[],
        &[],
        &mut sync_state,
        1,
        now + chrono::Duration::seconds(1),
        now,
    );

    assert!(result.is_err());
    assert!(!sync_state.is_processed(&SourceId::new("tight.md")));
}
