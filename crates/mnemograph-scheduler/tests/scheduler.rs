//! End-to-end scheduler scenarios over the stub providers and an
//! in-memory storage engine.

use std::sync::Arc;

use chrono::Utc;

use mnemograph_consolidation::ConsolidationDeps;
use mnemograph_core::config::{ConsolidationConfig, IngestConfig};
use mnemograph_core::ids::{SourceId, UserId};
use mnemograph_core::memory::{Memory, Significance};
use mnemograph_core::testing::{StubEmbeddingProvider, StubLlmProvider};
use mnemograph_ingest::IngestDeps;
use mnemograph_scheduler::{PendingSource, RunKind, Scheduler};
use mnemograph_storage::StorageEngine;

fn unit(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    for x in v.iter_mut() {
        *x /= norm;
    }
    v
}

fn build_scheduler(store: Arc<StorageEngine>) -> Scheduler {
    let ingest_deps = IngestDeps {
        embeddings: Arc::new(StubEmbeddingProvider::new(8)),
        llm: Arc::new(StubLlmProvider),
        vector_store: store.clone(),
    };
    let consolidation_deps = ConsolidationDeps {
        llm: Arc::new(StubLlmProvider),
        embeddings: Arc::new(StubEmbeddingProvider::new(8)),
        vector_store: store.clone(),
        graph_store: store.clone(),
        implication_store: store.clone(),
    };
    Scheduler::new(
        store,
        ingest_deps,
        consolidation_deps,
        IngestConfig::default(),
        ConsolidationConfig::default(),
    )
}

#[tokio::test]
async fn schedule_ingest_creates_memories_and_advances_sync_state() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let scheduler = build_scheduler(store.clone());
    let user = UserId::new();
    let now = Utc::now();

    let sources = vec![PendingSource {
        source_id: SourceId::new("2026-07-28.md"),
        text: "Had a long lunch with Priya and talked through the new roadmap.\n\n\
               Went for a run along the river afterward."
            .to_string(),
        entry_date: now.date_naive(),
        contacts_snapshot: Vec::new(),
        explicit_mentions: Vec::new(),
    }];

    let summary = scheduler.schedule_ingest(user.clone(), sources, now).await.unwrap();

    assert_eq!(summary.sources_attempted, 1);
    assert_eq!(summary.sources_completed, 1);
    assert_eq!(summary.created, 2);
    assert_eq!(summary.deferred, 0);
    assert_eq!(store.count_for_user(&user).unwrap(), 2);

    let sync_state = store.get_sync_state(&user, "journal").unwrap().unwrap();
    assert!(sync_state.is_processed(&SourceId::new("2026-07-28.md")));
}

#[tokio::test]
async fn concurrent_ingest_for_same_user_is_rejected() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let scheduler = Arc::new(build_scheduler(store));
    let user = UserId::new();

    // join! polls its arguments in order: the first call takes the run
    // lock and suspends inside spawn_blocking; the second observes the
    // lock already held and fails synchronously, before ever reaching the
    // blocking pool (spec §5: no two concurrent ingests for the same
    // user).
    let (r1, r2) = tokio::join!(
        scheduler.schedule_ingest(user.clone(), Vec::new(), Utc::now()),
        scheduler.schedule_ingest(user.clone(), Vec::new(), Utc::now()),
    );
    let ok_count = [r1.is_ok(), r2.is_ok()].into_iter().filter(|ok| *ok).count();
    assert_eq!(ok_count, 1);

    assert!(!scheduler.is_running(&user, RunKind::Ingest));
    let result = scheduler.schedule_ingest(user, Vec::new(), Utc::now()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn schedule_consolidation_is_idempotent_per_day() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let user = UserId::new();
    let now = Utc::now();

    let base = unit(vec![1.0, 0.0, 0.0, 0.0]);
    for i in 0..4 {
        let vec = unit(vec![1.0, 0.05 * i as f32, 0.0, 0.0]);
        let mut m = Memory::new(
            user.clone(),
            format!("reflection about the new job transition, entry {i}"),
            "journal".to_string(),
            now.date_naive(),
            Default::default(),
            Significance::Medium,
            now,
        )
        .with_embedding(vec);
        m.strength = 1.0 + i as f64;
        m.activation_count = 2;
        store.insert_memory(&m).unwrap();
    }
    let _ = base;

    let scheduler = build_scheduler(store.clone());

    let first = scheduler
        .schedule_consolidation(user.clone(), now.date_naive(), Vec::new(), now)
        .await
        .unwrap();
    assert_eq!(first.counts.implications_created, 1);

    let second = scheduler
        .schedule_consolidation(user.clone(), now.date_naive(), Vec::new(), now)
        .await
        .unwrap();
    // Same-day rerun upserts the same digest row rather than duplicating it.
    assert_eq!(second.id, first.id);

    let stored = store.get_digest(&user, now.date_naive()).unwrap().unwrap();
    assert_eq!(stored.id, first.id);
}
