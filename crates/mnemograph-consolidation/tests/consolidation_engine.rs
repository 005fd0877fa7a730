//! End-to-end consolidation over the stub providers and an in-memory
//! storage engine.

use std::sync::Arc;

use chrono::Utc;

use mnemograph_consolidation::{ConsolidationDeps, ConsolidationEngine};
use mnemograph_core::config::ConsolidationConfig;
use mnemograph_core::ids::UserId;
use mnemograph_core::memory::{Memory, Significance};
use mnemograph_core::testing::{StubEmbeddingProvider, StubLlmProvider};
use mnemograph_storage::StorageEngine;

fn unit(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    for x in v.iter_mut() {
        *x /= norm;
    }
    v
}

fn seed_memories(store: &StorageEngine, user: &UserId, now: chrono::DateTime<Utc>) {
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
}

#[test]
fn run_creates_a_cluster_and_one_implication() {
    let store = StorageEngine::open_in_memory().unwrap();
    let user = UserId::new();
    let now = Utc::now();
    seed_memories(&store, &user, now);

    let store = Arc::new(store);
    let deps = ConsolidationDeps {
        llm: Arc::new(StubLlmProvider),
        embeddings: Arc::new(StubEmbeddingProvider::new(8)),
        vector_store: store.clone(),
        graph_store: store.clone(),
        implication_store: store.clone(),
    };

    let engine = ConsolidationEngine::new();
    let config = ConsolidationConfig::default();
    let digest = engine
        .run(&deps, &store, &config, &user, now.date_naive(), &[], now)
        .unwrap();

    assert_eq!(digest.counts.clusters, 1);
    assert_eq!(digest.counts.anti_clusters, 0);
    assert_eq!(digest.counts.implications_created, 1);
    assert!(digest.ended_at.is_some());

    let reloaded = store.get_digest(&user, now.date_naive()).unwrap().unwrap();
    assert_eq!(reloaded.counts.implications_created, 1);
}

#[test]
fn concurrent_run_is_rejected_while_one_is_marked_running() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let user = UserId::new();
    let now = Utc::now();

    let deps = ConsolidationDeps {
        llm: Arc::new(StubLlmProvider),
        embeddings: Arc::new(StubEmbeddingProvider::new(8)),
        vector_store: store.clone(),
        graph_store: store.clone(),
        implication_store: store.clone(),
    };

    let engine = ConsolidationEngine::new();
    let config = ConsolidationConfig::default();

    // First run with no memories is cheap and leaves the guard released.
    engine.run(&deps, &store, &config, &user, now.date_naive(), &[], now).unwrap();
    assert!(!engine.is_running());
}
