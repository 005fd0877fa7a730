//! End-to-end retrieval over an in-memory storage engine and stub
//! embedding provider.

use std::sync::Arc;

use chrono::Utc;

use mnemograph_core::config::RetrievalConfig;
use mnemograph_core::connection::{Connection, ConnectionType};
use mnemograph_core::ids::UserId;
use mnemograph_core::memory::{Memory, Significance};
use mnemograph_core::testing::StubEmbeddingProvider;
use mnemograph_core::traits::IGraphStore;
use mnemograph_retrieval::{RetrievalDeps, RetrieveOptions};
use mnemograph_storage::StorageEngine;

fn unit(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    for x in v.iter_mut() {
        *x /= norm;
    }
    v
}

fn embed(provider: &StubEmbeddingProvider, text: &str) -> Vec<f32> {
    mnemograph_core::traits::IEmbeddingProvider::embed(provider, text).unwrap()
}

#[test]
fn retrieve_surfaces_a_seed_and_its_hop_neighbor() {
    let store = StorageEngine::open_in_memory().unwrap();
    let user = UserId::new();
    let now = Utc::now();
    let embeddings = StubEmbeddingProvider::new(8);

    let seed_text = "had coffee with sam and talked about the new job";
    let seed_vec = embed(&embeddings, seed_text);
    let mut seed = Memory::new(
        user.clone(),
        seed_text.to_string(),
        "journal".into(),
        now.date_naive(),
        Default::default(),
        Significance::High,
        now,
    )
    .with_embedding(seed_vec);
    seed.strength = 2.0;
    store.insert_memory(&seed).unwrap();

    // A neighbor with an unrelated embedding, reached only via the graph hop.
    let neighbor_vec = unit(vec![-1.0, 0.2, 0.3, 0.1, 0.0, 0.0, 0.0, 0.0]);
    let mut neighbor = Memory::new(
        user.clone(),
        "decided to start running again".to_string(),
        "journal".into(),
        now.date_naive(),
        Default::default(),
        Significance::Medium,
        now,
    )
    .with_embedding(neighbor_vec);
    neighbor.strength = 1.5;
    store.insert_memory(&neighbor).unwrap();

    let connection = Connection {
        memory_a_id: seed.id.clone().min(neighbor.id.clone()),
        memory_b_id: seed.id.clone().max(neighbor.id.clone()),
        connection_type: ConnectionType::Thematic,
        weight: 0.9,
        reason: "both about a life change".into(),
        created_at: now,
        last_coactivated_at: now,
    };
    IGraphStore::upsert_connection(&store, &connection, 0.1, now).unwrap();

    let store = Arc::new(store);
    let deps = RetrievalDeps {
        embeddings: Arc::new(StubEmbeddingProvider::new(8)),
        vector_store: store.clone(),
        graph_store: store.clone(),
        implication_store: store.clone(),
    };
    let config = RetrievalConfig::default();
    let opts = RetrieveOptions::from_config(&config);

    let result = mnemograph_retrieval::retrieve(&deps, &config, &user, seed_text, &opts, now).unwrap();

    let ids: Vec<_> = result.memories.iter().map(|m| m.memory.id.clone()).collect();
    assert!(ids.contains(&seed.id));
    assert!(ids.contains(&neighbor.id), "hop neighbor should have been reached via the traversed edge");

    let seed_result = result.memories.iter().find(|m| m.memory.id == seed.id).unwrap();
    assert_eq!(seed_result.hop, 0);
    let neighbor_result = result.memories.iter().find(|m| m.memory.id == neighbor.id).unwrap();
    assert_eq!(neighbor_result.hop, 1);

    assert!(!result.connections.is_empty());

    // Hebbian reinforcement should have bumped the traversed edge's weight.
    let refreshed = IGraphStore::between(store.as_ref(), &connection.memory_a_id, &connection.memory_b_id).unwrap();
    assert_eq!(refreshed.len(), 1);
    assert!(refreshed[0].weight > connection.weight);
}

#[test]
fn skip_hebbian_leaves_weights_and_strengths_untouched() {
    let store = StorageEngine::open_in_memory().unwrap();
    let user = UserId::new();
    let now = Utc::now();
    let embeddings = StubEmbeddingProvider::new(8);

    let text = "quiet evening reading at home";
    let mut mem = Memory::new(
        user.clone(),
        text.to_string(),
        "journal".into(),
        now.date_naive(),
        Default::default(),
        Significance::Medium,
        now,
    )
    .with_embedding(embed(&embeddings, text));
    let before_activation_count = mem.activation_count;
    store.insert_memory(&mem).unwrap();
    mem.activation_count = before_activation_count;

    let store = Arc::new(store);
    let deps = RetrievalDeps {
        embeddings: Arc::new(StubEmbeddingProvider::new(8)),
        vector_store: store.clone(),
        graph_store: store.clone(),
        implication_store: store.clone(),
    };
    let config = RetrievalConfig::default();
    let mut opts = RetrieveOptions::from_config(&config);
    opts.skip_hebbian = true;

    mnemograph_retrieval::retrieve(&deps, &config, &user, text, &opts, now).unwrap();

    let reloaded = store.get(&mem.id).unwrap().unwrap();
    assert_eq!(reloaded.activation_count, before_activation_count);
}

#[test]
fn no_matching_seeds_returns_no_seeds_error() {
    let store = StorageEngine::open_in_memory().unwrap();
    let user = UserId::new();
    let store = Arc::new(store);
    let deps = RetrievalDeps {
        embeddings: Arc::new(StubEmbeddingProvider::new(8)),
        vector_store: store.clone(),
        graph_store: store.clone(),
        implication_store: store.clone(),
    };
    let config = RetrievalConfig::default();
    let opts = RetrieveOptions::from_config(&config);

    let err = mnemograph_retrieval::retrieve(&deps, &config, &user, "anything", &opts, Utc::now());
    assert!(err.is_err());
}
