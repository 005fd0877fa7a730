//! Property tests for the vector codec and kNN threshold behavior (spec §8,
//! §4.3).

use mnemograph_storage::codec::{bytes_to_f32_vec, f32_vec_to_bytes};
use proptest::prelude::*;

proptest! {
    #[test]
    fn f32_vec_round_trips_through_bytes(
        v in prop::collection::vec(-1000.0f32..1000.0, 0..64),
    ) {
        let bytes = f32_vec_to_bytes(&v);
        let back = bytes_to_f32_vec(&bytes, v.len());
        prop_assert_eq!(back, v);
    }
}

use chrono::{NaiveDate, Utc};
use mnemograph_core::ids::UserId;
use mnemograph_core::memory::{cosine_similarity, Memory, Significance};
use mnemograph_core::traits::IVectorStore;
use mnemograph_storage::StorageEngine;
use std::collections::BTreeSet;

fn unit2(angle_deg: f64) -> Vec<f32> {
    let rad = angle_deg.to_radians();
    vec![rad.cos() as f32, rad.sin() as f32]
}

proptest! {
    #[test]
    fn knn_never_returns_a_result_below_min_similarity(
        angle in 0.0f64..360.0,
        min_similarity in 0.0f64..=1.0,
    ) {
        let engine = StorageEngine::open_in_memory().unwrap();
        let user_id = UserId::new();
        let query = vec![1.0f32, 0.0];

        let memory = Memory::new(
            user_id.clone(),
            "candidate".into(),
            "journal".into(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            BTreeSet::new(),
            Significance::Medium,
            Utc::now(),
        )
        .with_embedding(unit2(angle));
        engine.insert_memory(&memory).unwrap();

        let hits = engine.knn_by_embedding(&user_id, &query, 10, min_similarity).unwrap();
        for hit in &hits {
            let sim = cosine_similarity(&query, hit.memory.embedding.as_deref().unwrap());
            prop_assert!(sim >= min_similarity - 1e-6);
        }
    }
}
