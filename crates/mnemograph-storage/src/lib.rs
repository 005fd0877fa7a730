//! # mnemograph-storage
//!
//! SQLite-backed persistence for memories, connections, and implications
//! (C3/C6/C7, spec §4.3, §4.6, §4.7), plus `SyncState`/`Digest` bookkeeping
//! for the scheduler and consolidator. Grounded on `cortex-storage`: one
//! writer connection behind a mutex, a small round-robin read pool, WAL
//! journaling, and `CREATE TABLE IF NOT EXISTS` migrations run at open time.

pub mod codec;
mod engine;
mod graph_store;
mod implication_store;
mod migrations;
mod pool;
mod pragmas;
mod sync_digest;
mod vector_store;

pub use engine::StorageEngine;

use mnemograph_core::errors::{MnemoError, StorageError};

pub(crate) fn to_storage_err(reason: impl Into<String>) -> MnemoError {
    MnemoError::Storage(StorageError::Backend(reason.into()))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use mnemograph_core::ids::UserId;
    use mnemograph_core::memory::{Memory, Significance};
    use mnemograph_core::traits::IVectorStore;
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn insert_then_get_round_trips() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let user_id = UserId::new();
        let memory = Memory::new(
            user_id.clone(),
            "ate breakfast".into(),
            "journal".into(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            BTreeSet::new(),
            Significance::Medium,
            Utc::now(),
        )
        .with_embedding(vec![1.0, 0.0, 0.0]);

        engine.insert_memory(&memory).unwrap();
        let fetched = engine.get(&memory.id).unwrap().unwrap();
        assert_eq!(fetched.content, "ate breakfast");
        assert_eq!(fetched.embedding, Some(vec![1.0, 0.0, 0.0]));
    }

    #[test]
    fn knn_by_embedding_respects_min_similarity() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let user_id = UserId::new();
        for (content, vec) in [("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])] {
            let memory = Memory::new(
                user_id.clone(),
                content.into(),
                "journal".into(),
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                BTreeSet::new(),
                Significance::Medium,
                Utc::now(),
            )
            .with_embedding(vec);
            engine.insert_memory(&memory).unwrap();
        }

        let hits = engine.knn_by_embedding(&user_id, &[1.0, 0.0], 10, 0.9).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].memory.content, "a");
    }
}
