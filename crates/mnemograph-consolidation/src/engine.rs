//! `ConsolidationEngine`: single-execution guard plus the top-level
//! clustering -> anti-clustering -> per-cluster pipeline -> digest
//! orchestration (spec §4.8). Grounded on the teacher's
//! `cortex-consolidation::engine::ConsolidationEngine`, which uses the same
//! `Arc<AtomicBool>` compare-exchange guard to reject concurrent runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rand::seq::index::sample;
use rand::thread_rng;
use tracing::info;

use mnemograph_core::config::ConsolidationConfig;
use mnemograph_core::digest::Digest;
use mnemograph_core::errors::{ConsolidationError, MnemoResult};
use mnemograph_core::ids::{ContactId, MemoryId, UserId};
use mnemograph_core::memory::Memory;

use crate::clustering::{anti_cluster, cluster};
use crate::deps::ConsolidationDeps;
use crate::pipeline::process_cluster;

/// Coordinates one consolidation run for a user. Holds the reentrancy
/// guard; `deps` are fetched fresh per call so one engine instance can
/// serve every user the scheduler hands it (the guard itself is what
/// prevents two concurrent runs, not per-user state).
pub struct ConsolidationEngine {
    is_running: Arc<AtomicBool>,
}

impl Default for ConsolidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsolidationEngine {
    pub fn new() -> Self {
        Self { is_running: Arc::new(AtomicBool::new(false)) }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Run one consolidation pass for `user_id`, producing and persisting
    /// a `Digest` for `date`. Rejects concurrent invocations on the same
    /// engine instance (the scheduler is still responsible for ensuring
    /// at most one run per `(user, kind)` across the whole process).
    ///
    /// `storage` persists the `Digest` directly (spec §4.10 upsert-by-date);
    /// it has no dedicated trait, so the engine takes the concrete type the
    /// same way the ingest pipeline's caller owns `SyncState` persistence.
    pub fn run(
        &self,
        deps: &ConsolidationDeps,
        storage: &mnemograph_storage::StorageEngine,
        config: &ConsolidationConfig,
        user_id: &UserId,
        date: NaiveDate,
        contacts_snapshot: &[(ContactId, String)],
        now: DateTime<Utc>,
    ) -> MnemoResult<Digest> {
        if self
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ConsolidationError::DigestAlreadyFinalized {
                user_id: user_id.to_string(),
                date: date.to_string(),
            }
            .into());
        }

        let result = self.run_inner(deps, storage, config, user_id, date, contacts_snapshot, now);
        self.is_running.store(false, Ordering::SeqCst);
        result
    }

    fn run_inner(
        &self,
        deps: &ConsolidationDeps,
        storage: &mnemograph_storage::StorageEngine,
        config: &ConsolidationConfig,
        user_id: &UserId,
        date: NaiveDate,
        contacts_snapshot: &[(ContactId, String)],
        now: DateTime<Utc>,
    ) -> MnemoResult<Digest> {
        let mut digest = Digest::start(user_id.clone(), date, now);

        let dedup_removed = deps.implication_store.global_dedup(user_id)?;
        info!(user_id = %user_id, dedup_removed, "global implication dedup complete");

        let memories = deps.vector_store.list_all(user_id)?;
        let memories_by_id: HashMap<MemoryId, Memory> =
            memories.iter().cloned().map(|m| (m.id.clone(), m)).collect();

        let clusters = cluster(
            &memories,
            config.cluster_seed_pool,
            config.sim_cluster,
            config.max_cluster_size - 1,
            config.min_cluster_size,
        );
        digest.counts.clusters = clusters.len();

        let with_abstract = memories
            .iter()
            .filter(|m| m.embedding.is_some() && m.abstract_embedding.is_some())
            .count();
        let anti_clusters = if with_abstract >= config.anti_cluster_min_corpus {
            let mut rng = thread_rng();
            let draw = sample(&mut rng, with_abstract, config.anti_cluster_seed_count.min(with_abstract));
            anti_cluster(
                &memories,
                &draw.into_vec(),
                config.anti_surface_max,
                config.anti_abstract_min,
                5,
                config.min_cluster_size,
                config.anti_cluster_min_corpus,
            )
        } else {
            Vec::new()
        };
        digest.counts.anti_clusters = anti_clusters.len();

        for c in clusters.iter().chain(anti_clusters.iter()) {
            process_cluster(
                deps,
                config,
                user_id,
                c,
                &memories_by_id,
                contacts_snapshot,
                |text| deps.embeddings.embed(text),
                now,
                &mut digest,
            );
        }

        let summary = format!(
            "{} clusters, {} anti-clusters, {} connections created, {} implications created",
            digest.counts.clusters,
            digest.counts.anti_clusters,
            digest.counts.connections_created,
            digest.counts.implications_created,
        );
        digest.finish(Utc::now(), summary);
        storage.upsert_digest(&digest)?;
        Ok(digest)
    }
}
