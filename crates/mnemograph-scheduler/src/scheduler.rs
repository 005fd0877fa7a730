//! `Scheduler`: the top-level C10 coordinator. Owns the per-`(user, kind)`
//! run lock and fans scheduled runs out across users over
//! `tokio::task::spawn_blocking`, bounded by a semaphore — the pipeline
//! crates themselves (`mnemograph-ingest`, `mnemograph-consolidation`,
//! `mnemograph-retrieval`) stay ordinary synchronous Rust (spec §11 ambient
//! stack: "the teacher's own cortex subsystem is entirely synchronous"),
//! while the scheduler is the one place `tokio` earns its keep: cooperative
//! fan-out of independent users' background runs (spec §5 "the overall
//! system supports parallel operations across different users").

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio::sync::Semaphore;
use tokio::task;

use mnemograph_consolidation::ConsolidationDeps;
use mnemograph_core::config::{ConsolidationConfig, IngestConfig};
use mnemograph_core::digest::Digest;
use mnemograph_core::errors::{MnemoError, MnemoResult, SchedulerError, StorageError};
use mnemograph_core::ids::{ContactId, UserId};
use mnemograph_core::sync_state::SyncState;
use mnemograph_ingest::IngestDeps;
use mnemograph_storage::StorageEngine;

use crate::consolidation_runner::run_consolidation_for_user;
use crate::ingest_runner::{run_ingest_for_user, IngestRunSummary, PendingSource};
use crate::run_lock::{RunKind, RunLock};

/// Default cap on scheduled runs executing concurrently across all users —
/// bounds how many blocking-pool threads the scheduler pins down at once,
/// independent of how many users have pending work.
const DEFAULT_MAX_CONCURRENT_RUNS: usize = 8;

fn join_panic(stage: &'static str) -> MnemoError {
    MnemoError::Scheduler(SchedulerError::Storage(StorageError::Backend(format!(
        "{stage} task panicked"
    ))))
}

/// Coordinates background ingest and consolidation runs (C10, spec §4.10).
/// One `Scheduler` is shared process-wide; it holds no per-user state of
/// its own beyond the run lock; all durable state lives in `StorageEngine`.
pub struct Scheduler {
    storage: Arc<StorageEngine>,
    ingest_deps: IngestDeps,
    consolidation_deps: ConsolidationDeps,
    ingest_config: IngestConfig,
    consolidation_config: ConsolidationConfig,
    run_lock: RunLock,
    concurrency: Arc<Semaphore>,
}

impl Scheduler {
    pub fn new(
        storage: Arc<StorageEngine>,
        ingest_deps: IngestDeps,
        consolidation_deps: ConsolidationDeps,
        ingest_config: IngestConfig,
        consolidation_config: ConsolidationConfig,
    ) -> Self {
        Self::with_concurrency(
            storage,
            ingest_deps,
            consolidation_deps,
            ingest_config,
            consolidation_config,
            DEFAULT_MAX_CONCURRENT_RUNS,
        )
    }

    pub fn with_concurrency(
        storage: Arc<StorageEngine>,
        ingest_deps: IngestDeps,
        consolidation_deps: ConsolidationDeps,
        ingest_config: IngestConfig,
        consolidation_config: ConsolidationConfig,
        max_concurrent_runs: usize,
    ) -> Self {
        Self {
            storage,
            ingest_deps,
            consolidation_deps,
            ingest_config,
            consolidation_config,
            run_lock: RunLock::new(),
            concurrency: Arc::new(Semaphore::new(max_concurrent_runs.max(1))),
        }
    }

    pub fn is_running(&self, user_id: &UserId, kind: RunKind) -> bool {
        self.run_lock.is_running(user_id, kind)
    }

    /// Run ingest for `user_id` over `sources`, self-checking the wall
    /// clock budget between sources (spec §4.10). Rejects immediately
    /// (does not queue) if an ingest run for this user is already in
    /// flight (spec §5).
    pub async fn schedule_ingest(
        &self,
        user_id: UserId,
        sources: Vec<PendingSource>,
        now: DateTime<Utc>,
    ) -> MnemoResult<IngestRunSummary> {
        let guard = self.run_lock.try_acquire(user_id.clone(), RunKind::Ingest)?;
        let _permit = self
            .concurrency
            .acquire()
            .await
            .expect("scheduler semaphore never closes");

        let storage = Arc::clone(&self.storage);
        let deps = self.ingest_deps.clone();
        let config = self.ingest_config.clone();
        let deadline = now + Duration::seconds(config.default_deadline_secs as i64);
        let uid = user_id.clone();

        let result = task::spawn_blocking(move || -> MnemoResult<IngestRunSummary> {
            let mut sync_state = storage
                .get_sync_state(&uid, "journal")?
                .unwrap_or_else(|| SyncState::new(uid.clone(), "journal"));
            run_ingest_for_user(&deps, &config, &uid, sources, &mut sync_state, deadline, |state| {
                storage.save_sync_state(state)
            })
        })
        .await
        .map_err(|_| join_panic("ingest"))??;

        drop(guard);
        Ok(result)
    }

    /// Run one consolidation pass for `user_id` on `date`. Rejects
    /// immediately if a consolidation run for this user is already in
    /// flight; otherwise always runs (re-running on an already-consolidated
    /// day is the intended idempotent upsert, spec §4.10).
    pub async fn schedule_consolidation(
        &self,
        user_id: UserId,
        date: NaiveDate,
        contacts_snapshot: Vec<(ContactId, String)>,
        now: DateTime<Utc>,
    ) -> MnemoResult<Digest> {
        let guard = self.run_lock.try_acquire(user_id.clone(), RunKind::Consolidate)?;
        let _permit = self
            .concurrency
            .acquire()
            .await
            .expect("scheduler semaphore never closes");

        let storage = Arc::clone(&self.storage);
        let deps = self.consolidation_deps.clone();
        let config = self.consolidation_config.clone();
        let uid = user_id.clone();

        let result = task::spawn_blocking(move || -> MnemoResult<Digest> {
            run_consolidation_for_user(&storage, &deps, &config, &uid, date, &contacts_snapshot, now)
        })
        .await
        .map_err(|_| join_panic("consolidation"))??;

        drop(guard);
        Ok(result)
    }
}
