//! Per-`(user, kind)` run lock. Grounded on the teacher's
//! `cortex-consolidation::engine::ConsolidationEngine` compare-exchange
//! guard and `cortex-session::SessionManager`'s `DashMap`-per-entity
//! concurrency model — here keyed by `(UserId, RunKind)` instead of session
//! id, since spec §5/§4.10 requires at most one in-flight run per user per
//! run kind, not a single global lock.

use dashmap::DashMap;

use mnemograph_core::errors::{MnemoError, SchedulerError};
use mnemograph_core::ids::UserId;

/// The two background run kinds the scheduler coordinates (spec §4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunKind {
    Ingest,
    Consolidate,
}

impl RunKind {
    fn tag(self) -> &'static str {
        match self {
            RunKind::Ingest => "ingest",
            RunKind::Consolidate => "consolidate",
        }
    }
}

/// Tracks which `(user, kind)` pairs currently have a run in flight.
/// Acquiring returns a [`RunGuard`] that releases the slot on drop, so a
/// panicking or cancelled run never leaves the user permanently locked out.
#[derive(Default)]
pub struct RunLock {
    inflight: DashMap<(UserId, RunKind), ()>,
}

impl RunLock {
    pub fn new() -> Self {
        Self { inflight: DashMap::new() }
    }

    /// Attempt to take the run slot for `(user_id, kind)`. Returns `None`
    /// if a run of that kind is already in progress for that user — the
    /// scheduler never blocks waiting for it (spec §5 "no two concurrent
    /// ingests for the same user").
    pub fn try_acquire(&self, user_id: UserId, kind: RunKind) -> Result<RunGuard<'_>, MnemoError> {
        let key = (user_id.clone(), kind);
        if self.inflight.insert(key.clone(), ()).is_some() {
            // Already present before our insert: someone else holds it.
            // Restore the prior occupancy marker and report busy.
            return Err(SchedulerError::AlreadyRunning {
                user_id: user_id.to_string(),
                kind: kind.tag(),
            }
            .into());
        }
        Ok(RunGuard { lock: &self.inflight, key })
    }

    pub fn is_running(&self, user_id: &UserId, kind: RunKind) -> bool {
        self.inflight.contains_key(&(user_id.clone(), kind))
    }
}

/// RAII handle on a run slot; dropping it frees the `(user, kind)` pair for
/// the next run.
pub struct RunGuard<'a> {
    lock: &'a DashMap<(UserId, RunKind), ()>,
    key: (UserId, RunKind),
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.lock.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_for_same_user_and_kind_is_rejected() {
        let lock = RunLock::new();
        let user = UserId::new();
        let guard = lock.try_acquire(user.clone(), RunKind::Ingest).unwrap();
        assert!(lock.try_acquire(user.clone(), RunKind::Ingest).is_err());
        drop(guard);
        assert!(lock.try_acquire(user, RunKind::Ingest).is_ok());
    }

    #[test]
    fn different_kinds_for_same_user_do_not_conflict() {
        let lock = RunLock::new();
        let user = UserId::new();
        let _ingest_guard = lock.try_acquire(user.clone(), RunKind::Ingest).unwrap();
        assert!(lock.try_acquire(user, RunKind::Consolidate).is_ok());
    }

    #[test]
    fn different_users_do_not_conflict() {
        let lock = RunLock::new();
        let _a = lock.try_acquire(UserId::new(), RunKind::Ingest).unwrap();
        let _b = lock.try_acquire(UserId::new(), RunKind::Ingest).unwrap();
    }
}
