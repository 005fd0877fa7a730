//! Drives one consolidation pass for a user (spec §4.10: idempotent per
//! day per user, upserts a `Digest` keyed by `(user, date)`).

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use mnemograph_core::config::ConsolidationConfig;
use mnemograph_core::digest::Digest;
use mnemograph_core::errors::MnemoResult;
use mnemograph_core::ids::{ContactId, UserId};
use mnemograph_consolidation::{ConsolidationDeps, ConsolidationEngine};
use mnemograph_storage::StorageEngine;

/// Run consolidation for `user_id` on `date`. Re-running on the same day
/// is safe and intentional (spec §4.10 "idempotent per day per user,
/// upsert semantics") — a second run on an unchanged corpus produces no
/// new connections or implications beyond additional Hebbian
/// strengthening of whatever the first run already found (spec §8 quality
/// gate idempotence law).
pub fn run_consolidation_for_user(
    storage: &StorageEngine,
    deps: &ConsolidationDeps,
    config: &ConsolidationConfig,
    user_id: &UserId,
    date: NaiveDate,
    contacts_snapshot: &[(ContactId, String)],
    now: DateTime<Utc>,
) -> MnemoResult<Digest> {
    let engine = ConsolidationEngine::new();
    let digest = engine.run(deps, storage, config, user_id, date, contacts_snapshot, now)?;
    info!(
        user_id = %user_id,
        date = %date,
        clusters = digest.counts.clusters,
        connections_created = digest.counts.connections_created,
        implications_created = digest.counts.implications_created,
        "consolidation run complete"
    );
    Ok(digest)
}
