//! Drives `mnemograph_ingest::ingest` across a user's pending sources for
//! one scheduled run, self-checking the wall-clock budget between sources
//! the way spec §4.4 step 4 requires within a single source (spec §4.10
//! "pipelines self-check the remaining budget").

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use mnemograph_core::config::IngestConfig;
use mnemograph_core::errors::MnemoResult;
use mnemograph_core::ids::{SourceId, UserId};
use mnemograph_core::sync_state::SyncState;
use mnemograph_ingest::{ContactRecord, ExplicitMention, IngestDeps};

/// One journal entry (or other ingest source) waiting to be processed, plus
/// the per-entry context `ingest()` needs (spec §4.4's `contacts_snapshot`
/// and explicit-mention mapping are per-call, not per-user-global, since a
/// journaling app may attach different snapshots to different entries).
pub struct PendingSource {
    pub source_id: SourceId,
    pub text: String,
    pub entry_date: NaiveDate,
    pub contacts_snapshot: Vec<ContactRecord>,
    pub explicit_mentions: Vec<ExplicitMention>,
}

/// Aggregate outcome of one ingest run over possibly many sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestRunSummary {
    pub sources_attempted: usize,
    pub sources_completed: usize,
    pub created: usize,
    pub reinforced: usize,
    /// Sources left unprocessed because the run ran out of budget — the
    /// next scheduled run resumes from `SyncState` (spec §4.10).
    pub deferred: usize,
}

/// Run ingest for `sources` in order, stopping once the deadline no longer
/// leaves the per-cycle minimum slack (spec §4.10). `sync_state` is loaded
/// by the caller and saved back after each source that actually advances
/// it, so a cancelled or deadline-truncated run leaves durable partial
/// progress without ever marking a source processed that wasn't (spec §5
/// cancellation semantics).
#[allow(clippy::too_many_arguments)]
pub fn run_ingest_for_user(
    deps: &IngestDeps,
    config: &IngestConfig,
    user_id: &UserId,
    sources: Vec<PendingSource>,
    sync_state: &mut SyncState,
    deadline: DateTime<Utc>,
    mut save_sync_state: impl FnMut(&SyncState) -> MnemoResult<()>,
) -> MnemoResult<IngestRunSummary> {
    let mut summary = IngestRunSummary::default();
    let total = sources.len();

    for (idx, source) in sources.into_iter().enumerate() {
        let now = Utc::now();
        let slack = deadline.signed_duration_since(now).num_seconds();
        if slack < config.per_cycle_min_slack_secs as i64 {
            summary.deferred = total - idx;
            info!(
                user_id = %user_id,
                deferred = summary.deferred,
                "ingest run out of budget, deferring remaining sources"
            );
            break;
        }

        summary.sources_attempted += 1;
        let remaining_hint = total - idx;
        match mnemograph_ingest::ingest(
            deps,
            config,
            user_id,
            source.source_id,
            &source.text,
            source.entry_date,
            &source.contacts_snapshot,
            &source.explicit_mentions,
            sync_state,
            remaining_hint,
            deadline,
            now,
        ) {
            Ok(outcome) => {
                summary.created += outcome.created;
                summary.reinforced += outcome.reinforced;
                summary.sources_completed += 1;
                save_sync_state(sync_state)?;
            }
            Err(e) => {
                // Best-effort per spec §7: a single source's failure does
                // not abort the run; SyncState already reflects whatever
                // the failed call did or didn't commit.
                warn!(user_id = %user_id, error = %e, "ingest source failed, continuing run");
            }
        }
    }

    Ok(summary)
}
