//! Per-user, per-source ingest bookmark (spec §3 `SyncState`).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{SourceId, UserId};

/// The set of already-processed external ids for one `(user, source kind)`,
/// plus the last time ingest ran for it. Used by the scheduler (C10) to
/// resume after a crash or a cancelled run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncState {
    pub user_id: UserId,
    /// e.g. `"journal"` — the ingest source kind this bookmark tracks.
    pub source_kind: String,
    pub processed: BTreeSet<SourceId>,
    pub last_processed_at: Option<DateTime<Utc>>,
}

impl SyncState {
    pub fn new(user_id: UserId, source_kind: impl Into<String>) -> Self {
        Self {
            user_id,
            source_kind: source_kind.into(),
            processed: BTreeSet::new(),
            last_processed_at: None,
        }
    }

    pub fn is_processed(&self, source_id: &SourceId) -> bool {
        self.processed.contains(source_id)
    }

    /// Mark `source_id` processed and advance the bookmark. Never called
    /// for a cancelled/partial ingest run (spec §5 cancellation semantics).
    pub fn mark_processed(&mut self, source_id: SourceId, now: DateTime<Utc>) {
        self.processed.insert(source_id);
        self.last_processed_at = Some(now);
    }
}
