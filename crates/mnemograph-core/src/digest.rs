//! Per-user, per-date audit record of one consolidation run (spec §3
//! `Digest`, §4.10 upsert-by-`(user, date)` semantics).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{DigestId, UserId};

/// A single line-item in a digest's snippet list: what changed, briefly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestSnippet {
    pub kind: DigestSnippetKind,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestSnippetKind {
    ConnectionCreated,
    ConnectionStrengthened,
    ImplicationCreated,
    ImplicationReinforced,
    ImplicationFiltered,
}

/// Counters for one consolidation run, matching the scenario assertions of
/// spec §8 (`connections_created`, `implications_filtered`, ...).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DigestCounts {
    pub clusters: usize,
    pub anti_clusters: usize,
    pub connections_created: usize,
    pub connections_strengthened: usize,
    pub implications_created: usize,
    pub implications_reinforced: usize,
    pub implications_filtered: usize,
}

/// Audit record of one `(user, date)` consolidation run. Upserted, never
/// duplicated — consolidation is idempotent per day per user (spec §4.10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub id: DigestId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub counts: DigestCounts,
    pub summary: String,
    pub snippets: Vec<DigestSnippet>,
}

impl Digest {
    pub fn start(user_id: UserId, date: NaiveDate, started_at: DateTime<Utc>) -> Self {
        Self {
            id: DigestId::new(),
            user_id,
            date,
            started_at,
            ended_at: None,
            counts: DigestCounts::default(),
            summary: String::new(),
            snippets: Vec::new(),
        }
    }

    pub fn push_snippet(&mut self, kind: DigestSnippetKind, summary: impl Into<String>) {
        self.snippets.push(DigestSnippet {
            kind,
            summary: summary.into(),
        });
    }

    pub fn finish(&mut self, ended_at: DateTime<Utc>, summary: String) {
        self.ended_at = Some(ended_at);
        self.summary = summary;
    }
}
