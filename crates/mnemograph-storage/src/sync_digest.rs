//! `SyncState` and `Digest` persistence. Neither has a dedicated trait in
//! [`mnemograph_core::traits`] — both are consumed only by the scheduler
//! (C10) and consolidator (C8), which hold a concrete `StorageEngine`
//! rather than a trait object, so these are inherent methods.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};

use mnemograph_core::digest::{Digest, DigestCounts, DigestSnippet, DigestSnippetKind};
use mnemograph_core::errors::MnemoResult;
use mnemograph_core::ids::{DigestId, SourceId, UserId};
use mnemograph_core::sync_state::SyncState;

use crate::engine::StorageEngine;
use crate::to_storage_err;

fn snippet_kind_tag(kind: DigestSnippetKind) -> &'static str {
    match kind {
        DigestSnippetKind::ConnectionCreated => "connection_created",
        DigestSnippetKind::ConnectionStrengthened => "connection_strengthened",
        DigestSnippetKind::ImplicationCreated => "implication_created",
        DigestSnippetKind::ImplicationReinforced => "implication_reinforced",
        DigestSnippetKind::ImplicationFiltered => "implication_filtered",
    }
}

fn parse_snippet_kind(tag: &str) -> DigestSnippetKind {
    match tag {
        "connection_strengthened" => DigestSnippetKind::ConnectionStrengthened,
        "implication_created" => DigestSnippetKind::ImplicationCreated,
        "implication_reinforced" => DigestSnippetKind::ImplicationReinforced,
        "implication_filtered" => DigestSnippetKind::ImplicationFiltered,
        _ => DigestSnippetKind::ConnectionCreated,
    }
}

impl StorageEngine {
    pub fn get_sync_state(&self, user_id: &UserId, source_kind: &str) -> MnemoResult<Option<SyncState>> {
        self.pool().with_reader(|conn| {
            let row: Option<(String, Option<String>)> = conn
                .query_row(
                    "SELECT id, last_processed_at FROM sync_states WHERE user_id = ?1 AND source_kind = ?2",
                    params![user_id.as_str(), source_kind],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(|e| to_storage_err(e.to_string()))?;

            let Some((id, last_processed_at)) = row else {
                return Ok(None);
            };

            let mut stmt = conn
                .prepare("SELECT source_id FROM sync_state_processed WHERE sync_state_id = ?1")
                .map_err(|e| to_storage_err(e.to_string()))?;
            let processed: BTreeSet<SourceId> = stmt
                .query_map(params![id], |row| row.get::<_, String>(0))
                .map_err(|e| to_storage_err(e.to_string()))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| to_storage_err(e.to_string()))?
                .into_iter()
                .map(SourceId::new)
                .collect();

            Ok(Some(SyncState {
                user_id: user_id.clone(),
                source_kind: source_kind.to_string(),
                processed,
                last_processed_at: last_processed_at
                    .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                    .map(|d| d.with_timezone(&Utc)),
            }))
        })
    }

    pub fn save_sync_state(&self, state: &SyncState) -> MnemoResult<()> {
        self.pool().with_writer(|conn| {
            let tx = conn.unchecked_transaction().map_err(|e| to_storage_err(e.to_string()))?;

            let existing_id: Option<String> = tx
                .query_row(
                    "SELECT id FROM sync_states WHERE user_id = ?1 AND source_kind = ?2",
                    params![state.user_id.as_str(), state.source_kind],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| to_storage_err(e.to_string()))?;

            let id = match existing_id {
                Some(id) => {
                    tx.execute(
                        "UPDATE sync_states SET last_processed_at = ?1 WHERE id = ?2",
                        params![state.last_processed_at.map(|d| d.to_rfc3339()), id],
                    )
                    .map_err(|e| to_storage_err(e.to_string()))?;
                    id
                }
                None => {
                    let id = mnemograph_core::ids::SyncStateId::new().to_string();
                    tx.execute(
                        "INSERT INTO sync_states (id, user_id, source_kind, last_processed_at) \
                         VALUES (?1, ?2, ?3, ?4)",
                        params![
                            id,
                            state.user_id.as_str(),
                            state.source_kind,
                            state.last_processed_at.map(|d| d.to_rfc3339()),
                        ],
                    )
                    .map_err(|e| to_storage_err(e.to_string()))?;
                    id
                }
            };

            for source_id in &state.processed {
                tx.execute(
                    "INSERT OR IGNORE INTO sync_state_processed (sync_state_id, source_id) VALUES (?1, ?2)",
                    params![id, source_id.as_str()],
                )
                .map_err(|e| to_storage_err(e.to_string()))?;
            }

            tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
            Ok(())
        })
    }

    pub fn get_digest(&self, user_id: &UserId, date: NaiveDate) -> MnemoResult<Option<Digest>> {
        self.pool().with_reader(|conn| {
            let row: Option<(String, String, Option<String>, String, String)> = conn
                .query_row(
                    "SELECT id, started_at, finished_at, counts_json, summary \
                     FROM digests WHERE user_id = ?1 AND digest_date = ?2",
                    params![user_id.as_str(), date.to_string()],
                    |row| {
                        Ok((
                            row.get(0)?,
                            row.get(1)?,
                            row.get(2)?,
                            row.get(3)?,
                            row.get(4)?,
                        ))
                    },
                )
                .optional()
                .map_err(|e| to_storage_err(e.to_string()))?;

            let Some((id, started_at, finished_at, counts_json, summary)) = row else {
                return Ok(None);
            };

            let counts: DigestCounts =
                serde_json::from_str(&counts_json).map_err(|e| to_storage_err(e.to_string()))?;

            let mut stmt = conn
                .prepare("SELECT kind, summary FROM digest_snippets WHERE digest_id = ?1 ORDER BY position")
                .map_err(|e| to_storage_err(e.to_string()))?;
            let snippets = stmt
                .query_map(params![id], |row| {
                    let kind: String = row.get(0)?;
                    let summary: String = row.get(1)?;
                    Ok(DigestSnippet {
                        kind: parse_snippet_kind(&kind),
                        summary,
                    })
                })
                .map_err(|e| to_storage_err(e.to_string()))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| to_storage_err(e.to_string()))?;

            Ok(Some(Digest {
                id: DigestId::from_raw(id),
                user_id: user_id.clone(),
                date,
                started_at: DateTime::parse_from_rfc3339(&started_at)
                    .map(|d| d.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
                ended_at: finished_at.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()).map(|d| d.with_timezone(&Utc)),
                counts,
                summary,
                snippets,
            }))
        })
    }

    /// Upsert-by-`(user_id, date)` (spec §4.10): a second consolidation run
    /// on the same day replaces the prior digest rather than duplicating it.
    pub fn upsert_digest(&self, digest: &Digest) -> MnemoResult<()> {
        self.pool().with_writer(|conn| {
            let tx = conn.unchecked_transaction().map_err(|e| to_storage_err(e.to_string()))?;
            let counts_json =
                serde_json::to_string(&digest.counts).map_err(|e| to_storage_err(e.to_string()))?;

            tx.execute(
                "INSERT INTO digests (id, user_id, digest_date, started_at, finished_at, counts_json, summary)
                 VALUES (?1,?2,?3,?4,?5,?6,?7)
                 ON CONFLICT (user_id, digest_date) DO UPDATE SET
                    started_at = excluded.started_at,
                    finished_at = excluded.finished_at,
                    counts_json = excluded.counts_json,
                    summary = excluded.summary",
                params![
                    digest.id.as_str(),
                    digest.user_id.as_str(),
                    digest.date.to_string(),
                    digest.started_at.to_rfc3339(),
                    digest.ended_at.map(|d| d.to_rfc3339()),
                    counts_json,
                    digest.summary,
                ],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;

            let digest_id: String = tx
                .query_row(
                    "SELECT id FROM digests WHERE user_id = ?1 AND digest_date = ?2",
                    params![digest.user_id.as_str(), digest.date.to_string()],
                    |row| row.get(0),
                )
                .map_err(|e| to_storage_err(e.to_string()))?;

            tx.execute("DELETE FROM digest_snippets WHERE digest_id = ?1", params![digest_id])
                .map_err(|e| to_storage_err(e.to_string()))?;

            for (position, snippet) in digest.snippets.iter().enumerate() {
                tx.execute(
                    "INSERT INTO digest_snippets (digest_id, position, kind, summary) VALUES (?1,?2,?3,?4)",
                    params![digest_id, position as i64, snippet_kind_tag(snippet.kind), snippet.summary],
                )
                .map_err(|e| to_storage_err(e.to_string()))?;
            }

            tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
            Ok(())
        })
    }
}
