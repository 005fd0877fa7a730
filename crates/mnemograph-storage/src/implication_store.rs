//! [`IImplicationStore`] (C7, spec §4.7) against the `implications` table.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use mnemograph_core::constants::SIM_IMPL_DEDUP;
use mnemograph_core::errors::MnemoResult;
use mnemograph_core::ids::{ImplicationId, MemoryId, UserId};
use mnemograph_core::implication::{Implication, ImplicationOrder, ImplicationType};
use mnemograph_core::memory::cosine_similarity;
use mnemograph_core::traits::{IImplicationStore, ImplicationCreated, ScoredImplication};

use crate::codec::{bytes_to_f32_vec, f32_vec_to_bytes};
use crate::engine::StorageEngine;
use crate::to_storage_err;

const IMPLICATION_COLUMNS: &str = "id, user_id, content, embedding, embedding_dims, \
    implication_type, implication_order, source_memory_ids, strength, created_at, last_reinforced_at";

fn row_to_implication(row: &Row<'_>) -> rusqlite::Result<Implication> {
    let embedding_bytes: Vec<u8> = row.get("embedding")?;
    let embedding_dims: i64 = row.get("embedding_dims")?;
    let implication_type: String = row.get("implication_type")?;
    let implication_order: i64 = row.get("implication_order")?;
    let source_memory_ids_json: String = row.get("source_memory_ids")?;
    let created_at: String = row.get("created_at")?;
    let last_reinforced_at: String = row.get("last_reinforced_at")?;

    let source_memory_ids: BTreeSet<MemoryId> =
        serde_json::from_str::<Vec<String>>(&source_memory_ids_json)
            .unwrap_or_default()
            .into_iter()
            .map(MemoryId::from_raw)
            .collect();

    Ok(Implication {
        id: ImplicationId::from_raw(row.get::<_, String>("id")?),
        user_id: UserId::from_raw(row.get::<_, String>("user_id")?),
        content: row.get("content")?,
        embedding: bytes_to_f32_vec(&embedding_bytes, embedding_dims as usize),
        implication_type: ImplicationType::parse(&implication_type).unwrap_or(ImplicationType::Behavioral),
        implication_order: ImplicationOrder::parse(implication_order as u8).unwrap_or(ImplicationOrder::First),
        source_memory_ids,
        strength: row.get("strength")?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        last_reinforced_at: DateTime::parse_from_rfc3339(&last_reinforced_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

fn insert_implication(conn: &rusqlite::Connection, imp: &Implication) -> MnemoResult<()> {
    let source_ids_json = serde_json::to_string(
        &imp.source_memory_ids.iter().map(|id| id.as_str().to_string()).collect::<Vec<_>>(),
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    conn.execute(
        "INSERT INTO implications (
            id, user_id, content, embedding, embedding_dims, implication_type,
            implication_order, source_memory_ids, strength, created_at, last_reinforced_at
        ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
        params![
            imp.id.as_str(),
            imp.user_id.as_str(),
            imp.content,
            f32_vec_to_bytes(&imp.embedding),
            imp.embedding.len() as i64,
            imp.implication_type.tag(),
            imp.implication_order as i64,
            source_ids_json,
            imp.strength,
            imp.created_at.to_rfc3339(),
            imp.last_reinforced_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

impl IImplicationStore for StorageEngine {
    fn insert_or_reinforce(
        &self,
        implication: &Implication,
        now: DateTime<Utc>,
    ) -> MnemoResult<(ImplicationId, ImplicationCreated)> {
        self.pool().with_writer(|conn| {
            let sql = format!(
                "SELECT {IMPLICATION_COLUMNS} FROM implications WHERE user_id = ?1"
            );
            let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
            let rows = stmt
                .query_map(params![implication.user_id.as_str()], row_to_implication)
                .map_err(|e| to_storage_err(e.to_string()))?;

            let mut duplicate_of = None;
            for row in rows {
                let existing = row.map_err(|e| to_storage_err(e.to_string()))?;
                if existing.embedding.len() == implication.embedding.len()
                    && cosine_similarity(&existing.embedding, &implication.embedding) > SIM_IMPL_DEDUP
                {
                    duplicate_of = Some(existing.id);
                    break;
                }
            }
            drop(stmt);

            if let Some(existing_id) = duplicate_of {
                conn.execute(
                    "UPDATE implications SET strength = strength + 0.1, last_reinforced_at = ?1 WHERE id = ?2",
                    params![now.to_rfc3339(), existing_id.as_str()],
                )
                .map_err(|e| to_storage_err(e.to_string()))?;
                Ok((existing_id, false))
            } else {
                insert_implication(conn, implication)?;
                Ok((implication.id.clone(), true))
            }
        })
    }

    fn delete(&self, id: &ImplicationId) -> MnemoResult<()> {
        self.pool().with_writer(|conn| {
            conn.execute("DELETE FROM implications WHERE id = ?1", params![id.as_str()])
                .map_err(|e| to_storage_err(e.to_string()))?;
            Ok(())
        })
    }

    fn knn_by_embedding(
        &self,
        user_id: &UserId,
        query: &[f32],
        threshold: f64,
    ) -> MnemoResult<Vec<ScoredImplication>> {
        let all = self.list_all(user_id)?;
        let mut scored: Vec<ScoredImplication> = all
            .into_iter()
            .filter(|imp| imp.embedding.len() == query.len())
            .map(|implication| {
                let similarity = cosine_similarity(query, &implication.embedding);
                ScoredImplication { implication, similarity }
            })
            .filter(|s| s.similarity > threshold)
            .collect();
        // Tie-broken by id for deterministic ordering, matching the vector
        // store's knn contract (spec §4.3).
        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.implication.id.cmp(&b.implication.id))
        });
        Ok(scored)
    }

    /// Greedy dedup: rank by strength descending so the strongest
    /// implication in a near-duplicate group survives (mirrors
    /// `insert_or_reinforce`'s "keep the existing row" bias).
    fn global_dedup(&self, user_id: &UserId) -> MnemoResult<usize> {
        let mut all = self.list_all(user_id)?;
        all.sort_by(|a, b| b.strength.partial_cmp(&a.strength).unwrap_or(std::cmp::Ordering::Equal));

        let mut absorbed = std::collections::HashSet::new();
        let mut deleted = 0usize;
        for i in 0..all.len() {
            if absorbed.contains(&i) {
                continue;
            }
            for j in (i + 1)..all.len() {
                if absorbed.contains(&j) {
                    continue;
                }
                if all[i].embedding.len() != all[j].embedding.len() {
                    continue;
                }
                if cosine_similarity(&all[i].embedding, &all[j].embedding) > SIM_IMPL_DEDUP {
                    absorbed.insert(j);
                }
            }
        }
        for (j, imp) in all.iter().enumerate() {
            if absorbed.contains(&j) {
                self.delete(&imp.id)?;
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    fn get(&self, id: &ImplicationId) -> MnemoResult<Option<Implication>> {
        self.pool().with_reader(|conn| {
            let sql = format!("SELECT {IMPLICATION_COLUMNS} FROM implications WHERE id = ?1");
            conn.query_row(&sql, params![id.as_str()], row_to_implication)
                .optional()
                .map_err(|e| to_storage_err(e.to_string()))
        })
    }

    fn list_by_source_overlap(
        &self,
        user_id: &UserId,
        activated_ids: &BTreeSet<MemoryId>,
    ) -> MnemoResult<Vec<Implication>> {
        let mut all = self.list_all(user_id)?;
        all.retain(|imp| imp.source_memory_ids.intersection(activated_ids).next().is_some());
        all.sort_by(|a, b| {
            b.relevance(activated_ids)
                .partial_cmp(&a.relevance(activated_ids))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(all)
    }

    fn list_all(&self, user_id: &UserId) -> MnemoResult<Vec<Implication>> {
        self.pool().with_reader(|conn| {
            let sql = format!("SELECT {IMPLICATION_COLUMNS} FROM implications WHERE user_id = ?1");
            let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
            let rows = stmt
                .query_map(params![user_id.as_str()], row_to_implication)
                .map_err(|e| to_storage_err(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
        })
    }

    fn count_for_user(&self, user_id: &UserId) -> MnemoResult<usize> {
        self.pool().with_reader(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM implications WHERE user_id = ?1",
                params![user_id.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .map(|c| c as usize)
            .map_err(|e| to_storage_err(e.to_string()))
        })
    }
}
