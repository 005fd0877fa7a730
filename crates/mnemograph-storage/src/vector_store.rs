//! [`IVectorStore`] (C3, spec §4.3) against the `memories` table.
//! Brute-force cosine kNN, grounded on
//! `cortex-storage/src/queries/vector_search.rs::search_vector`.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use mnemograph_core::errors::MnemoResult;
use mnemograph_core::ids::{ContactId, MemoryId, UserId};
use mnemograph_core::memory::{cosine_similarity, Memory};
use mnemograph_core::traits::{IVectorStore, ScoredMemory};

use crate::codec::{bytes_to_f32_vec, f32_vec_to_bytes};
use crate::engine::StorageEngine;
use crate::to_storage_err;

fn row_to_memory(row: &Row<'_>) -> rusqlite::Result<Memory> {
    let embedding: Option<Vec<u8>> = row.get("embedding")?;
    let embedding_dims: Option<i64> = row.get("embedding_dims")?;
    let abstract_embedding: Option<Vec<u8>> = row.get("abstract_embedding")?;
    let abstract_dims: Option<i64> = row.get("abstract_dims")?;
    let contact_ids_json: String = row.get("contact_ids")?;
    let source_date: String = row.get("source_date")?;
    let last_activated_at: String = row.get("last_activated_at")?;
    let created_at: String = row.get("created_at")?;
    let significance_weight: f64 = row.get("significance_weight")?;

    let contact_ids: BTreeSet<ContactId> = serde_json::from_str::<Vec<String>>(&contact_ids_json)
        .unwrap_or_default()
        .into_iter()
        .map(ContactId::new)
        .collect();

    Ok(Memory {
        id: MemoryId::from_raw(row.get::<_, String>("id")?),
        user_id: UserId::from_raw(row.get::<_, String>("user_id")?),
        content: row.get("content")?,
        embedding: embedding
            .zip(embedding_dims)
            .map(|(b, d)| bytes_to_f32_vec(&b, d as usize)),
        abstract_embedding: abstract_embedding
            .zip(abstract_dims)
            .map(|(b, d)| bytes_to_f32_vec(&b, d as usize)),
        source: row.get("source")?,
        source_date: NaiveDate::from_str(&source_date).unwrap_or_default(),
        contact_ids,
        significance_weight,
        strength: row.get("strength")?,
        activation_count: row.get::<_, i64>("activation_count")? as u64,
        last_activated_at: DateTime::parse_from_rfc3339(&last_activated_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

const MEMORY_COLUMNS: &str = "id, user_id, content, embedding, embedding_dims, \
    abstract_embedding, abstract_dims, source, source_date, contact_ids, \
    significance_weight, strength, activation_count, last_activated_at, created_at";

fn insert_memory_conn(conn: &Connection, memory: &Memory) -> MnemoResult<()> {
    let contact_ids_json = serde_json::to_string(
        &memory.contact_ids.iter().map(|c| c.as_str().to_string()).collect::<Vec<_>>(),
    )
    .map_err(|e| crate::to_storage_err(e.to_string()))?;

    conn.execute(
        "INSERT INTO memories (
            id, user_id, content, embedding, embedding_dims, abstract_embedding,
            abstract_dims, source, source_date, contact_ids, significance_weight,
            strength, activation_count, last_activated_at, created_at
        ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
        params![
            memory.id.as_str(),
            memory.user_id.as_str(),
            memory.content,
            memory.embedding.as_ref().map(|v| f32_vec_to_bytes(v)),
            memory.embedding.as_ref().map(|v| v.len() as i64),
            memory.abstract_embedding.as_ref().map(|v| f32_vec_to_bytes(v)),
            memory.abstract_embedding.as_ref().map(|v| v.len() as i64),
            memory.source,
            memory.source_date.to_string(),
            contact_ids_json,
            memory.significance_weight,
            memory.strength,
            memory.activation_count as i64,
            memory.last_activated_at.to_rfc3339(),
            memory.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

fn reinforce_conn(
    conn: &Connection,
    id: &MemoryId,
    delta_strength: f64,
    delta_activation: u64,
    now: DateTime<Utc>,
) -> MnemoResult<()> {
    conn.execute(
        "UPDATE memories SET strength = strength + ?1, activation_count = activation_count + ?2, \
         last_activated_at = ?3 WHERE id = ?4",
        params![delta_strength, delta_activation as i64, now.to_rfc3339(), id.as_str()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

fn knn(
    conn: &Connection,
    user_id: &UserId,
    query: &[f32],
    k: usize,
    min_similarity: f64,
    embedding_col: &str,
) -> MnemoResult<Vec<ScoredMemory>> {
    let sql = format!(
        "SELECT {MEMORY_COLUMNS} FROM memories WHERE user_id = ?1 AND {embedding_col} IS NOT NULL"
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![user_id.as_str()], row_to_memory)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut scored = Vec::new();
    for row in rows {
        let memory = row.map_err(|e| to_storage_err(e.to_string()))?;
        let candidate = if embedding_col == "embedding" {
            memory.embedding.as_deref()
        } else {
            memory.abstract_embedding.as_deref()
        };
        let Some(candidate) = candidate else { continue };
        if candidate.len() != query.len() {
            continue;
        }
        let sim = cosine_similarity(query, candidate);
        if sim >= min_similarity {
            scored.push(ScoredMemory { memory, similarity: sim });
        }
    }
    // Spec §4.3: results are ordered by similarity descending and
    // tie-broken by id so brute-force KNN is deterministic regardless of
    // SQLite's unspecified scan order.
    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.memory.id.cmp(&b.memory.id))
    });
    scored.truncate(k);
    Ok(scored)
}

impl IVectorStore for StorageEngine {
    fn insert_memory(&self, memory: &Memory) -> MnemoResult<()> {
        self.pool().with_writer(|conn| insert_memory_conn(conn, memory))
    }

    fn get(&self, id: &MemoryId) -> MnemoResult<Option<Memory>> {
        self.pool().with_reader(|conn| {
            let sql = format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1");
            conn.query_row(&sql, params![id.as_str()], row_to_memory)
                .optional()
                .map_err(|e| to_storage_err(e.to_string()))
        })
    }

    fn get_bulk(&self, ids: &[MemoryId]) -> MnemoResult<Vec<Memory>> {
        self.pool().with_reader(|conn| {
            let mut out = Vec::with_capacity(ids.len());
            let sql = format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1");
            for id in ids {
                if let Some(m) = conn
                    .query_row(&sql, params![id.as_str()], row_to_memory)
                    .optional()
                    .map_err(|e| to_storage_err(e.to_string()))?
                {
                    out.push(m);
                }
            }
            Ok(out)
        })
    }

    fn reinforce(
        &self,
        id: &MemoryId,
        delta_strength: f64,
        delta_activation: u64,
        now: DateTime<Utc>,
    ) -> MnemoResult<()> {
        self.pool()
            .with_writer(|conn| reinforce_conn(conn, id, delta_strength, delta_activation, now))
    }

    fn bulk_reinforce(&self, updates: &[(MemoryId, f64, u64)], now: DateTime<Utc>) -> MnemoResult<()> {
        self.pool().with_writer(|conn| {
            let tx = conn.unchecked_transaction().map_err(|e| to_storage_err(e.to_string()))?;
            for (id, delta_strength, delta_activation) in updates {
                reinforce_conn(&tx, id, *delta_strength, *delta_activation, now)?;
            }
            tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
            Ok(())
        })
    }

    fn knn_by_embedding(
        &self,
        user_id: &UserId,
        query: &[f32],
        k: usize,
        min_similarity: f64,
    ) -> MnemoResult<Vec<ScoredMemory>> {
        self.pool()
            .with_reader(|conn| knn(conn, user_id, query, k, min_similarity, "embedding"))
    }

    fn knn_by_abstract(
        &self,
        user_id: &UserId,
        query: &[f32],
        k: usize,
        min_similarity: f64,
    ) -> MnemoResult<Vec<ScoredMemory>> {
        self.pool().with_reader(|conn| {
            knn(conn, user_id, query, k, min_similarity, "abstract_embedding")
        })
    }

    fn list_with_abstract_embedding(&self, user_id: &UserId) -> MnemoResult<Vec<Memory>> {
        self.pool().with_reader(|conn| {
            let sql = format!(
                "SELECT {MEMORY_COLUMNS} FROM memories WHERE user_id = ?1 AND abstract_embedding IS NOT NULL"
            );
            let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
            let rows = stmt
                .query_map(params![user_id.as_str()], row_to_memory)
                .map_err(|e| to_storage_err(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
        })
    }

    fn attach_abstract_embedding(&self, id: &MemoryId, embedding: Vec<f32>) -> MnemoResult<()> {
        self.pool().with_writer(|conn| {
            conn.execute(
                "UPDATE memories SET abstract_embedding = ?1, abstract_dims = ?2 WHERE id = ?3",
                params![f32_vec_to_bytes(&embedding), embedding.len() as i64, id.as_str()],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
            Ok(())
        })
    }

    fn list_all(&self, user_id: &UserId) -> MnemoResult<Vec<Memory>> {
        self.pool().with_reader(|conn| {
            let sql = format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE user_id = ?1");
            let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
            let rows = stmt
                .query_map(params![user_id.as_str()], row_to_memory)
                .map_err(|e| to_storage_err(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
        })
    }

    fn count_for_user(&self, user_id: &UserId) -> MnemoResult<usize> {
        self.pool().with_reader(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM memories WHERE user_id = ?1",
                params![user_id.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .map(|c| c as usize)
            .map_err(|e| to_storage_err(e.to_string()))
        })
    }
}
