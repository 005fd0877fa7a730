//! [`IGraphStore`] (C6, spec §4.6) against the `connections` table.

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use mnemograph_core::connection::{Connection as MemConnection, ConnectionType};
use mnemograph_core::errors::MnemoResult;
use mnemograph_core::ids::{MemoryId, UserId};
use mnemograph_core::traits::{ConnectionCreated, IGraphStore};

use crate::engine::StorageEngine;
use crate::to_storage_err;

fn row_to_connection(row: &Row<'_>) -> rusqlite::Result<MemConnection> {
    let connection_type: String = row.get("connection_type")?;
    let created_at: String = row.get("created_at")?;
    let last_coactivated_at: String = row.get("last_coactivated_at")?;
    Ok(MemConnection {
        memory_a_id: MemoryId::from_raw(row.get::<_, String>("memory_a_id")?),
        memory_b_id: MemoryId::from_raw(row.get::<_, String>("memory_b_id")?),
        connection_type: ConnectionType::parse(&connection_type).unwrap_or(ConnectionType::Thematic),
        weight: row.get("weight")?,
        reason: row.get("reason")?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        last_coactivated_at: DateTime::parse_from_rfc3339(&last_coactivated_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

const CONNECTION_COLUMNS: &str =
    "memory_a_id, memory_b_id, connection_type, weight, reason, created_at, last_coactivated_at";

impl IGraphStore for StorageEngine {
    fn upsert_connection(
        &self,
        connection: &MemConnection,
        hebbian_delta: f64,
        now: DateTime<Utc>,
    ) -> MnemoResult<ConnectionCreated> {
        let Some((lo, hi)) = MemConnection::normalize_pair(
            connection.memory_a_id.clone(),
            connection.memory_b_id.clone(),
        ) else {
            return Err(crate::to_storage_err("upsert_connection: self-edge rejected".into()));
        };
        self.pool().with_writer(|conn| {
            let existing: Option<f64> = conn
                .query_row(
                    "SELECT weight FROM connections \
                     WHERE memory_a_id = ?1 AND memory_b_id = ?2",
                    params![lo.as_str(), hi.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| to_storage_err(e.to_string()))?;

            match existing {
                Some(weight) => {
                    let new_weight = weight + hebbian_delta * (1.0 - weight);
                    conn.execute(
                        "UPDATE connections SET weight = ?1, last_coactivated_at = ?2 \
                         WHERE memory_a_id = ?3 AND memory_b_id = ?4",
                        params![
                            new_weight,
                            now.to_rfc3339(),
                            lo.as_str(),
                            hi.as_str(),
                        ],
                    )
                    .map_err(|e| to_storage_err(e.to_string()))?;
                    Ok(false)
                }
                None => {
                    conn.execute(
                        "INSERT INTO connections (
                            memory_a_id, memory_b_id, connection_type, weight, reason,
                            created_at, last_coactivated_at
                        ) VALUES (?1,?2,?3,?4,?5,?6,?7)",
                        params![
                            lo.as_str(),
                            hi.as_str(),
                            connection.connection_type.tag(),
                            connection.weight,
                            connection.reason,
                            connection.created_at.to_rfc3339(),
                            connection.last_coactivated_at.to_rfc3339(),
                        ],
                    )
                    .map_err(|e| to_storage_err(e.to_string()))?;
                    Ok(true)
                }
            }
        })
    }

    fn strengthen(
        &self,
        a_id: &MemoryId,
        b_id: &MemoryId,
        _connection_type: ConnectionType,
        delta: f64,
        now: DateTime<Utc>,
    ) -> MnemoResult<()> {
        let Some((lo, hi)) = MemConnection::normalize_pair(a_id.clone(), b_id.clone()) else {
            return Ok(());
        };
        self.pool().with_writer(|conn| {
            conn.execute(
                "UPDATE connections SET weight = weight + ?1 * (1.0 - weight), \
                 last_coactivated_at = ?2 \
                 WHERE memory_a_id = ?3 AND memory_b_id = ?4",
                params![delta, now.to_rfc3339(), lo.as_str(), hi.as_str()],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
            Ok(())
        })
    }

    fn neighbors(&self, memory_id: &MemoryId) -> MnemoResult<Vec<MemConnection>> {
        self.pool().with_reader(|conn| {
            let sql = format!(
                "SELECT {CONNECTION_COLUMNS} FROM connections WHERE memory_a_id = ?1 OR memory_b_id = ?1"
            );
            let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
            let rows = stmt
                .query_map(params![memory_id.as_str()], row_to_connection)
                .map_err(|e| to_storage_err(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
        })
    }

    fn between(&self, a_id: &MemoryId, b_id: &MemoryId) -> MnemoResult<Vec<MemConnection>> {
        let Some((lo, hi)) = MemConnection::normalize_pair(a_id.clone(), b_id.clone()) else {
            return Ok(Vec::new());
        };
        self.pool().with_reader(|conn| {
            let sql = format!(
                "SELECT {CONNECTION_COLUMNS} FROM connections WHERE memory_a_id = ?1 AND memory_b_id = ?2"
            );
            let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
            let rows = stmt
                .query_map(params![lo.as_str(), hi.as_str()], row_to_connection)
                .map_err(|e| to_storage_err(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
        })
    }

    fn connection_count(&self, user_id: &UserId) -> MnemoResult<usize> {
        self.pool().with_reader(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM connections c \
                 JOIN memories m ON m.id = c.memory_a_id WHERE m.user_id = ?1",
                params![user_id.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .map(|c| c as usize)
            .map_err(|e| to_storage_err(e.to_string()))
        })
    }
}
