use chrono::{DateTime, Utc};

use crate::connection::{Connection, ConnectionType};
use crate::errors::MnemoResult;
use crate::ids::{MemoryId, UserId};

/// `true` when [`IGraphStore::upsert_connection`] inserted a brand-new row;
/// `false` when it strengthened a row that was already there.
pub type ConnectionCreated = bool;

/// Durable storage for the connection graph (C6, spec §4.6). Connections
/// are undirected; implementations normalize `(memory_a_id, memory_b_id)`
/// ordering before touching storage so a lookup from either side is the
/// same row.
pub trait IGraphStore: Send + Sync {
    /// Insert a new connection at `connection.weight` (callers pass
    /// [`Connection::INITIAL_WEIGHT`]), or apply the Hebbian update
    /// `w <- w + hebbian_delta * (1 - w)` in place if a row already exists
    /// between the pair (the existing row's type is left unchanged — only
    /// its weight and `last_coactivated_at` move). Returns whether a new
    /// row was created.
    fn upsert_connection(
        &self,
        connection: &Connection,
        hebbian_delta: f64,
        now: DateTime<Utc>,
    ) -> MnemoResult<ConnectionCreated>;

    fn strengthen(
        &self,
        a_id: &MemoryId,
        b_id: &MemoryId,
        connection_type: ConnectionType,
        delta: f64,
        now: DateTime<Utc>,
    ) -> MnemoResult<()>;

    /// All connections touching a memory, across every type.
    fn neighbors(&self, memory_id: &MemoryId) -> MnemoResult<Vec<Connection>>;

    /// The connection between two specific memories, if one exists (at
    /// most one row per unordered pair — spec §3).
    fn between(&self, a_id: &MemoryId, b_id: &MemoryId) -> MnemoResult<Vec<Connection>>;

    fn connection_count(&self, user_id: &UserId) -> MnemoResult<usize>;
}
