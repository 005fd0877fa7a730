use chrono::{DateTime, Utc};

use crate::errors::MnemoResult;
use crate::ids::{MemoryId, UserId};
use crate::memory::Memory;

/// A memory paired with its similarity to a query vector.
#[derive(Debug, Clone)]
pub struct ScoredMemory {
    pub memory: Memory,
    pub similarity: f64,
}

/// Durable storage for memories and their surface/abstract embeddings
/// (C3, spec §4.3). Brute-force cosine kNN is sufficient at personal-scale
/// corpora (spec §9 design notes); no ANN index is required.
pub trait IVectorStore: Send + Sync {
    fn insert_memory(&self, memory: &Memory) -> MnemoResult<()>;

    fn get(&self, id: &MemoryId) -> MnemoResult<Option<Memory>>;

    fn get_bulk(&self, ids: &[MemoryId]) -> MnemoResult<Vec<Memory>>;

    /// Apply a Hebbian/activation update in place: bump strength,
    /// activation count, and `last_activated_at`.
    fn reinforce(
        &self,
        id: &MemoryId,
        delta_strength: f64,
        delta_activation: u64,
        now: DateTime<Utc>,
    ) -> MnemoResult<()>;

    /// Apply [`IVectorStore::reinforce`] to many memories in one
    /// transaction (spreading activation touches dozens per query).
    fn bulk_reinforce(
        &self,
        updates: &[(MemoryId, f64, u64)],
        now: DateTime<Utc>,
    ) -> MnemoResult<()>;

    /// Set `abstract_embedding` on an existing memory (spec §4.5, the
    /// abstract embedder's only write).
    fn attach_abstract_embedding(&self, id: &MemoryId, embedding: Vec<f32>) -> MnemoResult<()>;

    /// k nearest neighbors by surface embedding cosine similarity,
    /// restricted to one user's memories.
    fn knn_by_embedding(
        &self,
        user_id: &UserId,
        query: &[f32],
        k: usize,
        min_similarity: f64,
    ) -> MnemoResult<Vec<ScoredMemory>>;

    /// k nearest neighbors by abstract-pattern embedding, used by the
    /// consolidator to find cross-domain clusters (spec §4.8).
    fn knn_by_abstract(
        &self,
        user_id: &UserId,
        query: &[f32],
        k: usize,
        min_similarity: f64,
    ) -> MnemoResult<Vec<ScoredMemory>>;

    /// All memories for a user with an abstract embedding set, for
    /// clustering passes that need the full corpus rather than a kNN cut.
    fn list_with_abstract_embedding(&self, user_id: &UserId) -> MnemoResult<Vec<Memory>>;

    /// Every memory on file for a user regardless of embedding state, for
    /// the consolidator's cluster-seed ranking pass (spec §4.8).
    fn list_all(&self, user_id: &UserId) -> MnemoResult<Vec<Memory>>;

    fn count_for_user(&self, user_id: &UserId) -> MnemoResult<usize>;
}
