use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::errors::MnemoResult;
use crate::ids::{ImplicationId, MemoryId, UserId};
use crate::implication::Implication;

/// An implication paired with its similarity to a query vector (the
/// `knn_implications` bridging lookup, spec §4.9 step 8).
#[derive(Debug, Clone)]
pub struct ScoredImplication {
    pub implication: Implication,
    pub similarity: f64,
}

/// `true` when [`IImplicationStore::insert_or_reinforce`] inserted a brand
/// new row; `false` when it reinforced an existing duplicate.
pub type ImplicationCreated = bool;

/// Durable storage for higher-order implications (C7, spec §4.7).
pub trait IImplicationStore: Send + Sync {
    /// Insert a new implication, or reinforce an existing one if
    /// [`crate::constants::SIM_IMPL_DEDUP`] judges it a duplicate of one
    /// already on file for this user. Returns the surviving id and
    /// whether a new row was created.
    fn insert_or_reinforce(
        &self,
        implication: &Implication,
        now: DateTime<Utc>,
    ) -> MnemoResult<(ImplicationId, ImplicationCreated)>;

    fn get(&self, id: &ImplicationId) -> MnemoResult<Option<Implication>>;

    fn delete(&self, id: &ImplicationId) -> MnemoResult<()>;

    /// k nearest neighbors by implication embedding cosine similarity
    /// above `threshold`, sorted descending — the bridging lookup
    /// retrieval uses to surface implication-mediated neighbors that the
    /// raw graph hop wouldn't reach (spec §4.9 step 8).
    fn knn_by_embedding(
        &self,
        user_id: &UserId,
        query: &[f32],
        threshold: f64,
    ) -> MnemoResult<Vec<ScoredImplication>>;

    /// Run once per consolidation pass, before clustering: collapse every
    /// pair of implications whose embeddings exceed
    /// [`crate::constants::SIM_IMPL_DEDUP`], keeping the stronger of the
    /// pair. Returns the number of rows deleted (spec §4.7 `global_dedup`).
    fn global_dedup(&self, user_id: &UserId) -> MnemoResult<usize>;

    /// Implications whose source memories overlap the given set, ordered
    /// by overlap fraction descending — the bridging lookup retrieval
    /// uses to pull in implication-mediated neighbors (spec §4.9).
    fn list_by_source_overlap(
        &self,
        user_id: &UserId,
        activated_ids: &BTreeSet<MemoryId>,
    ) -> MnemoResult<Vec<Implication>>;

    /// Every implication on file for a user, for a global dedup pass
    /// during consolidation.
    fn list_all(&self, user_id: &UserId) -> MnemoResult<Vec<Implication>>;

    fn count_for_user(&self, user_id: &UserId) -> MnemoResult<usize>;
}
