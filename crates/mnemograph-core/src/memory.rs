//! The atomic memory — the base unit of the associative graph (spec §3).

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ContactId, MemoryId, UserId};

/// LLM-assigned significance bucket, mapped to a fixed `strength` seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    High,
    Medium,
    Low,
}

impl Significance {
    /// Initial `strength` a freshly-extracted memory is seeded with.
    pub fn initial_strength(self) -> f64 {
        match self {
            Significance::High => 1.5,
            Significance::Medium => 1.0,
            Significance::Low => 0.7,
        }
    }
}

/// The tag identifying where a memory was ingested from (e.g. `"journal"`).
pub type SourceTag = String;

/// An atomic, self-contained memory statement (spec §3 `Memory`).
///
/// Invariants upheld by construction: `embedding`/`abstract_embedding`, when
/// present, are L2-unit within `1e-3`; `strength >= 0`; `activation_count >=
/// 0`. None of these fields are ever lowered by any operation in this crate
/// family — see spec §8's monotonicity law.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: MemoryId,
    pub user_id: UserId,
    /// ≥ 1 char after trimming.
    pub content: String,
    /// Unit vector of fixed dimension `D`. `None` only transiently during
    /// insert, before the embedding batch resolves.
    pub embedding: Option<Vec<f32>>,
    /// Names/dates/locations-stripped paraphrase embedding, filled
    /// asynchronously by the abstract embedder (C5). `None` until then.
    pub abstract_embedding: Option<Vec<f32>>,
    pub source: SourceTag,
    pub source_date: NaiveDate,
    pub contact_ids: BTreeSet<ContactId>,
    pub significance_weight: f64,
    pub strength: f64,
    pub activation_count: u64,
    pub last_activated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Memory {
    /// Construct a brand-new memory at ingest time (spec §4.4 step 6).
    ///
    /// `embedding` is attached separately once the embedding batch resolves;
    /// callers build this with `embedding: None` and then call
    /// [`Memory::with_embedding`].
    pub fn new(
        user_id: UserId,
        content: String,
        source: SourceTag,
        source_date: NaiveDate,
        contact_ids: BTreeSet<ContactId>,
        significance: Significance,
        now: DateTime<Utc>,
    ) -> Self {
        let strength = significance.initial_strength();
        Self {
            id: MemoryId::new(),
            user_id,
            content,
            embedding: None,
            abstract_embedding: None,
            source,
            source_date,
            contact_ids,
            significance_weight: strength,
            strength,
            activation_count: 1,
            last_activated_at: now,
            created_at: now,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        debug_assert!(is_unit_vector(&embedding), "embedding must be L2-unit");
        self.embedding = Some(embedding);
        self
    }

    /// Apply a Hebbian/semantic-reinforcement bump in place (never lowers
    /// `strength` or `activation_count` — spec §3 lifecycle, §8 monotonicity).
    pub fn reinforce(&mut self, delta_strength: f64, delta_activation: u64, now: DateTime<Utc>) {
        debug_assert!(delta_strength >= 0.0);
        self.strength += delta_strength;
        self.activation_count += delta_activation;
        self.last_activated_at = now;
    }

    /// Number of days between `last_activated_at` and `now`, floored at 0.
    pub fn days_since_last_activation(&self, now: DateTime<Utc>) -> f64 {
        let delta = now.signed_duration_since(self.last_activated_at);
        (delta.num_seconds() as f64 / 86_400.0).max(0.0)
    }
}

/// `true` if `v` is L2-unit within the spec's `1e-3` tolerance.
pub fn is_unit_vector(v: &[f32]) -> bool {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    (norm - 1.0).abs() < 1e-3
}

/// L2-normalize `v` in place. No-op on a zero vector (left as-is — a
/// provider returning an all-zero embedding is a provider bug, not
/// something this function can repair).
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Cosine similarity between two equal-length vectors. Callers are expected
/// to pass unit vectors (in which case this is just the dot product); if
/// they are not exactly unit, this still computes true cosine similarity.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "cosine_similarity: dimension mismatch");
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na * nb)) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn significance_maps_to_spec_strength_seeds() {
        assert_eq!(Significance::High.initial_strength(), 1.5);
        assert_eq!(Significance::Medium.initial_strength(), 1.0);
        assert_eq!(Significance::Low.initial_strength(), 0.7);
    }

    #[test]
    fn reinforce_never_lowers_strength_or_activation() {
        let mut m = Memory::new(
            UserId::new(),
            "ate breakfast".into(),
            "journal".into(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            BTreeSet::new(),
            Significance::Medium,
            Utc::now(),
        );
        let before = (m.strength, m.activation_count);
        m.reinforce(0.05, 1, Utc::now());
        assert!(m.strength > before.0);
        assert!(m.activation_count > before.1);
    }

    #[test]
    fn cosine_of_identical_unit_vectors_is_one() {
        let v = vec![1.0_f32, 0.0, 0.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_produces_unit_vector() {
        let mut v = vec![3.0_f32, 4.0];
        l2_normalize(&mut v);
        assert!(is_unit_vector(&v));
    }
}
