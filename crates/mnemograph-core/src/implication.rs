//! Higher-order insights synthesized from memory clusters (spec §3
//! `Implication`, §4.7 implication store operations).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ImplicationId, MemoryId, UserId};

/// Closed set of implication types (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplicationType {
    Predictive,
    Emotional,
    Relational,
    Identity,
    Behavioral,
    Actionable,
    Absence,
    Trajectory,
    MetaCognitive,
    Retrograde,
    Counterfactual,
}

impl ImplicationType {
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag {
            "predictive" => Self::Predictive,
            "emotional" => Self::Emotional,
            "relational" => Self::Relational,
            "identity" => Self::Identity,
            "behavioral" => Self::Behavioral,
            "actionable" => Self::Actionable,
            "absence" => Self::Absence,
            "trajectory" => Self::Trajectory,
            "meta_cognitive" => Self::MetaCognitive,
            "retrograde" => Self::Retrograde,
            "counterfactual" => Self::Counterfactual,
            _ => return None,
        })
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Predictive => "predictive",
            Self::Emotional => "emotional",
            Self::Relational => "relational",
            Self::Identity => "identity",
            Self::Behavioral => "behavioral",
            Self::Actionable => "actionable",
            Self::Absence => "absence",
            Self::Trajectory => "trajectory",
            Self::MetaCognitive => "meta_cognitive",
            Self::Retrograde => "retrograde",
            Self::Counterfactual => "counterfactual",
        }
    }
}

/// Order of indirection: 1st-order insights draw directly on source
/// memories, 2nd/3rd-order build on other implications (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ImplicationOrder {
    First = 1,
    Second = 2,
    Third = 3,
}

impl ImplicationOrder {
    pub fn parse(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            _ => None,
        }
    }
}

/// A higher-order insight derived from one or more source memories.
///
/// Invariant: `source_memory_ids` is non-empty at creation time, and every
/// id names a memory of the same user that existed at creation time
/// (dangling entries are tolerated after source deletion but filtered out
/// on read — spec §3, §7 `NotFound`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Implication {
    pub id: ImplicationId,
    pub user_id: UserId,
    pub content: String,
    pub embedding: Vec<f32>,
    pub implication_type: ImplicationType,
    pub implication_order: ImplicationOrder,
    pub source_memory_ids: BTreeSet<MemoryId>,
    pub strength: f64,
    pub created_at: DateTime<Utc>,
    pub last_reinforced_at: DateTime<Utc>,
}

impl Implication {
    pub const INITIAL_STRENGTH: f64 = 1.0;

    pub fn new(
        user_id: UserId,
        content: String,
        embedding: Vec<f32>,
        implication_type: ImplicationType,
        implication_order: ImplicationOrder,
        source_memory_ids: BTreeSet<MemoryId>,
        now: DateTime<Utc>,
    ) -> Self {
        debug_assert!(
            !source_memory_ids.is_empty(),
            "implication source_memory_ids must be non-empty at creation"
        );
        Self {
            id: ImplicationId::new(),
            user_id,
            content,
            embedding,
            implication_type,
            implication_order,
            source_memory_ids,
            strength: Self::INITIAL_STRENGTH,
            created_at: now,
            last_reinforced_at: now,
        }
    }

    /// Rediscovery reinforcement (spec §4.7): `strength += 0.1`.
    pub fn reinforce(&mut self, now: DateTime<Utc>) {
        self.strength += 0.1;
        self.last_reinforced_at = now;
    }

    /// `|intersection(source_memory_ids, activated_ids)| / |source_memory_ids|`
    /// — the relevance annotation from `list_by_source_overlap` (spec §4.7).
    pub fn relevance(&self, activated_ids: &BTreeSet<MemoryId>) -> f64 {
        let intersection = self.source_memory_ids.intersection(activated_ids).count();
        intersection as f64 / self.source_memory_ids.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Implication {
        let mut sources = BTreeSet::new();
        sources.insert(MemoryId::from_raw("mem_a"));
        sources.insert(MemoryId::from_raw("mem_b"));
        Implication::new(
            UserId::new(),
            "a pattern emerges".into(),
            vec![1.0, 0.0],
            ImplicationType::Behavioral,
            ImplicationOrder::First,
            sources,
            Utc::now(),
        )
    }

    #[test]
    fn relevance_is_intersection_over_source_count() {
        let imp = sample();
        let mut activated = BTreeSet::new();
        activated.insert(MemoryId::from_raw("mem_a"));
        assert_eq!(imp.relevance(&activated), 0.5);
    }

    #[test]
    fn reinforce_bumps_strength_by_one_tenth() {
        let mut imp = sample();
        imp.reinforce(Utc::now());
        assert!((imp.strength - 1.1).abs() < 1e-9);
    }
}
