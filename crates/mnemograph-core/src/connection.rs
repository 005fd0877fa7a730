//! Undirected, weighted, typed edges between memories (spec §3 `Connection`,
//! §4.6 graph store operations).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::MemoryId;

/// Closed set of connection types (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Causal,
    Thematic,
    Contradiction,
    Pattern,
    TemporalSequence,
    CrossDomain,
    Sensory,
    Deviation,
    Escalation,
}

impl ConnectionType {
    /// Parse from the closed tag vocabulary, rejecting anything else —
    /// LLM output is dynamic JSON and must not propagate untyped strings
    /// past the parsing boundary (spec §9 design notes).
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag {
            "causal" => Self::Causal,
            "thematic" => Self::Thematic,
            "contradiction" => Self::Contradiction,
            "pattern" => Self::Pattern,
            "temporal_sequence" => Self::TemporalSequence,
            "cross_domain" => Self::CrossDomain,
            "sensory" => Self::Sensory,
            "deviation" => Self::Deviation,
            "escalation" => Self::Escalation,
            _ => return None,
        })
    }

    /// The tag this variant parses from — `ConnectionType::parse(t.tag())
    /// == Some(t)` for every `t`.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Causal => "causal",
            Self::Thematic => "thematic",
            Self::Contradiction => "contradiction",
            Self::Pattern => "pattern",
            Self::TemporalSequence => "temporal_sequence",
            Self::CrossDomain => "cross_domain",
            Self::Sensory => "sensory",
            Self::Deviation => "deviation",
            Self::Escalation => "escalation",
        }
    }
}

/// An undirected edge between two distinct memories of the same user.
///
/// Invariant: `memory_a_id < memory_b_id` lexicographically, so each
/// unordered pair has at most one row, and `memory_a_id != memory_b_id` (the
/// spec forbids self-edges — §9 open question, resolved).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub memory_a_id: MemoryId,
    pub memory_b_id: MemoryId,
    pub connection_type: ConnectionType,
    pub weight: f64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub last_coactivated_at: DateTime<Utc>,
}

impl Connection {
    /// Initial weight assigned to a brand-new connection.
    pub const INITIAL_WEIGHT: f64 = 0.5;

    /// Normalize an unordered pair `(a, b)` into `(lo, hi)` with `lo < hi`.
    ///
    /// Panics (debug) / returns `None` (release-safe callers should check
    /// first) on `a == b` — self-edges are forbidden by spec §9.
    pub fn normalize_pair(a: MemoryId, b: MemoryId) -> Option<(MemoryId, MemoryId)> {
        debug_assert!(a != b, "self-edges are forbidden: {a} == {b}");
        if a == b {
            return None;
        }
        if a < b {
            Some((a, b))
        } else {
            Some((b, a))
        }
    }

    /// Hebbian update: `w <- w + delta * (1 - w)`. Strictly increases
    /// towards (never past) 1, and never drops below the input weight —
    /// preserves the `[0, 1]` invariant by construction for any `delta` in
    /// `(0, 1)` and any `w0` in `[0, 1]` (spec §4.6, §8 law).
    pub fn strengthen(&mut self, delta: f64, now: DateTime<Utc>) {
        debug_assert!((0.0..1.0).contains(&delta));
        self.weight += delta * (1.0 - self.weight);
        self.last_coactivated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_pair_orders_lexicographically() {
        let a = MemoryId::from_raw("mem_b");
        let b = MemoryId::from_raw("mem_a");
        let (lo, hi) = Connection::normalize_pair(a.clone(), b.clone()).unwrap();
        assert_eq!(lo, b);
        assert_eq!(hi, a);
    }

    #[test]
    fn normalize_pair_rejects_self_edge() {
        let a = MemoryId::from_raw("mem_a");
        assert!(Connection::normalize_pair(a.clone(), a).is_none());
    }

    #[test]
    fn strengthen_never_exits_unit_interval() {
        let now = Utc::now();
        let mut c = Connection {
            memory_a_id: MemoryId::from_raw("mem_a"),
            memory_b_id: MemoryId::from_raw("mem_b"),
            connection_type: ConnectionType::Thematic,
            weight: Connection::INITIAL_WEIGHT,
            reason: "same topic".into(),
            created_at: now,
            last_coactivated_at: now,
        };
        for _ in 0..10_000 {
            c.strengthen(0.1, now);
            assert!((0.0..=1.0).contains(&c.weight));
        }
        assert!(c.weight > Connection::INITIAL_WEIGHT);
    }

    #[test]
    fn connection_type_rejects_unknown_tags() {
        assert!(ConnectionType::parse("causal").is_some());
        assert!(ConnectionType::parse("made_up_tag").is_none());
    }

    #[test]
    fn connection_type_tag_round_trips_through_parse() {
        for t in [
            ConnectionType::Causal,
            ConnectionType::Thematic,
            ConnectionType::Contradiction,
            ConnectionType::Pattern,
            ConnectionType::TemporalSequence,
            ConnectionType::CrossDomain,
            ConnectionType::Sensory,
            ConnectionType::Deviation,
            ConnectionType::Escalation,
        ] {
            assert_eq!(ConnectionType::parse(t.tag()), Some(t));
        }
    }
}
