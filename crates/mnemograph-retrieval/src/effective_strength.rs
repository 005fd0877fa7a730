//! Time-decayed strength (spec §4.9 step 3): a memory's raw `strength`
//! discounted by how long it's been since it last activated, with a longer
//! half-life for memories that participate in the connection graph.

use chrono::{DateTime, Utc};

use mnemograph_core::memory::Memory;

/// `strength * exp(-ln2 * days_since_last_activation / half_life)`, with
/// `half_life` chosen per memory: the "connected" half-life if this memory
/// has at least one connection, the shorter "isolated" one otherwise.
///
/// Connection count is evaluated per memory (`neighbors(id).len()`) rather
/// than the store-wide `IGraphStore::connection_count`, which is scoped to
/// a whole user — a design resolution of an ambiguity the store trait
/// otherwise leaves open (see `DESIGN.md`).
pub fn effective_strength(
    memory: &Memory,
    connection_count: usize,
    now: DateTime<Utc>,
    half_life_connected_days: f64,
    half_life_isolated_days: f64,
) -> f64 {
    let half_life = if connection_count > 0 {
        half_life_connected_days
    } else {
        half_life_isolated_days
    };
    let days = memory.days_since_last_activation(now);
    memory.strength * (-std::f64::consts::LN_2 * days / half_life).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use mnemograph_core::ids::UserId;
    use mnemograph_core::memory::Significance;

    fn memory_at(strength: f64, last_activated_at: DateTime<Utc>) -> Memory {
        let mut m = Memory::new(
            UserId::new(),
            "content".into(),
            "journal".into(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            Default::default(),
            Significance::Medium,
            last_activated_at,
        );
        m.strength = strength;
        m.last_activated_at = last_activated_at;
        m
    }

    #[test]
    fn fresh_activation_has_no_decay() {
        let now = Utc::now();
        let m = memory_at(1.0, now);
        assert!((effective_strength(&m, 1, now, 60.0, 30.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn isolated_memory_decays_faster_than_connected() {
        let now = Utc::now();
        let then = now - Duration::days(30);
        let m = memory_at(1.0, then);
        let connected = effective_strength(&m, 1, now, 60.0, 30.0);
        let isolated = effective_strength(&m, 0, now, 60.0, 30.0);
        assert!(isolated < connected);
        assert!((isolated - 0.5).abs() < 1e-6);
    }
}
