//! Property tests for the monotonicity/boundedness laws spec §8 names for
//! `Connection`/`Memory`.

use chrono::Utc;
use mnemograph_core::connection::{Connection, ConnectionType};
use mnemograph_core::ids::MemoryId;
use mnemograph_core::memory::{Memory, Significance};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn sample_connection(weight: f64) -> Connection {
    let now = Utc::now();
    Connection {
        memory_a_id: MemoryId::from_raw("mem_a"),
        memory_b_id: MemoryId::from_raw("mem_b"),
        connection_type: ConnectionType::Thematic,
        weight,
        reason: "shared topic".into(),
        created_at: now,
        last_coactivated_at: now,
    }
}

proptest! {
    #[test]
    fn strengthen_stays_within_unit_interval(
        initial_weight in 0.0f64..=1.0,
        delta in 0.001f64..1.0,
        steps in 1u32..50,
    ) {
        let mut c = sample_connection(initial_weight);
        let now = Utc::now();
        for _ in 0..steps {
            let before = c.weight;
            c.strengthen(delta, now);
            prop_assert!((0.0..=1.0).contains(&c.weight));
            prop_assert!(c.weight >= before);
        }
    }

    #[test]
    fn reinforce_never_lowers_memory_strength_or_activation(
        delta_strength in 0.0f64..5.0,
        delta_activation in 0u64..100,
    ) {
        let m0 = Memory::new(
            mnemograph_core::ids::UserId::new(),
            "content".into(),
            "journal".into(),
            chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            BTreeSet::new(),
            Significance::Medium,
            Utc::now(),
        );
        let mut m = m0.clone();
        m.reinforce(delta_strength, delta_activation, Utc::now());
        prop_assert!(m.strength >= m0.strength);
        prop_assert!(m.activation_count >= m0.activation_count);
    }
}
