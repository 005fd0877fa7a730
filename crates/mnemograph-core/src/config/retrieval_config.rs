use serde::{Deserialize, Serialize};

use crate::constants;

/// Retrieval engine (C9) tunables — the complete options surface of spec
/// §4.9 plus the underlying constants of §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub seed_count: usize,
    pub default_max_memories: usize,
    pub default_max_hops: usize,
    pub default_min_strength: f64,
    pub hop_discount: f64,
    pub half_life_connected_days: f64,
    pub half_life_isolated_days: f64,
    pub hebbian_delta_retrieve: f64,
    pub bridging_impl_threshold: f64,
    pub max_bridging_implications: usize,
    pub mmr_overrep: f64,
    pub mmr_max_per_entity: f64,
    pub mmr_diversity_weight: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            seed_count: constants::SEED_COUNT,
            default_max_memories: constants::DEFAULT_MAX_MEMORIES,
            default_max_hops: constants::DEFAULT_MAX_HOPS,
            default_min_strength: constants::DEFAULT_MIN_STRENGTH,
            hop_discount: constants::HOP_DISCOUNT,
            half_life_connected_days: constants::HALF_LIFE_CONNECTED_DAYS,
            half_life_isolated_days: constants::HALF_LIFE_ISOLATED_DAYS,
            hebbian_delta_retrieve: constants::HEBBIAN_DELTA_RETRIEVE,
            bridging_impl_threshold: constants::BRIDGING_IMPL_THRESHOLD,
            max_bridging_implications: constants::MAX_BRIDGING_IMPLICATIONS,
            mmr_overrep: constants::MMR_OVERREP,
            mmr_max_per_entity: constants::MMR_MAX_PER_ENTITY,
            mmr_diversity_weight: constants::MMR_DIVERSITY_WEIGHT,
        }
    }
}
