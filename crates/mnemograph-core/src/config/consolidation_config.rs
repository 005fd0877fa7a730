use serde::{Deserialize, Serialize};

use crate::constants;

/// Consolidator (C8) tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    pub sim_cluster: f64,
    pub anti_surface_max: f64,
    pub anti_abstract_min: f64,
    pub max_cluster_size: usize,
    pub min_cluster_size: usize,
    pub quality_threshold: u8,
    /// Spec §9 open question, resolved: explicit flag rather than
    /// hard-coded behavior. Default `true` per the spec's stated intent.
    pub quality_fail_open: bool,
    pub hebbian_delta_consolidate: f64,
    pub sim_impl_dedup: f64,
    /// Number of top-strength seeds considered per run (spec §4.8).
    pub cluster_seed_pool: usize,
    /// Number of anti-cluster seeds sampled per run (spec §4.8).
    pub anti_cluster_seed_count: usize,
    /// Minimum memories with abstract embeddings required to attempt
    /// anti-clustering at all (spec §4.8).
    pub anti_cluster_min_corpus: usize,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            sim_cluster: constants::SIM_CLUSTER,
            anti_surface_max: constants::ANTI_SURFACE_MAX,
            anti_abstract_min: constants::ANTI_ABSTRACT_MIN,
            max_cluster_size: constants::MAX_CLUSTER_SIZE,
            min_cluster_size: constants::MIN_CLUSTER_SIZE,
            quality_threshold: constants::QUALITY_THRESHOLD,
            quality_fail_open: true,
            hebbian_delta_consolidate: constants::HEBBIAN_DELTA_CONSOLIDATE,
            sim_impl_dedup: constants::SIM_IMPL_DEDUP,
            cluster_seed_pool: 10,
            anti_cluster_seed_count: 5,
            anti_cluster_min_corpus: 10,
        }
    }
}
