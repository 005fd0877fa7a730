use serde::{Deserialize, Serialize};

use crate::constants;

/// Memory ingest (C4) tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub sim_dedup: f64,
    pub min_text_len: usize,
    pub batch_size: usize,
    pub embed_max_batch: usize,
    pub default_deadline_secs: u64,
    pub post_extract_min_slack_secs: u64,
    pub per_cycle_min_slack_secs: u64,
    pub llm_timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            sim_dedup: constants::SIM_DEDUP,
            min_text_len: constants::MIN_INGEST_TEXT_LEN,
            batch_size: constants::INGEST_BATCH_SIZE,
            embed_max_batch: constants::EMBED_MAX_BATCH,
            default_deadline_secs: constants::DEFAULT_INGEST_DEADLINE_SECS,
            post_extract_min_slack_secs: constants::POST_EXTRACT_MIN_SLACK_SECS,
            per_cycle_min_slack_secs: constants::PER_CYCLE_MIN_SLACK_SECS,
            llm_timeout_secs: constants::DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}
