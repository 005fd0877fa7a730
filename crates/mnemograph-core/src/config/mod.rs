//! Per-process configuration, injected — there is no global mutable
//! configuration state (spec §9 design notes). Every tunable enumerated in
//! spec §6 lives here, with the spec's default as the `Default` impl.

mod consolidation_config;
mod ingest_config;
mod retrieval_config;

pub use consolidation_config::ConsolidationConfig;
pub use ingest_config::IngestConfig;
pub use retrieval_config::RetrievalConfig;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, CortexResult};

/// Root configuration object. Load with [`MnemoConfig::from_toml_str`] or
/// [`MnemoConfig::from_toml_file`]; any field left unspecified in the source
/// TOML falls back to its spec-mandated default (`#[serde(default)]`
/// throughout, mirroring the teacher's `cortex-core::config` pattern).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MnemoConfig {
    pub retrieval: RetrievalConfig,
    pub consolidation: ConsolidationConfig,
    pub ingest: IngestConfig,
}

impl MnemoConfig {
    pub fn from_toml_str(s: &str) -> CortexResult<Self> {
        toml::from_str(s).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        }.into())
    }

    pub fn from_toml_file(path: &Path) -> CortexResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_falls_back_to_spec_defaults() {
        let cfg = MnemoConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.retrieval.seed_count, crate::constants::SEED_COUNT);
        assert_eq!(
            cfg.consolidation.sim_cluster,
            crate::constants::SIM_CLUSTER
        );
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let cfg = MnemoConfig::from_toml_str(
            "[retrieval]\nseed_count = 25\n",
        )
        .unwrap();
        assert_eq!(cfg.retrieval.seed_count, 25);
        assert_eq!(
            cfg.retrieval.default_max_memories,
            crate::constants::DEFAULT_MAX_MEMORIES
        );
    }
}
