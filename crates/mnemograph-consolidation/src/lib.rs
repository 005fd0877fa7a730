//! Consolidator (C8, spec §4.8): clusters and anti-clusters a user's
//! memories, runs a three-stage LLM pipeline per cluster to discover
//! connections and synthesize implications, and records the run as a
//! per-day `Digest`.

mod clustering;
mod deps;
mod engine;
mod pipeline;

pub use clustering::{anti_cluster, cluster, Cluster};
pub use deps::ConsolidationDeps;
pub use engine::ConsolidationEngine;
