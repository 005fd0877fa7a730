//! Tunable constants enumerated in spec §6. Every value here is the spec's
//! default; `MnemoConfig` (see [`crate::config`]) lets a caller override any
//! of them per-process.

/// Cosine similarity above which a newly-extracted memory is treated as a
/// duplicate of an existing one (spec §4.4 step 6).
pub const SIM_DEDUP: f64 = 0.92;
/// Cosine similarity above which two implications are treated as duplicates
/// (spec §4.7 `global_dedup`, §4.8 quality gate dedup).
pub const SIM_IMPL_DEDUP: f64 = 0.75;
/// Cosine similarity threshold for cluster membership (spec §4.8).
pub const SIM_CLUSTER: f64 = 0.65;
/// Anti-cluster: maximum raw-embedding cosine similarity (spec §4.8).
pub const ANTI_SURFACE_MAX: f64 = 0.35;
/// Anti-cluster: minimum abstract-embedding cosine similarity (spec §4.8).
pub const ANTI_ABSTRACT_MIN: f64 = 0.55;

pub const MAX_CLUSTER_SIZE: usize = 15;
pub const MIN_CLUSTER_SIZE: usize = 3;

pub const HOP_DISCOUNT: f64 = 0.5;
pub const DEFAULT_MAX_HOPS: usize = 2;

pub const HEBBIAN_DELTA_RETRIEVE: f64 = 0.05;
pub const HEBBIAN_DELTA_CONSOLIDATE: f64 = 0.10;

pub const HALF_LIFE_CONNECTED_DAYS: f64 = 60.0;
pub const HALF_LIFE_ISOLATED_DAYS: f64 = 30.0;

pub const QUALITY_THRESHOLD: u8 = 4;

pub const MMR_OVERREP: f64 = 0.30;
pub const MMR_MAX_PER_ENTITY: f64 = 3.0;
pub const MMR_DIVERSITY_WEIGHT: f64 = 0.30;

pub const SEED_COUNT: usize = 10;
pub const DEFAULT_MAX_MEMORIES: usize = 20;
pub const DEFAULT_MIN_STRENGTH: f64 = 0.10;

pub const BRIDGING_IMPL_THRESHOLD: f64 = 0.5;
pub const MAX_BRIDGING_IMPLICATIONS: usize = 5;

pub const INGEST_BATCH_SIZE: usize = 5;
pub const EMBED_MAX_BATCH: usize = 128;

/// Minimum text length (after trimming) for extraction to even be attempted
/// (spec §4.4 step 2).
pub const MIN_INGEST_TEXT_LEN: usize = 50;

pub const DEFAULT_INGEST_DEADLINE_SECS: u64 = 120;
/// Minimum slack required after extraction before continuing the batch
/// (spec §4.4 step 4).
pub const POST_EXTRACT_MIN_SLACK_SECS: u64 = 12;
/// Minimum slack required at the top of an ingest cycle.
pub const PER_CYCLE_MIN_SLACK_SECS: u64 = 15;

/// Default per-call LLM timeout (spec §4.2).
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 40;
/// Embedding provider rate-limit retry wait (spec §4.1).
pub const EMBED_RATE_LIMIT_WAIT_SECS: u64 = 2;
/// Embedding provider 5xx retry wait (spec §4.1).
pub const EMBED_SERVER_ERROR_WAIT_SECS: u64 = 1;
