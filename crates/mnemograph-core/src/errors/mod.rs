//! Error taxonomy (spec §7). Each concern gets its own `thiserror` enum;
//! [`MnemoError`] is the unified facade every crate in the workspace
//! returns, following the teacher's per-crate-error + core-facade split
//! (`cortex-core/src/errors/*`, `CortexError`).

mod config_error;
mod consolidation_error;
mod embedding_error;
mod ingest_error;
mod llm_error;
mod retrieval_error;
mod scheduler_error;
mod storage_error;

pub use config_error::ConfigError;
pub use consolidation_error::ConsolidationError;
pub use embedding_error::EmbeddingError;
pub use ingest_error::IngestError;
pub use llm_error::{LlmError, LlmFailureMode};
pub use retrieval_error::RetrievalError;
pub use scheduler_error::SchedulerError;
pub use storage_error::StorageError;

/// Unified error facade. Every public fallible operation in the workspace
/// returns `MnemoResult<T>`.
#[derive(Debug, thiserror::Error)]
pub enum MnemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Consolidation(#[from] ConsolidationError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// An internal invariant was violated (non-unit embedding, `a_id ==
    /// b_id`, negative strength, ...). Spec §7: panic in debug builds
    /// (`debug_assert!` at the call site, before this variant is ever
    /// constructed), refuse the write in release by returning this.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The caller's deadline elapsed mid-operation (spec §7
    /// `DeadlineExceeded`). Propagates; callers of `ingest` leave
    /// `SyncState` unchanged for the unprocessed tail.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The caller cancelled the operation (spec §7 `Cancelled`).
    #[error("operation cancelled")]
    Cancelled,
}

pub type MnemoResult<T> = Result<T, MnemoError>;

/// Backwards-compatible alias kept for call sites ported verbatim from the
/// teacher idiom; identical to [`MnemoResult`].
pub type CortexResult<T> = MnemoResult<T>;
