/// Errors from the background run scheduler (C10, spec §4.10).
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Another run of the same kind is already in flight for this user;
    /// the scheduler enforces single-writer-per-`(user, kind)` (spec §5).
    #[error("a {kind} run is already in progress for user {user_id}")]
    AlreadyRunning { user_id: String, kind: &'static str },

    #[error(transparent)]
    Ingest(#[from] crate::errors::IngestError),

    #[error(transparent)]
    Consolidation(#[from] crate::errors::ConsolidationError),

    #[error(transparent)]
    Storage(#[from] crate::errors::StorageError),

    /// The run's wall-clock deadline elapsed before the per-cycle minimum
    /// slack could be satisfied (spec §4.10, §4.4 step 4).
    #[error("run deadline exceeded before completion")]
    DeadlineExceeded,
}
