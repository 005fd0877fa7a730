/// Errors from the consolidator (C8, spec §4.8).
#[derive(Debug, thiserror::Error)]
pub enum ConsolidationError {
    #[error("not enough memories with abstract embeddings to consolidate ({have} < {need})")]
    InsufficientCorpus { have: usize, need: usize },

    #[error(transparent)]
    Llm(#[from] crate::errors::LlmError),

    #[error(transparent)]
    Storage(#[from] crate::errors::StorageError),

    #[error("digest already finalized for user {user_id} on {date}")]
    DigestAlreadyFinalized { user_id: String, date: String },
}
