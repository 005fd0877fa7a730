/// Errors from the memory ingest pipeline (C4, spec §4.4).
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("journal entry text shorter than minimum ({len} < {min})")]
    EntryTooShort { len: usize, min: usize },

    #[error(transparent)]
    Embedding(#[from] crate::errors::EmbeddingError),

    #[error(transparent)]
    Llm(#[from] crate::errors::LlmError),

    #[error(transparent)]
    Storage(#[from] crate::errors::StorageError),

    #[error("ingest deadline left insufficient slack: {remaining_ms}ms remaining, need {needed_ms}ms")]
    InsufficientSlack { remaining_ms: u64, needed_ms: u64 },
}
