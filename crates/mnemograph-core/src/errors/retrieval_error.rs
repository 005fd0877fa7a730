/// Errors from the retrieval engine (C9, spec §4.9).
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("no seed memories found for query")]
    NoSeeds,

    #[error(transparent)]
    Embedding(#[from] crate::errors::EmbeddingError),

    #[error(transparent)]
    Storage(#[from] crate::errors::StorageError),

    #[error("invalid retrieval option: {reason}")]
    InvalidOption { reason: String },
}
