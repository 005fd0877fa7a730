/// Errors from the embedding client (C1, spec §4.1).
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding provider unavailable: {reason}")]
    ProviderUnavailable { reason: String },

    #[error("embedding request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("embedding provider returned {got} dims, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("embedding batch of {batch_size} exceeds provider limit {limit}")]
    BatchTooLarge { batch_size: usize, limit: usize },

    #[error("rate limited by embedding provider, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },
}
