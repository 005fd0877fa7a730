use crate::errors::MnemoResult;

/// Embedding generation provider (C1, spec §4.1). Implementations embed
/// journal text for memory storage and query text for retrieval seeding;
/// both paths must use the same model so cosine similarity is meaningful.
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed a single text, returning an L2-normalized vector.
    fn embed(&self, text: &str) -> MnemoResult<Vec<f32>>;

    /// Embed a batch of texts in as few round trips as the provider allows.
    /// Implementations must chunk internally if `texts.len()` exceeds
    /// [`IEmbeddingProvider::max_batch_size`].
    fn embed_batch(&self, texts: &[String]) -> MnemoResult<Vec<Vec<f32>>>;

    /// The dimensionality of embeddings produced by this provider. Fixed
    /// for the lifetime of a given vector store (spec §12).
    fn dimensions(&self) -> usize;

    /// The largest batch this provider accepts in one request.
    fn max_batch_size(&self) -> usize;

    /// Human-readable provider name, used in log fields.
    fn name(&self) -> &str;
}
