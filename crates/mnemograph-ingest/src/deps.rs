//! The store/provider handles one `ingest` call needs. `Arc`-wrapped so the
//! abstract embedder (spec §4.5) can be dispatched fire-and-forget onto
//! rayon's global pool without borrowing back into the caller's stack.

use std::sync::Arc;

use mnemograph_core::traits::{IEmbeddingProvider, ILlmProvider, IVectorStore};

#[derive(Clone)]
pub struct IngestDeps {
    pub embeddings: Arc<dyn IEmbeddingProvider>,
    pub llm: Arc<dyn ILlmProvider>,
    pub vector_store: Arc<dyn IVectorStore>,
}
