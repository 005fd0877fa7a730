//! The store/provider handles one `retrieve` call needs.

use std::sync::Arc;

use mnemograph_core::traits::{IEmbeddingProvider, IGraphStore, IImplicationStore, IVectorStore};

#[derive(Clone)]
pub struct RetrievalDeps {
    pub embeddings: Arc<dyn IEmbeddingProvider>,
    pub vector_store: Arc<dyn IVectorStore>,
    pub graph_store: Arc<dyn IGraphStore>,
    pub implication_store: Arc<dyn IImplicationStore>,
}
