//! The store/provider handles one consolidation run needs.

use std::sync::Arc;

use mnemograph_core::traits::{
    IEmbeddingProvider, IGraphStore, IImplicationStore, ILlmProvider, IVectorStore,
};

#[derive(Clone)]
pub struct ConsolidationDeps {
    pub llm: Arc<dyn ILlmProvider>,
    pub embeddings: Arc<dyn IEmbeddingProvider>,
    pub vector_store: Arc<dyn IVectorStore>,
    pub graph_store: Arc<dyn IGraphStore>,
    pub implication_store: Arc<dyn IImplicationStore>,
}
