//! The seams between the pipeline stages (spec §3). Each trait is
//! `Send + Sync` and fully synchronous, following the teacher's
//! `cortex-core::traits` pattern (`IEmbeddingProvider`, `IMemoryStorage`):
//! HTTP providers use a blocking client internally rather than pushing
//! `async fn` through every call site.

mod embedding;
mod graph_store;
mod implication_store;
mod llm;
mod vector_store;

pub use embedding::IEmbeddingProvider;
pub use graph_store::{ConnectionCreated, IGraphStore};
pub use implication_store::{IImplicationStore, ImplicationCreated, ScoredImplication};
pub use llm::{
    AbstractRequest, ConnectionCandidate, DiscoverConnectionsRequest, ExtractedMemory,
    ExtractRequest, ILlmProvider, ImplicationCandidate, ScoreRequest, SynthesizeImplicationRequest,
};
pub use vector_store::{IVectorStore, ScoredMemory};
