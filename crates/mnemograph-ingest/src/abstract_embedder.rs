//! Abstract embedder (C5, spec §4.5). Optional: failures are logged and
//! swallowed rather than propagated, since the abstract embedding only
//! gates the consolidator's anti-cluster pass, never the ingest result.

use mnemograph_core::ids::MemoryId;
use mnemograph_core::traits::AbstractRequest;
use tracing::warn;

use crate::deps::IngestDeps;

/// Backfill `memory_id`'s `abstract_embedding`. Best-effort: any C1/C2/C3
/// failure is logged and dropped, never returned to the caller.
pub fn backfill(deps: &IngestDeps, memory_id: &MemoryId, content: &str) {
    if let Err(e) = try_backfill(deps, memory_id, content) {
        warn!(memory_id = %memory_id, error = %e, "abstract embedding backfill failed, skipping");
    }
}

fn try_backfill(deps: &IngestDeps, memory_id: &MemoryId, content: &str) -> mnemograph_core::errors::MnemoResult<()> {
    let pattern = deps.llm.abstract_pattern(AbstractRequest { content })?;
    let embedding = deps.embeddings.embed(&pattern)?;
    deps.vector_store.attach_abstract_embedding(memory_id, embedding)
}
