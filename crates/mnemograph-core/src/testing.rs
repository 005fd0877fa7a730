//! Deterministic stub providers for integration tests (spec §13). Gated
//! behind the `testing` feature so production binaries never link them.
//! Grounded on the teacher's `test-fixtures` crate, which plays the same
//! role of shared, deterministic fakes reused by every dependent crate's
//! test suite.

use crate::errors::MnemoResult;
use crate::implication::{ImplicationOrder, ImplicationType};
use crate::memory::{l2_normalize, Significance};
use crate::traits::{
    AbstractRequest, ConnectionCandidate, DiscoverConnectionsRequest, ExtractRequest,
    ExtractedMemory, IEmbeddingProvider, ILlmProvider, ImplicationCandidate, ScoreRequest,
    SynthesizeImplicationRequest,
};

/// Embeds text by hashing it into a fixed-dimension vector. Not a
/// semantically meaningful embedding — identical texts embed identically,
/// and that's the only property the test suite relies on.
pub struct StubEmbeddingProvider {
    dims: usize,
}

impl StubEmbeddingProvider {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

impl Default for StubEmbeddingProvider {
    fn default() -> Self {
        Self::new(8)
    }
}

impl IEmbeddingProvider for StubEmbeddingProvider {
    fn embed(&self, text: &str) -> MnemoResult<Vec<f32>> {
        let hash = blake3::hash(text.as_bytes());
        let bytes = hash.as_bytes();
        let mut v: Vec<f32> = (0..self.dims)
            .map(|i| {
                let b = bytes[i % bytes.len()];
                (b as f32 / 255.0) * 2.0 - 1.0
            })
            .collect();
        l2_normalize(&mut v);
        Ok(v)
    }

    fn embed_batch(&self, texts: &[String]) -> MnemoResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn max_batch_size(&self) -> usize {
        256
    }

    fn name(&self) -> &str {
        "stub-embedding"
    }
}

/// Returns canned, deterministic responses for every prompt. Splits entry
/// text on blank lines to fake multi-memory extraction; every other
/// prompt returns a fixed, inspectable answer.
#[derive(Default)]
pub struct StubLlmProvider;

impl ILlmProvider for StubLlmProvider {
    fn extract(&self, req: ExtractRequest<'_>) -> MnemoResult<Vec<ExtractedMemory>> {
        let memories = req
            .entry_text
            .split("\n\n")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| ExtractedMemory {
                content: s.to_string(),
                significance: Significance::Medium,
                contact_names: Vec::new(),
            })
            .collect();
        Ok(memories)
    }

    fn abstract_pattern(&self, req: AbstractRequest<'_>) -> MnemoResult<String> {
        Ok(format!("pattern: {}", req.content))
    }

    fn discover_connections(
        &self,
        _req: DiscoverConnectionsRequest<'_>,
    ) -> MnemoResult<Vec<ConnectionCandidate>> {
        Ok(Vec::new())
    }

    fn synthesize_implication(
        &self,
        req: SynthesizeImplicationRequest<'_>,
    ) -> MnemoResult<Option<ImplicationCandidate>> {
        Ok(Some(ImplicationCandidate {
            content: "a recurring pattern emerges across this cluster".to_string(),
            implication_type: ImplicationType::Behavioral,
            implication_order: ImplicationOrder::Second,
            source_memory_ids: req.cluster_contents.iter().map(|(id, _)| id.clone()).collect(),
        }))
    }

    fn score(&self, _req: ScoreRequest<'_>) -> MnemoResult<u8> {
        Ok(5)
    }

    fn name(&self) -> &str {
        "stub-llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_embedding_is_deterministic_and_unit_length() {
        let p = StubEmbeddingProvider::new(8);
        let a = p.embed("hello").unwrap();
        let b = p.embed("hello").unwrap();
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[test]
    fn stub_extract_splits_on_blank_lines() {
        let llm = StubLlmProvider;
        let out = llm
            .extract(ExtractRequest {
                entry_text: "first memory\n\nsecond memory",
                entry_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                contact_names: &[],
            })
            .unwrap();
        assert_eq!(out.len(), 2);
    }
}
