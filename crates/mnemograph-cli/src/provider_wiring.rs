//! Selects stub or HTTP embedding/LLM providers for the CLI, reading
//! connection details for the latter from `MNEMOGRAPH_EMBEDDING_*` /
//! `MNEMOGRAPH_LLM_*` environment variables.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use mnemograph_core::testing::{StubEmbeddingProvider, StubLlmProvider};
use mnemograph_core::traits::{IEmbeddingProvider, ILlmProvider};
use mnemograph_embeddings::{HttpEmbeddingProvider, HttpEmbeddingProviderConfig};
use mnemograph_llm::{HttpLlmProvider, HttpLlmProviderConfig};

/// A matched pair of providers, `Arc`-wrapped so every dependency bundle
/// (`IngestDeps`, `ConsolidationDeps`, `RetrievalDeps`) can share them.
pub struct Providers {
    pub embeddings: Arc<dyn IEmbeddingProvider>,
    pub llm: Arc<dyn ILlmProvider>,
}

impl Providers {
    /// Deterministic, network-free providers — the default, since this
    /// binary exists to exercise the engine locally (spec §10).
    pub fn stub() -> Self {
        Self {
            embeddings: Arc::new(StubEmbeddingProvider::new(8)),
            llm: Arc::new(StubLlmProvider),
        }
    }

    /// Real HTTP providers, for pointing the CLI at an actual embedding /
    /// LLM deployment.
    pub fn from_env() -> Result<Self> {
        let embeddings = HttpEmbeddingProvider::new(HttpEmbeddingProviderConfig {
            base_url: env_var("MNEMOGRAPH_EMBEDDING_BASE_URL")?,
            api_key: env_var("MNEMOGRAPH_EMBEDDING_API_KEY")?,
            model: env_var("MNEMOGRAPH_EMBEDDING_MODEL")?,
            dimensions: env_var("MNEMOGRAPH_EMBEDDING_DIMENSIONS")?
                .parse()
                .context("MNEMOGRAPH_EMBEDDING_DIMENSIONS must be an integer")?,
            max_batch_size: mnemograph_core::constants::EMBED_MAX_BATCH,
            timeout: Duration::from_secs(40),
            max_retries: 1,
        })
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

        let llm = HttpLlmProvider::new(HttpLlmProviderConfig {
            base_url: env_var("MNEMOGRAPH_LLM_BASE_URL")?,
            api_key: env_var("MNEMOGRAPH_LLM_API_KEY")?,
            model: env_var("MNEMOGRAPH_LLM_MODEL")?,
            timeout: Duration::from_secs(mnemograph_core::constants::DEFAULT_LLM_TIMEOUT_SECS),
            max_retries: 1,
        })
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

        Ok(Self { embeddings: Arc::new(embeddings), llm: Arc::new(llm) })
    }
}

fn env_var(name: &'static str) -> Result<String> {
    env::var(name).with_context(|| format!("{name} must be set when --live is passed"))
}
