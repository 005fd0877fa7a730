//! HTTP embedding provider (C1, spec §4.1). Speaks an OpenAI-compatible
//! `/embeddings` endpoint over a blocking `reqwest` client — the same
//! blocking-HTTP idiom the teacher's `cortex-cloud` transport layer uses
//! for its sync calls, applied here instead of the teacher's local-ONNX
//! `OnnxProvider` (spec §9: embeddings come from a configured remote
//! model, not a bundled one).

use std::time::{Duration, Instant};

use mnemograph_core::errors::{EmbeddingError, MnemoResult};
use mnemograph_core::memory::l2_normalize;
use mnemograph_core::traits::IEmbeddingProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::EmbeddingCache;

#[derive(Debug, Clone)]
pub struct HttpEmbeddingProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub dimensions: usize,
    pub max_batch_size: usize,
    pub timeout: Duration,
    pub max_retries: u32,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

/// Remote embedding provider with an L1 cache in front of every call.
pub struct HttpEmbeddingProvider {
    client: reqwest::blocking::Client,
    config: HttpEmbeddingProviderConfig,
    cache: EmbeddingCache,
}

impl HttpEmbeddingProvider {
    pub fn new(config: HttpEmbeddingProviderConfig) -> MnemoResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::ProviderUnavailable {
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            config,
            cache: EmbeddingCache::new(),
        })
    }

    /// Retry contract (spec §4.1): a rate-limit response gets exactly one
    /// retry after a 2s wait; a 5xx gets exactly one retry after a 1s wait;
    /// anything else (network error, 4xx, bad body) fails immediately with
    /// `ProviderUnavailable` — `max_retries` does not apply to this call,
    /// only to the LLM client's generic backoff.
    fn embed_batch_uncached(&self, texts: &[String]) -> MnemoResult<Vec<Vec<f32>>> {
        if texts.len() > self.config.max_batch_size {
            return Err(EmbeddingError::BatchTooLarge {
                batch_size: texts.len(),
                limit: self.config.max_batch_size,
            }
            .into());
        }

        let mut rate_limit_retried = false;
        let mut server_error_retried = false;
        loop {
            let started = Instant::now();
            let sent = self
                .client
                .post(format!("{}/embeddings", self.config.base_url))
                .bearer_auth(&self.config.api_key)
                .json(&EmbeddingsRequest {
                    model: &self.config.model,
                    input: texts,
                })
                .send();

            let response = match sent {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    return Err(EmbeddingError::Timeout {
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    }
                    .into())
                }
                Err(e) => {
                    return Err(EmbeddingError::ProviderUnavailable {
                        reason: e.to_string(),
                    }
                    .into())
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if !rate_limit_retried {
                    rate_limit_retried = true;
                    warn!(batch = texts.len(), "embedding call rate-limited, retrying after 2s");
                    std::thread::sleep(Duration::from_secs(2));
                    continue;
                }
                return Err(EmbeddingError::RateLimited { retry_after_ms: 2_000 }.into());
            }
            if status.is_server_error() {
                if !server_error_retried {
                    server_error_retried = true;
                    warn!(batch = texts.len(), %status, "embedding call hit a server error, retrying after 1s");
                    std::thread::sleep(Duration::from_secs(1));
                    continue;
                }
                return Err(EmbeddingError::ProviderUnavailable {
                    reason: format!("server error {status} after retry"),
                }
                .into());
            }
            if !status.is_success() {
                return Err(EmbeddingError::ProviderUnavailable {
                    reason: format!("http {status}"),
                }
                .into());
            }

            let resp: EmbeddingsResponse = response.json().map_err(|e| EmbeddingError::ProviderUnavailable {
                reason: e.to_string(),
            })?;

            let mut out = Vec::with_capacity(resp.data.len());
            for datum in resp.data {
                let mut v = datum.embedding;
                if v.len() != self.config.dimensions {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: self.config.dimensions,
                        got: v.len(),
                    }
                    .into());
                }
                l2_normalize(&mut v);
                out.push(v);
            }
            debug!(
                provider = %self.config.model,
                batch = texts.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "embedded batch"
            );
            return Ok(out);
        }
    }
}

impl IEmbeddingProvider for HttpEmbeddingProvider {
    fn embed(&self, text: &str) -> MnemoResult<Vec<f32>> {
        if let Some(cached) = self.cache.get(text) {
            return Ok(cached);
        }
        let mut out = self.embed_batch_uncached(std::slice::from_ref(&text.to_string()))?;
        let v = out.pop().expect("embed_batch_uncached returns one vector per input");
        self.cache.put(text, v.clone());
        Ok(v)
    }

    fn embed_batch(&self, texts: &[String]) -> MnemoResult<Vec<Vec<f32>>> {
        let mut out = vec![Vec::new(); texts.len()];
        let mut misses = Vec::new();
        let mut miss_idx = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match self.cache.get(text) {
                Some(v) => out[i] = v,
                None => {
                    misses.push(text.clone());
                    miss_idx.push(i);
                }
            }
        }

        if !misses.is_empty() {
            for chunk_start in (0..misses.len()).step_by(self.config.max_batch_size) {
                let chunk_end = (chunk_start + self.config.max_batch_size).min(misses.len());
                let chunk = &misses[chunk_start..chunk_end];
                let embedded = self.embed_batch_uncached(chunk)?;
                for (offset, v) in embedded.into_iter().enumerate() {
                    let global = chunk_start + offset;
                    self.cache.put(&misses[global], v.clone());
                    out[miss_idx[global]] = v;
                }
            }
        }

        Ok(out)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn max_batch_size(&self) -> usize {
        self.config.max_batch_size
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
