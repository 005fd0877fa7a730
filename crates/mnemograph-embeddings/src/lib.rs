//! # mnemograph-embeddings
//!
//! HTTP-backed implementation of [`mnemograph_core::traits::IEmbeddingProvider`]
//! (C1, spec §4.1), with an L1 content-hash cache in front of every call.

pub mod cache;
pub mod provider;

pub use cache::EmbeddingCache;
pub use provider::{HttpEmbeddingProvider, HttpEmbeddingProviderConfig};

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mnemograph_core::traits::IEmbeddingProvider;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(base_url: String) -> HttpEmbeddingProviderConfig {
        HttpEmbeddingProviderConfig {
            base_url,
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            dimensions: 3,
            max_batch_size: 16,
            timeout: Duration::from_secs(5),
            max_retries: 2,
        }
    }

    #[tokio::test]
    async fn embed_parses_response_and_normalizes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [3.0, 4.0, 0.0]}]
            })))
            .mount(&server)
            .await;

        let provider = HttpEmbeddingProvider::new(config(server.uri())).unwrap();
        let v = tokio::task::spawn_blocking(move || provider.embed("hello"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(v.len(), 3);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn embed_is_cached_across_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [1.0, 0.0, 0.0]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = HttpEmbeddingProvider::new(config(server.uri())).unwrap();
        tokio::task::spawn_blocking(move || {
            provider.embed("hello").unwrap();
            provider.embed("hello").unwrap();
            provider
        })
        .await
        .unwrap();
    }
}
