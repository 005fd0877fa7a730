//! # mnemograph-llm
//!
//! HTTP-backed implementation of [`mnemograph_core::traits::ILlmProvider`]
//! (C2, spec §4.2): the five structured prompts an ingest or consolidation
//! run drives — extract, abstract, discover connections, synthesize
//! implication, score.

pub mod provider;

pub use provider::{HttpLlmProvider, HttpLlmProviderConfig};

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;
    use mnemograph_core::traits::{ExtractRequest, ILlmProvider};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(base_url: String) -> HttpLlmProviderConfig {
        HttpLlmProviderConfig {
            base_url,
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            timeout: Duration::from_secs(5),
            max_retries: 1,
        }
    }

    #[tokio::test]
    async fn extract_parses_json_content_from_chat_completion() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "memories": [
                {"content": "had coffee with Sam", "significance": "medium", "contact_ids": ["sam"]}
            ]
        })
        .to_string();
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": body}}]
            })))
            .mount(&server)
            .await;

        let provider = HttpLlmProvider::new(config(server.uri())).unwrap();
        let out = tokio::task::spawn_blocking(move || {
            provider.extract(ExtractRequest {
                entry_text: "Had coffee with Sam today.",
                entry_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                contact_names: &[],
            })
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].content, "had coffee with Sam");
    }

    #[tokio::test]
    async fn malformed_content_surfaces_as_shape_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "not json"}}]
            })))
            .mount(&server)
            .await;

        let provider = HttpLlmProvider::new(config(server.uri())).unwrap();
        let err = tokio::task::spawn_blocking(move || {
            provider.extract(ExtractRequest {
                entry_text: "x",
                entry_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                contact_names: &[],
            })
        })
        .await
        .unwrap()
        .unwrap_err();

        assert!(err.to_string().contains("extract"));
    }
}
