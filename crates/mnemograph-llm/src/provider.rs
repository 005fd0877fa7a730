//! HTTP LLM provider (C2, spec §4.2). Five structured prompts, each a
//! single chat-completion round trip against an OpenAI-compatible
//! `/chat/completions` endpoint with `response_format: json_object`,
//! following the same blocking-`reqwest` idiom as `mnemograph-embeddings`.

use std::time::Duration;

use mnemograph_core::errors::{LlmError, LlmFailureMode, MnemoResult};
use mnemograph_core::traits::{
    AbstractRequest, ConnectionCandidate, DiscoverConnectionsRequest, ExtractRequest,
    ExtractedMemory, ILlmProvider, ImplicationCandidate, ScoreRequest,
    SynthesizeImplicationRequest,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct HttpLlmProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

pub struct HttpLlmProvider {
    client: reqwest::blocking::Client,
    config: HttpLlmProviderConfig,
}

impl HttpLlmProvider {
    pub fn new(config: HttpLlmProviderConfig) -> MnemoResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::ProviderUnavailable {
                reason: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &'static str,
        system: &str,
        user: &str,
    ) -> MnemoResult<T> {
        let mut attempt = 0;
        loop {
            let sent = self
                .client
                .post(format!("{}/chat/completions", self.config.base_url))
                .bearer_auth(&self.config.api_key)
                .json(&ChatRequest {
                    model: &self.config.model,
                    messages: vec![
                        ChatMessage {
                            role: "system",
                            content: system,
                        },
                        ChatMessage {
                            role: "user",
                            content: user,
                        },
                    ],
                    response_format: ResponseFormat { kind: "json_object" },
                })
                .send()
                .and_then(|r| r.error_for_status());

            let resp = match sent {
                Ok(r) => r,
                Err(e) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(prompt, attempt, error = %e, "llm call failed, retrying");
                    std::thread::sleep(Duration::from_millis(200 * attempt as u64));
                    continue;
                }
                Err(e) => {
                    let mode = if e.is_timeout() {
                        LlmFailureMode::Timeout
                    } else {
                        LlmFailureMode::ProviderError
                    };
                    return Err(LlmError::OutputInvalid {
                        prompt,
                        mode,
                        detail: e.to_string(),
                    }
                    .into())
                }
            };

            let body: ChatResponse = resp.json().map_err(|e| LlmError::OutputInvalid {
                prompt,
                mode: LlmFailureMode::ProviderError,
                detail: e.to_string(),
            })?;

            let content = body
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| LlmError::OutputInvalid {
                    prompt,
                    mode: LlmFailureMode::NoJson,
                    detail: "empty choices array".to_string(),
                })?
                .message
                .content;

            return parse_structured(prompt, &content);
        }
    }
}

/// Extract the first brace-balanced JSON object from free-form text, then
/// parse and shape-validate it, keeping `no_json`/`parse_error`/
/// `shape_mismatch` distinct (spec §4.2(c), §7).
fn parse_structured<T: DeserializeOwned>(prompt: &'static str, content: &str) -> MnemoResult<T> {
    let object = first_json_object(content).ok_or_else(|| LlmError::OutputInvalid {
        prompt,
        mode: LlmFailureMode::NoJson,
        detail: "no brace-balanced JSON object in response".to_string(),
    })?;

    let value: serde_json::Value = serde_json::from_str(object).map_err(|e| LlmError::OutputInvalid {
        prompt,
        mode: LlmFailureMode::ParseError,
        detail: e.to_string(),
    })?;

    serde_json::from_value(value)
        .map_err(|e| {
            LlmError::OutputInvalid {
                prompt,
                mode: LlmFailureMode::ShapeMismatch,
                detail: e.to_string(),
            }
            .into()
        })
}

/// Scan `text` for the first `{...}` span with balanced braces, ignoring
/// braces inside JSON string literals (so a reason/content field containing
/// `}` doesn't truncate the match early).
fn first_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

impl ILlmProvider for HttpLlmProvider {
    fn extract(&self, req: ExtractRequest<'_>) -> MnemoResult<Vec<ExtractedMemory>> {
        #[derive(Deserialize)]
        struct Wire {
            memories: Vec<ExtractedMemory>,
        }
        let contacts = req.contact_names.join(", ");
        let user = format!(
            "Journal entry dated {}:\n\n{}\n\nKnown contacts: {}\n\nExtract each atomic, \
             self-contained memory as JSON.",
            req.entry_date, req.entry_text, contacts
        );
        self.call_json::<Wire>(
            "extract",
            "You extract atomic, self-contained memories from a journal entry. \
             Respond with JSON: {\"memories\": [{\"content\": str, \"significance\": \
             \"high\"|\"medium\"|\"low\", \"contact_names\": [str]}]}.",
            &user,
        )
        .map(|w| w.memories)
    }

    fn abstract_pattern(&self, req: AbstractRequest<'_>) -> MnemoResult<String> {
        #[derive(Deserialize)]
        struct Wire {
            pattern: String,
        }
        let user = format!(
            "Memory content:\n\n{}\n\nRestate as a context-free structural pattern.",
            req.content
        );
        self.call_json::<Wire>(
            "abstract",
            "You restate a memory's content as a structural pattern, stripping \
             names, dates, and locations. Respond with JSON: {\"pattern\": str}.",
            &user,
        )
        .map(|w| w.pattern)
    }

    fn discover_connections(
        &self,
        req: DiscoverConnectionsRequest<'_>,
    ) -> MnemoResult<Vec<ConnectionCandidate>> {
        #[derive(Deserialize)]
        struct Wire {
            connections: Vec<ConnectionCandidate>,
        }
        let cluster = format_cluster(req.cluster_contents);
        let contacts = format_contacts(req.contacts);
        let user = format!(
            "Memory cluster{}:\n{}\n\nContacts involved:\n{}\n\nPropose up to 4 typed connections \
             between memories in this cluster.",
            if req.anti_cluster { " (anti-cluster: surface-distant, abstractly related)" } else { "" },
            cluster,
            contacts,
        );
        self.call_json::<Wire>(
            "discover_connections",
            "You propose typed connections between memories in a cluster. Respond with JSON: \
             {\"connections\": [{\"memory_a_id\": str, \"memory_b_id\": str, \
             \"connection_type\": str, \"reason\": str}]}.",
            &user,
        )
        .map(|w| w.connections)
    }

    fn synthesize_implication(
        &self,
        req: SynthesizeImplicationRequest<'_>,
    ) -> MnemoResult<Option<ImplicationCandidate>> {
        #[derive(Deserialize)]
        struct Wire {
            implications: Vec<ImplicationCandidate>,
        }
        let cluster = format_cluster(req.cluster_contents);
        let contacts = format_contacts(req.contacts);
        let connections = req
            .connections
            .iter()
            .map(|c| format!("- {} <-> {} ({}): {}", c.memory_a_id, c.memory_b_id, c.connection_type.tag(), c.reason))
            .collect::<Vec<_>>()
            .join("\n");
        let user = format!(
            "Memory cluster{}:\n{}\n\nDiscovered connections:\n{}\n\nContacts involved:\n{}\n\n\
             Synthesize at most one higher-order implication this cluster suggests, or none.",
            if req.anti_cluster { " (anti-cluster)" } else { "" },
            cluster,
            connections,
            contacts,
        );
        self.call_json::<Wire>(
            "synthesize_implication",
            "You synthesize at most one higher-order implication from a cluster of related \
             memories. Respond with JSON: {\"implications\": [{\"content\": str, \
             \"implication_type\": str, \"implication_order\": 1|2|3, \
             \"source_memory_ids\": [str]}]} — an empty array if nothing rises above the \
             source memories themselves.",
            &user,
        )
        .map(|w| w.implications.into_iter().next())
    }

    fn score(&self, req: ScoreRequest<'_>) -> MnemoResult<u8> {
        #[derive(Deserialize)]
        struct Wire {
            score: u8,
        }
        let sources = req.source_contents.join("\n- ");
        let user = format!(
            "Candidate implication:\n\n{}\n\nSource memories:\n- {}\n\nScore its quality 1-5.",
            req.implication_content, sources
        );
        self.call_json::<Wire>(
            "score",
            "You score a candidate implication's quality against its source memories on a \
             1-5 scale, where 5 is a sharp, non-obvious, well-supported insight and 1 is a \
             restatement of a single source memory. Respond with JSON: {\"score\": int}.",
            &user,
        )
        .map(|w| w.score)
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
