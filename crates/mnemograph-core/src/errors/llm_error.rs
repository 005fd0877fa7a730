/// Why a structured LLM call failed to yield usable output (spec §4.2,
/// §7). Distinguishing these lets callers decide between a bounded retry
/// (`Timeout`, `ProviderError`) and skip-and-log (`NoJson`, `ShapeMismatch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmFailureMode {
    /// Response contained no brace-balanced JSON object at all.
    NoJson,
    /// A JSON-looking substring was found but does not parse as JSON.
    ParseError,
    /// JSON parsed but did not match the expected shape for the prompt.
    ShapeMismatch,
    /// The provider's HTTP call itself failed or returned an error status.
    ProviderError,
    /// The call exceeded its deadline.
    Timeout,
}

impl std::fmt::Display for LlmFailureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LlmFailureMode::NoJson => "no_json",
            LlmFailureMode::ParseError => "parse_error",
            LlmFailureMode::ShapeMismatch => "shape_mismatch",
            LlmFailureMode::ProviderError => "provider_error",
            LlmFailureMode::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("llm call for prompt '{prompt}' failed ({mode}): {detail}")]
    OutputInvalid {
        prompt: &'static str,
        mode: LlmFailureMode,
        detail: String,
    },

    #[error("llm provider unavailable: {reason}")]
    ProviderUnavailable { reason: String },
}
