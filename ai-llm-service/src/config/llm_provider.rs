use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Represents the provider (backend) used for embeddings or chat inference.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_provider::LlmProvider;
///
/// let p: LlmProvider = "openai".parse().unwrap();
/// assert_eq!(p, LlmProvider::OpenAI);
/// assert!(p.supports_embeddings());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime for on-device inference.
    Ollama,
    /// OpenAI REST API (chat completions + embeddings).
    OpenAI,
    /// Anthropic Messages API (chat only).
    Anthropic,
}

impl LlmProvider {
    /// Human-readable name used in traces and logs.
    pub fn label(self) -> &'static str {
        match self {
            LlmProvider::Ollama => "Ollama",
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::Anthropic => "Anthropic",
        }
    }

    /// Whether the backend exposes an embeddings endpoint.
    pub fn supports_embeddings(self) -> bool {
        !matches!(self, LlmProvider::Anthropic)
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
