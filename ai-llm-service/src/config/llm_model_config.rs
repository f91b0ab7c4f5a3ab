use crate::config::llm_provider::LlmProvider;

/// Configuration for one provider/model pair.
///
/// A single struct serves both roles (chat and embedding). Sampling fields
/// are defaults; callers may override `temperature`/`max_tokens` per request
/// through [`GenerationParams`](crate::capabilities::GenerationParams).
///
/// # Fields
///
/// - `provider`: Which backend to use (Ollama, OpenAI, Anthropic).
/// - `model`: The model identifier (e.g., `"gpt-4o-mini"`, `"nomic-embed-text"`).
/// - `endpoint`: Base URL of the API (no trailing path).
/// - `api_key`: Optional API key for providers that require authentication.
/// - `max_tokens`: Default maximum number of tokens to generate.
/// - `temperature`: Default sampling temperature.
/// - `top_p`: Nucleus sampling cutoff.
/// - `timeout_secs`: HTTP request timeout in seconds.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_model_config::LlmModelConfig;
/// use ai_llm_service::config::llm_provider::LlmProvider;
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::OpenAI,
///     model: "gpt-4o-mini".to_string(),
///     endpoint: "https://api.openai.com".to_string(),
///     api_key: Some("sk-...".to_string()),
///     max_tokens: Some(512),
///     temperature: Some(0.3),
///     top_p: None,
///     timeout_secs: Some(30),
/// };
/// assert_eq!(cfg.provider.label(), "OpenAI");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The LLM provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// Base endpoint (local URL or remote API host).
    pub endpoint: String,

    /// Optional API key for authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature (controls creativity).
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
