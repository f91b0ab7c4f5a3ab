//! Default model configs loaded strictly from environment variables.
//!
//! This module provides convenience constructors for [`LlmModelConfig`],
//! grouped by provider and role:
//!
//! - **Chat**      → answer generation (OpenAI, Ollama, Anthropic)
//! - **Embedding** → question/knowledge vectors (OpenAI, Ollama)
//!
//! # Environment variables
//!
//! Common:
//! - `EMBEDDING_PROVIDER` = `openai` (default) | `ollama`
//! - `CHAT_PROVIDER`      = `openai` | `ollama` | `anthropic` | `none`
//!   (defaults to the embedding provider; when defaulted, missing chat
//!   settings disable chat instead of failing start-up)
//! - `LLM_MAX_TOKENS`     = optional default max tokens (u32)
//! - `LLM_HTTP_TIMEOUT_SECS` = optional HTTP timeout (u32, default 60)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY` (mandatory), `OPENAI_URL`, `OPENAI_CHAT_MODEL`, `OPENAI_EMBED_MODEL`
//!
//! Anthropic-specific:
//! - `ANTHROPIC_API_KEY` (mandatory), `ANTHROPIC_URL`, `ANTHROPIC_MODEL`
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = chat model (mandatory for chat)
//! - `EMBEDDING_MODEL`             = embedding model (mandatory for embeddings)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_u32, must_env, opt_env, validate_http_endpoint,
    },
};
use tracing::warn;

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_CHAT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_EMBED_MODEL: &str = "text-embedding-3-small";
const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if both are missing
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = opt_env("OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = opt_env("OLLAMA_PORT") {
        let _ = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{}", port.trim()));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

fn http_timeout() -> Result<Option<u64>, AiLlmError> {
    Ok(Some(
        env_opt_u32("LLM_HTTP_TIMEOUT_SECS")?
            .map(u64::from)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
    ))
}

fn openai_endpoint() -> Result<String, AiLlmError> {
    let url = opt_env("OPENAI_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
    validate_http_endpoint("OPENAI_URL", &url)?;
    Ok(url)
}

/// Chat config for OpenAI.
///
/// # Env
/// - `OPENAI_API_KEY` (required)
/// - `OPENAI_CHAT_MODEL` (default `gpt-4o-mini`)
/// - `OPENAI_URL`, `LLM_MAX_TOKENS`, `LLM_HTTP_TIMEOUT_SECS` (optional)
pub fn config_openai_chat() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: opt_env("OPENAI_CHAT_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_CHAT_MODEL.into()),
        endpoint: openai_endpoint()?,
        api_key: Some(must_env("OPENAI_API_KEY")?),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.3),
        top_p: None,
        timeout_secs: http_timeout()?,
    })
}

/// Embedding config for OpenAI.
///
/// # Env
/// - `OPENAI_API_KEY` (required)
/// - `OPENAI_EMBED_MODEL` (default `text-embedding-3-small`)
pub fn config_openai_embedding() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: opt_env("OPENAI_EMBED_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_EMBED_MODEL.into()),
        endpoint: openai_endpoint()?,
        api_key: Some(must_env("OPENAI_API_KEY")?),
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: http_timeout()?,
    })
}

/// Chat config for a local Ollama model.
///
/// # Env
/// - `OLLAMA_URL` / `OLLAMA_PORT` (required)
/// - `OLLAMA_MODEL` (required)
pub fn config_ollama_chat() -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = ollama_endpoint()?;
    let model = must_env("OLLAMA_MODEL")?;

    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint,
        api_key: None,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.3),
        top_p: None,
        timeout_secs: http_timeout()?,
    })
}

/// Embedding config for a local Ollama model.
///
/// # Env
/// - `OLLAMA_URL` / `OLLAMA_PORT` (required)
/// - `EMBEDDING_MODEL` (required)
pub fn config_ollama_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = ollama_endpoint()?;
    let model = must_env("EMBEDDING_MODEL")?;

    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint,
        api_key: None,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: http_timeout()?,
    })
}

/// Chat config for Anthropic.
///
/// # Env
/// - `ANTHROPIC_API_KEY` (required)
/// - `ANTHROPIC_MODEL` (default `claude-3-5-haiku-latest`), `ANTHROPIC_URL`
pub fn config_anthropic_chat() -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = opt_env("ANTHROPIC_URL").unwrap_or_else(|| DEFAULT_ANTHROPIC_URL.into());
    validate_http_endpoint("ANTHROPIC_URL", &endpoint)?;

    Ok(LlmModelConfig {
        provider: LlmProvider::Anthropic,
        model: opt_env("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.into()),
        endpoint,
        api_key: Some(must_env("ANTHROPIC_API_KEY")?),
        // Anthropic requires max_tokens on every request.
        max_tokens: Some(env_opt_u32("LLM_MAX_TOKENS")?.unwrap_or(512)),
        temperature: Some(0.3),
        top_p: None,
        timeout_secs: http_timeout()?,
    })
}

/// Reads `EMBEDDING_PROVIDER` (default `openai`).
pub fn embedding_provider_from_env() -> Result<LlmProvider, AiLlmError> {
    let raw = opt_env("EMBEDDING_PROVIDER").unwrap_or_else(|| "openai".into());
    let provider: LlmProvider = raw.parse()?;
    if !provider.supports_embeddings() {
        return Err(ConfigError::UnsupportedRole {
            provider: provider.label(),
            role: "embeddings",
        }
        .into());
    }
    Ok(provider)
}

/// Builds the embedding profile selected by `EMBEDDING_PROVIDER`.
pub fn embedding_config_from_env() -> Result<LlmModelConfig, AiLlmError> {
    match embedding_provider_from_env()? {
        LlmProvider::OpenAI => config_openai_embedding(),
        LlmProvider::Ollama => config_ollama_embedding(),
        LlmProvider::Anthropic => Err(ConfigError::UnsupportedRole {
            provider: "Anthropic",
            role: "embeddings",
        }
        .into()),
    }
}

/// Builds the chat profile selected by `CHAT_PROVIDER`.
///
/// Returns `Ok(None)` when chat is disabled (`none`), or when `CHAT_PROVIDER`
/// is unset and the embedding provider's chat settings are incomplete.
/// Callers treat a missing chat profile as "answer with the default message".
pub fn chat_config_from_env() -> Result<Option<LlmModelConfig>, AiLlmError> {
    let embedding = embedding_provider_from_env()?;
    let raw = opt_env("CHAT_PROVIDER");
    let Some(provider) = resolve_chat_provider(raw.as_deref(), embedding)? else {
        return Ok(None);
    };

    let built = match provider {
        LlmProvider::OpenAI => config_openai_chat(),
        LlmProvider::Ollama => config_ollama_chat(),
        LlmProvider::Anthropic => config_anthropic_chat(),
    };
    settle_chat_config(built, provider, raw.is_some())
}

/// Only an explicitly chosen chat provider must be fully configured; an
/// inherited one with a missing variable turns chat off.
fn settle_chat_config(
    built: Result<LlmModelConfig, AiLlmError>,
    provider: LlmProvider,
    explicit: bool,
) -> Result<Option<LlmModelConfig>, AiLlmError> {
    match built {
        Ok(cfg) => Ok(Some(cfg)),
        Err(AiLlmError::Config(ConfigError::MissingVar(var))) if !explicit => {
            warn!(
                provider = provider.label(),
                missing = var,
                "CHAT_PROVIDER unset and chat settings incomplete; generation disabled"
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Pure selection rule behind [`chat_config_from_env`].
pub fn resolve_chat_provider(
    raw: Option<&str>,
    embedding: LlmProvider,
) -> Result<Option<LlmProvider>, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Some(embedding)),
        Some(v) if v.eq_ignore_ascii_case("none") || v.eq_ignore_ascii_case("off") => Ok(None),
        Some(v) => v.parse().map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_defaults_to_embedding_provider() {
        let p = resolve_chat_provider(None, LlmProvider::Ollama).unwrap();
        assert_eq!(p, Some(LlmProvider::Ollama));
    }

    #[test]
    fn chat_can_be_disabled() {
        assert_eq!(
            resolve_chat_provider(Some("none"), LlmProvider::OpenAI).unwrap(),
            None
        );
        assert_eq!(
            resolve_chat_provider(Some("OFF"), LlmProvider::OpenAI).unwrap(),
            None
        );
    }

    #[test]
    fn chat_provider_can_differ_from_embeddings() {
        assert_eq!(
            resolve_chat_provider(Some("anthropic"), LlmProvider::OpenAI).unwrap(),
            Some(LlmProvider::Anthropic)
        );
        assert!(resolve_chat_provider(Some("bard"), LlmProvider::OpenAI).is_err());
    }

    #[test]
    fn inherited_chat_provider_without_model_disables_chat() {
        let missing = || -> Result<LlmModelConfig, AiLlmError> {
            Err(ConfigError::MissingVar("OLLAMA_MODEL").into())
        };

        let settled = settle_chat_config(missing(), LlmProvider::Ollama, false).unwrap();
        assert!(settled.is_none());

        let err = settle_chat_config(missing(), LlmProvider::Ollama, true).unwrap_err();
        assert!(err.to_string().contains("OLLAMA_MODEL"));
    }

    #[test]
    fn inherited_chat_provider_keeps_other_errors() {
        let bad: Result<LlmModelConfig, AiLlmError> = Err(ConfigError::InvalidNumber {
            var: "LLM_MAX_TOKENS",
            reason: "expected u32",
        }
        .into());
        assert!(settle_chat_config(bad, LlmProvider::OpenAI, false).is_err());
    }
}
