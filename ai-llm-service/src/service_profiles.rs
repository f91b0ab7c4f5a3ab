//! Shared LLM service with two profiles: `embedding` (required) and `chat` (optional).
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once at start-up; clients are built eagerly so configuration
//!   problems surface before the server accepts traffic.
//! - Hands out capability handles (`Arc<dyn TextEmbedder>`, `Arc<dyn TextGenerator>`)
//!   so callers never branch on the provider.
//!
//! # Example
//! ```no_run
//! use ai_llm_service::config::default_config::{chat_config_from_env, embedding_config_from_env};
//! use ai_llm_service::service_profiles::LlmServiceProfiles;
//!
//! # async fn demo() -> Result<(), ai_llm_service::error_handler::AiLlmError> {
//! let svc = LlmServiceProfiles::new(embedding_config_from_env()?, chat_config_from_env()?)?;
//! let v = svc.embedder().embed("Ferris").await?;
//! println!("dim = {}", v.len());
//! # Ok(()) }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::{
    capabilities::{TextEmbedder, TextGenerator},
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError},
    services::{
        anthropic_service::AnthropicService, ollama_service::OllamaService,
        open_ai_service::OpenAiService,
    },
};

/// Embedding + optional chat clients, built once from config.
#[derive(Clone)]
pub struct LlmServiceProfiles {
    embedding: LlmModelConfig,
    chat: Option<LlmModelConfig>,

    embedder: Arc<dyn TextEmbedder>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl LlmServiceProfiles {
    /// Creates the service.
    ///
    /// - `embedding`: required embedding profile.
    /// - `chat`: optional chat profile; `None` disables generation.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if any client fails validation or the embedding
    /// profile names a provider without an embeddings API.
    pub fn new(
        embedding: LlmModelConfig,
        chat: Option<LlmModelConfig>,
    ) -> Result<Self, AiLlmError> {
        let embedder = build_embedder(&embedding)?;
        let generator = chat.as_ref().map(build_generator).transpose()?;

        info!(
            embedding_provider = embedding.provider.label(),
            embedding_model = %embedding.model,
            chat_provider = chat.as_ref().map(|c| c.provider.label()).unwrap_or("none"),
            "LLM profiles ready"
        );

        Ok(Self {
            embedding,
            chat,
            embedder,
            generator,
        })
    }

    /// Handle for computing embeddings.
    pub fn embedder(&self) -> Arc<dyn TextEmbedder> {
        Arc::clone(&self.embedder)
    }

    /// Handle for text generation, if a chat provider is configured.
    pub fn generator(&self) -> Option<Arc<dyn TextGenerator>> {
        self.generator.clone()
    }

    /// Returns references to the current profiles `(embedding, chat)`.
    pub fn profiles(&self) -> (&LlmModelConfig, Option<&LlmModelConfig>) {
        (&self.embedding, self.chat.as_ref())
    }
}

fn build_embedder(cfg: &LlmModelConfig) -> Result<Arc<dyn TextEmbedder>, AiLlmError> {
    match cfg.provider {
        LlmProvider::OpenAI => Ok(Arc::new(OpenAiService::new(cfg.clone())?)),
        LlmProvider::Ollama => Ok(Arc::new(OllamaService::new(cfg.clone())?)),
        LlmProvider::Anthropic => Err(ConfigError::UnsupportedRole {
            provider: "Anthropic",
            role: "embeddings",
        }
        .into()),
    }
}

fn build_generator(cfg: &LlmModelConfig) -> Result<Arc<dyn TextGenerator>, AiLlmError> {
    Ok(match cfg.provider {
        LlmProvider::OpenAI => Arc::new(OpenAiService::new(cfg.clone())?),
        LlmProvider::Ollama => Arc::new(OllamaService::new(cfg.clone())?),
        LlmProvider::Anthropic => Arc::new(AnthropicService::new(cfg.clone())?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ollama(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn chat_is_optional() {
        let svc = LlmServiceProfiles::new(ollama("nomic-embed-text"), None).unwrap();
        assert!(svc.generator().is_none());
        assert_eq!(svc.embedder().provider_name(), "Ollama");
    }

    #[test]
    fn anthropic_cannot_embed() {
        let mut cfg = ollama("x");
        cfg.provider = LlmProvider::Anthropic;
        cfg.api_key = Some("k".into());
        assert!(LlmServiceProfiles::new(cfg, None).is_err());
    }

    #[test]
    fn mixed_providers() {
        let chat = LlmModelConfig {
            provider: LlmProvider::Anthropic,
            model: "claude-3-5-haiku-latest".into(),
            endpoint: "https://api.anthropic.com".into(),
            api_key: Some("k".into()),
            max_tokens: Some(512),
            temperature: None,
            top_p: None,
            timeout_secs: Some(5),
        };
        let svc = LlmServiceProfiles::new(ollama("nomic-embed-text"), Some(chat)).unwrap();
        let g = svc.generator().unwrap();
        assert_eq!(g.provider_name(), "Anthropic");
    }
}
