//! Anthropic Messages API client (chat only).
//!
//! - POST {endpoint}/v1/messages — non-streaming message creation
//!
//! Anthropic has no embeddings endpoint, so this type implements only
//! [`TextGenerator`].

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    capabilities::{BoxFuture, GenerationParams, TextGenerator},
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet,
    },
};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 512;

#[derive(Debug)]
pub struct AnthropicService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_messages: String,
}

impl AnthropicService {
    /// Creates a new [`AnthropicService`].
    ///
    /// # Errors
    /// Same validation rules as [`super::open_ai_service::OpenAiService::new`].
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Anthropic {
            return Err(
                ProviderError::new(Provider::Anthropic, ProviderErrorKind::InvalidProvider).into(),
            );
        }

        let api_key = cfg.api_key.clone().ok_or_else(|| {
            ProviderError::new(Provider::Anthropic, ProviderErrorKind::MissingApiKey)
        })?;

        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ProviderError::new(
                Provider::Anthropic,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "x-api-key",
            header::HeaderValue::from_str(&api_key).map_err(|e| {
                ProviderError::new(
                    Provider::Anthropic,
                    ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
                )
            })?,
        );
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let url_messages = format!("{}/v1/messages", endpoint.trim_end_matches('/'));

        info!(model = %cfg.model, endpoint = %cfg.endpoint, "AnthropicService initialized");

        Ok(Self {
            client,
            cfg,
            url_messages,
        })
    }

    pub async fn messages(
        &self,
        system: &str,
        user: &str,
        params: GenerationParams,
    ) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = MessagesRequest::from_cfg(&self.cfg, system, user, params);

        debug!(model = %self.cfg.model, prompt_len = user.len(), "POST {}", self.url_messages);

        let resp = self
            .client
            .post(&self.url_messages)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_messages.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "Anthropic /v1/messages returned non-success status"
            );
            return Err(ProviderError::new(
                Provider::Anthropic,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url,
                    snippet,
                }),
            )
            .into());
        }

        let out: MessagesResponse = resp.json().await.map_err(|e| {
            ProviderError::new(
                Provider::Anthropic,
                ProviderErrorKind::Decode(format!("serde error: {e}; expected `content[].text`")),
            )
        })?;

        let text = out.joined_text();
        if text.is_empty() {
            return Err(
                ProviderError::new(Provider::Anthropic, ProviderErrorKind::EmptyChoices).into(),
            );
        }

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            "message completed"
        );
        Ok(text)
    }
}

impl TextGenerator for AnthropicService {
    fn generate<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
        params: GenerationParams,
    ) -> BoxFuture<'a, Result<String, AiLlmError>> {
        Box::pin(self.messages(system, user, params))
    }

    fn provider_name(&self) -> &'static str {
        LlmProvider::Anthropic.label()
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<UserMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl<'a> MessagesRequest<'a> {
    fn from_cfg(
        cfg: &'a LlmModelConfig,
        system: &'a str,
        user: &'a str,
        params: GenerationParams,
    ) -> Self {
        Self {
            model: &cfg.model,
            max_tokens: params
                .max_tokens
                .or(cfg.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            system: Some(system).filter(|s| !s.trim().is_empty()),
            messages: vec![UserMessage {
                role: "user",
                content: user,
            }],
            temperature: params.temperature.or(cfg.temperature),
        }
    }
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    fn joined_text(self) -> String {
        self.content
            .into_iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join("")
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Anthropic,
            model: "claude-3-5-haiku-latest".into(),
            endpoint: "https://api.anthropic.com".into(),
            api_key: Some("key".into()),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(10),
        }
    }

    #[test]
    fn max_tokens_is_always_sent() {
        let c = cfg();
        let req = MessagesRequest::from_cfg(&c, "sys", "q", GenerationParams::default());
        assert_eq!(req.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(req.system, Some("sys"));
        assert!(req.temperature.is_none());
    }

    #[test]
    fn only_text_blocks_are_joined() {
        let raw = r#"{"content":[{"type":"text","text":"Hello "},{"type":"tool_use","id":"x"},{"type":"text","text":"there"}]}"#;
        let resp: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.joined_text(), "Hello there");
    }
}
