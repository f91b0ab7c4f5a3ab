//! Provider-agnostic capabilities used by the answering engine and indexer.
//!
//! Every adapter in [`crate::services`] implements one or both traits, so
//! callers hold `Arc<dyn TextEmbedder>` / `Arc<dyn TextGenerator>` and never
//! branch on the provider.

use std::{future::Future, pin::Pin};

use crate::error_handler::AiLlmError;

/// Boxed future returned by capability methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Per-request sampling overrides. `None` falls back to the model config.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationParams {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GenerationParams {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature: Some(temperature),
            max_tokens: Some(max_tokens),
        }
    }
}

/// Turns text into a fixed-dimension vector.
pub trait TextEmbedder: Send + Sync {
    fn embed<'a>(&'a self, input: &'a str) -> BoxFuture<'a, Result<Vec<f32>, AiLlmError>>;

    /// Provider label for logs and traces.
    fn provider_name(&self) -> &'static str;
}

/// Produces a completion from a system instruction and a user prompt.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
        params: GenerationParams,
    ) -> BoxFuture<'a, Result<String, AiLlmError>>;

    /// Provider label for logs and traces.
    fn provider_name(&self) -> &'static str;
}
