//! Typed error for the kb-answer crate.

use ai_llm_service::error_handler::AiLlmError;
use kb_index::errors::kb_index_error::KbIndexError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnswerError {
    /// Question could not be embedded.
    #[error("embedding failed: {0}")]
    Embedding(#[source] AiLlmError),

    /// Vector index query failed.
    #[error("knowledge index query failed: {0}")]
    Index(#[from] KbIndexError),

    /// Chat provider failed on either path.
    #[error("generation failed: {0}")]
    Generation(#[source] AiLlmError),

    /// A provider call exceeded the per-call timeout.
    #[error("{stage} timed out after {secs}s")]
    Timeout { stage: &'static str, secs: u64 },

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}
