//! Unified error type for the kb-index crate.

use ai_llm_service::error_handler::AiLlmError;
use thiserror::Error;

/// Errors produced by the knowledge index.
#[derive(Debug, Error)]
pub enum KbIndexError {
    // ── Configuration / environment ──────────────────────────────────────────
    /// Failed to parse an environment variable into the expected type.
    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    /// Configuration combination is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O & filesystem ────────────────────────────────────────────────────
    /// Underlying I/O error (reading kb.json).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // ── JSON / serialization ────────────────────────────────────────────────
    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Qdrant client / transport ───────────────────────────────────────────
    /// Transport / server error from Qdrant.
    #[error("qdrant error: {0}")]
    Qdrant(String),

    // ── Embeddings backend ──────────────────────────────────────────────────
    /// Embedding provider failed while indexing.
    #[error("embedding error: {0}")]
    Embedding(#[from] AiLlmError),

    /// Vector length did not match the collection dimension.
    #[error("vector size mismatch for {key}: got {got}, want {want}")]
    VectorSizeMismatch { key: String, got: usize, want: usize },
}
