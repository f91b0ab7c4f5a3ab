//! Embedding and chat providers behind two capability traits.
//!
//! - [`capabilities`]: `TextEmbedder` / `TextGenerator` traits used by callers.
//! - [`services`]: OpenAI, Ollama and Anthropic HTTP adapters.
//! - [`service_profiles`]: builds the configured adapters once at start-up.
//! - [`config`]: env-driven model configs.
//! - [`telemetry`]: shared `tracing-subscriber` layers for binaries.

pub mod capabilities;
pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;
pub mod telemetry;
