//! Knowledge-base answering engine.
//!
//! Public API: [`AnswerEngine::ask`]. It embeds the question, fetches the top
//! candidates from the knowledge index, and either polishes the best entry
//! (score at or above the threshold) or falls back to the chat model. Every
//! decision is recorded in the returned trace.

mod api_types;
pub mod cfg;
mod engine;
mod error;
pub mod prompt;

pub use api_types::{AnswerOutcome, AnswerSource};
pub use cfg::EngineConfig;
pub use engine::AnswerEngine;
pub use error::AnswerError;
