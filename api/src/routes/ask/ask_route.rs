//! POST /ask — answer a question from the knowledge base or the fallback model.

use std::{sync::Arc, time::Instant};

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::{info, warn};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::ask::ask_request::{AskRequest, AskResponse},
};

/// Handler: POST /ask
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What are your hours?"}'
/// ```
pub async fn ask(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> AppResult<Json<AskResponse>> {
    let Json(body) = payload?;
    let question = body.question.as_str();
    if question.trim().is_empty() {
        return Err(AppError::BadRequest("question must not be empty".into()));
    }

    let started = Instant::now();
    let outcome = state.engine.ask(question).await?;

    info!(
        target: "api",
        question_len = question.len(),
        source = %outcome.source,
        score = outcome.score,
        latency_ms = started.elapsed().as_millis() as u64,
        "ask answered"
    );

    // Recorded before responding; a failed write is logged and the answer still returned.
    if let Err(e) = state
        .history
        .append(question, &outcome.answer, outcome.source.as_str())
        .await
    {
        warn!(target: "api", error = %e, "failed to record history");
    }

    Ok(Json(outcome.into()))
}
