//! GET /history and POST /history/clear.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::history::history_response::{ClearResponse, HistoryQuery, HistoryResponse},
};

/// Handler: GET /history?limit=N — newest first.
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> AppResult<Json<HistoryResponse>> {
    let Query(q) = query?;
    let limit = q.limit.unwrap_or(state.history_default_limit);
    let items = state.history.recent(limit).await;
    Ok(Json(HistoryResponse { items }))
}

/// Handler: POST /history/clear
pub async fn clear_history(State(state): State<Arc<AppState>>) -> AppResult<Json<ClearResponse>> {
    state.history.clear().await?;
    Ok(Json(ClearResponse { success: true }))
}
