//! POST /kb/reindex — rebuild the knowledge index from `KB_PATH`.
//!
//! Disabled (404) unless `KB_ADMIN_REINDEX=true`; callers must send the
//! configured secret in `X-Admin-Secret`.

use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use kb_index::reindex_knowledge_base;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

#[derive(Debug, Serialize)]
pub struct ReindexResponse {
    pub indexed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

/// Handler: POST /kb/reindex
pub async fn reindex(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<ReindexResponse>> {
    let admin = state.admin.as_ref().ok_or(AppError::NotFound)?;

    let provided = headers
        .get(ADMIN_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !secrets_match(provided, &admin.secret) {
        warn!(target: "api", "reindex rejected: bad admin secret");
        return Err(AppError::Unauthorized);
    }

    let stats = reindex_knowledge_base(&admin.kb, admin.embedder.as_ref()).await?;
    info!(target: "api", indexed = stats.indexed, skipped = stats.skipped, "reindex via admin route");

    Ok(Json(ReindexResponse {
        indexed: stats.indexed,
        skipped: stats.skipped,
        duration_ms: stats.duration_ms as u64,
    }))
}

/// Compares every byte so the time taken does not reveal how much of the
/// secret matched. Only the length leaks.
fn secrets_match(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_comparison() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3creT", "s3cret"));
        assert!(!secrets_match("s3cret-longer", "s3cret"));
        assert!(!secrets_match("", "s3cret"));
    }
}
