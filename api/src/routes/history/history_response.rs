use history_store::HistoryEntry;
use serde::{Deserialize, Serialize};

/// Query string for GET /history.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub items: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
}
