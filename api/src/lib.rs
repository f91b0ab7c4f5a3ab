//! HTTP boundary for the knowledge-base chat backend.
//!
//! Routes:
//! - `POST /ask`            → answer + source + trace
//! - `GET  /history`        → recent Q&A, newest first
//! - `POST /history/clear`  → wipe history
//! - `GET  /health`         → liveness
//! - `POST /kb/reindex`     → rebuild the index (opt-in, secret-protected)

use std::sync::Arc;

pub mod core;
pub mod error_handler;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub use crate::core::{app_config::AppConfig, app_state::AppState};
use crate::{
    error_handler::AppError,
    routes::{
        ask::ask_route::ask,
        health_route::health,
        history::history_route::{clear_history, list_history},
        kb_admin::reindex_route::reindex,
    },
};

/// Build the router over an already constructed state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ask", post(ask))
        .route("/history", get(list_history))
        .route("/history/clear", post(clear_history))
        .route("/health", get(health))
        .route("/kb/reindex", post(reindex))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build state from `config`, bind `config.server.address` and serve until Ctrl+C.
pub async fn start(config: AppConfig) -> Result<(), AppError> {
    let address = config.server.address.clone();
    let state = Arc::new(AppState::from_config(config)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(AppError::Bind)?;
    info!(target: "api", %address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!(target: "api", "server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(target: "api", error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
