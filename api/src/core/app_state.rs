use std::sync::Arc;

use ai_llm_service::{capabilities::TextEmbedder, service_profiles::LlmServiceProfiles};
use history_store::HistoryStore;
use kb_answer::AnswerEngine;
use kb_index::{index::QdrantKnowledgeIndex, structs::kb_index_config::KbIndexConfig};
use tracing::info;

use crate::{
    core::app_config::AppConfig,
    error_handler::{AppError, AppResult},
};

/// Everything `POST /kb/reindex` needs.
#[derive(Clone)]
pub struct AdminReindex {
    pub secret: String,
    pub kb: KbIndexConfig,
    pub embedder: Arc<dyn TextEmbedder>,
}

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnswerEngine>,
    pub history: Arc<HistoryStore>,
    pub history_default_limit: i64,
    /// `None` keeps the admin route disabled.
    pub admin: Option<AdminReindex>,
}

impl AppState {
    pub fn new(
        engine: Arc<AnswerEngine>,
        history: Arc<HistoryStore>,
        history_default_limit: i64,
        admin: Option<AdminReindex>,
    ) -> Self {
        Self {
            engine,
            history,
            history_default_limit,
            admin,
        }
    }

    /// Build provider clients and the engine from configuration.
    pub fn from_config(cfg: AppConfig) -> AppResult<Self> {
        let profiles = LlmServiceProfiles::new(cfg.embedding, cfg.chat)?;
        let index = QdrantKnowledgeIndex::new(cfg.kb.qdrant.clone())
            .map_err(|e| AppError::Config(e.to_string()))?;

        info!(
            target: "api",
            collection = index.collection(),
            threshold = cfg.engine.threshold,
            generation = profiles.generator().is_some(),
            "answer engine ready"
        );

        let engine = AnswerEngine::new(
            profiles.embedder(),
            Arc::new(index),
            profiles.generator(),
            cfg.engine,
        );

        let admin = cfg.server.admin_secret.map(|secret| AdminReindex {
            secret,
            kb: cfg.kb,
            embedder: profiles.embedder(),
        });

        Ok(Self::new(
            Arc::new(engine),
            Arc::new(HistoryStore::open(cfg.server.history_path)),
            cfg.server.history_default_limit,
            admin,
        ))
    }
}
