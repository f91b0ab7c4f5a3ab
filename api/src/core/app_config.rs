//! Process-wide configuration, assembled once in `main` and handed to
//! [`crate::start`].

use std::path::PathBuf;

use ai_llm_service::config::{
    default_config::{chat_config_from_env, embedding_config_from_env},
    llm_model_config::LlmModelConfig,
};
use kb_answer::EngineConfig;
use kb_index::structs::kb_index_config::KbIndexConfig;

use crate::error_handler::{AppError, AppResult};

/// HTTP-layer settings that do not belong to any domain crate.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub address: String,
    pub history_path: PathBuf,
    pub history_default_limit: i64,
    /// `Some(secret)` enables `POST /kb/reindex`.
    pub admin_secret: Option<String>,
}

impl ServerSettings {
    /// Reads `API_ADDRESS`, `HISTORY_PATH`, `HISTORY_DEFAULT_LIMIT`,
    /// `KB_ADMIN_REINDEX` and `KB_ADMIN_SECRET`.
    pub fn from_vars<F>(get: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |k: &str| get(k).filter(|v| !v.trim().is_empty());

        let history_default_limit = match var("HISTORY_DEFAULT_LIMIT") {
            Some(v) => v.trim().parse::<i64>().map_err(|_| {
                AppError::Config(format!("HISTORY_DEFAULT_LIMIT is not an integer: '{v}'"))
            })?,
            None => 10,
        };

        let admin_enabled = var("KB_ADMIN_REINDEX")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let admin_secret = match (admin_enabled, var("KB_ADMIN_SECRET")) {
            (false, _) => None,
            (true, Some(secret)) => Some(secret),
            (true, None) => {
                return Err(AppError::Config(
                    "KB_ADMIN_REINDEX=true requires KB_ADMIN_SECRET".into(),
                ));
            }
        };

        Ok(Self {
            address: var("API_ADDRESS").unwrap_or_else(|| "0.0.0.0:8000".into()),
            history_path: var("HISTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("kb/history.json")),
            history_default_limit,
            admin_secret,
        })
    }
}

/// Everything the server needs to build its state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub embedding: LlmModelConfig,
    pub chat: Option<LlmModelConfig>,
    pub kb: KbIndexConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Load and validate every section from the process environment.
    ///
    /// # Errors
    /// Any missing credential or malformed value is fatal at start-up.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            server: ServerSettings::from_vars(|k| std::env::var(k).ok())?,
            embedding: embedding_config_from_env()?,
            chat: chat_config_from_env()?,
            kb: KbIndexConfig::from_env()
                .map_err(|e| AppError::Config(e.to_string()))?,
            engine: EngineConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from(pairs: &'static [(&'static str, &'static str)]) -> AppResult<ServerSettings> {
        ServerSettings::from_vars(|k| {
            pairs
                .iter()
                .find(|(key, _)| *key == k)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn defaults() {
        let s = from(&[]).unwrap();
        assert_eq!(s.address, "0.0.0.0:8000");
        assert_eq!(s.history_path, PathBuf::from("kb/history.json"));
        assert_eq!(s.history_default_limit, 10);
        assert_eq!(s.admin_secret, None);
    }

    #[test]
    fn admin_route_needs_secret() {
        assert!(from(&[("KB_ADMIN_REINDEX", "true")]).is_err());
        let s = from(&[("KB_ADMIN_REINDEX", "true"), ("KB_ADMIN_SECRET", "s3cret")]).unwrap();
        assert_eq!(s.admin_secret.as_deref(), Some("s3cret"));
        // Secret alone does not enable the route.
        assert_eq!(from(&[("KB_ADMIN_SECRET", "s3cret")]).unwrap().admin_secret, None);
    }

    #[test]
    fn bad_limit_is_rejected() {
        assert!(from(&[("HISTORY_DEFAULT_LIMIT", "ten")]).is_err());
    }
}
