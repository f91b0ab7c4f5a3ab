//! Configuration layer: reads runtime settings from environment variables
//! and exposes strongly typed configs for Qdrant and the reindex input.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::kb_index_error::KbIndexError;

/// Qdrant connectivity and collection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QdrantConfig {
    /// gRPC URL for Qdrant (e.g., "http://localhost:6334").
    pub url: String,
    /// Optional API key for Qdrant Cloud.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Collection holding the knowledge entries.
    pub collection: String,
    /// Upsert batch size.
    pub batch_size: usize,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            collection: "kb".to_string(),
            batch_size: 100,
        }
    }
}

/// Top-level configuration for the knowledge index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbIndexConfig {
    /// Source file for reindexing: JSON array of `{q, a, topic?, tags?}`.
    pub kb_path: PathBuf,
    /// Qdrant connectivity & collection settings.
    pub qdrant: QdrantConfig,
}

impl KbIndexConfig {
    /// Build configuration from environment variables.
    ///
    /// Environment variables used:
    /// - `QDRANT_URL` (default: "http://localhost:6334")
    /// - `QDRANT_API_KEY` (optional)
    /// - `KB_COLLECTION` (default: "kb")
    /// - `KB_UPSERT_BATCH` (default: 100)
    /// - `KB_PATH` (default: `kb/kb.json`)
    pub fn from_env() -> Result<Self, KbIndexError> {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    /// Same as [`KbIndexConfig::from_env`] but reads from an arbitrary lookup.
    pub fn from_vars<F>(get: F) -> Result<Self, KbIndexError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |k: &str| get(k).filter(|v| !v.trim().is_empty());
        let defaults = QdrantConfig::default();

        let batch_size = match var("KB_UPSERT_BATCH") {
            Some(v) => v.trim().parse::<usize>().map_err(|_| KbIndexError::EnvParse {
                key: "KB_UPSERT_BATCH".into(),
                value: v,
            })?,
            None => defaults.batch_size,
        };

        let qdrant = QdrantConfig {
            url: var("QDRANT_URL").unwrap_or(defaults.url),
            api_key: var("QDRANT_API_KEY"),
            collection: var("KB_COLLECTION").unwrap_or(defaults.collection),
            batch_size,
        };

        let kb_path = var("KB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("kb/kb.json"));

        let cfg = Self { kb_path, qdrant };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Basic validations shared by env and CLI construction.
    pub fn validate(&self) -> Result<(), KbIndexError> {
        if self.qdrant.batch_size == 0 {
            return Err(KbIndexError::InvalidConfig(
                "KB_UPSERT_BATCH must be > 0".into(),
            ));
        }
        if self.qdrant.collection.trim().is_empty() {
            return Err(KbIndexError::InvalidConfig(
                "KB_COLLECTION must not be empty".into(),
            ));
        }
        Ok(())
    }
}
