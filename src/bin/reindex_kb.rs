//! Offline reindex: read `kb.json`, embed every question and upsert into Qdrant.
//!
//! ```bash
//! cargo run --bin reindex_kb -- --index kb-openai-1536 --kb kb/kb.json
//! ```

use std::{error::Error, path::PathBuf};

use ai_llm_service::{
    config::default_config::embedding_config_from_env, service_profiles::LlmServiceProfiles,
    telemetry,
};
use clap::Parser;
use kb_index::{reindex_knowledge_base, structs::kb_index_config::KbIndexConfig};
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Reindex the knowledge base into the vector store.
#[derive(Debug, Parser)]
#[command(name = "reindex_kb", version)]
struct Cli {
    /// Collection name (overrides KB_COLLECTION), e.g. kb-openai-1536.
    #[arg(long)]
    index: Option<String>,

    /// Path to kb.json (overrides KB_PATH).
    #[arg(long)]
    kb: Option<PathBuf>,

    /// Embedding model (overrides OPENAI_EMBED_MODEL / EMBEDDING_MODEL).
    #[arg(long)]
    embed_model: Option<String>,

    /// Upsert batch size (overrides KB_UPSERT_BATCH).
    #[arg(long)]
    batch_size: Option<usize>,
}

impl Cli {
    fn apply(self, cfg: &mut KbIndexConfig) -> Option<String> {
        if let Some(index) = self.index {
            cfg.qdrant.collection = index;
        }
        if let Some(kb) = self.kb {
            cfg.kb_path = kb;
        }
        if let Some(n) = self.batch_size {
            cfg.qdrant.batch_size = n;
        }
        self.embed_model
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(telemetry::layer())
        .try_init()?;

    let mut kb_cfg = KbIndexConfig::from_env()?;
    let embed_model = cli.apply(&mut kb_cfg);
    kb_cfg.validate()?;

    let mut embedding = embedding_config_from_env()?;
    if let Some(model) = embed_model {
        embedding.model = model;
    }
    let profiles = LlmServiceProfiles::new(embedding, None)?;

    info!(
        collection = %kb_cfg.qdrant.collection,
        kb = %kb_cfg.kb_path.display(),
        model = %profiles.profiles().0.model,
        "reindexing knowledge base"
    );

    let embedder = profiles.embedder();
    let stats = reindex_knowledge_base(&kb_cfg, embedder.as_ref()).await?;

    println!(
        "Indexed {} item(s) into '{}' (dim {}, skipped {}, {} ms)",
        stats.indexed, kb_cfg.qdrant.collection, stats.dimension, stats.skipped, stats.duration_ms
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_env_config() {
        let cli = Cli::parse_from([
            "reindex_kb",
            "--index",
            "kb-openai-1536",
            "--kb",
            "data/kb.json",
            "--embed-model",
            "text-embedding-3-large",
            "--batch-size",
            "10",
        ]);
        let mut cfg = KbIndexConfig::from_vars(|_| None).unwrap();
        let model = cli.apply(&mut cfg);

        assert_eq!(cfg.qdrant.collection, "kb-openai-1536");
        assert_eq!(cfg.kb_path, PathBuf::from("data/kb.json"));
        assert_eq!(cfg.qdrant.batch_size, 10);
        assert_eq!(model.as_deref(), Some("text-embedding-3-large"));
    }

    #[test]
    fn flags_are_optional() {
        let cli = Cli::parse_from(["reindex_kb"]);
        let mut cfg = KbIndexConfig::from_vars(|_| None).unwrap();
        assert_eq!(cli.apply(&mut cfg), None);
        assert_eq!(cfg.qdrant.collection, "kb");
    }
}
