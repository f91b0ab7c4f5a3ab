//! Knowledge-base vector index.
//!
//! Public API:
//! - [`reindex_knowledge_base`]: read `kb.json`, embed every question and
//!   upsert the entries into Qdrant.
//! - [`index::KnowledgeIndex`] / [`index::QdrantKnowledgeIndex`]: top-K
//!   similarity queries used by the answering engine.

pub mod errors;
pub mod index;
pub mod kb_reader;
pub mod structs;
mod vector_db;

use std::time::Instant;

use ai_llm_service::capabilities::TextEmbedder;
use tracing::{debug, info};

use errors::kb_index_error::KbIndexError;
use kb_reader::{KeyedEntry, read_knowledge_file};
use structs::kb_index_config::KbIndexConfig;
use structs::knowledge::{IndexStats, KbPayload};
use vector_db::{connect, ensure_collection, upsert_batch};

pub use vector_db::stable_point_id;

/// Text embedded once to learn the vector size before the collection exists.
pub const DIMENSION_PROBE: &str = "dimension probe";

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, KbIndexError>;

/// Rebuild the index from `cfg.kb_path`.
///
/// Existing points with the same keys are overwritten; the collection is
/// created only when missing.
pub async fn reindex_knowledge_base(
    cfg: &KbIndexConfig,
    embedder: &dyn TextEmbedder,
) -> Result<IndexStats> {
    cfg.validate()?;
    info!(
        target: "kb_index::reindex",
        kb_path = %cfg.kb_path.display(),
        collection = %cfg.qdrant.collection,
        provider = embedder.provider_name(),
        "reindex: start"
    );
    let started = Instant::now();

    let (entries, skipped) = read_knowledge_file(&cfg.kb_path).await?;
    let dim = probe_dimension(embedder).await?;

    let client = connect(&cfg.qdrant)?;
    ensure_collection(&client, &cfg.qdrant, dim).await?;

    let mut indexed = 0usize;
    for chunk in entries.chunks(cfg.qdrant.batch_size) {
        let points = embed_records(embedder, dim, chunk).await?;
        indexed += upsert_batch(&client, &cfg.qdrant, dim, points).await?;
        debug!(target: "kb_index::reindex", indexed, total = entries.len(), "progress");
    }

    let stats = IndexStats {
        indexed,
        skipped,
        dimension: dim,
        duration_ms: started.elapsed().as_millis(),
    };
    info!(
        target: "kb_index::reindex",
        indexed = stats.indexed,
        skipped = stats.skipped,
        dim = stats.dimension,
        duration_ms = stats.duration_ms as u64,
        "reindex: finished"
    );
    Ok(stats)
}

/// Embed [`DIMENSION_PROBE`] and return the vector length.
pub async fn probe_dimension(embedder: &dyn TextEmbedder) -> Result<usize> {
    let v = embedder.embed(DIMENSION_PROBE).await?;
    if v.is_empty() {
        return Err(KbIndexError::InvalidConfig(format!(
            "{} returned an empty embedding",
            embedder.provider_name()
        )));
    }
    Ok(v.len())
}

/// Embed the question of every entry, checking each vector against `dim`.
pub async fn embed_records(
    embedder: &dyn TextEmbedder,
    dim: usize,
    entries: &[KeyedEntry],
) -> Result<Vec<(String, Vec<f32>, KbPayload)>> {
    let mut out = Vec::with_capacity(entries.len());
    for KeyedEntry { key, entry } in entries {
        let vector = embedder.embed(&entry.question).await?;
        if vector.len() != dim {
            return Err(KbIndexError::VectorSizeMismatch {
                key: key.clone(),
                got: vector.len(),
                want: dim,
            });
        }
        out.push((key.clone(), vector, KbPayload::from_entry(key, entry)));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use ai_llm_service::capabilities::BoxFuture;
    use ai_llm_service::error_handler::AiLlmError;

    use super::*;
    use crate::kb_reader::parse_knowledge;

    /// Fixed-size embedder; questions mentioning "odd" come back one element longer.
    struct FixedDim(usize);

    impl TextEmbedder for FixedDim {
        fn embed<'a>(&'a self, input: &'a str) -> BoxFuture<'a, std::result::Result<Vec<f32>, AiLlmError>> {
            let dim = if input == DIMENSION_PROBE || !input.contains("odd") {
                self.0
            } else {
                self.0 + 1
            };
            Box::pin(async move { Ok(vec![0.5; dim]) })
        }

        fn provider_name(&self) -> &'static str {
            "Fake"
        }
    }

    #[tokio::test]
    async fn probe_reports_vector_length() {
        assert_eq!(probe_dimension(&FixedDim(8)).await.unwrap(), 8);
        assert!(probe_dimension(&FixedDim(0)).await.is_err());
    }

    #[tokio::test]
    async fn embeds_questions_with_payloads() {
        let (entries, _) =
            parse_knowledge(r#"[{"q":"What are your hours?","a":"We are open 9-5 Mon-Fri."}]"#)
                .unwrap();
        let rows = embed_records(&FixedDim(4), 4, &entries).await.unwrap();
        assert_eq!(rows.len(), 1);
        let (key, vec, payload) = &rows[0];
        assert_eq!(key, "kb-000");
        assert_eq!(vec.len(), 4);
        assert_eq!(payload.key.as_deref(), Some("kb-000"));
        assert_eq!(payload.usable_answer(), Some("We are open 9-5 Mon-Fri."));
    }

    #[tokio::test]
    async fn dimension_drift_is_rejected() {
        let (entries, _) = parse_knowledge(r#"[{"q":"an odd one","a":"x"}]"#).unwrap();
        let err = embed_records(&FixedDim(4), 4, &entries).await.unwrap_err();
        assert!(matches!(err, KbIndexError::VectorSizeMismatch { got: 5, want: 4, .. }));
    }
}
