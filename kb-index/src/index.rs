//! Query side of the knowledge index.

use ai_llm_service::capabilities::BoxFuture;
use qdrant_client::Qdrant;

use crate::errors::kb_index_error::KbIndexError;
use crate::structs::kb_index_config::QdrantConfig;
use crate::structs::knowledge::KbMatch;
use crate::vector_db::{connect, search_top_k};

/// Similarity lookup over stored knowledge entries.
pub trait KnowledgeIndex: Send + Sync {
    /// Up to `top_k` matches for `vector`, with payloads. Ordering is whatever
    /// the backend returns; callers pick the best match themselves.
    fn query<'a>(
        &'a self,
        vector: Vec<f32>,
        top_k: u64,
    ) -> BoxFuture<'a, Result<Vec<KbMatch>, KbIndexError>>;
}

/// [`KnowledgeIndex`] backed by a Qdrant collection.
#[derive(Clone)]
pub struct QdrantKnowledgeIndex {
    client: Qdrant,
    cfg: QdrantConfig,
}

impl QdrantKnowledgeIndex {
    /// Builds the client eagerly; no network round-trip happens here.
    pub fn new(cfg: QdrantConfig) -> Result<Self, KbIndexError> {
        let client = connect(&cfg)?;
        Ok(Self { client, cfg })
    }

    pub fn collection(&self) -> &str {
        &self.cfg.collection
    }
}

impl KnowledgeIndex for QdrantKnowledgeIndex {
    fn query<'a>(
        &'a self,
        vector: Vec<f32>,
        top_k: u64,
    ) -> BoxFuture<'a, Result<Vec<KbMatch>, KbIndexError>> {
        Box::pin(search_top_k(&self.client, &self.cfg, vector, top_k))
    }
}
