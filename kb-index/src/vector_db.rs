//! Qdrant helpers: connection, collection bootstrap, batched upserts and
//! top-K search.
//!
//! This module does not read `kb.json` or compute embeddings, only DB I/O.

use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, ScoredPoint, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder, point_id::PointIdOptions,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::kb_index_error::KbIndexError;
use crate::structs::kb_index_config::QdrantConfig;
use crate::structs::knowledge::{KbMatch, KbPayload};

/// Build a gRPC client for `cfg.url`. Does not touch any collection.
pub fn connect(cfg: &QdrantConfig) -> Result<Qdrant, KbIndexError> {
    let mut builder = Qdrant::from_url(&cfg.url);
    if let Some(key) = &cfg.api_key {
        builder = builder.api_key(key.clone());
    }
    builder
        .build()
        .map_err(|e| KbIndexError::Qdrant(format!("client build: {e}")))
}

/// Deterministic point id for a knowledge key.
///
/// Qdrant only accepts unsigned integers or UUIDs, so the key is hashed into
/// a UUIDv5; the key itself travels in the payload.
pub fn stable_point_id(key: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()).to_string()
}

/// Vector space for new collections.
///
/// Scores are compared against a similarity threshold (higher is closer), so
/// the metric is fixed to cosine.
fn vector_params(dim: usize) -> VectorParamsBuilder {
    VectorParamsBuilder::new(dim as u64, Distance::Cosine)
}

/// Create the collection with `dim`-sized vectors unless it already exists.
///
/// Returns `true` when a new collection was created.
pub async fn ensure_collection(
    client: &Qdrant,
    cfg: &QdrantConfig,
    dim: usize,
) -> Result<bool, KbIndexError> {
    let exists = client
        .collection_exists(&cfg.collection)
        .await
        .map_err(|e| KbIndexError::Qdrant(format!("collection_exists: {e}")))?;

    if exists {
        debug!(target: "kb_index::qdrant", collection = %cfg.collection, "collection already present");
        return Ok(false);
    }

    client
        .create_collection(
            CreateCollectionBuilder::new(&cfg.collection).vectors_config(vector_params(dim)),
        )
        .await
        .map_err(|e| KbIndexError::Qdrant(format!("create_collection: {e}")))?;

    info!(target: "kb_index::qdrant", collection = %cfg.collection, dim, "collection created");
    Ok(true)
}

fn payload_to_qdrant(payload: &KbPayload) -> Result<Payload, KbIndexError> {
    let as_json = serde_json::to_value(payload)?;
    Payload::try_from(as_json).map_err(|e| KbIndexError::Qdrant(format!("payload convert: {e}")))
}

/// Upsert `(key, vector, payload)` triples. Every vector must be `dim` long.
///
/// Returns the number of written points.
pub async fn upsert_batch(
    client: &Qdrant,
    cfg: &QdrantConfig,
    dim: usize,
    batch: Vec<(String, Vec<f32>, KbPayload)>,
) -> Result<usize, KbIndexError> {
    if batch.is_empty() {
        return Ok(0);
    }

    let mut points = Vec::with_capacity(batch.len());
    for (key, vector, payload) in batch {
        if vector.len() != dim {
            return Err(KbIndexError::VectorSizeMismatch {
                key,
                got: vector.len(),
                want: dim,
            });
        }
        points.push(PointStruct::new(
            stable_point_id(&key),
            vector,
            payload_to_qdrant(&payload)?,
        ));
    }

    let written = points.len();
    client
        .upsert_points(UpsertPointsBuilder::new(&cfg.collection, points).wait(true))
        .await
        .map_err(|e| KbIndexError::Qdrant(format!("upsert_points: {e}")))?;

    debug!(target: "kb_index::qdrant", written, "batch upserted");
    Ok(written)
}

/// k-NN search with payloads.
pub async fn search_top_k(
    client: &Qdrant,
    cfg: &QdrantConfig,
    query_vec: Vec<f32>,
    k: u64,
) -> Result<Vec<KbMatch>, KbIndexError> {
    let resp = client
        .search_points(SearchPointsBuilder::new(&cfg.collection, query_vec, k).with_payload(true))
        .await
        .map_err(|e| KbIndexError::Qdrant(format!("search_points: {e}")))?;

    Ok(resp.result.into_iter().map(scored_point_to_match).collect())
}

fn scored_point_to_match(sp: ScoredPoint) -> KbMatch {
    let point_id = match sp.id.and_then(|pid| pid.point_id_options) {
        Some(PointIdOptions::Uuid(s)) => s,
        Some(PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    };

    // Values come back as qdrant `Value`s; go through JSON to reuse serde.
    let as_json: serde_json::Map<String, serde_json::Value> = sp
        .payload
        .into_iter()
        .map(|(k, v)| (k, v.into_json()))
        .collect();
    let payload: KbPayload = match serde_json::from_value(serde_json::Value::Object(as_json)) {
        Ok(p) => p,
        Err(e) => {
            warn!(target: "kb_index::qdrant", point_id = %point_id, error = %e, "unreadable payload; treating as empty");
            KbPayload::default()
        }
    };

    KbMatch {
        id: payload.key.clone().unwrap_or(point_id),
        score: sp.score,
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_ids_are_stable_uuids() {
        let a = stable_point_id("kb-000");
        assert_eq!(a, stable_point_id("kb-000"));
        assert_ne!(a, stable_point_id("kb-001"));
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn collections_use_cosine_similarity() {
        let params = vector_params(1536).build();
        assert_eq!(params.size, 1536);
        assert_eq!(params.distance, Distance::Cosine as i32);
    }

    #[test]
    fn payload_converts() {
        let p = KbPayload {
            key: Some("kb-000".into()),
            question: Some("What are your hours?".into()),
            answer: Some("We are open 9-5 Mon-Fri.".into()),
            topic: None,
            tags: vec!["hours".into()],
        };
        let q = payload_to_qdrant(&p).unwrap();
        let map: std::collections::HashMap<String, qdrant_client::qdrant::Value> = q.into();
        assert_eq!(map["q"].clone().into_json(), "What are your hours?");
        assert_eq!(map["key"].clone().into_json(), "kb-000");
    }

    #[test]
    fn unreadable_payload_falls_back_to_point_id() {
        let id = stable_point_id("kb-007");
        let mut payload = std::collections::HashMap::new();
        payload.insert("q".to_string(), qdrant_client::qdrant::Value::from(42_i64));
        let sp = ScoredPoint {
            id: Some(id.clone().into()),
            payload,
            score: 0.91,
            ..Default::default()
        };

        let m = scored_point_to_match(sp);
        assert_eq!(m.id, id);
        assert_eq!(m.payload, KbPayload::default());
        assert!((m.score - 0.91).abs() < 1e-6);
    }
}
