//! Data types for the knowledge index: source entries, stored payloads,
//! query matches and reindex statistics.

use serde::{Deserialize, Serialize};

/// One curated question/answer pair as it appears in `kb.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    #[serde(rename = "q")]
    pub question: String,
    #[serde(rename = "a")]
    pub answer: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Payload stored next to each vector.
///
/// Every field is optional on the way back: entries written by other tools
/// (or older runs) may lack some of them, and the engine decides what a
/// missing answer means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KbPayload {
    /// Stable key (`kb-000`, `kb-001`, ...).
    #[serde(default)]
    pub key: Option<String>,
    #[serde(rename = "q", default)]
    pub question: Option<String>,
    #[serde(rename = "a", default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl KbPayload {
    pub fn from_entry(key: &str, entry: &KnowledgeEntry) -> Self {
        Self {
            key: Some(key.to_string()),
            question: Some(entry.question.clone()),
            answer: Some(entry.answer.clone()),
            topic: entry.topic.clone(),
            tags: entry.tags.clone(),
        }
    }

    /// Stored answer, if present and not blank.
    pub fn usable_answer(&self) -> Option<&str> {
        self.answer.as_deref().filter(|a| !a.trim().is_empty())
    }
}

/// A single similarity hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbMatch {
    /// Payload key when present, otherwise the Qdrant point id.
    pub id: String,
    /// Similarity as reported by the index (cosine: higher is closer).
    pub score: f32,
    pub payload: KbPayload,
}

/// Summary statistics for a full reindex operation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub indexed: usize,
    pub skipped: usize,
    pub dimension: usize,
    pub duration_ms: u128,
}
