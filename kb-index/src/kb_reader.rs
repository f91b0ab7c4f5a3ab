//! Reader for the curated knowledge file (`kb.json`).
//!
//! The file is a single JSON array of `{q, a, topic?, tags?}` objects. Keys
//! are positional (`kb-000`, `kb-001`, ...) so reindexing the same file
//! overwrites the same points.

use std::path::Path;

use tracing::warn;

use crate::errors::kb_index_error::KbIndexError;
use crate::structs::knowledge::KnowledgeEntry;

/// Entry plus its stable key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedEntry {
    pub key: String,
    pub entry: KnowledgeEntry,
}

/// Positional key for the `index`-th entry.
pub fn entry_key(index: usize) -> String {
    format!("kb-{index:03}")
}

/// Read and normalize `kb.json`.
///
/// Questions and answers are trimmed; entries whose question is blank are
/// skipped (they cannot be embedded). Returns `(entries, skipped)`.
///
/// # Errors
/// - `Io` when the file cannot be read.
/// - `Json` when the file is not an array of entries.
pub async fn read_knowledge_file(
    path: &Path,
) -> Result<(Vec<KeyedEntry>, usize), KbIndexError> {
    let raw = tokio::fs::read_to_string(path).await?;
    parse_knowledge(&raw)
}

/// Pure part of [`read_knowledge_file`].
pub fn parse_knowledge(raw: &str) -> Result<(Vec<KeyedEntry>, usize), KbIndexError> {
    let entries: Vec<KnowledgeEntry> = serde_json::from_str(raw)?;

    let mut out = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;

    for (i, mut entry) in entries.into_iter().enumerate() {
        entry.question = entry.question.trim().to_string();
        entry.answer = entry.answer.trim().to_string();

        if entry.question.is_empty() {
            warn!(target: "kb_index::reader", position = i, "skipping entry with blank question");
            skipped += 1;
            continue;
        }

        out.push(KeyedEntry {
            key: entry_key(i),
            entry,
        });
    }

    Ok((out, skipped))
}
