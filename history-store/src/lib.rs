//! Question/answer history kept in one JSON array on disk.
//!
//! - One `tokio::sync::RwLock` guards the whole file: `recent` shares the read
//!   side, `append`/`clear` take the write side.
//! - Every write rewrites the full array to `<file>.tmp` and renames it over
//!   the original, so readers never observe a half-written file.
//! - The file (and its parent directory) is created on first write.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

pub mod errors;
use errors::Result;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unix seconds at append time.
    #[serde(rename = "ts", alias = "timestamp")]
    pub timestamp: i64,
    pub question: String,
    pub answer: String,
    /// `"kb"` or `"llm"`.
    pub source: String,
}

#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl HistoryStore {
    /// Bind the store to `path`. Nothing is touched on disk yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry stamped with the current time.
    ///
    /// A missing or unreadable log is treated as empty and replaced.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn append(&self, question: &str, answer: &str, source: &str) -> Result<HistoryEntry> {
        let _guard = self.lock.write().await;

        let mut entries = read_entries(&self.path).await;
        let entry = HistoryEntry {
            timestamp: Utc::now().timestamp(),
            question: question.to_string(),
            answer: answer.to_string(),
            source: source.to_string(),
        };
        entries.push(entry.clone());
        write_atomic(&self.path, &entries).await?;

        debug!(total = entries.len(), "history entry appended");
        Ok(entry)
    }

    /// Up to `limit` newest entries, newest first. Never fails: a missing or
    /// corrupt file reads as empty.
    pub async fn recent(&self, limit: i64) -> Vec<HistoryEntry> {
        if limit <= 0 {
            return Vec::new();
        }
        let _guard = self.lock.read().await;

        let entries = read_entries(&self.path).await;
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        entries.into_iter().rev().take(take).collect()
    }

    /// Replace the log with an empty array.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.lock.write().await;
        write_atomic(&self.path, &[]).await?;
        debug!("history cleared");
        Ok(())
    }
}

async fn read_entries(path: &Path) -> Vec<HistoryEntry> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "history unreadable; treating as empty");
            return Vec::new();
        }
    };
    match serde_json::from_slice(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "history corrupt; treating as empty");
            Vec::new()
        }
    }
}

async fn write_atomic(path: &Path, entries: &[HistoryEntry]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_vec_pretty(entries)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::open(dir.path().join("nested").join("history.json"))
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for i in 0..5 {
            store.append(&format!("q{i}"), "a", "kb").await.unwrap();
        }

        let got: Vec<_> = store.recent(3).await.into_iter().map(|e| e.question).collect();
        assert_eq!(got, vec!["q4", "q3", "q2"]);
        assert_eq!(store.recent(100).await.len(), 5);
        assert!(store.recent(0).await.is_empty());
        assert!(store.recent(-7).await.is_empty());
    }

    #[tokio::test]
    async fn missing_and_corrupt_files_read_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.recent(10).await.is_empty());

        tokio::fs::create_dir_all(store.path().parent().unwrap()).await.unwrap();
        tokio::fs::write(store.path(), b"{not json").await.unwrap();
        assert!(store.recent(10).await.is_empty());

        // Next append starts a fresh log.
        store.append("q", "a", "llm").await.unwrap();
        assert_eq!(store.recent(10).await.len(), 1);
    }

    #[tokio::test]
    async fn clear_empties_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append("q", "a", "kb").await.unwrap();
        store.clear().await.unwrap();

        assert!(store.recent(10).await.is_empty());
        let raw = tokio::fs::read_to_string(store.path()).await.unwrap();
        assert!(serde_json::from_str::<Vec<HistoryEntry>>(&raw).unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(&dir));

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.append(&format!("q{i}"), "a", "llm").await })
            })
            .collect();
        for t in tasks {
            t.await.unwrap().unwrap();
        }

        assert_eq!(store.recent(1000).await.len(), 50);
    }

    #[test]
    fn entry_wire_format() {
        let e = HistoryEntry {
            timestamp: 1_700_000_000,
            question: "What are your hours?".into(),
            answer: "We are open 9-5 Mon-Fri.".into(),
            source: "kb".into(),
        };
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["ts"], 1_700_000_000);

        let legacy: HistoryEntry = serde_json::from_str(
            r#"{"timestamp": 5, "question": "q", "answer": "a", "source": "llm"}"#,
        )
        .unwrap();
        assert_eq!(legacy.timestamp, 5);
    }
}
