// src/core/history_store.rs
//! Bounded, ordered history of previously sent questions, kept in one JSON file

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::HistoryConfig;
use crate::core::FsOps;
use crate::types::{QuestionRecord, Signature};

/// Oldest first, newest last.
pub type HistoryCollection = Vec<QuestionRecord>;

/// Current on-disk record layout.
///
/// - v0: `{question, answer}`
/// - v1: `{question, answer, signature}`
pub const HISTORY_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct StoredRecord {
    question: String,
    answer: String,
    #[serde(default)]
    signature: Option<Signature>,
}

impl StoredRecord {
    fn schema_version(&self) -> u32 {
        if self.signature.is_some() {
            1
        } else {
            0
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub backfilled: usize,
    /// Stored signatures that did not match the recomputed one.
    pub resigned: usize,
    pub dropped_duplicates: usize,
}

pub struct HistoryStore {
    path: PathBuf,
    max_history: usize,
}

impl HistoryStore {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            path: config.path.clone(),
            max_history: config.max_history,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Load the history.
    ///
    /// A missing file yields an empty history and an empty `[]` file is
    /// created. A file that is not a JSON array of `{question, answer}`
    /// objects is an error; it is left untouched on disk.
    pub async fn load(&self) -> Result<HistoryCollection> {
        self.read(true).await
    }

    /// Like [`load`](Self::load) but never creates a missing file.
    pub async fn load_read_only(&self) -> Result<HistoryCollection> {
        self.read(false).await
    }

    async fn read(&self, create_missing: bool) -> Result<HistoryCollection> {
        let Some(content) = FsOps::read_if_exists(&self.path).await? else {
            info!(
                "No history file at {}, starting empty",
                self.path.display()
            );
            if create_missing {
                FsOps::write_atomic(&self.path, "[]").await?;
            }
            return Ok(Vec::new());
        };

        let stored: Vec<StoredRecord> = serde_json::from_str(&content).with_context(|| {
            format!(
                "History file {} is corrupt; fix or remove it",
                self.path.display()
            )
        })?;

        let (records, report) = migrate(stored);
        if report.backfilled > 0 {
            info!(
                "Migrated {} history record(s) to schema v{}",
                report.backfilled, HISTORY_SCHEMA_VERSION
            );
        }
        if report.resigned > 0 {
            warn!(
                "Recomputed {} stored signature(s) in {} that did not match their question",
                report.resigned,
                self.path.display()
            );
        }
        if report.dropped_duplicates > 0 {
            warn!(
                "Dropped {} duplicate record(s) from {}",
                report.dropped_duplicates,
                self.path.display()
            );
        }

        info!(
            "Loaded {} history record(s) from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    /// Keep the most recent `max_history` records and rewrite the whole file.
    pub async fn save(&self, collection: &[QuestionRecord]) -> Result<()> {
        let kept = most_recent(collection, self.max_history);
        let evicted = collection.len() - kept.len();

        let json =
            serde_json::to_string_pretty(kept).context("Failed to serialize history")?;
        FsOps::write_atomic(&self.path, &json).await?;

        info!(
            "Saved {} history record(s) to {} ({} evicted)",
            kept.len(),
            self.path.display(),
            evicted
        );
        Ok(())
    }
}

/// Tail of `records` holding at most `max` entries, order preserved.
pub fn most_recent(records: &[QuestionRecord], max: usize) -> &[QuestionRecord] {
    let start = records.len().saturating_sub(max);
    &records[start..]
}

/// Bring loaded records up to the current schema and drop later records
/// whose signature repeats an earlier one.
///
/// Signatures are always recomputed from the question; stored values that
/// differ are counted in `resigned`.
fn migrate(stored: Vec<StoredRecord>) -> (HistoryCollection, MigrationReport) {
    let mut report = MigrationReport::default();
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(stored.len());

    for record in stored {
        let signature = Signature::of(&record.question);
        match (record.schema_version(), &record.signature) {
            (0, _) => report.backfilled += 1,
            (_, Some(stored)) if *stored != signature => report.resigned += 1,
            _ => {}
        }

        if !seen.insert(signature.clone()) {
            report.dropped_duplicates += 1;
            continue;
        }

        records.push(QuestionRecord {
            question: record.question,
            answer: record.answer,
            signature,
        });
    }

    (records, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Deduplicator;

    fn store_in(dir: &Path, max_history: usize) -> HistoryStore {
        HistoryStore::new(&HistoryConfig {
            path: dir.join("last_questions.json"),
            max_history,
        })
    }

    fn records(prefix: &str, n: usize) -> Vec<QuestionRecord> {
        (0..n)
            .map(|i| QuestionRecord::new(format!("{} question {}?", prefix, i), "answer"))
            .collect()
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty_and_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 100);

        assert!(store.load().await.unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[]");
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error_and_left_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 100);
        std::fs::write(store.path(), "{not json").unwrap();

        let err = store.load().await.unwrap_err();
        assert!(err.to_string().contains("corrupt"));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{not json");
    }

    #[tokio::test]
    async fn test_wrong_shape_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 100);
        std::fs::write(store.path(), r#"[{"question": "only a question"}]"#).unwrap();

        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn test_legacy_records_get_signatures() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 100);
        std::fs::write(
            store.path(),
            r#"[{"question": "  What is UAT? ", "answer": "User acceptance testing."}]"#,
        )
        .unwrap();

        let history = store.load().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].signature.as_str(), "what is uat?");
        assert_eq!(history[0].question, "  What is UAT? ");
    }

    #[tokio::test]
    async fn test_legacy_duplicates_are_dropped_keeping_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 100);
        std::fs::write(
            store.path(),
            r#"[
                {"question": "What is UAT?", "answer": "first"},
                {"question": "what is uat?", "answer": "second"}
            ]"#,
        )
        .unwrap();

        let history = store.load().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].answer, "first");
    }

    #[tokio::test]
    async fn test_stored_signatures_are_recomputed_from_question() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 100);
        std::fs::write(
            store.path(),
            r#"[
                {"question": "What is UAT?", "answer": "a", "signature": "5d41402abc4b2a76b9719d911017c592"},
                {"question": "Explain  flaky tests", "answer": "b", "signature": "explain  flaky tests"}
            ]"#,
        )
        .unwrap();

        let history = store.load().await.unwrap();
        assert_eq!(history[0].signature.as_str(), "what is uat?");
        assert_eq!(history[1].signature.as_str(), "explain flaky tests");

        let dedup = Deduplicator::new(&history);
        assert!(!dedup.is_unique(&Signature::of("what is uat?")));
        assert!(!dedup.is_unique(&Signature::of("Explain flaky tests")));
    }

    #[test]
    fn test_migrate_counts_mismatched_signatures() {
        let stored = vec![
            StoredRecord {
                question: "What is UAT?".to_string(),
                answer: "a".to_string(),
                signature: Some(Signature::of("What is UAT?")),
            },
            StoredRecord {
                question: "What is a bug?".to_string(),
                answer: "b".to_string(),
                signature: Some(Signature::of("md5")),
            },
            StoredRecord {
                question: "What is a defect?".to_string(),
                answer: "c".to_string(),
                signature: None,
            },
        ];

        let (records, report) = migrate(stored);
        assert_eq!(records.len(), 3);
        assert_eq!(
            report,
            MigrationReport {
                backfilled: 1,
                resigned: 1,
                dropped_duplicates: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_read_only_load_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 100);

        assert!(store.load_read_only().await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_save_truncates_to_most_recent_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 5);
        let old = records("old", 4);
        let new = records("new", 3);
        let all: Vec<_> = old.iter().chain(new.iter()).cloned().collect();

        store.save(&all).await.unwrap();
        let reloaded = store.load().await.unwrap();

        assert_eq!(reloaded.len(), 5);
        assert_eq!(reloaded, all[2..].to_vec());
    }

    #[tokio::test]
    async fn test_save_under_bound_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 100);
        let all = records("q", 7);

        store.save(&all).await.unwrap();
        assert_eq!(store.load().await.unwrap(), all);
    }

    #[tokio::test]
    async fn test_full_history_evicts_exactly_one_from_front() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 10);
        let mut history = records("h", 10);
        store.save(&history).await.unwrap();

        let extra = QuestionRecord::new("Brand new question?", "answer");
        history.push(extra.clone());
        store.save(&history).await.unwrap();

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.len(), 10);
        assert_eq!(reloaded[0].question, "h question 1?");
        assert_eq!(reloaded.last(), Some(&extra));
    }

    #[tokio::test]
    async fn test_load_then_save_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), 100);
        store.save(&records("q", 3)).await.unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        let history = store.load().await.unwrap();
        store.save(&history).await.unwrap();

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_most_recent() {
        let all = records("q", 4);
        assert_eq!(most_recent(&all, 2), &all[2..]);
        assert_eq!(most_recent(&all, 10), &all[..]);
        assert!(most_recent(&[], 3).is_empty());
    }
}
