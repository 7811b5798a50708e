// src/core/dedup.rs
use std::collections::HashSet;

use crate::types::{QuestionRecord, Signature};

/// Set-backed uniqueness check over the history plus the batch being built.
///
/// Built once per generation run from the history; every accepted record is
/// registered so later candidates are checked against it too. Only the
/// normalized question text is compared.
#[derive(Debug, Default, Clone)]
pub struct Deduplicator {
    seen: HashSet<Signature>,
}

impl Deduplicator {
    pub fn new(history: &[QuestionRecord]) -> Self {
        Self {
            seen: history.iter().map(|r| r.signature.clone()).collect(),
        }
    }

    pub fn is_unique(&self, signature: &Signature) -> bool {
        !signature.as_str().is_empty() && !self.seen.contains(signature)
    }

    /// Record a signature as taken. Returns false if it was already present.
    pub fn register(&mut self, signature: Signature) -> bool {
        self.seen.insert(signature)
    }

    /// Check and register in one step.
    pub fn admit(&mut self, record: &QuestionRecord) -> bool {
        self.is_unique(&record.signature) && self.register(record.signature.clone())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Stateless form of the check, for callers without a built index.
pub fn is_unique(
    candidate: &Signature,
    history: &[QuestionRecord],
    batch_so_far: &[QuestionRecord],
) -> bool {
    !candidate.as_str().is_empty()
        && history
            .iter()
            .chain(batch_so_far)
            .all(|r| &r.signature != candidate)
}
