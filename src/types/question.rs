// src/types/question.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized fingerprint of a question, compared instead of the raw text.
///
/// Lowercased, trimmed, and with inner whitespace runs collapsed to a single
/// space. Answers never contribute to the signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn of(question: &str) -> Self {
        Self(crate::utils::normalize_question(question))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A generated interview question, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub answer: String,
    pub signature: Signature,
}

impl QuestionRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        let question = question.into();
        let signature = Signature::of(&question);
        Self {
            question,
            answer: answer.into(),
            signature,
        }
    }
}

/// A question/answer pair as returned by the generation service or the
/// fallback pool, before it has been fingerprinted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCandidate {
    pub question: String,
    pub answer: String,
}

impl From<QuestionCandidate> for QuestionRecord {
    fn from(candidate: QuestionCandidate) -> Self {
        QuestionRecord::new(candidate.question, candidate.answer)
    }
}
