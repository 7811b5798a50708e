// src/core/fallback.rs
//! Curated questions used to pad a batch when generation keeps failing

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::types::QuestionCandidate;

const EMBEDDED_POOL: &str = include_str!("../../data/fallback_questions.json");

#[derive(Debug, Clone, Deserialize)]
pub struct FallbackPool {
    pub version: u32,
    pub questions: Vec<QuestionCandidate>,
}

impl FallbackPool {
    /// The pool compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_POOL).context("Embedded fallback pool is invalid")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let pool: Self = serde_json::from_str(json).context("Failed to parse fallback pool")?;
        Ok(pool)
    }

    pub fn empty() -> Self {
        Self {
            version: 0,
            questions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
