// src/core/batch_generator.rs
//! Bounded-retry generation of a batch of unique interview questions

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::dedup::Deduplicator;
use super::fallback::FallbackPool;
use super::generation_client::{GenerationRequest, TextGenerator};
use crate::config::GenerationConfig;
use crate::types::{QuestionCandidate, QuestionRecord};
use crate::utils::{strip_code_fences, truncate_chars};

pub const TARGET_SIZE: usize = 10;
pub const MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_SLACK: usize = 3;

/// How many past questions are quoted back to the service as "do not repeat".
const RECENT_QUESTIONS_IN_PROMPT: usize = 15;

pub const DEFAULT_TOPICS: [&str; 12] = [
    "test strategy and planning",
    "test automation frameworks",
    "API testing",
    "ecommerce checkout and payments",
    "performance and load testing",
    "defect management and triage",
    "regression testing",
    "CI/CD and quality gates",
    "mobile and cross-browser testing",
    "test data management",
    "team leadership and mentoring",
    "risk-based testing",
];

/// Shape of each request sent to the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStrategy {
    /// Ask for exactly one record per call.
    Single,
    /// Ask for everything still missing plus `slack` extra, to absorb
    /// duplicates and unusable items.
    Oversized { slack: usize },
}

impl Default for RequestStrategy {
    fn default() -> Self {
        RequestStrategy::Oversized {
            slack: DEFAULT_SLACK,
        }
    }
}

impl RequestStrategy {
    pub fn request_count(&self, missing: usize) -> usize {
        match self {
            RequestStrategy::Single => 1,
            RequestStrategy::Oversized { slack } => missing + slack,
        }
    }
}

/// Why a response could not be used. Consumes an attempt, never fatal.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("response was empty")]
    Empty,
    #[error("response is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("expected a JSON object or array, got {0}")]
    UnexpectedShape(&'static str),
    #[error("no item carried both `question` and `answer`")]
    MissingKeys,
}

/// Parse raw service output into candidates.
///
/// Accepts a single object or an array of objects, optionally wrapped in a
/// code fence. Array items without a non-empty `question` and `answer`
/// string are skipped.
pub fn parse_candidates(raw: &str) -> Result<Vec<QuestionCandidate>, ResponseError> {
    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(ResponseError::Empty);
    }

    match serde_json::from_str::<Value>(body)? {
        value @ Value::Object(_) => candidate_from(&value)
            .map(|c| vec![c])
            .ok_or(ResponseError::MissingKeys),
        Value::Array(items) => {
            let candidates: Vec<_> = items.iter().filter_map(candidate_from).collect();
            if candidates.is_empty() && !items.is_empty() {
                return Err(ResponseError::MissingKeys);
            }
            Ok(candidates)
        }
        Value::Null => Err(ResponseError::UnexpectedShape("null")),
        Value::Bool(_) => Err(ResponseError::UnexpectedShape("a boolean")),
        Value::Number(_) => Err(ResponseError::UnexpectedShape("a number")),
        Value::String(_) => Err(ResponseError::UnexpectedShape("a string")),
    }
}

fn candidate_from(value: &Value) -> Option<QuestionCandidate> {
    let question = value.get("question")?.as_str()?.trim();
    let answer = value.get("answer")?.as_str()?.trim();
    if question.is_empty() || answer.is_empty() {
        return None;
    }
    Some(QuestionCandidate {
        question: question.to_string(),
        answer: answer.to_string(),
    })
}

/// Rotates through a fixed topic list without replacement, reshuffling once
/// every topic has been used.
pub struct TopicRotation {
    topics: Vec<String>,
    remaining: Vec<String>,
    rng: StdRng,
}

impl TopicRotation {
    pub fn new(topics: Vec<String>) -> Self {
        Self::with_rng(topics, StdRng::from_os_rng())
    }

    pub fn seeded(topics: Vec<String>, seed: u64) -> Self {
        Self::with_rng(topics, StdRng::seed_from_u64(seed))
    }

    pub fn default_topics() -> Self {
        Self::new(DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect())
    }

    fn with_rng(topics: Vec<String>, rng: StdRng) -> Self {
        Self {
            topics,
            remaining: Vec::new(),
            rng,
        }
    }

    pub fn next_topic(&mut self) -> Option<String> {
        if self.topics.is_empty() {
            return None;
        }
        if self.remaining.is_empty() {
            self.remaining = self.topics.clone();
            self.remaining.shuffle(&mut self.rng);
        }
        self.remaining.pop()
    }
}

/// Result of one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub records: Vec<QuestionRecord>,
    pub attempts: u32,
    pub generated: usize,
    pub from_fallback: usize,
}

impl BatchOutcome {
    pub fn is_complete(&self, target: usize) -> bool {
        self.records.len() == target
    }
}

pub struct BatchGenerator<G> {
    generator: G,
    fallback: FallbackPool,
    role: String,
    strategy: RequestStrategy,
    topics: Option<TopicRotation>,
    target_size: usize,
    max_attempts: u32,
    request_template: GenerationRequest,
}

impl<G: TextGenerator> BatchGenerator<G> {
    pub fn new(generator: G, fallback: FallbackPool, role: impl Into<String>) -> Self {
        Self {
            generator,
            fallback,
            role: role.into(),
            strategy: RequestStrategy::default(),
            topics: None,
            target_size: TARGET_SIZE,
            max_attempts: MAX_ATTEMPTS,
            request_template: GenerationRequest::new(String::new()),
        }
    }

    pub fn from_config(generator: G, fallback: FallbackPool, config: &GenerationConfig) -> Self {
        Self::new(generator, fallback, config.role.clone()).with_sampling(config)
    }

    pub fn with_strategy(mut self, strategy: RequestStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_topics(mut self, topics: TopicRotation) -> Self {
        self.topics = Some(topics);
        self
    }

    pub fn with_sampling(mut self, config: &GenerationConfig) -> Self {
        self.request_template = self.request_template.with_sampling(config);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Produce up to `TARGET_SIZE` records whose signatures are distinct from
    /// each other and from `history`. Never fails: unusable responses burn
    /// an attempt, and a short batch is padded from the fallback pool.
    pub async fn generate(&mut self, history: &[QuestionRecord]) -> BatchOutcome {
        let mut dedup = Deduplicator::new(history);
        let mut unique: Vec<QuestionRecord> = Vec::with_capacity(self.target_size);
        let mut attempts = 0;

        while unique.len() < self.target_size && attempts < self.max_attempts {
            attempts += 1;

            let missing = self.target_size - unique.len();
            let count = self.strategy.request_count(missing);
            let topic = self.topics.as_mut().and_then(|t| t.next_topic());
            let request = GenerationRequest {
                prompt: build_prompt(&self.role, count, topic.as_deref(), history, &unique),
                ..self.request_template.clone()
            };

            debug!(attempt = attempts, count, topic = ?topic, "Requesting questions");

            let raw = match self.generator.generate(&request).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(attempt = attempts, "Generation request failed: {:#}", e);
                    continue;
                }
            };

            let candidates = match parse_candidates(&raw) {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(
                        attempt = attempts,
                        "Unusable generation response: {} (starts with {:?})",
                        e,
                        truncate_chars(raw.trim(), 80)
                    );
                    continue;
                }
            };

            let offered = candidates.len();
            let mut accepted = 0;
            for candidate in candidates {
                if unique.len() >= self.target_size {
                    break;
                }
                let record = QuestionRecord::from(candidate);
                if dedup.admit(&record) {
                    unique.push(record);
                    accepted += 1;
                } else {
                    debug!("Skipping duplicate question: {}", record.question);
                }
            }

            info!(
                attempt = attempts,
                offered,
                accepted,
                total = unique.len(),
                "Generation attempt finished"
            );
        }

        let generated = unique.len();
        let mut from_fallback = 0;

        if unique.len() < self.target_size {
            warn!(
                "Only {} of {} questions generated after {} attempt(s), using fallback pool v{}",
                generated, self.target_size, attempts, self.fallback.version
            );
            for candidate in &self.fallback.questions {
                if unique.len() >= self.target_size {
                    break;
                }
                let record = QuestionRecord::from(candidate.clone());
                if dedup.admit(&record) {
                    unique.push(record);
                    from_fallback += 1;
                }
            }
            if unique.len() < self.target_size {
                warn!(
                    "Fallback pool exhausted, sending {} question(s)",
                    unique.len()
                );
            }
        }

        unique.truncate(self.target_size);

        BatchOutcome {
            records: unique,
            attempts,
            generated,
            from_fallback,
        }
    }
}

fn build_prompt(
    role: &str,
    count: usize,
    topic: Option<&str>,
    history: &[QuestionRecord],
    batch_so_far: &[QuestionRecord],
) -> String {
    let mut prompt = if count == 1 {
        format!(
            "Generate one unique senior-level software testing interview question \
             with its answer for a {}.",
            role
        )
    } else {
        format!(
            "Generate {} unique senior-level software testing interview questions \
             with their answers for a {}.",
            count, role
        )
    };

    if let Some(topic) = topic {
        prompt.push_str(&format!(" Focus on {}.", topic));
    }

    if count == 1 {
        prompt.push_str(
            "\nReturn only JSON in this shape: {\"question\": \"...\", \"answer\": \"...\"}.",
        );
    } else {
        prompt.push_str(&format!(
            "\nReturn only a JSON array of {} objects, each shaped \
             {{\"question\": \"...\", \"answer\": \"...\"}}.",
            count
        ));
    }
    prompt.push_str(" No markdown, no commentary. Every question must be different.");

    let recent_start = history.len().saturating_sub(RECENT_QUESTIONS_IN_PROMPT);
    let avoid: Vec<&str> = history[recent_start..]
        .iter()
        .chain(batch_so_far)
        .map(|r| r.question.as_str())
        .collect();
    if !avoid.is_empty() {
        prompt.push_str("\nDo not repeat any of these questions:");
        for question in avoid {
            prompt.push_str("\n- ");
            prompt.push_str(question);
        }
    }

    prompt
}
