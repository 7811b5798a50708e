// src/core/testing.rs
//! Scripted stand-ins for the external services, used by unit tests

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::generation_client::{GenerationRequest, TextGenerator};
use super::mailer::{MailMessage, Mailer};
use super::search_client::SearchClient;
use crate::types::{JobHit, SearchQuery};

/// Replays canned responses in order; errors once the script runs out.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.prompt).collect()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("script exhausted")))
    }
}

/// Records delivered messages; the first `failures` sends fail.
pub struct RecordingMailer {
    failures: Mutex<usize>,
    attempts: Mutex<usize>,
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingMailer {
    pub fn succeeding() -> Self {
        Self::failing_first(0)
    }

    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures: Mutex::new(failures),
            attempts: Mutex::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        *self.attempts.lock().unwrap() += 1;
        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(anyhow!("smtp down"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Fixed hits or errors per (role, location); unscripted pairs return nothing.
#[derive(Default)]
pub struct ScriptedSearch {
    results: HashMap<(String, String), std::result::Result<Vec<JobHit>, String>>,
}

impl ScriptedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(mut self, role: &str, location: &str, hits: Vec<JobHit>) -> Self {
        self.results
            .insert((role.to_string(), location.to_string()), Ok(hits));
        self
    }

    pub fn with_error(mut self, role: &str, location: &str, error: &str) -> Self {
        self.results.insert(
            (role.to_string(), location.to_string()),
            Err(error.to_string()),
        );
        self
    }
}

#[async_trait]
impl SearchClient for ScriptedSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobHit>> {
        match self
            .results
            .get(&(query.role.clone(), query.location.clone()))
        {
            Some(Ok(hits)) => Ok(hits.clone()),
            Some(Err(e)) => Err(anyhow!("{}", e)),
            None => Ok(Vec::new()),
        }
    }
}
