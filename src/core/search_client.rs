// src/core/search_client.rs
//! Job-search service boundary (JSearch on RapidAPI)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use crate::config::SearchConfig;
use crate::types::{JobHit, JobSearchResponse, SearchQuery};

#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobHit>>;
}

pub struct JSearchClient {
    client: Client,
    api_key: String,
    api_host: String,
    api_url: String,
}

impl JSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_host: config.api_host.clone(),
            api_url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl SearchClient for JSearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobHit>> {
        let query_text = query.query_text();
        debug!("Querying job search: {}", query_text);

        let response = self
            .client
            .get(&self.api_url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .query(&[
                ("query", query_text.as_str()),
                ("page", "1"),
                ("num_pages", "1"),
            ])
            .send()
            .await
            .context("Job search request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Job search error {}: {}", status, error_text);
            anyhow::bail!("Job search returned error {}", status);
        }

        let parsed: JobSearchResponse = response
            .json()
            .await
            .context("Failed to parse job search response")?;

        Ok(parsed.data)
    }
}
