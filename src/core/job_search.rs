// src/core/job_search.rs
use tracing::{info, warn};

use super::search_client::SearchClient;
use crate::config::SearchConfig;
use crate::types::{JobListing, SearchQuery};

/// Queries every (role, location) pair in turn. Each pair contributes at
/// least one row: its hits, a "no jobs found" sentinel, or an error sentinel.
pub struct JobSearchRunner<S> {
    client: S,
    queries: Vec<SearchQuery>,
}

impl<S: SearchClient> JobSearchRunner<S> {
    pub fn new(client: S, queries: Vec<SearchQuery>) -> Self {
        Self { client, queries }
    }

    pub fn from_config(client: S, config: &SearchConfig) -> Self {
        Self::new(client, cross_product(&config.roles, &config.locations))
    }

    pub fn queries(&self) -> &[SearchQuery] {
        &self.queries
    }

    pub async fn run(&self) -> Vec<JobListing> {
        let mut listings = Vec::new();

        for query in &self.queries {
            info!("Searching: {} in {}...", query.role, query.location);

            match self.client.search(query).await {
                Ok(hits) if hits.is_empty() => {
                    info!("No jobs found for {} in {}", query.role, query.location);
                    listings.push(JobListing::no_results(query));
                }
                Ok(hits) => {
                    info!(
                        "Found {} job(s) for {} in {}",
                        hits.len(),
                        query.role,
                        query.location
                    );
                    listings.extend(
                        hits.into_iter()
                            .map(|hit| JobListing::from_hit(hit, &query.location)),
                    );
                }
                Err(e) => {
                    warn!(
                        "Search failed for {} in {}: {:#}",
                        query.role, query.location, e
                    );
                    listings.push(JobListing::error(query, &format!("{:#}", e)));
                }
            }
        }

        listings
    }
}

pub fn cross_product(roles: &[String], locations: &[String]) -> Vec<SearchQuery> {
    roles
        .iter()
        .flat_map(|role| {
            locations
                .iter()
                .map(move |location| SearchQuery::new(role.clone(), location.clone()))
        })
        .collect()
}
