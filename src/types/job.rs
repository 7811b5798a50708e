// src/types/job.rs
use serde::Deserialize;

/// One (role, location) pair of the search cross-product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub role: String,
    pub location: String,
}

impl SearchQuery {
    pub fn new(role: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            location: location.into(),
        }
    }

    /// Free-text query sent to the search service
    pub fn query_text(&self) -> String {
        format!("{} in {}, India", self.role, self.location)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Found,
    NoResults,
    Error,
}

/// A row of the job email. Sentinel rows keep one row per query pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub apply_link: String,
    pub kind: ListingKind,
}

pub const DEFAULT_TITLE: &str = "No Title";
pub const DEFAULT_COMPANY: &str = "Unknown Company";
pub const DEFAULT_LINK: &str = "#";

impl JobListing {
    pub fn from_hit(hit: JobHit, location: &str) -> Self {
        Self {
            title: hit.job_title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            company: hit
                .employer_name
                .unwrap_or_else(|| DEFAULT_COMPANY.to_string()),
            location: location.to_string(),
            apply_link: hit
                .job_apply_link
                .unwrap_or_else(|| DEFAULT_LINK.to_string()),
            kind: ListingKind::Found,
        }
    }

    pub fn no_results(query: &SearchQuery) -> Self {
        Self {
            title: format!("No jobs found for {} in {}", query.role, query.location),
            company: "-".to_string(),
            location: query.location.clone(),
            apply_link: DEFAULT_LINK.to_string(),
            kind: ListingKind::NoResults,
        }
    }

    pub fn error(query: &SearchQuery, error: &str) -> Self {
        Self {
            title: format!("Error searching {} in {}", query.role, query.location),
            company: error.to_string(),
            location: query.location.clone(),
            apply_link: DEFAULT_LINK.to_string(),
            kind: ListingKind::Error,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.kind != ListingKind::Found
    }
}

// ===== Search service wire types =====

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSearchResponse {
    #[serde(default)]
    pub data: Vec<JobHit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobHit {
    pub job_title: Option<String>,
    pub employer_name: Option<String>,
    pub job_apply_link: Option<String>,
}
