// src/types/mod.rs
pub mod job;
pub mod question;

pub use job::{JobHit, JobListing, JobSearchResponse, ListingKind, SearchQuery};
pub use question::{QuestionCandidate, QuestionRecord, Signature};
