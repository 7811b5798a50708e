// src/lib.rs
//! Two scheduled email digests: deduplicated interview questions from a
//! text-generation service, and a table of job-search results.

pub mod cli;
pub mod config;
pub mod core;
pub mod pipeline;
pub mod types;
pub mod utils;

pub use crate::core::batch_generator::{MAX_ATTEMPTS, TARGET_SIZE};
pub use crate::pipeline::{run_jobs, run_questions, JobsReport, QuestionsReport};
