// src/core/mod.rs
//! Building blocks shared by the question and job pipelines

pub mod batch_generator;
pub mod dedup;
pub mod fallback;
pub mod fs_ops;
pub mod generation_client;
pub mod history_store;
pub mod job_search;
pub mod mailer;
pub mod notifier;
pub mod render;
pub mod search_client;

#[cfg(test)]
pub(crate) mod testing;

pub use batch_generator::{BatchGenerator, BatchOutcome, RequestStrategy, TopicRotation};
pub use dedup::Deduplicator;
pub use fallback::FallbackPool;
pub use fs_ops::FsOps;
pub use generation_client::{GeminiClient, GenerationRequest, TextGenerator};
pub use history_store::{HistoryCollection, HistoryStore};
pub use job_search::JobSearchRunner;
pub use mailer::{DryRunMailer, MailBody, MailMessage, Mailer, SmtpMailer};
pub use notifier::{Delivery, Notifier};
pub use search_client::{JSearchClient, SearchClient};
