// src/cli.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::config::{EnvSource, GenerationConfig, HistoryConfig, MailConfig, SearchConfig};
use crate::core::{
    BatchGenerator, DryRunMailer, FallbackPool, GeminiClient, HistoryStore, JSearchClient,
    JobSearchRunner, Mailer, Notifier, SmtpMailer, TopicRotation,
};
use crate::pipeline::{run_jobs, run_questions};

#[derive(Parser)]
#[command(name = "daily-prep")]
#[command(about = "Daily interview questions and job listings by email")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate 10 new interview questions and email them
    Questions {
        /// Override HISTORY_FILE
        #[arg(long)]
        history_file: Option<PathBuf>,
        /// Log the email instead of sending it; history is not updated
        #[arg(long)]
        dry_run: bool,
    },
    /// Search the configured roles and locations and email the results
    Jobs {
        /// Log the email instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
}

/// Run the selected pipeline. `Ok(true)` means the email went out.
pub async fn handle_command(cli: Cli, env: &dyn EnvSource) -> Result<bool> {
    match cli.command {
        Some(Command::Questions {
            history_file,
            dry_run,
        }) => {
            let mut history_config = HistoryConfig::from_env(env)?;
            if let Some(path) = history_file {
                history_config = history_config.with_path(path);
            }
            let generation_config = GenerationConfig::from_env(env)?;

            let store = HistoryStore::new(&history_config);
            let mut generator = BatchGenerator::from_config(
                GeminiClient::new(&generation_config)?,
                FallbackPool::embedded()?,
                &generation_config,
            )
            .with_topics(TopicRotation::default_topics());

            if dry_run {
                let notifier = Notifier::new(DryRunMailer);
                let report = run_questions(&store, &mut generator, &notifier, false).await?;
                return Ok(report.succeeded());
            }

            let notifier = Notifier::new(SmtpMailer::new(&MailConfig::from_env(env)?));
            let report = run_questions(&store, &mut generator, &notifier, true).await?;
            info!(
                "Questions run: {} sent ({} from fallback) in {} attempt(s), history {}",
                report.sent_questions, report.from_fallback, report.attempts, report.history_len
            );
            Ok(report.succeeded())
        }

        Some(Command::Jobs { dry_run }) => {
            let search_config = SearchConfig::from_env(env)?;
            let runner =
                JobSearchRunner::from_config(JSearchClient::new(&search_config)?, &search_config);

            if dry_run {
                return jobs_with(&runner, Notifier::new(DryRunMailer)).await;
            }
            let mailer = SmtpMailer::new(&MailConfig::from_env(env)?);
            jobs_with(&runner, Notifier::new(mailer)).await
        }

        None => {
            error!("no subcommand passed");
            Ok(false)
        }
    }
}

async fn jobs_with<M: Mailer>(
    runner: &JobSearchRunner<JSearchClient>,
    notifier: Notifier<M>,
) -> Result<bool> {
    let today = chrono::Local::now().date_naive();
    let report = run_jobs(runner, &notifier, today).await;
    if report.sentinels == report.queries && report.queries > 0 {
        warn!("Every job query came back empty or failed");
    }
    info!(
        "Jobs run: {} row(s) for {} quer(ies)",
        report.listings, report.queries
    );
    Ok(report.succeeded())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_questions_flags() {
        let cli = Cli::try_parse_from([
            "daily-prep",
            "questions",
            "--history-file",
            "/tmp/h.json",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Questions {
                history_file,
                dry_run,
            }) => {
                assert_eq!(history_file, Some(PathBuf::from("/tmp/h.json")));
                assert!(dry_run);
            }
            _ => panic!("expected questions"),
        }
    }

    #[test]
    fn test_parse_jobs() {
        let cli = Cli::try_parse_from(["daily-prep", "jobs"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Jobs { dry_run: false })));
    }

    #[tokio::test]
    async fn test_missing_subcommand_reports_failure() {
        let cli = Cli::try_parse_from(["daily-prep"]).unwrap();
        let env: HashMap<String, String> = HashMap::new();
        assert!(!handle_command(cli, &env).await.unwrap());
    }

    #[tokio::test]
    async fn test_jobs_without_api_key_is_a_config_error() {
        let cli = Cli::try_parse_from(["daily-prep", "jobs"]).unwrap();
        let env: HashMap<String, String> = HashMap::new();
        let err = handle_command(cli, &env).await.unwrap_err();
        assert!(err.to_string().contains("RAPIDAPI_KEY"));
    }
}
