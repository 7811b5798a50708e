// src/pipeline.rs
//! The two scheduled runs: daily interview questions and daily job listings

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{error, info};

use crate::core::render::{jobs_subject, render_job_table, render_questions, QUESTIONS_SUBJECT};
use crate::core::{
    BatchGenerator, Delivery, HistoryStore, JobSearchRunner, MailBody, Mailer, Notifier,
    SearchClient, TextGenerator,
};

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionsReport {
    pub sent_questions: usize,
    pub attempts: u32,
    pub from_fallback: usize,
    pub history_len: usize,
    pub delivery: Delivery,
}

impl QuestionsReport {
    pub fn succeeded(&self) -> bool {
        self.delivery.is_sent()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobsReport {
    pub queries: usize,
    pub listings: usize,
    pub sentinels: usize,
    pub delivery: Delivery,
}

impl JobsReport {
    pub fn succeeded(&self) -> bool {
        self.delivery.is_sent()
    }
}

/// Load history, generate a batch, persist the merged history, then email
/// the batch. Errors only when the run cannot produce anything to send; an
/// error notification is attempted first.
pub async fn run_questions<G, M>(
    store: &HistoryStore,
    generator: &mut BatchGenerator<G>,
    notifier: &Notifier<M>,
    persist: bool,
) -> Result<QuestionsReport>
where
    G: TextGenerator,
    M: Mailer,
{
    let loaded = if persist {
        store.load().await
    } else {
        store.load_read_only().await
    };
    let history = match loaded {
        Ok(history) => history,
        Err(e) => return abort(notifier, "Interview question run aborted", e).await,
    };

    let outcome = generator.generate(&history).await;
    if outcome.records.is_empty() {
        let e = anyhow::anyhow!(
            "no questions generated after {} attempt(s) and fallback pool exhausted",
            outcome.attempts
        );
        return abort(notifier, "Interview question run produced nothing", e).await;
    }

    let mut merged = history;
    merged.extend(outcome.records.iter().cloned());
    if persist {
        if let Err(e) = store.save(&merged).await {
            return abort(notifier, "Interview question history could not be saved", e).await;
        }
    } else {
        info!("History not persisted (dry run)");
    }

    let body = render_questions(&outcome.records);
    let delivery = notifier.send(QUESTIONS_SUBJECT, MailBody::Text(body)).await;
    if delivery.is_sent() {
        info!(
            "Email sent with {} interview question(s)",
            outcome.records.len()
        );
    }

    Ok(QuestionsReport {
        sent_questions: outcome.records.len(),
        attempts: outcome.attempts,
        from_fallback: outcome.from_fallback,
        history_len: merged.len().min(store.max_history()),
        delivery,
    })
}

/// Search every role/location pair and email the listings as one HTML table.
pub async fn run_jobs<S, M>(
    runner: &JobSearchRunner<S>,
    notifier: &Notifier<M>,
    today: NaiveDate,
) -> JobsReport
where
    S: SearchClient,
    M: Mailer,
{
    let listings = runner.run().await;
    let sentinels = listings.iter().filter(|l| l.is_sentinel()).count();
    info!(
        "Collected {} listing row(s) for {} quer(ies), {} placeholder(s)",
        listings.len(),
        runner.queries().len(),
        sentinels
    );

    let html = render_job_table(&listings, today);
    let delivery = notifier.send(&jobs_subject(today), MailBody::Html(html)).await;

    JobsReport {
        queries: runner.queries().len(),
        listings: listings.len(),
        sentinels,
        delivery,
    }
}

async fn abort<T, M: Mailer>(
    notifier: &Notifier<M>,
    what: &str,
    e: anyhow::Error,
) -> Result<T> {
    error!("{}: {:#}", what, e);
    notifier.alert(what, &format!("{:#}", e)).await;
    Err(e)
}
