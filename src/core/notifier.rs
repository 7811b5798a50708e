// src/core/notifier.rs
use tracing::{error, info, warn};

use super::mailer::{MailBody, MailMessage, Mailer};

/// What happened to a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed {
        error: String,
        /// Whether the follow-up error notification went out.
        alert_sent: bool,
    },
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

/// Delivers run results, falling back to a best-effort error notification
/// when the primary send fails. Never returns an error.
pub struct Notifier<M> {
    mailer: M,
}

impl<M: Mailer> Notifier<M> {
    pub fn new(mailer: M) -> Self {
        Self { mailer }
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    pub async fn send(&self, subject: &str, body: MailBody) -> Delivery {
        let message = MailMessage::new(subject, body);
        match self.mailer.send(&message).await {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                let error = format!("{:#}", e);
                error!("Failed to send email '{}': {}", subject, error);
                let alert_sent = self
                    .alert(&format!("Failed to send \"{}\"", subject), &error)
                    .await;
                Delivery::Failed { error, alert_sent }
            }
        }
    }

    /// Best-effort plain-text error notification. Failure is only logged.
    pub async fn alert(&self, what: &str, error: &str) -> bool {
        let body = format!(
            "{}\n\nError: {}\n\nTime: {}\n",
            what,
            error,
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        let message = MailMessage::new(format!("[daily-prep] {}", what), MailBody::Text(body));

        match self.mailer.send(&message).await {
            Ok(()) => {
                info!("Error notification sent");
                true
            }
            Err(e) => {
                warn!("Error notification also failed: {:#}", e);
                false
            }
        }
    }
}
