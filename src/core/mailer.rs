// src/core/mailer.rs
//! Mail transport boundary: authenticated SMTP over TLS via lettre

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

use crate::config::MailConfig;
use crate::utils::truncate_chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailBody {
    Text(String),
    Html(String),
}

impl MailBody {
    pub fn content(&self) -> &str {
        match self {
            MailBody::Text(s) | MailBody::Html(s) => s,
        }
    }

    fn content_type(&self) -> ContentType {
        match self {
            MailBody::Text(_) => ContentType::TEXT_PLAIN,
            MailBody::Html(_) => ContentType::TEXT_HTML,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub subject: String,
    pub body: MailBody,
}

impl MailMessage {
    pub fn new(subject: impl Into<String>, body: MailBody) -> Self {
        Self {
            subject: subject.into(),
            body,
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<()>;
}

/// Sends to the single configured receiver through the configured relay.
/// Port 465 uses implicit TLS, any other port STARTTLS.
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn build_message(&self, message: &MailMessage) -> Result<Message> {
        let from: Mailbox = self
            .config
            .sender
            .parse()
            .with_context(|| format!("Invalid sender address: {}", self.config.sender))?;
        let to: Mailbox = self
            .config
            .receiver
            .parse()
            .with_context(|| format!("Invalid receiver address: {}", self.config.receiver))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .header(message.body.content_type())
            .body(message.body.content().to_string())
            .context("Failed to build email message")
    }

    fn transport(&self) -> Result<SmtpTransport> {
        let builder = if self.config.smtp_port == 465 {
            SmtpTransport::relay(&self.config.smtp_server)
        } else {
            SmtpTransport::starttls_relay(&self.config.smtp_server)
        }
        .with_context(|| format!("Invalid SMTP relay: {}", self.config.smtp_server))?;

        let credentials =
            Credentials::new(self.config.sender.clone(), self.config.password.clone());

        Ok(builder
            .port(self.config.smtp_port)
            .credentials(credentials)
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        let email = self.build_message(message)?;
        let transport = self.transport()?;

        debug!("Sending email to {}", self.config.receiver);

        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .context("Email task failed to execute")?
            .context("SMTP delivery failed")?;

        info!(
            "Email '{}' sent to {}",
            message.subject, self.config.receiver
        );
        Ok(())
    }
}

/// Logs the message instead of delivering it.
pub struct DryRunMailer;

#[async_trait]
impl Mailer for DryRunMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        info!(
            subject = %message.subject,
            "Dry run, email not sent:\n{}",
            truncate_chars(message.body.content(), 4000)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailConfig {
        MailConfig {
            sender: "sender@example.com".to_string(),
            password: "secret".to_string(),
            receiver: "receiver@example.com".to_string(),
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 465,
        }
    }

    #[test]
    fn test_build_html_message() {
        let mailer = SmtpMailer::new(&config());
        let message = MailMessage::new(
            "Daily Jobs",
            MailBody::Html("<html><body>hi</body></html>".to_string()),
        );

        let email = mailer.build_message(&message).unwrap();
        let formatted = String::from_utf8(email.formatted()).unwrap();

        assert!(formatted.contains("Subject: Daily Jobs"));
        assert!(formatted.contains("From: sender@example.com"));
        assert!(formatted.contains("To: receiver@example.com"));
        assert!(formatted.contains("Content-Type: text/html"));
    }

    #[test]
    fn test_build_text_message() {
        let mailer = SmtpMailer::new(&config());
        let message = MailMessage::new("Questions", MailBody::Text("Q: a\nA: b".to_string()));

        let email = mailer.build_message(&message).unwrap();
        let formatted = String::from_utf8(email.formatted()).unwrap();

        assert!(formatted.contains("Content-Type: text/plain"));
    }

    #[test]
    fn test_invalid_sender_is_rejected() {
        let mut cfg = config();
        cfg.sender = "not an address".to_string();
        let mailer = SmtpMailer::new(&cfg);

        let message = MailMessage::new("s", MailBody::Text("b".to_string()));
        assert!(mailer.build_message(&message).is_err());
    }

    #[tokio::test]
    async fn test_dry_run_always_succeeds() {
        let message = MailMessage::new("s", MailBody::Text("b".to_string()));
        assert!(DryRunMailer.send(&message).await.is_ok());
    }
}
