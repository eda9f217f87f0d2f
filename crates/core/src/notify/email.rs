use super::{Notifier, NotifyOutcome};
use crate::config::Settings;
use crate::domain::analysis::{self, AnalysisRecord};
use anyhow::Context;
use chrono::{DateTime, Utc};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;

const PLACEHOLDER: &str = "N/A";

const LABELS: [(&str, &str); 8] = [
    ("Entry Price", analysis::ENTRY_PRICE),
    ("Target Price", analysis::TARGET_PRICE),
    ("Stop Loss", analysis::STOP_LOSS),
    ("Time Horizon", analysis::TIME_HORIZON),
    ("Confidence", analysis::CONFIDENCE_LEVEL),
    ("Setup Type", analysis::SETUP_TYPE),
    ("Reasoning", analysis::REASONING),
    ("Latest News", analysis::LATEST_NEWS),
];

#[derive(Debug, Clone, Default)]
pub struct MailSettings {
    pub username: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
}

impl MailSettings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            username: settings.email_user.clone(),
            password: settings.email_pass.clone(),
            recipient: settings.email_recipient.clone(),
        }
    }

    /// `(username, password, recipient)`, or the name of whatever is missing.
    fn complete(&self) -> Result<(&str, &str, &str), &'static str> {
        let username = self.username.as_deref().ok_or("EMAIL_USER")?;
        let password = self.password.as_deref().ok_or("EMAIL_PASS")?;
        let recipient = self.recipient.as_deref().ok_or("EMAIL_RECIPIENT")?;
        Ok((username, password, recipient))
    }
}

#[async_trait::async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, credentials: Credentials, message: Message) -> anyhow::Result<()>;
}

/// Implicit-TLS SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpMailTransport {
    host: String,
    port: u16,
}

impl SmtpMailTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

#[async_trait::async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, credentials: Credentials, message: Message) -> anyhow::Result<()> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .with_context(|| format!("SMTP transport error for host {}", self.host))?
            .port(self.port)
            .credentials(credentials)
            .build();

        transport
            .send(message)
            .await
            .context("failed to send email")?;
        Ok(())
    }
}

pub struct EmailNotifier {
    mail: MailSettings,
    transport: Arc<dyn MailTransport>,
}

impl EmailNotifier {
    pub fn new(mail: MailSettings, transport: Arc<dyn MailTransport>) -> Self {
        Self { mail, transport }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            MailSettings::from_settings(settings),
            Arc::new(SmtpMailTransport::new(
                settings.smtp_host.clone(),
                settings.smtp_port,
            )),
        )
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn notify(&self, results: &[AnalysisRecord]) -> anyhow::Result<NotifyOutcome> {
        let (username, password, recipient) = match self.mail.complete() {
            Ok(parts) => parts,
            Err(missing) => {
                tracing::warn!(missing, "mail credentials not configured; skipping email");
                return Ok(NotifyOutcome::Skipped {
                    reason: format!("{missing} is not set"),
                });
            }
        };

        let from: Mailbox = username
            .parse()
            .with_context(|| format!("invalid sender address: {username}"))?;
        let to: Mailbox = recipient
            .parse()
            .with_context(|| format!("invalid recipient address: {recipient}"))?;

        let now = Utc::now();
        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject(now))
            .header(ContentType::TEXT_PLAIN)
            .body(format_body(results, now))
            .context("failed to build email")?;

        self.transport
            .send(
                Credentials::new(username.to_string(), password.to_string()),
                message,
            )
            .await?;

        tracing::info!(records = results.len(), "analysis email sent");
        Ok(NotifyOutcome::Sent)
    }
}

pub fn subject(now: DateTime<Utc>) -> String {
    format!("Swing Trade Analysis - {}", now.format("%Y-%m-%d"))
}

pub fn format_body(results: &[AnalysisRecord], now: DateTime<Utc>) -> String {
    let mut out = format!(
        "Swing Trade Analysis Report\nGenerated: {}\n",
        now.format("%Y-%m-%d %H:%M UTC")
    );

    if results.is_empty() {
        out.push_str("\nNo stocks were analyzed.\n");
        return out;
    }

    for (idx, record) in results.iter().enumerate() {
        let name = record
            .field(analysis::STOCK_NAME)
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        out.push_str(&format!("\n{}. {}\n", idx + 1, name));
        for (label, key) in LABELS {
            let value = record
                .field(key)
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            out.push_str(&format!("   {label}: {value}\n"));
        }
    }

    out
}
