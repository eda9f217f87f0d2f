pub mod email;

use crate::domain::analysis::AnalysisRecord;

pub use email::{EmailNotifier, MailSettings, SmtpMailTransport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    Skipped { reason: String },
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Sends one summary covering every record. Transport failures are returned as
    /// errors; a deliberately skipped send is `Ok(NotifyOutcome::Skipped)`.
    async fn notify(&self, results: &[AnalysisRecord]) -> anyhow::Result<NotifyOutcome>;
}

/// Writes the summary to the log instead of sending it. Used by worker dry runs.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, results: &[AnalysisRecord]) -> anyhow::Result<NotifyOutcome> {
        let now = chrono::Utc::now();
        tracing::info!(
            subject = %email::subject(now),
            body = %email::format_body(results, now),
            "dry run: summary not sent"
        );
        Ok(NotifyOutcome::Skipped {
            reason: "dry run".to_string(),
        })
    }
}
