//! Outgoing notices: review decisions and bug reports.

use std::time::Duration;

use async_trait::async_trait;
use perso_core::WebhookSettings;
use perso_store::DocumentKind;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook answered with status {0}")]
    Status(u16),

    #[error("no webhook configured for {0}")]
    NotConfigured(&'static str),
}

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Sink for notices.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post a free-text notice to the review log.
    async fn notify(&self, content: &str) -> NotifyResult<()>;

    /// Forward a bug report.
    async fn bug_report(&self, user: &str, message: &str) -> NotifyResult<()>;
}

/// Posts JSON to the configured webhook URLs.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    review_url: Option<String>,
    bug_report_url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(settings: &WebhookSettings) -> NotifyResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            review_url: settings.url.clone(),
            bug_report_url: settings.bug_report.clone(),
        })
    }

    async fn post(&self, url: &str, body: &serde_json::Value) -> NotifyResult<()> {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, content: &str) -> NotifyResult<()> {
        let url = self
            .review_url
            .as_deref()
            .ok_or(NotifyError::NotConfigured("review notices"))?;
        self.post(url, &json!({ "content": content })).await?;
        debug!("Review notice delivered");
        Ok(())
    }

    async fn bug_report(&self, user: &str, message: &str) -> NotifyResult<()> {
        let url = self
            .bug_report_url
            .as_deref()
            .ok_or(NotifyError::NotConfigured("bug reports"))?;
        self.post(url, &json!({ "value1": user, "value2": message }))
            .await?;
        info!(user, "Bug report delivered");
        Ok(())
    }
}

/// Used when no webhook is configured. Notices are dropped; bug reports
/// fail so the reporter knows nothing was sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, content: &str) -> NotifyResult<()> {
        debug!(content, "No webhook configured, notice dropped");
        Ok(())
    }

    async fn bug_report(&self, _user: &str, _message: &str) -> NotifyResult<()> {
        Err(NotifyError::NotConfigured("bug reports"))
    }
}

/// Outcome of a review, for notice wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    Submitted,
    Approved,
    Denied { reason: &'a str },
}

/// Review-log line for a decision on `uuid` owned by `owner_id`.
pub fn review_notice(
    decision: Decision<'_>,
    kind: DocumentKind,
    actor: Option<&str>,
    owner_id: &str,
    uuid: &str,
) -> String {
    let forged = if kind.is_forged() { "gefälschten " } else { "" };
    let actor = actor.map_or_else(|| "Ein Admin".to_string(), |id| format!("<@{}>", id));
    match decision {
        Decision::Submitted => {
            let emoji = if kind.is_forged() { "🚨" } else { "📄" };
            format!("{emoji} <@{owner_id}> hat einen {forged}Ausweis mit UUID `{uuid}` beantragt.")
        }
        Decision::Approved => {
            let emoji = if kind.is_forged() { "🚨" } else { "✅" };
            format!("{emoji} {actor} hat {forged}Ausweis von <@{owner_id}> mit UUID `{uuid}` **angenommen**.")
        }
        Decision::Denied { reason } => {
            format!("❌ {actor} hat {forged}Ausweis von <@{owner_id}> mit UUID `{uuid}` **abgelehnt**. Grund: {reason}")
        }
    }
}
