//! Delivery of run summaries.

use async_trait::async_trait;
use tracing::{error, info};

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message. Failures are logged by the implementation and
    /// reported as `false`, never raised.
    async fn notify(&self, title: &str, body: &str) -> bool;
}

/// Posts to a Discord-style webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    hook_url: String,
}

impl WebhookNotifier {
    pub fn new(hook_url: impl Into<String>) -> Self {
        WebhookNotifier {
            client: reqwest::Client::new(),
            hook_url: hook_url.into(),
        }
    }
}

pub fn webhook_content(title: &str, body: &str) -> String {
    format!("**{title}**\n{body}")
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, title: &str, body: &str) -> bool {
        let payload = serde_json::json!({ "content": webhook_content(title, body) });

        match self.client.post(&self.hook_url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!(status = resp.status().as_u16(), "Posted run summary to webhook");
                true
            }
            Ok(resp) => {
                error!(status = resp.status().as_u16(), "Webhook rejected run summary");
                false
            }
            Err(e) => {
                error!(error = %e, "Failed to post to webhook");
                false
            }
        }
    }
}

/// Writes the message to the log. Used when no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, title: &str, body: &str) -> bool {
        info!(title, "{body}");
        true
    }
}

/// Webhook when a URL is configured, log otherwise.
pub fn notifier_for(url: Option<&str>) -> Box<dyn Notifier> {
    match url {
        Some(url) if !url.trim().is_empty() => Box::new(WebhookNotifier::new(url)),
        _ => Box::new(LogNotifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_content_bolds_title() {
        assert_eq!(webhook_content("Run", "3 created"), "**Run**\n3 created");
    }

    #[tokio::test]
    async fn test_log_notifier_always_delivers() {
        assert!(LogNotifier.notify("Run", "body").await);
    }

    #[tokio::test]
    async fn test_unreachable_webhook_reports_false() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hook");
        assert!(!notifier.notify("Run", "body").await);
    }
}
