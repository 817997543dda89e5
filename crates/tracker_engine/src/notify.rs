use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use tracker_core::{Notification, NotificationKind};
use tracker_logging::{tracker_info, tracker_warn};

const TRUNCATED_MARKER: &str = "\n[truncated]";
/// Discord rejects embed descriptions longer than this.
pub const MAX_EMBED_DESCRIPTION: usize = 4096;

const COLOR_ALERT: u32 = 0x00ff00;
const COLOR_HEARTBEAT: u32 = 0x0099ff;
const COLOR_HEARTBEAT_ERRORS: u32 = 0xff9900;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid webhook url: {0}")]
    InvalidUrl(String),
    #[error("webhook request failed: {0}")]
    Request(String),
    #[error("webhook rejected payload with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers a notification over some transport.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of sending them anywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracker_info!("Notification: {}", notification.title);
        if !notification.mentions.is_empty() {
            tracker_info!("Mentions: {}", notification.mentions.join(", "));
        }
        for line in notification.body.lines() {
            tracker_info!("  {}", line);
        }
        Ok(())
    }
}

/// Posts notifications to a Discord webhook.
#[derive(Debug, Clone)]
pub struct DiscordWebhookNotifier {
    webhook_url: reqwest::Url,
    client: reqwest::Client,
}

impl DiscordWebhookNotifier {
    pub fn new(webhook_url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let webhook_url = reqwest::Url::parse(webhook_url)
            .map_err(|err| NotifyError::InvalidUrl(format!("{webhook_url:?}: {err}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| NotifyError::Request(err.to_string()))?;
        Ok(Self {
            webhook_url,
            client,
        })
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordWebhookNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = discord_payload(notification);
        let response = self
            .client
            .post(self.webhook_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .await
            .map_err(|err| NotifyError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        tracker_info!("Discord notification delivered ({})", status.as_u16());
        Ok(())
    }
}

/// Discord webhook body. Only numeric ids can be mentioned; others are dropped.
pub fn discord_payload(notification: &Notification) -> Value {
    let user_ids: Vec<&str> = notification
        .mentions
        .iter()
        .map(String::as_str)
        .filter(|id| {
            let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_digit());
            if !valid {
                tracker_warn!("Skipping non-numeric Discord mention {:?}", id);
            }
            valid
        })
        .collect();

    let mut content = format!("**{}**", notification.title);
    for id in &user_ids {
        content.push_str(&format!(" <@{id}>"));
    }

    let color = match notification.kind {
        NotificationKind::Alert => COLOR_ALERT,
        NotificationKind::Heartbeat => COLOR_HEARTBEAT,
        NotificationKind::HeartbeatWithErrors => COLOR_HEARTBEAT_ERRORS,
    };

    json!({
        "content": content,
        "allowed_mentions": { "parse": [], "users": user_ids },
        "embeds": [{
            "title": notification.title,
            "description": truncate_description(&notification.body),
            "color": color,
            "footer": { "text": "Site Tracker" },
        }],
    })
}

fn truncate_description(text: &str) -> String {
    if text.chars().count() <= MAX_EMBED_DESCRIPTION {
        return text.to_string();
    }
    let keep = MAX_EMBED_DESCRIPTION - TRUNCATED_MARKER.chars().count();
    let truncated: String = text.chars().take(keep).collect();
    format!("{truncated}{TRUNCATED_MARKER}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(kind: NotificationKind, mentions: &[&str]) -> Notification {
        Notification {
            kind,
            title: "2 website(s) changed".to_string(),
            body: "https://a.example (content)".to_string(),
            mentions: mentions.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn numeric_mentions_become_user_pings() {
        let payload = discord_payload(&notification(
            NotificationKind::Alert,
            &["123", "not-an-id", "456"],
        ));
        assert_eq!(payload["content"], "**2 website(s) changed** <@123> <@456>");
        assert_eq!(payload["allowed_mentions"]["users"], json!(["123", "456"]));
        assert_eq!(payload["embeds"][0]["color"], COLOR_ALERT);
    }

    #[test]
    fn heartbeat_payload_pings_nobody() {
        let payload = discord_payload(&notification(NotificationKind::Heartbeat, &[]));
        assert_eq!(payload["allowed_mentions"]["users"], json!([]));
        assert!(!payload["content"].as_str().unwrap().contains("<@"));
        assert_eq!(payload["embeds"][0]["color"], COLOR_HEARTBEAT);
    }

    #[test]
    fn long_bodies_are_truncated_to_embed_limit() {
        let long = "é".repeat(MAX_EMBED_DESCRIPTION + 10);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), MAX_EMBED_DESCRIPTION);
        assert!(truncated.ends_with(TRUNCATED_MARKER));
    }

    #[test]
    fn placeholder_webhook_is_rejected() {
        let err = DiscordWebhookNotifier::new("YOUR_DISCORD_WEBHOOK_URL_HERE", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, NotifyError::InvalidUrl(_)));
    }
}
