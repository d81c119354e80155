//! Chat → platform forwarding.
//!
//! Each observed message is filtered, turned into an
//! [`OutboundEventPayload`] and POSTed once to the platform webhook. Failures
//! are logged and dropped: no retry, no queue, nothing reported back to chat.

use std::time::Duration;

use {
    relaybot_channels::ChatMessage,
    serde::Serialize,
    tracing::{debug, warn},
};

/// Body of the webhook POST. Ids are decimal strings so large snowflakes
/// survive JSON consumers that parse numbers as doubles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEventPayload {
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub author: PayloadAuthor,
    pub content: String,
    pub attachments: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadAuthor {
    pub id: String,
    pub display: String,
}

impl From<&ChatMessage> for OutboundEventPayload {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            guild_id: msg.guild_id.map(|id| id.to_string()),
            channel_id: msg.channel_id.to_string(),
            author: PayloadAuthor {
                id: msg.author.id.to_string(),
                display: msg.author.display.clone(),
            },
            content: msg.content.clone(),
            attachments: msg.attachments.clone(),
            timestamp: msg.timestamp.clone(),
        }
    }
}

/// What happened to one observed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Authored by a bot; not forwarded.
    Skipped,
    Forwarded,
    /// The webhook was unreachable or answered with an error status.
    Failed,
}

#[derive(Debug, thiserror::Error)]
enum ForwardError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook responded {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Forwards chat messages to the platform webhook.
pub struct InboundRelay {
    client: reqwest::Client,
    webhook_url: String,
}

impl InboundRelay {
    /// Build the relay and its HTTP client.
    ///
    /// Construct this from inside the gateway runtime's startup path so the
    /// client's connection pool is created on the runtime that uses it.
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }

    /// Bot-authored messages are never forwarded; this also keeps the relay
    /// from echoing its own `/send` output back to the platform.
    pub fn should_forward(msg: &ChatMessage) -> bool {
        !msg.author.bot
    }

    /// Filter, transform and forward one message. Never fails.
    pub async fn handle(&self, msg: &ChatMessage) -> RelayOutcome {
        if !Self::should_forward(msg) {
            debug!(author = msg.author.id, "skipping bot-authored message");
            return RelayOutcome::Skipped;
        }

        let payload = OutboundEventPayload::from(msg);
        match self.forward(&payload).await {
            Ok(()) => {
                debug!(channel = %payload.channel_id, "forwarded message");
                RelayOutcome::Forwarded
            },
            Err(e) => {
                warn!(channel = %payload.channel_id, error = %e, "error forwarding message");
                RelayOutcome::Failed
            },
        }
    }

    async fn forward(&self, payload: &OutboundEventPayload) -> Result<(), ForwardError> {
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ForwardError::Rejected { status, body });
        }
        Ok(())
    }
}
