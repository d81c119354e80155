use async_trait::async_trait;

use crate::message::{ChannelHandle, SentMessage};

/// Error returned by the chat network for a lookup or send.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChatError {
    /// The chat API answered with an error.
    #[error("{0}")]
    Api(String),
    /// The request never got an answer (connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),
}

/// The chat client capabilities the relay needs.
///
/// Implementations wrap a live gateway connection and are only ever called
/// from the gateway's own runtime; the HTTP side reaches them through the
/// dispatch bridge.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Look up a channel the bot can post to.
    ///
    /// Returns `Ok(None)` when the channel does not exist or the bot has no
    /// access to it.
    async fn resolve_channel(&self, channel_id: u64) -> Result<Option<ChannelHandle>, ChatError>;

    /// Post a text message to a resolved channel.
    async fn send_text(&self, channel: &ChannelHandle, text: &str)
    -> Result<SentMessage, ChatError>;
}
