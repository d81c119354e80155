/// Author of an observed chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatAuthor {
    pub id: u64,
    /// Display form of the author, e.g. `name` or `name#1234`.
    pub display: String,
    /// Set for bots and other automated participants, including the relay
    /// itself.
    pub bot: bool,
}

/// A chat message as seen by the relay, independent of the client library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// `None` for direct messages.
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub author: ChatAuthor,
    pub content: String,
    pub attachments: Vec<String>,
    /// Creation time as RFC 3339.
    pub timestamp: String,
}

/// A channel that resolved and is accessible to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    pub id: u64,
    pub name: Option<String>,
}

impl ChannelHandle {
    pub fn new(id: u64) -> Self {
        Self { id, name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Receipt for a message the chat network accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub id: u64,
    pub channel_id: u64,
}
