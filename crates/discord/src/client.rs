use std::{num::NonZeroU64, sync::Arc};

use {
    relaybot_channels::{
        ChannelHandle, ChatAuthor, ChatClient, ChatError, ChatMessage, SentMessage,
    },
    serenity::{
        async_trait,
        builder::CreateMessage,
        cache::Cache,
        http::Http,
        model::{
            channel::{Channel, Message},
            id::ChannelId,
        },
    },
    tracing::debug,
};

/// [`ChatClient`] over a serenity connection's REST client and cache.
pub struct SerenityChat {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl SerenityChat {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }
}

fn channel_id(raw: u64) -> Option<ChannelId> {
    NonZeroU64::new(raw).map(ChannelId::from)
}

/// HTTP status of a failed Discord request, if Discord answered at all.
fn http_status(err: &serenity::Error) -> Option<u16> {
    match err {
        serenity::Error::Http(http) => http.status_code().map(|s| s.as_u16()),
        _ => None,
    }
}

/// Errors without an HTTP status never got an answer from Discord.
fn chat_error(err: serenity::Error) -> ChatError {
    let transport = matches!(err, serenity::Error::Http(_)) && http_status(&err).is_none();
    if transport {
        ChatError::Transport(err.to_string())
    } else {
        ChatError::Api(err.to_string())
    }
}

/// Unknown channels and channels the bot cannot see both read as "absent".
fn is_absent_status(status: Option<u16>) -> bool {
    matches!(status, Some(403 | 404))
}

#[async_trait]
impl ChatClient for SerenityChat {
    async fn resolve_channel(&self, raw: u64) -> Result<Option<ChannelHandle>, ChatError> {
        let Some(id) = channel_id(raw) else {
            return Ok(None);
        };

        // Guild channels are in the cache once the guild has streamed in.
        let cached = self.cache.channel(id).map(|c| c.name.clone());
        if let Some(name) = cached {
            return Ok(Some(ChannelHandle::new(raw).with_name(name)));
        }

        match self.http.get_channel(id).await {
            Ok(Channel::Guild(channel)) => Ok(Some(ChannelHandle::new(raw).with_name(channel.name))),
            Ok(_) => Ok(Some(ChannelHandle::new(raw))),
            Err(e) if is_absent_status(http_status(&e)) => {
                debug!(channel = raw, error = %e, "channel lookup found nothing");
                Ok(None)
            },
            Err(e) => Err(chat_error(e)),
        }
    }

    async fn send_text(
        &self,
        channel: &ChannelHandle,
        text: &str,
    ) -> Result<SentMessage, ChatError> {
        let id = channel_id(channel.id)
            .ok_or_else(|| ChatError::Api(format!("invalid channel id {}", channel.id)))?;
        let sent = id
            .send_message(&self.http, CreateMessage::new().content(text))
            .await
            .map_err(chat_error)?;
        Ok(SentMessage {
            id: sent.id.get(),
            channel_id: sent.channel_id.get(),
        })
    }
}

/// Library-neutral view of a serenity message.
pub fn chat_message_from(msg: &Message) -> ChatMessage {
    ChatMessage {
        guild_id: msg.guild_id.map(|id| id.get()),
        channel_id: msg.channel_id.get(),
        author: ChatAuthor {
            id: msg.author.id.get(),
            display: msg.author.tag(),
            bot: msg.author.bot,
        },
        content: msg.content.clone(),
        attachments: msg.attachments.iter().map(|a| a.url.clone()).collect(),
        timestamp: msg.timestamp.to_string(),
    }
}
