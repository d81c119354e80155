//! Chat network abstraction.
//!
//! The relay core talks to the chat side only through the [`ChatClient`]
//! trait and the library-neutral message types here; the Discord adapter
//! lives in `relaybot-discord`.

pub mod client;
pub mod message;

pub use {
    client::{ChatClient, ChatError},
    message::{ChannelHandle, ChatAuthor, ChatMessage, SentMessage},
};
