//! Discord side of the relay, built on serenity.

pub mod client;
pub mod handler;

use serenity::{Client, prelude::GatewayIntents};

pub use {
    client::{SerenityChat, chat_message_from},
    handler::RelayHandler,
};

/// Guild and DM messages, with message content.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Build (but do not start) a serenity client driving `handler`.
pub async fn build_client(token: &str, handler: RelayHandler) -> serenity::Result<Client> {
    Client::builder(token, intents())
        .event_handler(handler)
        .await
}
