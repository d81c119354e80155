use std::sync::Arc;

use {
    relaybot_channels::{ChatClient, ChatMessage},
    relaybot_gateway::{ChatBridge, InboundRelay, RelayOutcome},
    serenity::{
        async_trait,
        client::{Context, EventHandler},
        model::{channel::Message, gateway::Ready},
    },
    tokio::task::JoinHandle,
    tracing::info,
};

use crate::client::{SerenityChat, chat_message_from};

/// Serenity event handler wiring the gateway connection to the relay.
pub struct RelayHandler {
    relay: Arc<InboundRelay>,
    bridge: ChatBridge,
}

impl RelayHandler {
    pub fn new(relay: Arc<InboundRelay>, bridge: ChatBridge) -> Self {
        Self { relay, bridge }
    }
}

#[async_trait]
impl EventHandler for RelayHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.tag(), id = %ready.user.id, "discord gateway ready");
        // Runs on the gateway runtime, so the bridge pump lands there too.
        let chat: Arc<dyn ChatClient> = Arc::new(SerenityChat::new(
            Arc::clone(&ctx.http),
            Arc::clone(&ctx.cache),
        ));
        self.bridge.attach(chat).await;
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        spawn_forward(Arc::clone(&self.relay), chat_message_from(&msg));
    }
}

/// Forwarding runs detached so a slow webhook never holds up events. The
/// relay itself drops bot-authored messages.
fn spawn_forward(relay: Arc<InboundRelay>, message: ChatMessage) -> JoinHandle<RelayOutcome> {
    tokio::spawn(async move { relay.handle(&message).await })
}
