use std::sync::Arc;

use relaybot_channels::ChatClient;

use crate::{auth::SignatureCodec, bridge::DispatchBridge};

/// Bridge whose actions receive the live chat client.
pub type ChatBridge = DispatchBridge<Arc<dyn ChatClient>>;

/// Shared state for the HTTP API, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<SignatureCodec>,
    pub bridge: ChatBridge,
}

impl AppState {
    pub fn new(codec: SignatureCodec, bridge: ChatBridge) -> Self {
        Self {
            codec: Arc::new(codec),
            bridge,
        }
    }
}
