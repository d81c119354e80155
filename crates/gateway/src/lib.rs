//! Relay engine: signed HTTP API into chat, chat forwarding out to the
//! platform webhook, and the bridge between the two runtimes.
//!
//! Lifecycle (driven by the `relaybot` binary):
//! 1. Load + validate config
//! 2. Bind the HTTP API on its own runtime ([`server::serve`])
//! 3. Start the chat gateway runtime, build the [`relay::InboundRelay`] there
//! 4. Attach the [`bridge::DispatchBridge`] once the gateway reports ready
//!
//! The chat network itself is behind `relaybot_channels::ChatClient`.

pub mod auth;
pub mod bridge;
pub mod error;
pub mod relay;
pub mod server;
pub mod state;

pub use {
    auth::SignatureCodec,
    bridge::{BridgeError, DispatchBridge},
    error::SendError,
    relay::{InboundRelay, OutboundEventPayload, RelayOutcome},
    state::{AppState, ChatBridge},
};
