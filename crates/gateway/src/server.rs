use std::net::SocketAddr;

use {
    axum::{
        Json, Router,
        body::Bytes,
        extract::State,
        http::HeaderMap,
        routing::{get, post},
    },
    serde_json::Value,
    tower_http::trace::TraceLayer,
    tracing::{info, warn},
};

use crate::{
    auth::{SIGNATURE_HEADER, TIMESTAMP_HEADER},
    error::SendError,
    state::AppState,
};

pub const LIVENESS_BODY: &str = "Relay bot up and running";

// ── Request types ───────────────────────────────────────────────────────────

/// A validated `POST /send` body.
///
/// `channel_id` is any integer the caller sent, including ones no channel can
/// have (zero, negative, wider than a snowflake); those are answered with 404.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub channel_id: i128,
    pub content: String,
}

impl SendRequest {
    /// Parse `{"channel_id": <int or int-string>, "content": "<non-empty>"}`.
    pub fn parse(body: &[u8]) -> Result<Self, SendError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| SendError::InvalidPayload)?;
        let channel_id = match value.get("channel_id") {
            Some(Value::Number(n)) => integer_from_number(n),
            Some(Value::String(s)) => s.trim().parse::<i128>().ok(),
            _ => None,
        }
        .ok_or(SendError::InvalidPayload)?;
        let content = value
            .get("content")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(SendError::InvalidPayload)?
            .to_string();
        Ok(Self {
            channel_id,
            content,
        })
    }
}

/// Whole-valued JSON numbers, so `42.0` reads as 42 and `4.2` is rejected.
fn integer_from_number(n: &serde_json::Number) -> Option<i128> {
    if let Some(u) = n.as_u64() {
        return Some(i128::from(u));
    }
    if let Some(i) = n.as_i64() {
        return Some(i128::from(i));
    }
    n.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        // Saturates outside i128; such values are 404s either way.
        .map(|f| f as i128)
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the HTTP API router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/send", post(send_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the HTTP API on an already-bound listener until the runtime stops.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, "relay API listening");
    axum::serve(listener, build_app(state)).await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn root_handler() -> &'static str {
    LIVENESS_BODY
}

async fn send_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, SendError> {
    let timestamp = header_str(&headers, TIMESTAMP_HEADER);
    let signature = header_str(&headers, SIGNATURE_HEADER);
    if !state.codec.verify(&body, timestamp, signature) {
        warn!("rejected /send: invalid or missing signature");
        return Err(SendError::Unauthorized);
    }

    let request = SendRequest::parse(&body)?;

    // Ids that cannot name a channel never reach the gateway.
    let channel_id = u64::try_from(request.channel_id)
        .ok()
        .filter(|id| *id != 0)
        .ok_or(SendError::ChannelNotFound)?;

    let channel = state
        .bridge
        .submit(move |chat| async move { chat.resolve_channel(channel_id).await })
        .await??
        .ok_or(SendError::ChannelNotFound)?;

    let channel_name = channel.name.clone();
    let content = request.content;
    let sent = state
        .bridge
        .submit(move |chat| async move { chat.send_text(&channel, &content).await })
        .await?
        .map_err(|e| {
            warn!(channel = channel_id, error = %e, "chat send failed");
            SendError::from(e)
        })?;

    info!(
        channel = sent.channel_id,
        channel_name = channel_name.as_deref().unwrap_or("-"),
        message = sent.id,
        "relayed message into chat"
    );
    Ok(Json(serde_json::json!({ "ok": true })))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
