use {
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    relaybot_channels::ChatError,
};

use crate::bridge::BridgeError;

/// Failure of a `POST /send` request, one variant per response status.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Invalid or missing signature")]
    Unauthorized,

    #[error("Payload must include 'channel_id' (int) and 'content' (non-empty str)")]
    InvalidPayload,

    #[error("Channel not found or bot lacks access")]
    ChannelNotFound,

    #[error("chat API error: {0}")]
    Downstream(#[from] ChatError),

    #[error("chat gateway not connected")]
    Unavailable,
}

impl From<BridgeError> for SendError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Unavailable => Self::Unavailable,
        }
    }
}

impl SendError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidPayload => StatusCode::BAD_REQUEST,
            Self::ChannelNotFound => StatusCode::NOT_FOUND,
            Self::Downstream(_) => StatusCode::BAD_GATEWAY,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for SendError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (self.status(), body).into_response()
    }
}
