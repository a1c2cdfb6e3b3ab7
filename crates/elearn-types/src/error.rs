use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthFailure),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Socket error: {0}")]
    Socket(String),

    #[error("Chat channel is {state}, cannot send")]
    ChannelNotOpen { state: String },

    #[error("Cannot send an empty message")]
    EmptyMessage,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serialization(e.to_string())
    }
}

/// Terminal outcome of the refresh-and-retry flow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("no refresh token available")]
    NoRefreshToken,

    #[error("token refresh rejected with HTTP {status}")]
    RefreshRejected { status: u16 },

    #[error("token refresh failed: {0}")]
    Transport(String),
}
