use thiserror::Error;

/// Tracker payload that could not be decoded.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed tracker payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open tracker stream at {url}: {reason}")]
    Open { url: String, reason: String },
    #[error("tracker stream is not open")]
    NotOpen,
    #[error("failed to send on tracker stream: {0}")]
    Send(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("game `{0}` is not available yet")]
    Unavailable(String),
    #[error("unknown game `{0}`")]
    Unknown(String),
}
