//! Errors surfaced by the Commerce API client

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("API Error {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body was not the JSON we expected
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a status error, preferring the JSON `message` field over the raw body
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string());
        Self::Status { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status { status, message } => *status == 404 || message.contains("NOT_FOUND"),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
