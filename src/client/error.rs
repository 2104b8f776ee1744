//! Client errors and error-body summarization.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors emitted by [`StoryClient`](super::StoryClient).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Summary taken from the error body.
        message: String,
    },
    /// The request could not be sent or the body could not be read.
    #[error("Cannot reach the story server: {0}")]
    Transport(#[from] reqwest::Error),
    /// The body was readable but not the expected JSON.
    #[error("Unexpected response from the story server: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Status code, for errors that carry one.
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// One-line message suitable for display in place of the story.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Summarize an error body into one descriptive message.
///
/// Prefers a JSON `detail` or `message` field, then the raw text, then a
/// generic line naming the status.
pub fn summarize_error_body(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message"] {
            if let Some(text) = value.get(key).and_then(field_text) {
                return text;
            }
        }
    }

    let raw = body.trim();
    if raw.is_empty() {
        format!("Request failed ({status})")
    } else {
        raw.to_string()
    }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Null | Value::String(_) => None,
        // Validation errors arrive as a list of objects; keep them readable
        other => Some(other.to_string()),
    }
}
