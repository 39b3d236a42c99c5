//! Client error types.

use helm_core::types::AlreadyDecided;
use thiserror::Error;

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failure in a client call.
///
/// Errors are caught at the store layer and surfaced as strings in store
/// state; they never propagate past it as panics or crashes.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status.
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated for logging.
        body: String,
    },

    /// Response body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    /// The agent reported an error inside an otherwise-successful stream.
    #[error("agent error: {0}")]
    Agent(String),

    /// A local approval transition guard refused the operation.
    #[error(transparent)]
    Decided(#[from] AlreadyDecided),
}

impl ClientError {
    /// Build a status error, truncating the body for safe logging.
    #[must_use]
    pub fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            body: helm_core::text::preview(body, 200),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_truncates_body() {
        let long = "x".repeat(500);
        let err = ClientError::status(502, &long);
        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.len() < 300);
    }

    #[test]
    fn decided_error_passes_through() {
        let err: ClientError = AlreadyDecided {
            id: "ap-1".into(),
            status: helm_core::types::ApprovalStatus::Approved,
        }
        .into();
        assert!(err.to_string().contains("already decided"));
    }
}
