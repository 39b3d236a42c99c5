//! Proxy error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors that reach the browser as JSON error responses.
///
/// Upstream agent failures deliberately do not appear here: the chat
/// handler degrades those to a canned reply instead of an error status.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The request carried no usable message list.
    #[error("Invalid messages format")]
    InvalidMessages,

    /// Body parsing or response assembly failed unexpectedly.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::InvalidMessages => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
