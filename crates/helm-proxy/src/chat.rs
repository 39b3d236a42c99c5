//! Chat forwarding handlers.
//!
//! `POST /api/chat` accepts the console's `{messages: [{role, content}]}`
//! body, forwards the last message to the agent's `run_sse` endpoint in
//! its fixed envelope, and re-frames whatever text came back as `0:"…"`
//! lines. The response advertises a streaming content type but is
//! emitted as a single chunk and closed; that shape is what the stream
//! reader on the other side expects.
//!
//! Upstream failures never propagate: a canned reply embedding the
//! user's text keeps the chat UI rendering a well-formed stream even
//! when the agent is unreachable.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use helm_core::agent::{ReplyMessage, extract_messages, parse_agent_payload};
use helm_core::frames::encode_text_frame;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::ProxyError;

/// Incoming chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatPayload {
    /// The transcript; only the last message is forwarded.
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
}

/// One transcript message from the console.
#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    /// `user` or `assistant`; the proxy does not care which.
    #[serde(default)]
    pub role: String,
    /// Message text.
    #[serde(default)]
    pub content: String,
}

/// Upstream call failure, degraded to the canned fallback.
#[derive(Debug, Error)]
enum UpstreamError {
    #[error("transport: {0}")]
    Http(#[from] reqwest::Error),
    #[error("status {0}")]
    Status(u16),
    #[error("unparseable reply: {0}")]
    Parse(#[from] serde_json::Error),
}

/// POST /api/chat
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatPayload>,
) -> Result<Response, ProxyError> {
    let last = payload.messages.last().ok_or(ProxyError::InvalidMessages)?;
    if last.content.trim().is_empty() {
        return Err(ProxyError::InvalidMessages);
    }

    let mut replies = match forward_to_agent(&state, &last.content).await {
        Ok(replies) => replies,
        Err(error) => {
            warn!(%error, "agent API call failed, using fallback reply");
            Vec::new()
        }
    };

    if replies.is_empty() {
        replies = vec![ReplyMessage::text(format!(
            "Received your message: \"{}\". The agent API is unavailable right now, please try again later.",
            last.content
        ))];
    }

    Ok(frame_response(&replies))
}

/// Forward one message to `run_sse` and extract the reply messages.
async fn forward_to_agent(
    state: &AppState,
    text: &str,
) -> Result<Vec<ReplyMessage>, UpstreamError> {
    let body = json!({
        "appName": state.agent.app_name,
        "userId": state.agent.user_id,
        "sessionId": state.agent.session_id,
        "newMessage": {
            "parts": [{ "text": text }],
            "role": "user",
        },
        "streaming": true,
    });

    let url = format!("{}/run_sse", state.agent.api_url);
    let response = state.http.post(&url).json(&body).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status.as_u16()));
    }

    let raw = response.text().await?;
    let events = parse_agent_payload(&raw)?;
    let messages = extract_messages(&events);
    debug!(count = messages.len(), "extracted agent reply messages");
    Ok(messages)
}

/// Encode replies as framed lines in a single-chunk "stream".
fn frame_response(replies: &[ReplyMessage]) -> Response {
    let body: String = replies
        .iter()
        .map(|m| encode_text_frame(&m.content))
        .collect();

    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
        ],
        body,
    )
        .into_response()
}

/// GET /api/chat/sessions/{session_id}: history passthrough.
///
/// Relays the upstream JSON and status; unlike the chat route, history
/// has no sensible fallback, so upstream failures surface as error
/// bodies with the upstream status.
pub async fn session_history_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let url = format!(
        "{}/apps/{}/users/{}/sessions/{}",
        state.agent.api_url, state.agent.app_name, state.agent.user_id, session_id
    );

    let result = async {
        let response = state
            .http
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body: Value = if status.is_success() {
            response.json().await?
        } else {
            warn!(%url, status = status.as_u16(), "failed to load chat history");
            json!({ "error": "Failed to load chat history", "status": status.as_u16() })
        };
        Ok::<_, reqwest::Error>((status, body))
    }
    .await;

    match result {
        Ok((status, body)) => {
            let status =
                StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(body)).into_response()
        }
        Err(error) => {
            warn!(%error, "error fetching chat history");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch chat history" })),
            )
                .into_response()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
