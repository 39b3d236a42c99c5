//! The chat send/stream client.
//!
//! Talks to the chat proxy's `POST /api/chat` endpoint and feeds the
//! reply into a [`Transcript`]. Three reply shapes are handled, sniffed
//! per line while the body streams in:
//!
//! - line frames (`0:"…"`), decoded and appended incrementally
//! - SSE `data:` lines carrying [`AgentEvent`] JSON, appended per text
//!   part as fragments arrive
//! - anything else: the whole body is parsed once at the end via
//!   [`parse_agent_payload`] and appended as a single assistant message

use bytes::BytesMut;
use helm_core::frames::decode_text_frame;
use serde::Serialize;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use helm_core::agent::{AgentEvent, extract_response_text, parse_agent_payload};

use super::transcript::Transcript;
use crate::error::{ClientError, Result};
use helm_core::types::ChatRole;

/// Assistant note used when a reply carried no usable text.
const EMPTY_REPLY_NOTE: &str = "Received a response, but it was empty.";

/// Wire shape of one transcript message.
#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Wire shape of the chat request body.
#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<WireMessage<'a>>,
}

/// Client for the chat proxy endpoint.
#[derive(Clone, Debug)]
pub struct ChatClient {
    http: reqwest::Client,
    url: String,
}

impl ChatClient {
    /// Create a client for the given chat endpoint URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Use a shared `reqwest` client instead of a fresh one.
    #[must_use]
    pub fn with_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Submit one user message and fold the reply into the transcript.
    ///
    /// The user text is echoed immediately. Any failure (transport,
    /// status, parse, or agent-reported) is absorbed as an
    /// error-flavored assistant message; the transcript never stays
    /// pending. Blank input is a no-op.
    pub async fn send_message(&self, transcript: &mut Transcript, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        transcript.push_user(text);

        match self.stream_reply(transcript).await {
            Ok(true) => {}
            Ok(false) => transcript.push_assistant(EMPTY_REPLY_NOTE),
            Err(error) => {
                warn!(%error, "chat request failed");
                transcript.push_error(&error.to_string());
            }
        }
    }

    /// POST the history and consume the streamed reply. Returns whether
    /// any assistant text was produced.
    async fn stream_reply(&self, transcript: &mut Transcript) -> Result<bool> {
        let request = ChatRequest {
            messages: transcript
                .messages()
                .iter()
                .map(|m| WireMessage {
                    role: match m.role {
                        ChatRole::User => "user",
                        ChatRole::Assistant => "assistant",
                    },
                    content: &m.content,
                })
                .collect(),
        };

        let response = self.http.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::status(status.as_u16(), &body));
        }

        let mut stream = response.bytes_stream();
        let mut buffer = BytesMut::new();
        let mut raw = Vec::new();
        let mut got_text = false;
        let mut done = false;

        while !done {
            let Some(chunk) = stream.next().await else {
                break;
            };
            let chunk = chunk?;
            raw.extend_from_slice(&chunk);
            buffer.extend_from_slice(&chunk);

            while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                let mut line_bytes = buffer.split_to(newline + 1);
                line_bytes.truncate(line_bytes.len() - 1);
                if line_bytes.last() == Some(&b'\r') {
                    line_bytes.truncate(line_bytes.len() - 1);
                }
                let Ok(line) = std::str::from_utf8(&line_bytes) else {
                    continue;
                };
                done = apply_line(transcript, line, &mut got_text)?;
                if done {
                    break;
                }
            }
        }
        // A last line without a trailing newline still counts.
        if !done && !buffer.is_empty() {
            if let Ok(line) = std::str::from_utf8(&buffer) {
                let _ = apply_line(transcript, line, &mut got_text)?;
            }
        }

        if got_text {
            return Ok(true);
        }

        // Nothing streamed incrementally; try the body as one document.
        let raw_text = String::from_utf8_lossy(&raw);
        if raw_text.trim().is_empty() {
            return Ok(false);
        }
        let events = parse_agent_payload(&raw_text)?;
        if let Some(error) = events.iter().find_map(|e| e.error.clone()) {
            return Err(ClientError::Agent(error));
        }
        let reply = extract_response_text(&events);
        if reply.is_empty() {
            return Ok(false);
        }
        transcript.push_assistant(reply);
        Ok(true)
    }
}

/// Feed one reply line into the transcript. Returns whether the stream
/// signaled completion.
fn apply_line(transcript: &mut Transcript, line: &str, got_text: &mut bool) -> Result<bool> {
    if let Some(text) = decode_text_frame(line) {
        transcript.append_assistant_fragment(&text);
        *got_text = true;
        return Ok(false);
    }

    let Some(payload) = line.trim_start().strip_prefix("data:") else {
        return Ok(false);
    };
    let payload = payload.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return Ok(false);
    }

    match serde_json::from_str::<AgentEvent>(payload) {
        Ok(event) => {
            if let Some(error) = event.error {
                return Err(ClientError::Agent(error));
            }
            if let Some(content) = &event.content {
                for part in &content.parts {
                    if let Some(text) = &part.text {
                        transcript.append_assistant_fragment(text);
                        *got_text = true;
                    }
                }
            } else if let Some(text) = &event.text {
                transcript.append_assistant_fragment(text);
                *got_text = true;
            }
            Ok(event.done)
        }
        Err(error) => {
            // Same policy as the push stream: log, drop, move on.
            debug!(%error, "unparseable data line in chat reply");
            Ok(false)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
