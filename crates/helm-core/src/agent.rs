//! Typed parsing of agent chat replies.
//!
//! Shared by the chat client (single-shot fallback parsing) and the chat
//! proxy (reshaping the upstream reply before re-framing it).
//!
//! The upstream agent API is inconsistent about whether a request yields
//! one aggregate JSON document or several newline-delimited fragments
//! wrapped in `data:` lines. [`parse_agent_payload`] therefore runs a
//! double-parse strategy, preserved from the original consumer exactly:
//! each `data:` line is parsed independently and every success is
//! collected; only if none parse is the concatenation parsed as a single
//! document. Plain (non-SSE) bodies parse directly as one object or an
//! array.
//!
//! The schema is a typed boundary: payloads that match none of the known
//! shapes fail fast with a JSON error instead of silently producing
//! empty strings.

use serde::Deserialize;

/// One event from the agent API.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct AgentEvent {
    /// Structured reply content.
    #[serde(default)]
    pub content: Option<AgentContent>,
    /// Bare-text shape some emitter versions use instead of `content`.
    #[serde(default)]
    pub text: Option<String>,
    /// Whether this fragment is partial (more are coming).
    #[serde(default)]
    pub partial: bool,
    /// Whether the stream is complete.
    #[serde(default)]
    pub done: bool,
    /// Agent-reported error.
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply content: an ordered list of parts.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct AgentContent {
    /// The parts, in reply order.
    #[serde(default)]
    pub parts: Vec<AgentPart>,
}

/// One content part: text or a function response.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct AgentPart {
    /// Text payload.
    #[serde(default)]
    pub text: Option<String>,
    /// Function-response payload.
    #[serde(default, rename = "functionResponse")]
    pub function_response: Option<FunctionResponse>,
}

/// A function invocation echoed in the reply.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct FunctionResponse {
    /// Function name, when reported.
    #[serde(default)]
    pub name: Option<String>,
}

/// Kind of an extracted reply message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// Ordinary text.
    Text,
    /// A function-call annotation.
    Function,
}

/// One extracted reply message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyMessage {
    /// The message text.
    pub content: String,
    /// Text or function annotation.
    pub kind: MessageKind,
}

impl ReplyMessage {
    /// Plain-text reply message.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: MessageKind::Text,
        }
    }
}

/// Pull the payloads out of `data:` lines.
fn data_lines(raw: &str) -> Vec<&str> {
    raw.lines()
        .map(str::trim_start)
        .filter(|line| line.starts_with("data:"))
        .map(|line| line["data:".len()..].trim())
        .filter(|payload| !payload.is_empty() && *payload != "[DONE]")
        .collect()
}

/// Parse a raw agent response body into events.
///
/// Shapes handled, in order:
/// 1. Multiple `data:` lines → parse each line independently, keep every
///    success; fall back to parsing the concatenation only if none parse.
/// 2. A single `data:` line → parse its payload.
/// 3. No `data:` lines → parse the whole body as one JSON document
///    (object or array of events).
pub fn parse_agent_payload(raw: &str) -> Result<Vec<AgentEvent>, serde_json::Error> {
    let lines = data_lines(raw);

    if lines.len() > 1 {
        let parsed: Vec<AgentEvent> = lines
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();
        if !parsed.is_empty() {
            return Ok(parsed);
        }
        // None parsed individually; the fragments may be one document
        // split across lines.
        return parse_document(&lines.concat());
    }

    match lines.first() {
        Some(line) => parse_document(line),
        None => parse_document(raw.trim()),
    }
}

/// Parse one JSON document as an event or an array of events.
fn parse_document(text: &str) -> Result<Vec<AgentEvent>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.is_array() {
        serde_json::from_value(value)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}

/// Flatten events into reply messages.
///
/// Text parts are split per line (blank lines dropped); function
/// responses become `Function called: <name>` annotations. Events
/// carrying the bare `text` shape contribute that text directly.
#[must_use]
pub fn extract_messages(events: &[AgentEvent]) -> Vec<ReplyMessage> {
    let mut messages = Vec::new();
    for event in events {
        if let Some(content) = &event.content {
            for part in &content.parts {
                if let Some(text) = &part.text {
                    for line in text.lines().filter(|l| !l.trim().is_empty()) {
                        messages.push(ReplyMessage {
                            content: line.to_string(),
                            kind: MessageKind::Text,
                        });
                    }
                } else if let Some(call) = &part.function_response {
                    messages.push(ReplyMessage {
                        content: format!(
                            "Function called: {}",
                            call.name.as_deref().unwrap_or("unknown")
                        ),
                        kind: MessageKind::Function,
                    });
                }
            }
        } else if let Some(text) = &event.text {
            if !text.is_empty() {
                messages.push(ReplyMessage {
                    content: text.clone(),
                    kind: MessageKind::Text,
                });
            }
        }
    }
    messages
}

/// Join every extracted message into one assistant reply.
#[must_use]
pub fn extract_response_text(events: &[AgentEvent]) -> String {
    extract_messages(events)
        .into_iter()
        .map(|m| m.content)
        .collect::<Vec<_>>()
        .join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
