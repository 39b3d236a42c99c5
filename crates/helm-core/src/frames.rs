//! Line-oriented chat stream framing.
//!
//! The chat proxy answers `POST /api/chat` with a UTF-8 body of text
//! frames, one per line:
//!
//! ```text
//! 0:"<escaped text>"\n
//! ```
//!
//! The `0:` marker tags a text fragment; the payload is a quoted string
//! with `\`, `"` and newline escaped. The proxy encodes, the chat client
//! decodes; both sides live here so the two cannot drift.

/// Marker prefix for a text frame.
pub const TEXT_FRAME_PREFIX: &str = "0:";

/// Encode one text fragment as a framed line (including the trailing
/// newline).
#[must_use]
pub fn encode_text_frame(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            ch => escaped.push(ch),
        }
    }
    format!("{TEXT_FRAME_PREFIX}\"{escaped}\"\n")
}

/// Decode one framed line back into its text fragment.
///
/// The line may or may not carry its trailing newline. Returns `None`
/// for lines with a different marker or malformed quoting.
#[must_use]
pub fn decode_text_frame(line: &str) -> Option<String> {
    let body = line
        .strip_prefix(TEXT_FRAME_PREFIX)?
        .trim_end_matches(['\r', '\n']);
    let inner = body.strip_prefix('"')?.strip_suffix('"')?;

    let mut text = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            text.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => text.push('\\'),
            Some('"') => text.push('"'),
            Some('n') => text.push('\n'),
            Some('r') => text.push('\r'),
            // Unknown escape or dangling backslash: malformed frame.
            _ => return None,
        }
    }
    Some(text)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
