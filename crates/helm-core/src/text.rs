//! UTF-8–safe truncation for log previews.
//!
//! Slicing a `&str` at an arbitrary byte index panics when the index falls
//! inside a multi-byte character, so payload previews go through these
//! helpers instead.

/// Longest prefix of `s` that is at most `max_bytes` bytes and ends on a
/// char boundary.
#[inline]
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max_bytes)
        .last()
        .unwrap_or(0);
    &s[..end]
}

/// Preview of an untrusted payload for log lines: truncated to `max_bytes`
/// with an ellipsis marker when anything was cut.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let head = truncate_str(s, max_bytes);
    if head.len() == s.len() {
        head.to_owned()
    } else {
        format!("{head}…")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
