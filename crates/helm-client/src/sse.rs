//! Incremental Server-Sent-Events parser.
//!
//! Consumes a chunked byte stream and yields one [`SseFrame`] per
//! dispatched event. Handles the parts of the SSE grammar the `/events`
//! endpoint actually uses:
//!
//! - line buffering across chunk boundaries (LF and CRLF)
//! - `data:` payloads, accumulated across multiple lines per event
//! - optional `event:` names
//! - comment lines (leading `:`) and unknown fields, skipped
//! - `[DONE]` sentinel payloads, skipped
//! - a configurable trailing-buffer flush for servers that end the
//!   stream without a final blank line

use bytes::BytesMut;
use futures::Stream;
use tokio_stream::StreamExt;
use tracing::warn;

/// One dispatched SSE event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, when the server named the event.
    pub event: Option<String>,
    /// Joined `data:` payload.
    pub data: String,
}

/// Parser options.
#[derive(Clone, Debug)]
pub struct SseOptions {
    /// Dispatch a pending event when the stream ends without a trailing
    /// blank line. The `/events` backend needs this; endpoints with an
    /// explicit `[DONE]` sentinel do not.
    pub flush_trailing: bool,
}

impl Default for SseOptions {
    fn default() -> Self {
        Self {
            flush_trailing: true,
        }
    }
}

/// Per-event accumulation state.
#[derive(Default)]
struct Pending {
    event: Option<String>,
    data_lines: Vec<String>,
}

impl Pending {
    /// Consume the accumulated lines into a frame, if any data arrived.
    fn dispatch(&mut self) -> Option<SseFrame> {
        if self.data_lines.is_empty() {
            self.event = None;
            return None;
        }
        let frame = SseFrame {
            event: self.event.take(),
            data: self.data_lines.join("\n"),
        };
        self.data_lines.clear();
        Some(frame)
    }

    /// Apply one line of the stream. Returns a frame when the line was a
    /// dispatching blank line.
    fn feed(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            // A field name with no colon has an empty value.
            None => (line, ""),
        };
        match field {
            "data" if value != "[DONE]" => self.data_lines.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            // "id", "retry", "[DONE]" payloads and anything else: ignored.
            _ => {}
        }
        None
    }
}

/// Parse an SSE byte stream into frames.
pub fn frames<S, E>(byte_stream: S, options: SseOptions) -> impl Stream<Item = SseFrame> + Send
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Send + Unpin + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async_stream::stream! {
        let mut byte_stream = byte_stream;
        let mut buffer = BytesMut::with_capacity(8192);
        let mut pending = Pending::default();

        loop {
            // Drain complete lines out of the buffer first.
            while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                let mut line_bytes = buffer.split_to(newline + 1);
                line_bytes.truncate(line_bytes.len() - 1);
                if line_bytes.last() == Some(&b'\r') {
                    line_bytes.truncate(line_bytes.len() - 1);
                }
                match std::str::from_utf8(&line_bytes) {
                    Ok(line) => {
                        if let Some(frame) = pending.feed(line) {
                            yield frame;
                        }
                    }
                    Err(_) => warn!("skipping non-UTF-8 line in event stream"),
                }
            }

            match byte_stream.next().await {
                Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                Some(Err(error)) => {
                    warn!(%error, "event stream read failed");
                    break;
                }
                None => break,
            }
        }

        if options.flush_trailing {
            // Treat any remaining buffered text as a final (unterminated)
            // line, then dispatch whatever accumulated.
            if !buffer.is_empty() {
                if let Ok(line) = std::str::from_utf8(&buffer) {
                    let line = line.trim_end_matches('\r');
                    if let Some(frame) = pending.feed(line) {
                        yield frame;
                    }
                }
            }
            if let Some(frame) = pending.dispatch() {
                yield frame;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    async fn collect(chunks: Vec<&'static str>, options: SseOptions) -> Vec<SseFrame> {
        let stream = futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, std::convert::Infallible>(Bytes::from(c))),
        );
        frames(stream, options).collect().await
    }

    #[tokio::test]
    async fn single_event() {
        let got = collect(vec!["data: {\"a\":1}\n\n"], SseOptions::default()).await;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].data, "{\"a\":1}");
        assert_eq!(got[0].event, None);
    }

    #[tokio::test]
    async fn named_event() {
        let got = collect(
            vec!["event: todo_added\ndata: {}\n\n"],
            SseOptions::default(),
        )
        .await;
        assert_eq!(got[0].event.as_deref(), Some("todo_added"));
    }

    #[tokio::test]
    async fn multiple_events_one_chunk() {
        let got = collect(
            vec!["data: {\"a\":1}\n\ndata: {\"b\":2}\n\n"],
            SseOptions::default(),
        )
        .await;
        assert_eq!(got.len(), 2);
        assert_eq!(got[1].data, "{\"b\":2}");
    }

    #[tokio::test]
    async fn event_split_across_chunks() {
        let got = collect(
            vec!["data: {\"par", "tial\":true}\n\n"],
            SseOptions::default(),
        )
        .await;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].data, "{\"partial\":true}");
    }

    #[tokio::test]
    async fn multi_line_data_joined_with_newline() {
        let got = collect(vec!["data: first\ndata: second\n\n"], SseOptions::default()).await;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].data, "first\nsecond");
    }

    #[tokio::test]
    async fn comments_and_unknown_fields_skipped() {
        let got = collect(
            vec![": keep-alive\nid: 7\nretry: 100\ndata: x\n\n"],
            SseOptions::default(),
        )
        .await;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].data, "x");
    }

    #[tokio::test]
    async fn done_sentinel_skipped() {
        let got = collect(
            vec!["data: {\"ok\":1}\n\ndata: [DONE]\n\n"],
            SseOptions::default(),
        )
        .await;
        assert_eq!(got.len(), 1);
    }

    #[tokio::test]
    async fn crlf_lines() {
        let got = collect(vec!["data: {\"cr\":1}\r\n\r\n"], SseOptions::default()).await;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].data, "{\"cr\":1}");
    }

    #[tokio::test]
    async fn no_space_after_colon() {
        let got = collect(vec!["data:{\"tight\":1}\n\n"], SseOptions::default()).await;
        assert_eq!(got[0].data, "{\"tight\":1}");
    }

    #[tokio::test]
    async fn trailing_flush_enabled() {
        let got = collect(vec!["data: {\"tail\":1}"], SseOptions::default()).await;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].data, "{\"tail\":1}");
    }

    #[tokio::test]
    async fn trailing_flush_disabled() {
        let got = collect(
            vec!["data: {\"tail\":1}"],
            SseOptions {
                flush_trailing: false,
            },
        )
        .await;
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn blank_line_without_data_dispatches_nothing() {
        let got = collect(vec!["event: ping\n\n"], SseOptions::default()).await;
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn empty_stream() {
        let got = collect(vec![], SseOptions::default()).await;
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn read_error_ends_stream_after_yielding_parsed_frames() {
        let chunks: Vec<Result<Bytes, &str>> = vec![
            Ok(Bytes::from("data: {\"a\":1}\n\n")),
            Err("connection reset"),
        ];
        let stream = futures::stream::iter(chunks);
        let got: Vec<SseFrame> = frames(stream, SseOptions::default()).collect().await;
        assert_eq!(got.len(), 1);
    }
}
