//! The persistent `/events` connection.
//!
//! [`EventStreamClient`] owns one live SSE connection to the backend and
//! publishes every parsed [`PushEvent`] onto an [`EventBus`]. Connection
//! health transitions are recorded on the same bus.
//!
//! Reconnect semantics: every dropped or failed connection is retried
//! indefinitely, with capped exponential backoff between attempts. The
//! attempt counter resets once a connection is established, so a stable
//! backend that drops the stream occasionally is re-joined after the
//! base delay, while a dead backend backs off toward the cap instead of
//! hammering it on a fixed timer.
//!
//! The spawned task is tied to a [`CancellationToken`]: shutting the
//! handle down aborts an in-flight read and any pending backoff sleep,
//! so nothing outlives its owner.

use std::pin::pin;
use std::time::Duration;

use helm_core::backoff::BackoffPolicy;
use helm_core::events::PushEvent;
use metrics::counter;
use reqwest::header::ACCEPT;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::EventBus;
use crate::error::ClientError;
use crate::sse::{self, SseOptions};

/// Client for the backend's SSE push endpoint.
pub struct EventStreamClient {
    http: reqwest::Client,
    url: String,
    backoff: BackoffPolicy,
    bus: EventBus,
}

/// Handle to a running stream task.
///
/// Dropping the handle cancels the task; [`StreamHandle::shutdown`]
/// additionally waits for it to finish.
pub struct StreamHandle {
    cancel: CancellationToken,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl StreamHandle {
    /// Cancel the stream task and wait for it to stop.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// The task's cancellation token, for tying further work to the
    /// stream's lifetime.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl EventStreamClient {
    /// Create a client for the given SSE URL, publishing onto `bus`.
    #[must_use]
    pub fn new(url: impl Into<String>, backoff: BackoffPolicy, bus: EventBus) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            backoff,
            bus,
        }
    }

    /// Use a shared `reqwest` client instead of a fresh one.
    #[must_use]
    pub fn with_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Spawn the connect-and-reconnect loop on the current runtime.
    #[must_use]
    pub fn spawn(self) -> StreamHandle {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move { self.run(task_cancel).await });
        StreamHandle {
            cancel,
            task: Some(task),
        }
    }

    async fn run(self, cancel: CancellationToken) {
        let mut attempt: u32 = 0;
        loop {
            let result = self.connect_once(&cancel).await;
            if cancel.is_cancelled() {
                break;
            }
            let reason = match result {
                Ok(()) => {
                    // The connection worked and then ended; retry from
                    // the base delay again.
                    attempt = 0;
                    "event stream ended".to_string()
                }
                Err(error) => error.to_string(),
            };
            self.bus.set_health(false, Some(reason.clone()));

            let delay = self.backoff.delay_ms(attempt, jitter());
            attempt = attempt.saturating_add(1);
            counter!("helm_events_reconnects_total").increment(1);
            warn!(%reason, attempt, delay_ms = delay, "events stream down, reconnecting");

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(Duration::from_millis(delay)) => {}
            }
        }
        debug!("event stream client stopped");
    }

    /// One connection lifetime: connect, mark healthy, pump frames until
    /// the stream ends or the token cancels.
    async fn connect_once(&self, cancel: &CancellationToken) -> Result<(), ClientError> {
        let response = self
            .http
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::status(status.as_u16(), &body));
        }

        self.bus.set_health(true, None);
        info!(url = %self.url, "events stream connected");

        let byte_stream = Box::pin(response.bytes_stream());
        let mut frames = pin!(sse::frames(byte_stream, SseOptions::default()));
        loop {
            tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                frame = frames.next() => match frame {
                    Some(frame) => {
                        // The envelope rides inside `data`; a frame that
                        // does not parse is logged and dropped.
                        if let Some(event) = PushEvent::parse(&frame.data) {
                            counter!("helm_events_received_total").increment(1);
                            self.bus.publish(event);
                        }
                    }
                    None => return Ok(()),
                }
            }
        }
    }
}

/// Jitter source in `[0.0, 1.0)` from the subsecond clock.
fn jitter() -> f64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.subsec_nanos());
    f64::from(nanos % 1000) / 1000.0
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
