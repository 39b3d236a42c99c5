//! Reconnect backoff policy.
//!
//! The event-stream client retries a dropped `/events` connection forever,
//! but the wait between attempts grows exponentially up to a cap instead of
//! the fixed interval a naive reconnect loop would use. Jitter is applied
//! from caller-supplied randomness so the delay computation stays
//! deterministic and testable.

use serde::{Deserialize, Serialize};

/// Default base delay in milliseconds (first retry).
pub const DEFAULT_BASE_DELAY_MS: u64 = 3000;
/// Default maximum delay between retries in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 60_000;
/// Default jitter factor (0.0–1.0).
pub const DEFAULT_JITTER_FACTOR: f64 = 0.2;

/// Capped exponential backoff with jitter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackoffPolicy {
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound on any computed delay, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Fraction of the capped delay added as jitter, 0.0–1.0.
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}
fn default_jitter_factor() -> f64 {
    DEFAULT_JITTER_FACTOR
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry number `attempt` (0-based), in milliseconds.
    ///
    /// `random` must be in `[0.0, 1.0)`; it scales the jitter term. The
    /// jittered result never exceeds `max_delay_ms`.
    #[must_use]
    pub fn delay_ms(&self, attempt: u32, random: f64) -> u64 {
        let exponential = self.base_delay_ms.saturating_mul(1u64 << attempt.min(31));
        let capped = exponential.min(self.max_delay_ms);
        let jitter = (capped as f64) * self.jitter_factor * random.clamp(0.0, 1.0);
        ((capped as f64 + jitter).round() as u64).min(self.max_delay_ms)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
