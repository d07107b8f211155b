//! Bounded retry with exponential backoff.
//!
//! Every network-bound step in the pipelines (generation, embedding, store
//! reads and writes) runs under the same policy. Callers supply a predicate
//! deciding which errors are worth retrying; permanent failures pass through
//! on the first attempt.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    250
}

fn default_max_delay_ms() -> u64 {
    5_000
}

/// Retry policy for network-bound operations.
///
/// `max_attempts` counts the initial try: a policy with `max_attempts = 3`
/// issues at most three requests. Delays double per failed attempt starting
/// from `base_delay_ms`, capped at `max_delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn with_base_delay_ms(mut self, ms: u64) -> Self {
        self.base_delay_ms = ms;
        self
    }

    pub fn with_max_delay_ms(mut self, ms: u64) -> Self {
        self.max_delay_ms = ms;
        self
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(1)
    }

    /// Delay before the retry following failed attempt number `attempt`
    /// (1-based).
    fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let delay = self.base_delay_ms.saturating_mul(1u64 << shift);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }

    /// Run `op`, retrying while `retryable` holds and attempts remain.
    ///
    /// The final error is returned unchanged once attempts are exhausted or
    /// the predicate rejects it.
    pub async fn run<T, E, F, Fut, P>(&self, mut op: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
        P: Fn(&E) -> bool,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts && retryable(&err) => {
                    let delay = self.backoff(attempt);
                    warn!(attempt, max_attempts, error = %err, "retrying in {:?}", delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
