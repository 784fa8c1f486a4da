//! Retry with exponential backoff for remote calls.
//!
//! The executor knows nothing about sheets: it runs a closure, classifies
//! each failure with the policy's classifier and either sleeps and retries
//! (transient) or gives up at once (fatal).
//!
//! The default classifier treats a failure without a
//! recognised HTTP status (connection reset, undecodable body, anything the
//! client could not put a status on) as transient. Supply a stricter
//! [`Classifier`] in [`RetryPolicy`] to change that.

use std::thread;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;

use crate::error::RemoteError;

/// Statuses that are retried: rate limited, internal error, unavailable.
pub const TRANSIENT_STATUSES: [u16; 3] = [429, 500, 503];

/// What to do with a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Transient,
    Fatal,
}

/// Decides whether a failure is worth another attempt.
pub type Classifier = fn(&RemoteError) -> Disposition;

/// Default classifier: transient statuses and status-less failures retry,
/// every other status is fatal.
pub fn classify(err: &RemoteError) -> Disposition {
    match err.status {
        Some(code) if TRANSIENT_STATUSES.contains(&code) => Disposition::Transient,
        Some(_) => Disposition::Fatal,
        None => Disposition::Transient,
    }
}

/// Like [`classify`], but status-less failures are fatal too.
pub fn classify_strict(err: &RemoteError) -> Disposition {
    match err.status {
        Some(code) if TRANSIENT_STATUSES.contains(&code) => Disposition::Transient,
        _ => Disposition::Fatal,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Wait before the first retry; doubles per attempt.
    pub base_delay: Duration,
    /// Upper bound (exclusive) of the uniform jitter added to each wait.
    pub max_jitter: Duration,
    pub classify: Classifier,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::from_secs(1),
            classify,
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
            classify,
        }
    }

    pub fn with_classifier(mut self, classify: Classifier) -> Self {
        self.classify = classify;
        self
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// `base_delay * 2^attempt_index + jitter_fraction * max_jitter`.
    /// `jitter_fraction` is clamped to [0, 1).
    pub fn backoff_delay(&self, attempt_index: u32, jitter_fraction: f64) -> Duration {
        let factor = 1u32.checked_shl(attempt_index).unwrap_or(u32::MAX);
        let fraction = if jitter_fraction.is_finite() {
            jitter_fraction.clamp(0.0, 1.0 - f64::EPSILON)
        } else {
            0.0
        };
        self.base_delay
            .saturating_mul(factor)
            .saturating_add(self.max_jitter.mul_f64(fraction))
    }
}

/// Why [`RetryExecutor::execute`] gave up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    #[error("{0}")]
    Fatal(RemoteError),

    #[error("all {attempts} attempts failed, last error: {last}")]
    Exhausted { attempts: u32, last: RemoteError },
}

/// Runs remote operations under a [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails fatally, or the attempts run out.
    ///
    /// `label` only appears in log lines.
    pub fn execute<T>(
        &self,
        label: &str,
        mut operation: impl FnMut() -> Result<T, RemoteError>,
    ) -> Result<T, RetryError> {
        let attempts = self.policy.attempts();
        let mut attempt = 0u32;

        loop {
            let err = match operation() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            attempt += 1;

            if (self.policy.classify)(&err) == Disposition::Fatal {
                log::debug!("{}: fatal failure on attempt {}: {}", label, attempt, err);
                return Err(RetryError::Fatal(err));
            }

            if attempt >= attempts {
                log::warn!("{}: giving up after {} attempts ({})", label, attempts, err);
                return Err(RetryError::Exhausted { attempts, last: err });
            }

            let wait = self
                .policy
                .backoff_delay(attempt - 1, rand::thread_rng().gen::<f64>());
            log::warn!(
                "{}: retry {}/{} in {:.2}s ({})",
                label,
                attempt,
                attempts - 1,
                wait.as_secs_f64(),
                err,
            );
            thread::sleep(wait);
        }
    }
}
