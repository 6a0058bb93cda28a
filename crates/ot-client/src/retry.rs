//! Retry policy for fair-usage (429) and token-expiry (419) responses.
//!
//! The remote API throttles via `Retry-After` rather than asking clients to
//! back off exponentially, so the policy here is a flat delay taken from the
//! header (or a configured default) with an optional attempt cap. The cap is
//! off by default: fair-usage throttling is expected to be transient and the
//! reference behavior is to wait it out indefinitely.

use std::time::Duration;

/// Configuration for the rate-limit/token-expiry retry loop.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay used for a 429 response that carries no `Retry-After` header.
    pub rate_limit_delay: Duration,
    /// Whether to honor the `Retry-After` response header.
    pub respect_retry_after: bool,
    /// Maximum number of retries before surfacing the error.
    /// `None` retries without bound.
    pub max_attempts: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay: Duration::from_secs(1),
            respect_retry_after: true,
            max_attempts: None,
        }
    }
}

impl RetryConfig {
    /// Set the fallback delay for 429 responses without `Retry-After`.
    pub fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    /// Cap the number of retries.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Ignore the `Retry-After` header and always use the configured delay.
    pub fn ignore_retry_after(mut self) -> Self {
        self.respect_retry_after = false;
        self
    }
}

/// Per-request retry state.
#[derive(Debug)]
pub struct RetryPolicy {
    config: RetryConfig,
    attempts: u32,
}

impl RetryPolicy {
    /// Create a new retry policy from config.
    pub fn new(config: RetryConfig) -> Self {
        Self { config, attempts: 0 }
    }

    /// Number of retries recorded so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record a retry attempt. Returns false once the configured cap is
    /// exhausted; always true for the default unbounded policy.
    pub fn admit(&mut self) -> bool {
        if let Some(max) = self.config.max_attempts {
            if self.attempts >= max {
                return false;
            }
        }
        self.attempts += 1;
        true
    }

    /// Delay before the next rate-limit retry, or None when the cap is
    /// exhausted.
    pub fn next_delay(&mut self, retry_after: Option<Duration>) -> Option<Duration> {
        if !self.admit() {
            return None;
        }
        match retry_after {
            Some(delay) if self.config.respect_retry_after => Some(delay),
            _ => Some(self.config.rate_limit_delay),
        }
    }
}

/// Parse a `Retry-After` header value. The remote API sends seconds,
/// occasionally fractional.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds = value.trim().parse::<f64>().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some(Duration::from_secs_f64(seconds))
    } else {
        None
    }
}
