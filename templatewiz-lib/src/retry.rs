//! Retry with exponential backoff for blocking outbound calls.

use std::fmt::Display;
use std::thread::sleep;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Runs `operation` until it succeeds, fails permanently (`is_transient`
/// returns false), or `max_attempts` is used up. The last error is returned.
pub fn retry_with_backoff<T, E, F, P>(
    config: &RetryConfig,
    operation_name: &str,
    is_transient: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let mut attempts = 0;
    let mut backoff = config.initial_backoff;

    loop {
        attempts += 1;
        match operation() {
            Ok(result) => return Ok(result),
            Err(err) => {
                if attempts >= config.max_attempts || !is_transient(&err) {
                    return Err(err);
                }
                log::warn!(
                    "{operation_name} attempt {attempts}/{} failed: {err}. Retrying in {backoff:?}",
                    config.max_attempts
                );
                sleep(backoff);
                backoff = Duration::from_secs_f64(
                    (backoff.as_secs_f64() * config.backoff_multiplier)
                        .min(config.max_backoff.as_secs_f64()),
                );
            }
        }
    }
}
