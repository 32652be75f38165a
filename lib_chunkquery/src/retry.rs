//! # Fixed-Delay Retry Policy
//!
//! The MSQL endpoint fails transiently on large or slow queries. The policy
//! here is deliberately plain: a fixed attempt budget, a fixed wait between
//! attempts, no backoff and no jitter. Every error counts as a failed attempt.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

/// Attempts per page fetch, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;
/// Wait between two attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2000);

/// Retry budget applied around one fallible async operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// The last error of a run that used up its budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhausted<E> {
    /// Attempts made.
    pub attempts: usize,
    /// Error of the final attempt.
    pub last_error: E,
}

impl RetryPolicy {
    /// A policy with `max_attempts` attempts and `delay` between them.
    ///
    /// A budget of zero is treated as a single attempt.
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Attempt budget.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Wait between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `op` until it succeeds or the budget is spent.
    ///
    /// `op` receives the 1-based attempt number. The delay is only awaited
    /// between attempts, never after the last one.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, Exhausted<E>>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= self.max_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "retry budget exhausted"
                    );
                    return Err(Exhausted {
                        attempts: attempt,
                        last_error: err,
                    });
                }
                Err(err) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = self.delay.as_millis() as u64,
                        error = %err,
                        "attempt failed, retrying"
                    );
                    sleep(self.delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    #[test]
    fn defaults_match_the_endpoint_budget() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 10);
        assert_eq!(policy.delay(), Duration::from_millis(2000));
    }

    #[test]
    fn zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        let calls = Cell::new(0);
        let started = Instant::now();

        let result: Result<&str, Exhausted<String>> = policy
            .run(|attempt| {
                calls.set(calls.get() + 1);
                async move {
                    if attempt < 3 {
                        Err(format!("timeout on attempt {attempt}"))
                    } else {
                        Ok("page")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("page"));
        assert_eq!(calls.get(), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_the_budget() {
        let policy = RetryPolicy::new(4, Duration::from_millis(50));
        let calls = Cell::new(0);
        let started = Instant::now();

        let result: Result<(), Exhausted<String>> = policy
            .run(|attempt| {
                calls.set(calls.get() + 1);
                async move { Err(format!("failure {attempt}")) }
            })
            .await;

        assert_eq!(
            result,
            Err(Exhausted {
                attempts: 4,
                last_error: "failure 4".to_string()
            })
        );
        assert_eq!(calls.get(), 4);
        // No wait after the final attempt.
        assert_eq!(started.elapsed(), Duration::from_millis(150));
    }
}
