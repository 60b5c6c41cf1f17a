//! Fixed-schedule retry for upstream calls.

use std::future::Future;
use std::time::Duration;

use super::BlingError;

/// Backoff schedule, indexed by attempt number (0-based).
pub const DEFAULT_BACKOFF_MS: [u64; 4] = [1000, 2000, 4000, 8000];

/// Delay used for attempts beyond the end of the schedule.
const FALLBACK_BACKOFF: Duration = Duration::from_millis(8000);

/// Retry policy for upstream calls.
///
/// An operation is tried once and then retried up to `max_retries` times,
/// sleeping `delays[attempt]` after each failed attempt except the last.
/// Only transient errors (see [`BlingError::is_transient`]) are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delays: DEFAULT_BACKOFF_MS
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with a custom schedule.
    #[must_use]
    pub const fn new(max_retries: u32, delays: Vec<Duration>) -> Self {
        Self {
            max_retries,
            delays,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0, Vec::new())
    }

    /// Total number of tries, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to sleep after the given failed attempt (0-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        usize::try_from(attempt)
            .ok()
            .and_then(|i| self.delays.get(i).copied())
            .unwrap_or(FALLBACK_BACKOFF)
    }

    /// Run `operation` under this policy.
    ///
    /// # Errors
    ///
    /// Returns the first non-transient error immediately, or the last error
    /// verbatim once every attempt has failed.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, BlingError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BlingError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() || attempt >= self.max_retries => {
                    if attempt > 0 {
                        tracing::warn!(
                            operation = label,
                            attempts = attempt + 1,
                            error = %err,
                            "Giving up on Bling request"
                        );
                    }
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        operation = label,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Bling request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use reqwest::StatusCode;
    use tokio::time::Instant;

    use super::*;

    fn unavailable() -> BlingError {
        BlingError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: String::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_makes_four_attempts_on_schedule() {
        let policy = RetryPolicy::default();
        let start = Instant::now();
        let seen = Mutex::new(Vec::new());

        let result: Result<(), _> = policy
            .run("test", || {
                seen.lock().unwrap().push(start.elapsed());
                async { Err(unavailable()) }
            })
            .await;

        assert!(matches!(result, Err(BlingError::Status { .. })));

        let seen = seen.into_inner().unwrap();
        let offsets: Vec<u128> = seen.iter().map(Duration::as_millis).collect();
        // Sleeps of 1000, 2000, 4000 between the four attempts
        assert_eq!(offsets, vec![0, 1000, 3000, 7000]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_delay_used_when_retries_extended() {
        let policy = RetryPolicy::new(
            5,
            DEFAULT_BACKOFF_MS
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        );
        let start = Instant::now();
        let seen = Mutex::new(Vec::new());

        let _: Result<(), _> = policy
            .run("test", || {
                seen.lock().unwrap().push(start.elapsed().as_millis());
                async { Err(unavailable()) }
            })
            .await;

        assert_eq!(
            seen.into_inner().unwrap(),
            vec![0, 1000, 3000, 7000, 15000, 23000]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let policy = RetryPolicy::default();
        let attempts = Mutex::new(0);

        let value = policy
            .run("test", || {
                let n = {
                    let mut guard = attempts.lock().unwrap();
                    *guard += 1;
                    *guard
                };
                async move { if n < 3 { Err(unavailable()) } else { Ok(n) } }
            })
            .await
            .unwrap();

        assert_eq!(value, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_errors_are_not_retried() {
        let policy = RetryPolicy::default();
        let attempts = Mutex::new(0);

        let result: Result<(), _> = policy
            .run("test", || {
                *attempts.lock().unwrap() += 1;
                async { Err(BlingError::NotFound("/produtos/1".to_string())) }
            })
            .await;

        assert!(matches!(result, Err(BlingError::NotFound(_))));
        assert_eq!(*attempts.lock().unwrap(), 1);
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(8000));
        assert_eq!(policy.delay_for(10), Duration::from_millis(8000));
    }
}
