use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

// ============================================================================
// Exponential Backoff Retry
// ============================================================================
//
// Used at startup to wait for the order store to become reachable. Each
// failed attempt doubles the delay up to `max_delay`.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    fn next_delay(&self, delay: Duration) -> Duration {
        delay.mul_f64(self.multiplier).min(self.max_delay)
    }
}

#[derive(Debug)]
pub enum RetryResult<T, E> {
    Success(T),
    /// Every attempt failed; carries the last error
    Failed { error: E, attempts: u32 },
}

impl<T, E> RetryResult<T, E> {
    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryResult::Success(value) => Ok(value),
            RetryResult::Failed { error, .. } => Err(error),
        }
    }
}

/// Run `operation` until it succeeds or `max_attempts` is exhausted. The
/// closure receives the 1-based attempt number.
pub async fn retry_with_backoff<F, Fut, T, E>(config: RetryConfig, mut operation: F) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt = attempt, "✅ Succeeded after retry");
                }
                return RetryResult::Success(value);
            }
            Err(error) if attempt >= config.max_attempts => {
                tracing::error!(attempt = attempt, error = %error, "Giving up after all retries");
                return RetryResult::Failed { error, attempts: attempt };
            }
            Err(error) => {
                tracing::warn!(
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    error = %error,
                    delay_ms = delay.as_millis() as u64,
                    "Attempt failed, retrying"
                );
                sleep(delay).await;
                delay = config.next_delay(delay);
            }
        }
    }
}
