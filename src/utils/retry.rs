//! Bounded fixed-delay retry for blocking external calls

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry settings: total attempts and the fixed pause between failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

    /// At least one attempt is always made
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_DELAY)
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// `op` receives the 1-based attempt number and `sleep` provides the pause
/// between failures. The last error is returned as is.
pub async fn retry_with_sleep<T, E, F, Fut, S, SFut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
    mut sleep: S,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("{} succeeded on attempt {}/{}", label, attempt, max_attempts);
                }
                return Ok(value);
            }
            Err(e) if attempt >= max_attempts => {
                tracing::error!("{} failed after {} attempt(s): {}", label, attempt, e);
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                    label,
                    attempt,
                    max_attempts,
                    e,
                    policy.delay
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
