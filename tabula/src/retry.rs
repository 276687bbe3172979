use std::time::Duration;

use tabula_backend::{BackendResult, Connect, Store};
use tracing::{debug, warn};

/// Fixed-interval retry of the initial store connection.
///
/// Retrying starts from an elapsed-time counter of `baseline`. Every failed
/// attempt sleeps `interval` and adds it to the counter; a new attempt is
/// made only while the counter is below `budget`. The defaults (2 s
/// baseline, 5 s interval, 20 s budget) give four retries, five attempts in
/// total, and twenty seconds of sleeping before the last error is returned.
///
/// Only connection errors are retried; a configuration error is returned
/// from the first attempt.
///
/// The counter lives in a single [`connect`](crate::TableClient::connect)
/// call; separate constructions never share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    baseline: Duration,
    interval: Duration,
    budget: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            baseline: Duration::from_secs(2),
            interval: Duration::from_secs(5),
            budget: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    pub fn new(baseline: Duration, interval: Duration, budget: Duration) -> Self {
        Self {
            baseline,
            interval,
            budget,
        }
    }

    /// A policy making exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    /// Number of retries after the first attempt.
    ///
    /// A zero interval disables retrying.
    pub fn max_retries(&self) -> u32 {
        if self.baseline >= self.budget || self.interval.is_zero() {
            return 0;
        }
        let remaining = (self.budget - self.baseline).as_nanos();
        let retries = remaining.div_ceil(self.interval.as_nanos());
        u32::try_from(retries).unwrap_or(u32::MAX)
    }

    pub(crate) async fn connect<C: Connect>(&self, connector: &C) -> BackendResult<C::Store> {
        let retries = self.max_retries();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match connector.connect().await {
                Ok(store) => {
                    debug!(attempt, store = store.label(), "Connected to store");
                    return Ok(store);
                }
                Err(error) if error.is_connection() && attempt <= retries => {
                    warn!(
                        attempt,
                        retry_in = ?self.interval,
                        %error,
                        "Store connection failed, retrying"
                    );
                    tokio::time::sleep(self.interval).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_allows_four_retries() {
        assert_eq!(RetryPolicy::default().max_retries(), 4);
    }

    #[test]
    fn test_partial_interval_rounds_up() {
        let policy = RetryPolicy::new(
            Duration::from_secs(2),
            Duration::from_secs(5),
            Duration::from_secs(18),
        );
        assert_eq!(policy.max_retries(), 4);

        let policy = RetryPolicy::new(
            Duration::from_secs(2),
            Duration::from_secs(5),
            Duration::from_secs(17),
        );
        assert_eq!(policy.max_retries(), 3);
    }

    #[test]
    fn test_no_retry() {
        assert_eq!(RetryPolicy::no_retry().max_retries(), 0);
        let policy = RetryPolicy::new(Duration::ZERO, Duration::ZERO, Duration::from_secs(5));
        assert_eq!(policy.max_retries(), 0);
    }
}
