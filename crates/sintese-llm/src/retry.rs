//! Bounded retry policy for cloud backends.

use std::time::Duration;

/// How many times a failed cloud call may be reissued, and how long to
/// back off after a provider-side rate limit.
///
/// The gateway drives an explicit attempt-counting loop with this policy;
/// exhausting it surfaces the last error to the caller, which skips the
/// chunk rather than aborting the run.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after an HTTP 429
    pub max_rate_limit_retries: u32,
    /// Additional attempts after a timeout
    pub max_timeout_retries: u32,
    /// Fixed wait before retrying a rate-limited call
    pub rate_limit_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_rate_limit_retries: 3,
            max_timeout_retries: 2,
            rate_limit_backoff: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_rate_limit_retries, 3);
        assert_eq!(policy.max_timeout_retries, 2);
        assert_eq!(policy.rate_limit_backoff, Duration::from_secs(60));
    }
}
