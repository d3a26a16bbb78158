//! Client-side rate limiter for quota-capped backends.
//!
//! Tracks a rolling 60-second request counter plus a minimum inter-request
//! spacing. The limiter never sleeps itself: it reports how long the caller
//! must wait, and the caller records the request once it is actually sent.
//! One limiter instance is shared (behind a mutex) by every concurrent
//! caller targeting the same backend.

use std::time::{Duration, Instant};

/// Rolling-window request limiter with minimum spacing.
#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: u32,
    window: Duration,
    min_spacing: Duration,
    window_start: Option<Instant>,
    count: u32,
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Create a limiter allowing `max_per_window` requests per `window`,
    /// with at least `min_spacing` between consecutive requests.
    pub fn new(max_per_window: u32, window: Duration, min_spacing: Duration) -> Self {
        Self {
            max_per_window,
            window,
            min_spacing,
            window_start: None,
            count: 0,
            last_request: None,
        }
    }

    /// How long a caller must wait, as of `now`, before the next request
    /// may be sent. Zero when the request may go out immediately.
    ///
    /// `last_request` may sit in the future when a concurrent caller has
    /// already reserved a send slot, so the gaps are computed from the
    /// deadline side rather than from saturating elapsed times.
    pub fn delay_before_next(&self, now: Instant) -> Duration {
        let mut delay = Duration::ZERO;

        if let Some(start) = self.window_start {
            let window_end = start + self.window;
            if now <= window_end && self.count >= self.max_per_window {
                // Wait out the window, plus a second of margin
                delay = (window_end + Duration::from_secs(1)).duration_since(now);
            }
        }

        if let Some(last) = self.last_request {
            let next_allowed = last + self.min_spacing;
            if next_allowed > now {
                delay = delay.max(next_allowed.duration_since(now));
            }
        }

        delay
    }

    /// Record a request sent at `now`. Rolls the window over when the
    /// previous one has expired.
    pub fn record(&mut self, now: Instant) {
        match self.window_start {
            Some(start) if now.duration_since(start) <= self.window => {
                self.count += 1;
            }
            _ => {
                self.window_start = Some(now);
                self.count = 1;
            }
        }
        self.last_request = Some(now);
    }

    /// Reset the window after a provider-enforced wait (HTTP 429 backoff).
    pub fn reset(&mut self, now: Instant) {
        self.window_start = Some(now);
        self.count = 0;
        self.last_request = None;
    }
}
