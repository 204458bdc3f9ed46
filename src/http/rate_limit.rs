//! Call-rate limiting for outgoing requests

#[cfg(test)]
use mockall::automock;

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::config::RateLimitConfig;

/// Gate that callers pass through before each request
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RateLimit: Send + Sync {
    /// Waits until another call is allowed and records it
    async fn acquire(&self);
}

/// Allows at most `max_calls` acquisitions in any trailing window of `period`
pub struct SlidingWindowLimiter {
    max_calls: usize,
    period: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    /// `max_calls` is raised to 1 if zero
    pub fn new(max_calls: usize, period: Duration) -> Self {
        let max_calls = max_calls.max(1);
        Self {
            max_calls,
            period,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_calls, config.period())
    }

    /// Records a call if one is allowed right now, without waiting
    pub async fn try_acquire(&self) -> bool {
        let mut calls = self.calls.lock().await;
        let now = Instant::now();
        self.evict_expired(&mut calls, now);
        if calls.len() < self.max_calls {
            calls.push_back(now);
            true
        } else {
            false
        }
    }

    /// Either records the call, or returns how long until the oldest call leaves the window
    async fn reserve(&self) -> Option<Duration> {
        let mut calls = self.calls.lock().await;
        let now = Instant::now();
        self.evict_expired(&mut calls, now);
        if calls.len() < self.max_calls {
            calls.push_back(now);
            return None;
        }
        calls
            .front()
            .map(|oldest| (*oldest + self.period).saturating_duration_since(now))
    }

    fn evict_expired(&self, calls: &mut VecDeque<Instant>, now: Instant) {
        while calls
            .front()
            .is_some_and(|oldest| now.duration_since(*oldest) >= self.period)
        {
            calls.pop_front();
        }
    }
}

#[async_trait::async_trait]
impl RateLimit for SlidingWindowLimiter {
    async fn acquire(&self) {
        while let Some(wait) = self.reserve().await {
            debug!("Rate limit reached, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
}
