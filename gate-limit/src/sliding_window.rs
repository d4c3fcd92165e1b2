use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use quanta::Clock;
use quanta::Instant;

use super::ConfigError;
use super::Limiter;

/// A Sliding Window Log implementation.
///
/// Keeps one timestamp per admitted request and counts the entries that
/// still fall inside the trailing interval, so the limit holds over *every*
/// possible trailing window rather than only at aligned boundaries. That
/// exactness costs O(limit) memory and an O(log length) prune on each call.
///
/// Expired entries are pruned lazily, at call time only, so between calls
/// the log may still hold stale timestamps; immediately after [`allow`]
/// returns, its length never exceeds the limit.
///
/// [`allow`]: Limiter::allow
#[derive(Debug)]
pub struct SlidingWindow {
    limit: usize,
    interval: Duration,
    /// Timestamps of admitted requests, oldest first.
    log: Mutex<Vec<Instant>>,
    clock: Clock,
}

impl SlidingWindow {
    /// Creates a new `SlidingWindow` strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroInterval`] if `interval` is zero.
    pub fn new(limit: NonZeroUsize, interval: Duration) -> Result<Self, ConfigError> {
        Self::with_clock(limit, interval, Clock::new())
    }

    /// As [`SlidingWindow::new`], but reading time from a caller-supplied
    /// clock. Pair with [`quanta::Clock::mock`] for deterministic tests.
    pub fn with_clock(
        limit: NonZeroUsize,
        interval: Duration,
        clock: Clock,
    ) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(Self {
            limit: limit.get(),
            interval,
            log: Mutex::new(Vec::with_capacity(limit.get())),
            clock,
        })
    }
}

impl Limiter for SlidingWindow {
    fn allow(&self) -> bool {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();

        // Prune everything that has slid out of the trailing interval.
        log.retain(|&admitted| now.duration_since(admitted) < self.interval);

        if log.len() < self.limit {
            log.push(now);
            true
        } else {
            // Rejection leaves the log untouched.
            false
        }
    }
}
