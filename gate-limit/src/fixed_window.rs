use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use quanta::Clock;
use quanta::Instant;

use super::ConfigError;
use super::Limiter;

/// A simple window-based limiter.
///
/// Counts requests in a discrete bucket that resets once the interval
/// elapses. The window is anchored to the first request after a reset, not
/// to absolute clock boundaries, so it is susceptible to "boundary bursts":
/// `limit` requests just before a reset plus `limit` just after can all be
/// admitted within a very short real-time span. This is the documented
/// behavior of this strategy, not an oversight; use [`SlidingWindow`] when
/// the limit must hold over every trailing interval.
///
/// [`SlidingWindow`]: crate::SlidingWindow
#[derive(Debug)]
pub struct FixedWindow {
    limit: usize,
    interval: Duration,
    state: Mutex<WindowState>,
    clock: Clock,
}

#[derive(Debug)]
struct WindowState {
    count: usize,
    window_start: Instant,
}

impl FixedWindow {
    /// Creates a new `FixedWindow` strategy.
    ///
    /// # Arguments
    ///
    /// * `limit` - The maximum number of requests admitted within one window.
    /// * `interval` - The duration of the window.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroInterval`] if `interval` is zero.
    pub fn new(limit: NonZeroUsize, interval: Duration) -> Result<Self, ConfigError> {
        Self::with_clock(limit, interval, Clock::new())
    }

    /// As [`FixedWindow::new`], but reading time from a caller-supplied
    /// clock. Pair with [`quanta::Clock::mock`] for deterministic tests.
    pub fn with_clock(
        limit: NonZeroUsize,
        interval: Duration,
        clock: Clock,
    ) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        let window_start = clock.now();
        Ok(Self {
            limit: limit.get(),
            interval,
            state: Mutex::new(WindowState {
                count: 0,
                window_start,
            }),
            clock,
        })
    }
}

impl Limiter for FixedWindow {
    fn allow(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        // Read the clock under the lock so window_start never moves backward.
        let now = self.clock.now();

        if now.duration_since(state.window_start) < self.interval {
            if state.count < self.limit {
                state.count += 1;
                true
            } else {
                false
            }
        } else {
            state.count = 1;
            state.window_start = now;
            true
        }
    }
}
