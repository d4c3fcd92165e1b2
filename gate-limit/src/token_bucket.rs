use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::PoisonError;

use quanta::Clock;
use quanta::Instant;

use super::ConfigError;
use super::Limiter;

/// A token bucket limiter.
///
/// Holds a budget of up to `capacity` tokens, refilled continuously at
/// `rate` tokens per second; each admission consumes exactly one token. The
/// bucket starts full, so bursts up to `capacity` are admitted immediately
/// while the sustained rate converges on `rate`.
///
/// The level is tracked as an `f64` and the refill is applied *before*
/// truncating anything to a whole token. Adding `elapsed * rate` as an
/// integer instead would discard the fractional part on every call, and a
/// caller polling faster than the refill interval would then never
/// accumulate a whole token. Real-valued accounting keeps every fraction.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    rate: f64,
    state: Mutex<BucketState>,
    clock: Clock,
}

#[derive(Debug)]
struct BucketState {
    /// Current token budget, 0.0..=capacity.
    level: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Creates a new `TokenBucket` strategy.
    ///
    /// # Arguments
    ///
    /// * `rate` - Tokens added per second of elapsed time.
    /// * `capacity` - The maximum number of tokens the bucket can hold.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveRate`] if `rate` is zero, negative,
    /// NaN, or infinite.
    pub fn new(rate: f64, capacity: NonZeroUsize) -> Result<Self, ConfigError> {
        Self::with_clock(rate, capacity, Clock::new())
    }

    /// As [`TokenBucket::new`], but reading time from a caller-supplied
    /// clock. Pair with [`quanta::Clock::mock`] for deterministic tests.
    pub fn with_clock(
        rate: f64,
        capacity: NonZeroUsize,
        clock: Clock,
    ) -> Result<Self, ConfigError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConfigError::NonPositiveRate);
        }
        let last_refill = clock.now();
        Ok(Self {
            capacity: capacity.get() as f64,
            rate,
            state: Mutex::new(BucketState {
                level: capacity.get() as f64,
                last_refill,
            }),
            clock,
        })
    }
}

impl Limiter for TokenBucket {
    fn allow(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();

        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.level = (state.level + elapsed * self.rate).min(self.capacity);
        // Advance even on rejection: the fraction accrued so far lives on in
        // `level`, not in a stale timestamp.
        state.last_refill = now;

        if state.level >= 1.0 {
            state.level -= 1.0;
            true
        } else {
            false
        }
    }
}
