//! # gate-limit
//!
//! `gate-limit` provides interchangeable, thread-safe admission-control strategies.
//!
//! ## Core Philosophy
//!
//! Every strategy answers the same question, "may one unit of work proceed
//! right now?", through a single boolean [`Limiter::allow`] call. The
//! strategies differ in how they account for time: fixed windows are the
//! cheapest but burstiest, the sliding window log is exact over every
//! trailing interval at O(limit) memory, the token bucket smooths a refill
//! budget with real-valued accounting, and the leaky bucket drains a bounded
//! queue at a fixed cadence from a background thread.
//!
//! ## Key Concepts
//!
//! * **One Contract**: `allow()` never blocks on I/O, a sleep, or a timer.
//!   At most it takes a short per-instance lock.
//! * **Admission Is Final**: a `true` result is a non-revocable admission at
//!   that instant. A `false` result means "rejected now"; retry and backoff
//!   policy belong entirely to the caller.
//! * **Validated Construction**: counts use `NonZeroUsize`, and intervals and
//!   rates are checked up front. A limiter that constructed successfully
//!   never re-validates on the hot path.
//!
//! ## Example
//!
//! ```rust
//! use gate_limit::FixedWindow;
//! use gate_limit::Limiter;
//! use std::time::Duration;
//! use std::num::NonZeroUsize;
//!
//! let limit = NonZeroUsize::new(100).unwrap();
//! let interval = Duration::from_secs(60);
//! let window = FixedWindow::new(limit, interval).unwrap();
//!
//! if window.allow() {
//!     // Request admitted
//! }
//! ```

use std::fmt::Debug;

mod fixed_window;
mod leaky_bucket;
mod sliding_window;
mod token_bucket;

pub use fixed_window::FixedWindow;
pub use leaky_bucket::LeakyBucket;
pub use sliding_window::SlidingWindow;
pub use token_bucket::TokenBucket;

/// Construction-time validation failures.
///
/// These are always fatal to construction and never recovered internally.
/// Note that a rejected request (`allow() == false`) is *not* an error; it
/// is an expected policy decision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The window or trailing interval was zero.
    #[error("interval must be greater than zero")]
    ZeroInterval,

    /// A refill or leak rate was zero, negative, NaN, or infinite.
    #[error("rate must be a positive, finite number of events per second")]
    NonPositiveRate,

    /// A leak rate so small that its drain period overflows `Duration`.
    #[error("rate produces an unrepresentable drain period")]
    UnrepresentablePeriod,

    /// The leaky bucket's drain thread could not be started.
    #[error("failed to spawn drain thread: {0}")]
    DrainThread(String),
}

/// The core trait for all admission-control algorithms.
///
/// Strategies must be `Send` and `Sync` to allow sharing across thread
/// boundaries via `Arc`.
pub trait Limiter: Debug {
    /// Decides whether one unit of work may proceed right now.
    ///
    /// This method is non-blocking: it may briefly hold an internal lock but
    /// never waits on I/O, a sleep, or a timer. Concurrent callers racing
    /// for the last slot may be admitted in either order, but the admitted
    /// total never exceeds the configured bound.
    fn allow(&self) -> bool;
}
