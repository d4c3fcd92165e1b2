//! # Tower Gate
//!
//! `tower-gate` is a fail-fast admission-control middleware for the
//! [Tower](https://github.com/tower-rs/tower) ecosystem, backed by the
//! strategies in [`gate_limit`].
//!
//! Each request consults [`gate_limit::Limiter::allow`] exactly once. An
//! admitted request is forwarded to the inner service; a denied request
//! resolves immediately to [`GateError::LimitExceeded`] without the inner
//! service being polled at all. The `allow` contract carries no retry hint,
//! so there is no queuing, no timeout, and no load shedding here: callers
//! who want backoff own that policy, exactly as they do when calling a
//! [`Limiter`](gate_limit::Limiter) directly.
//!
//! ## Example
//!
//! ```rust
//! use std::num::NonZeroUsize;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use gate_limit::FixedWindow;
//! use tower::ServiceBuilder;
//! use tower_gate::GateLayer;
//!
//! let limit = NonZeroUsize::new(100).unwrap();
//! let window = FixedWindow::new(limit, Duration::from_secs(60)).unwrap();
//!
//! let layer = GateLayer::new(Arc::new(window));
//! # let _ = ServiceBuilder::new().layer(layer);
//! ```

mod error;
mod layer;
mod service;

#[cfg(test)]
mod tests;

pub use error::GateError;
pub use layer::GateLayer;
pub use service::GateService;
