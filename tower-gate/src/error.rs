/// Errors produced by the Tower Gate middleware.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The request was denied admission by the configured limiter.
    ///
    /// The limiter contract carries no retry hint, so none is offered here;
    /// retry and backoff policy belong to the caller.
    #[error("Admission denied by rate limiter")]
    LimitExceeded,
}
