use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

use pin_project_lite::pin_project;
use tower::BoxError;
use tower::Service;

use gate_limit::Limiter;

use crate::error::GateError;

/// A fail-fast admission-control service.
///
/// `poll_ready` is pass-through; the admission decision happens in `call`,
/// where the limiter is consulted exactly once per request. Denied requests
/// resolve immediately to [`GateError::LimitExceeded`] and the inner
/// service never sees them.
#[derive(Debug)]
pub struct GateService<L, S>
where
    L: ?Sized,
{
    inner: S,
    limiter: Arc<L>,
}

impl<L, S> GateService<L, S>
where
    L: ?Sized,
{
    /// Create a GateService wrapping `inner`.
    pub fn new(inner: S, limiter: Arc<L>) -> Self {
        GateService { inner, limiter }
    }
}

impl<L, S> Clone for GateService<L, S>
where
    L: ?Sized,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            limiter: Arc::clone(&self.limiter),
        }
    }
}

pin_project! {
    /// The response future for [`GateService`].
    ///
    /// Either the inner service's future, or an immediate rejection that
    /// was decided before the inner service was called.
    #[project = ResponseFutureProj]
    pub enum ResponseFuture<F> {
        Forwarded { #[pin] future: F },
        Rejected,
    }
}

impl<F, T> Future for ResponseFuture<F>
where
    F: Future<Output = Result<T, BoxError>>,
{
    type Output = Result<T, BoxError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            ResponseFutureProj::Forwarded { future } => future.poll(cx),
            ResponseFutureProj::Rejected => {
                Poll::Ready(Err(Box::new(GateError::LimitExceeded) as BoxError))
            }
        }
    }
}

impl<L, S, Req> Service<Req> for GateService<L, S>
where
    L: Limiter + ?Sized + Send + Sync + 'static,
    S: Service<Req, Error = BoxError>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Admission is decided per-call; readiness is the inner service's.
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        if self.limiter.allow() {
            ResponseFuture::Forwarded {
                future: self.inner.call(req),
            }
        } else {
            ResponseFuture::Rejected
        }
    }
}
