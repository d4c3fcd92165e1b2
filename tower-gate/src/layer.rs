use std::sync::Arc;

use gate_limit::Limiter;
use tower::Layer;

use crate::service::GateService;

/// Applies admission control to requests via the supplied limiter.
///
/// The limiter is shared: every service produced by this layer consults the
/// same instance, so one budget covers all clones of the stack.
#[derive(Debug)]
pub struct GateLayer<L>
where
    L: ?Sized,
{
    limiter: Arc<L>,
}

impl<L> Clone for GateLayer<L>
where
    L: ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            limiter: Arc::clone(&self.limiter),
        }
    }
}

impl<L> GateLayer<L>
where
    L: Limiter + ?Sized,
{
    /// Create a GateLayer
    pub fn new(limiter: Arc<L>) -> Self {
        GateLayer { limiter }
    }
}

impl<L, S> Layer<S> for GateLayer<L>
where
    L: ?Sized,
{
    type Service = GateService<L, S>;

    fn layer(&self, service: S) -> Self::Service {
        GateService::new(service, self.limiter.clone())
    }
}
