use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::task::Context;
use std::task::Poll;
use std::time::Duration;

use gate_limit::FixedWindow;
use gate_limit::Limiter;
use tower::BoxError;
use tower::Layer;
use tower::Service;
use tower::ServiceExt;

use futures::future::Ready;
use futures::future::ready;

use super::*;

#[derive(Clone)]
struct MockService {
    pub count: Arc<AtomicUsize>,
}

impl Service<()> for MockService {
    type Response = ();
    type Error = BoxError;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: ()) -> Self::Future {
        self.count.fetch_add(1, Ordering::SeqCst);
        ready(Ok(()))
    }
}

// A limiter that denies exactly the first request, then admits everything
#[derive(Debug)]
struct DenyOnceLimiter {
    already_denied: AtomicBool,
}

impl Limiter for DenyOnceLimiter {
    fn allow(&self) -> bool {
        self.already_denied.swap(true, Ordering::SeqCst)
    }
}

fn is_limit_exceeded(err: &BoxError) -> bool {
    matches!(err.downcast_ref::<GateError>(), Some(GateError::LimitExceeded))
}

#[tokio::test]
async fn test_admitted_requests_reach_the_inner_service() {
    let count = Arc::new(AtomicUsize::new(0));
    let mock = MockService {
        count: Arc::clone(&count),
    };

    let window = FixedWindow::new(NonZeroUsize::new(2).unwrap(), Duration::from_secs(60)).unwrap();
    let mut service = GateLayer::new(Arc::new(window)).layer(mock);

    service.ready().await.unwrap().call(()).await.unwrap();
    service.ready().await.unwrap().call(()).await.unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_denied_requests_fail_fast() {
    let count = Arc::new(AtomicUsize::new(0));
    let mock = MockService {
        count: Arc::clone(&count),
    };

    let window = FixedWindow::new(NonZeroUsize::new(1).unwrap(), Duration::from_secs(60)).unwrap();
    let mut service = GateLayer::new(Arc::new(window)).layer(mock);

    service.ready().await.unwrap().call(()).await.unwrap();

    let err = service
        .ready()
        .await
        .unwrap()
        .call(())
        .await
        .expect_err("second request should be denied");

    assert!(is_limit_exceeded(&err));
    // The inner service never saw the denied request
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_denial_is_per_request_not_sticky() {
    let count = Arc::new(AtomicUsize::new(0));
    let mock = MockService {
        count: Arc::clone(&count),
    };

    let limiter = DenyOnceLimiter {
        already_denied: AtomicBool::new(false),
    };
    let mut service = GateLayer::new(Arc::new(limiter)).layer(mock);

    let err = service.ready().await.unwrap().call(()).await.unwrap_err();
    assert!(is_limit_exceeded(&err));

    // The very next request goes straight through
    service.ready().await.unwrap().call(()).await.unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_clones_share_one_budget() {
    let count = Arc::new(AtomicUsize::new(0));
    let mock = MockService {
        count: Arc::clone(&count),
    };

    let window = FixedWindow::new(NonZeroUsize::new(2).unwrap(), Duration::from_secs(60)).unwrap();
    let layer = GateLayer::new(Arc::new(window));

    let mut first = layer.layer(mock.clone());
    let mut second = layer.layer(mock);

    first.ready().await.unwrap().call(()).await.unwrap();
    second.ready().await.unwrap().call(()).await.unwrap();

    // Both clones drew from the same window, which is now exhausted
    let err = first.ready().await.unwrap().call(()).await.unwrap_err();
    assert!(is_limit_exceeded(&err));
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_dynamic_limiter_via_trait_object() {
    let count = Arc::new(AtomicUsize::new(0));
    let mock = MockService {
        count: Arc::clone(&count),
    };

    let window = FixedWindow::new(NonZeroUsize::new(1).unwrap(), Duration::from_secs(60)).unwrap();
    let limiter: Arc<dyn Limiter + Send + Sync> = Arc::new(window);

    let mut service = GateLayer::new(limiter).layer(mock);

    service.ready().await.unwrap().call(()).await.unwrap();
    let err = service.ready().await.unwrap().call(()).await.unwrap_err();
    assert!(is_limit_exceeded(&err));
}
