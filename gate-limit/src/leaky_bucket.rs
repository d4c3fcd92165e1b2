use std::num::NonZeroUsize;
use std::sync::mpsc;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::mpsc::Sender;
use std::sync::mpsc::SyncSender;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use super::ConfigError;
use super::Limiter;

/// A leaky bucket limiter.
///
/// Admitted requests occupy a bounded queue that a background drain thread
/// empties one entry at a time, once every `1 / leak_rate` seconds. This
/// decouples admission (instant, non-blocking) from egress (a perfectly
/// smooth cadence, regardless of how bursty arrivals are). [`allow`] never
/// waits for a leak: it succeeds while the queue has room and fails
/// immediately once the queue is full. A tick that finds the queue empty is
/// a no-op; idle time never accrues credit.
///
/// # Lifecycle
///
/// The drain thread is the one resource in this crate that outlives an
/// `allow()` call. [`LeakyBucket::stop`] consumes the limiter, signals the
/// thread, and joins it; `Drop` performs the same teardown, so the thread
/// cannot outlive its owner. Because `stop` takes `self` by value, calling
/// `allow` on a stopped bucket does not compile.
///
/// [`allow`]: Limiter::allow
#[derive(Debug)]
pub struct LeakyBucket {
    /// Producer side of the bounded queue; one `()` per admitted request.
    queue: SyncSender<()>,
    stop: Sender<()>,
    drain: Option<JoinHandle<()>>,
}

impl LeakyBucket {
    /// Creates a new `LeakyBucket` strategy and starts its drain thread.
    ///
    /// # Arguments
    ///
    /// * `leak_rate` - Queued requests drained per second.
    /// * `capacity` - The maximum number of admitted-but-undrained requests.
    ///
    /// Rates above roughly 1e9 produce a period below the 1ns floor (and
    /// typically below the OS timer resolution), making the drain
    /// effectively continuous; a [`TokenBucket`](crate::TokenBucket) is the
    /// better fit for budgets that large.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveRate`] if `leak_rate` is zero,
    /// negative, NaN, or infinite;
    /// [`ConfigError::UnrepresentablePeriod`] if `leak_rate` is so small
    /// that `1 / leak_rate` seconds overflows `Duration`; and
    /// [`ConfigError::DrainThread`] if the drain thread cannot be spawned.
    pub fn new(leak_rate: f64, capacity: NonZeroUsize) -> Result<Self, ConfigError> {
        if !leak_rate.is_finite() || leak_rate <= 0.0 {
            return Err(ConfigError::NonPositiveRate);
        }
        // Sub-nanosecond periods round to zero; keep the timeout non-zero
        // so the drain thread always sleeps between ticks.
        let period = Duration::try_from_secs_f64(1.0 / leak_rate)
            .map_err(|_| ConfigError::UnrepresentablePeriod)?
            .max(Duration::from_nanos(1));

        let (queue, queued) = mpsc::sync_channel(capacity.get());
        let (stop, stopped) = mpsc::channel();

        let drain = thread::Builder::new()
            .name("leaky-bucket-drain".into())
            .spawn(move || Self::drain_loop(period, &queued, &stopped))
            .map_err(|e| ConfigError::DrainThread(e.to_string()))?;

        Ok(Self {
            queue,
            stop,
            drain: Some(drain),
        })
    }

    /// Waits one period at a time on the stop channel; each timeout is a
    /// tick that leaks at most one queued entry.
    fn drain_loop(period: Duration, queued: &Receiver<()>, stopped: &Receiver<()>) {
        loop {
            match stopped.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => {
                    // Nothing queued at tick time means nothing to leak.
                    let _ = queued.try_recv();
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    /// Halts the drain thread and releases its timer, joining the thread
    /// before returning.
    ///
    /// Dropping the limiter performs the same teardown; `stop` exists so an
    /// owner can tear down at a point of its choosing.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.drain.take() {
            let _ = self.stop.send(());
            let _ = handle.join();
        }
    }
}

impl Drop for LeakyBucket {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Limiter for LeakyBucket {
    fn allow(&self) -> bool {
        // Non-blocking push: a full queue rejects immediately rather than
        // waiting for the next leak.
        self.queue.try_send(()).is_ok()
    }
}
