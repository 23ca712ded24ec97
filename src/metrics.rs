//! Dispatch timing instrumentation.
//!
//! The router notifies an attached [`TimingRecorder`] once per served
//! request with a named measurement covering request receipt to handler
//! dispatch. Recording is strictly fire-and-forget: it never blocks or
//! alters the response, and a panicking recorder is dropped silently.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Measurement name for requests served by a direct handler.
pub const SYNCHRONOUS_ROUTE: &str = "synchronous-route";

/// Measurement name for requests served by a lazily-loaded handler.
pub const ASYNCHRONOUS_ROUTE: &str = "asynchronous-route";

/// Receiver of named duration measurements from the router.
pub trait TimingRecorder: Send + Sync {
    /// Record one measurement. No return value is consumed.
    fn record(&self, name: &'static str, elapsed: Duration);
}

/// Lock-free dispatch metrics backed by atomic counters.
///
/// Tracks how many requests were served through direct vs lazy handlers
/// and the cumulative dispatch latency. All counters use
/// `Ordering::Relaxed`: metrics are eventually consistent and extremely
/// cheap to collect.
pub struct DispatchMetrics {
    direct_dispatches: AtomicUsize,
    lazy_dispatches: AtomicUsize,
    total_latency_ns: AtomicU64,
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self {
            direct_dispatches: AtomicUsize::new(0),
            lazy_dispatches: AtomicUsize::new(0),
            total_latency_ns: AtomicU64::new(0),
        }
    }
}

impl DispatchMetrics {
    /// Create a metrics recorder with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests served through a direct handler.
    #[must_use]
    pub fn direct_dispatches(&self) -> usize {
        self.direct_dispatches.load(Ordering::Relaxed)
    }

    /// Requests served through a lazily-loaded handler.
    #[must_use]
    pub fn lazy_dispatches(&self) -> usize {
        self.lazy_dispatches.load(Ordering::Relaxed)
    }

    /// Total requests observed.
    #[must_use]
    pub fn dispatch_count(&self) -> usize {
        self.direct_dispatches() + self.lazy_dispatches()
    }

    /// Mean time from request receipt to handler dispatch.
    ///
    /// Returns zero if no dispatches have been recorded yet.
    #[must_use]
    pub fn average_dispatch_latency(&self) -> Duration {
        let count = self.dispatch_count() as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}

impl TimingRecorder for DispatchMetrics {
    fn record(&self, name: &'static str, elapsed: Duration) {
        match name {
            SYNCHRONOUS_ROUTE => {
                self.direct_dispatches.fetch_add(1, Ordering::Relaxed);
            }
            ASYNCHRONOUS_ROUTE => {
                self.lazy_dispatches.fetch_add(1, Ordering::Relaxed);
            }
            // Unknown measurement names are ignored.
            _ => return,
        }
        self.total_latency_ns
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }
}
