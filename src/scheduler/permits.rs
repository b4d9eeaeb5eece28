//! Instrumented permit pool over `tokio::sync::Semaphore`
//!
//! The semaphore does the counting and the closing; this wrapper only
//! records how many permits are held and the high-water mark.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Default)]
struct Gauge {
    in_use: AtomicUsize,
    peak: AtomicUsize,
}

/// Fixed-size set of concurrency permits
///
/// Cloning yields another handle to the same pool.
#[derive(Debug, Clone)]
pub struct PermitPool {
    semaphore: Arc<Semaphore>,
    limit: usize,
    gauge: Arc<Gauge>,
}

impl PermitPool {
    /// Create a pool holding `limit` permits (range is checked by callers)
    pub fn new(limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
            gauge: Arc::new(Gauge::default()),
        }
    }

    /// Wait for a permit; fails once the pool is closed
    pub async fn acquire(&self) -> Result<Permit, AcquireError> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await?;

        let held = self.gauge.in_use.fetch_add(1, Ordering::SeqCst) + 1;
        self.gauge.peak.fetch_max(held, Ordering::SeqCst);

        Ok(Permit {
            gauge: Arc::clone(&self.gauge),
            _permit: permit,
        })
    }

    /// Refuse all further acquisitions and wake blocked acquirers
    ///
    /// Permits already handed out stay valid until dropped.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    /// Total number of permits
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Permits currently held
    pub fn in_use(&self) -> usize {
        self.gauge.in_use.load(Ordering::SeqCst)
    }

    /// Highest number of permits held at once
    pub fn peak(&self) -> usize {
        self.gauge.peak.load(Ordering::SeqCst)
    }
}

/// Held permit; released on drop, including during unwinding
#[derive(Debug)]
pub struct Permit {
    gauge: Arc<Gauge>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for Permit {
    fn drop(&mut self) {
        // Runs before the semaphore permit field is released, so `in_use`
        // never exceeds `limit`.
        self.gauge.in_use.fetch_sub(1, Ordering::SeqCst);
    }
}
