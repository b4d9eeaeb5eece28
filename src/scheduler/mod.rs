//! Bounded-concurrency dispatch
//!
//! One coordinating thread walks the unit list. For every unit it takes
//! a semaphore permit (the only point where dispatch may block), then
//! spawns a worker thread that owns the permit, runs the executor and
//! sends the completion. The permit drops when the worker ends, however
//! it ends. Acquisition is driven by a current-thread tokio runtime owned
//! by the scheduler; the work itself runs on plain OS threads.
//!
//! ```text
//! dispatch ──acquire──▶ worker(unit 0) ──send──┐
//!          ──acquire──▶ worker(unit 1) ──send──┼──▶ completion channel
//!          ──acquire──▶ ...                    ┘
//! ```

mod permits;

pub use permits::{Permit, PermitPool};

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

use crate::work::{Completion, UnitExecutor, WorkUnit};
use crate::{ChurnError, Result, MAX_CONCURRENCY};

/// What the dispatch pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Units handed to workers
    pub dispatched: usize,
    /// Highest number of permits held at once while dispatching
    pub peak_concurrency: usize,
    /// Wall time of the dispatch pass (not of the workers)
    pub elapsed: Duration,
}

/// Runs units on worker threads, at most `limit` at a time
#[derive(Debug)]
pub struct Scheduler<E> {
    executor: Arc<E>,
    permits: PermitPool,
    runtime: Runtime,
}

impl<E: UnitExecutor> Scheduler<E> {
    /// Create a scheduler with `limit` permits (1..=MAX_CONCURRENCY)
    pub fn new(executor: E, limit: usize) -> Result<Self> {
        if !(1..=MAX_CONCURRENCY).contains(&limit) {
            return Err(ChurnError::InvalidConcurrency(limit));
        }

        let runtime = Builder::new_current_thread()
            .build()
            .map_err(ChurnError::Runtime)?;

        Ok(Self {
            executor: Arc::new(executor),
            permits: PermitPool::new(limit),
            runtime,
        })
    }

    /// Concurrency limit
    pub fn limit(&self) -> usize {
        self.permits.limit()
    }

    /// Permit pool backing this scheduler
    pub fn permits(&self) -> &PermitPool {
        &self.permits
    }

    /// Dispatch every unit, blocking on permits as needed
    ///
    /// Returns once the last unit has been handed to a worker; workers
    /// may still be running. Fails on the first unit that cannot get a
    /// permit or a thread, without dispatching the rest.
    pub fn dispatch(
        &self,
        units: Vec<WorkUnit>,
        completions: Sender<Completion>,
    ) -> Result<DispatchSummary> {
        let start = Instant::now();
        let mut dispatched = 0;

        for unit in units {
            let permit = self
                .runtime
                .block_on(self.permits.acquire())
                .map_err(|source| ChurnError::PermitUnavailable {
                    role: unit.role,
                    source,
                })?;

            debug!(
                role = %unit.role,
                depth = unit.depth,
                iterations = unit.iterations,
                in_use = self.permits.in_use(),
                "dispatching unit"
            );

            let executor = Arc::clone(&self.executor);
            let completions = completions.clone();
            thread::Builder::new()
                .name(format!("churn-unit-{}", unit.role))
                .spawn(move || {
                    let _permit = permit;
                    let started = Instant::now();
                    let completion = executor.execute(&unit);
                    debug!(
                        role = %unit.role,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "unit finished"
                    );
                    if completions.send(completion).is_err() {
                        warn!(role = %unit.role, "collector gone, result dropped");
                    }
                })
                .map_err(ChurnError::Spawn)?;

            dispatched += 1;
        }

        let summary = DispatchSummary {
            dispatched,
            peak_concurrency: self.permits.peak(),
            elapsed: start.elapsed(),
        };
        info!(
            dispatched = summary.dispatched,
            limit = self.limit(),
            peak = summary.peak_concurrency,
            "dispatch complete"
        );
        Ok(summary)
    }

    /// Run `dispatch` on a dedicated coordinating thread
    pub fn spawn(
        self,
        units: Vec<WorkUnit>,
        completions: Sender<Completion>,
    ) -> Result<JoinHandle<Result<DispatchSummary>>> {
        thread::Builder::new()
            .name("churn-dispatch".to_string())
            .spawn(move || self.dispatch(units, completions))
            .map_err(ChurnError::Spawn)
    }
}
