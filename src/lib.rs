//! # Binary-trees memory churn under bounded parallelism
//!
//! Builds many perfect binary trees of varying depth, counts their nodes
//! by recursive traversal and reports checksums. The interesting part is
//! the scheduling around it:
//!
//! 1. **Derivation**: the problem size `n` becomes a ladder of units over
//!    depths `4, 6, .. max(n, 6)` plus a stretch unit and a long-lived unit
//! 2. **Dispatch**: each unit runs on its own thread, gated by `L` permits
//!    (`L` = hardware parallelism unless overridden)
//! 3. **Collection**: completions arrive in any order; the collector waits
//!    for all of them, then emits stretch first, ladder by depth, long-lived last
//!
//! ## Usage Example
//!
//! ```no_run
//! use treechurn::{Benchmark, ChurnConfig};
//!
//! let report = Benchmark::new(ChurnConfig::for_problem_size(10)).run()?;
//! for line in report.lines() {
//!     println!("{}", line);
//! }
//! # Ok::<(), treechurn::ChurnError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod collector; // Ordered result collection
pub mod scheduler; // Permit-gated dispatch
pub mod tree; // Tree construction and counting
pub mod work; // Unit derivation and per-unit computation

// Re-exports for convenience
pub use collector::{Collector, CollectorState, Report};
pub use scheduler::{DispatchSummary, Permit, PermitPool, Scheduler};
pub use tree::Tree;
pub use work::{
    derive_units, Completion, ResultMessage, TreeExecutor, UnitExecutor, UnitRole, WorkUnit,
    MIN_DEPTH,
};

use crossbeam_channel::bounded;
use thiserror::Error;
use tracing::{debug, info};

/// Deepest `max_depth` whose checksums still fit in a `u64`
pub const MAX_DEPTH_LIMIT: u32 = 59;

/// Most permits a run may use
pub const MAX_CONCURRENCY: usize = 4096;

/// Benchmark parameters derived from the problem size
///
/// Depths are derived once in `for_problem_size` and only readable
/// afterwards, so `max_depth >= MIN_DEPTH + 2` and
/// `stretch_depth == max_depth + 1` always hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChurnConfig {
    problem_size: u32,
    max_depth: u32,
    stretch_depth: u32,
    concurrency: usize,
}

impl ChurnConfig {
    /// Configuration for `n`, with concurrency set to the CPU count
    pub fn for_problem_size(problem_size: u32) -> Self {
        let max_depth = problem_size.max(MIN_DEPTH + 2);
        Self {
            problem_size,
            max_depth,
            stretch_depth: max_depth.saturating_add(1),
            concurrency: num_cpus::get().clamp(1, MAX_CONCURRENCY),
        }
    }

    /// Override the concurrency limit
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Requested problem size `n`
    pub fn problem_size(&self) -> u32 {
        self.problem_size
    }

    /// Deepest ladder depth: max(n, MIN_DEPTH + 2)
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Depth of the stretch tree: max_depth + 1
    pub fn stretch_depth(&self) -> u32 {
        self.stretch_depth
    }

    /// Maximum units running at once
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Number of ladder units: ⌊(max_depth - MIN_DEPTH) / 2⌋ + 1
    pub fn ladder_len(&self) -> usize {
        ((self.max_depth - MIN_DEPTH) / 2 + 1) as usize
    }

    /// Total units (and output lines): ladder plus stretch and long-lived
    pub fn expected_units(&self) -> usize {
        self.ladder_len() + 2
    }

    /// Check the concurrency range and that checksums fit in `u64`
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ChurnError::InvalidConcurrency(self.concurrency));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ChurnError::ProblemTooLarge {
                requested: self.problem_size,
                limit: MAX_DEPTH_LIMIT,
            });
        }
        Ok(())
    }
}

/// Errors that can abort a run
#[derive(Error, Debug)]
pub enum ChurnError {
    /// Concurrency limit outside 1..=MAX_CONCURRENCY
    #[error("Invalid concurrency limit {0}: expected 1..={max}", max = MAX_CONCURRENCY)]
    InvalidConcurrency(usize),

    /// Problem size whose checksums would overflow
    #[error("Problem size {requested} too large: max depth is limited to {limit}")]
    ProblemTooLarge {
        /// Requested problem size
        requested: u32,
        /// Largest accepted max depth
        limit: u32,
    },

    /// A unit could not obtain a permit; the run cannot complete
    #[error("No permit available for {role} unit")]
    PermitUnavailable {
        /// Unit that was being dispatched
        role: UnitRole,
        /// Underlying semaphore failure
        #[source]
        source: tokio::sync::AcquireError,
    },

    /// Worker or dispatcher thread could not be started
    #[error("Failed to spawn thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// Runtime driving permit acquisition could not be built
    #[error("Failed to build permit runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Every producer went away before all results arrived
    #[error("Result stream closed with {missing} result(s) still expected")]
    ResultStreamClosed {
        /// Results never received
        missing: usize,
    },

    /// The coordinating thread panicked
    #[error("Dispatcher thread panicked")]
    DispatcherPanicked,
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, ChurnError>;

/// One benchmark run: derive, dispatch, collect
#[derive(Debug, Clone)]
pub struct Benchmark {
    config: ChurnConfig,
}

impl Benchmark {
    /// Create a benchmark for a configuration
    pub fn new(config: ChurnConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &ChurnConfig {
        &self.config
    }

    /// Run with real tree construction
    ///
    /// Any `n` is accepted except those whose max depth exceeds
    /// `MAX_DEPTH_LIMIT`: their checksums overflow `u64`, and such a run
    /// could not finish anyway. Those fail with `ProblemTooLarge`.
    pub fn run(&self) -> Result<Report> {
        self.run_with(TreeExecutor)
    }

    /// Run with a custom executor
    ///
    /// Dispatch happens on a coordinating thread while the calling
    /// thread collects. If collection fails, the dispatcher's own error
    /// is returned when it has one, since it is the root cause.
    pub fn run_with<E: UnitExecutor>(&self, executor: E) -> Result<Report> {
        self.config.validate()?;

        let units = derive_units(&self.config);
        let expected = units.len();
        info!(
            problem_size = self.config.problem_size,
            max_depth = self.config.max_depth,
            units = expected,
            concurrency = self.config.concurrency,
            "starting run"
        );

        let (tx, rx) = bounded(self.config.concurrency);
        let scheduler = Scheduler::new(executor, self.config.concurrency)?;
        let dispatcher = scheduler.spawn(units, tx)?;

        let collected = Collector::new(expected, rx).finish();
        let dispatched = dispatcher
            .join()
            .map_err(|_| ChurnError::DispatcherPanicked)
            .and_then(|summary| summary);

        match (collected, dispatched) {
            (Ok(report), Ok(summary)) => {
                debug!(
                    peak = summary.peak_concurrency,
                    dispatch_ms = summary.elapsed.as_millis() as u64,
                    "run complete"
                );
                Ok(report)
            }
            (_, Err(err)) => Err(err),
            (Err(err), Ok(_)) => Err(err),
        }
    }
}

/// Run the benchmark for `n` at hardware parallelism
///
/// Fails with `ProblemTooLarge` when `max(n, 6)` exceeds `MAX_DEPTH_LIMIT`;
/// every smaller `n` is accepted without further checks.
pub fn run(problem_size: u32) -> Result<Report> {
    Benchmark::new(ChurnConfig::for_problem_size(problem_size)).run()
}
