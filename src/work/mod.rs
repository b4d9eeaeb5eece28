//! Units of work derived from the problem size
//!
//! The depth range [MIN_DEPTH, max_depth] is split into a ladder of
//! independent checksum tasks, stepping by two. Two fixed-role units
//! bracket the ladder:
//!   Stretch:   one tree of depth max_depth + 1, reported first
//!   LongLived: one tree of depth max_depth, retained to the end, reported last

mod executor;

pub use executor::{Completion, ResultMessage, TreeExecutor, UnitExecutor};

use std::fmt;

use crate::ChurnConfig;

/// Smallest ladder depth
pub const MIN_DEPTH: u32 = 4;

/// Role of a unit, which is also its position in the final output
///
/// Ordering: `Stretch < Ladder(a) < Ladder(b) < LongLived` for `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitRole {
    /// Single tree one level deeper than the ladder maximum
    Stretch,
    /// Repeated trees at the given depth
    Ladder(u32),
    /// Single tree kept alive for the whole run
    LongLived,
}

impl UnitRole {
    /// Numeric sort key: 0 for stretch, the depth for ladder units,
    /// `u32::MAX` for the long-lived tree
    pub fn sort_key(&self) -> u32 {
        match *self {
            UnitRole::Stretch => 0,
            UnitRole::Ladder(depth) => depth,
            UnitRole::LongLived => u32::MAX,
        }
    }
}

impl fmt::Display for UnitRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitRole::Stretch => write!(f, "stretch"),
            UnitRole::Ladder(depth) => write!(f, "ladder-{}", depth),
            UnitRole::LongLived => write!(f, "long-lived"),
        }
    }
}

/// One checksum task: build `iterations` trees of `depth` and sum their sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    /// Output position and line format
    pub role: UnitRole,
    /// Tree depth
    pub depth: u32,
    /// Number of trees to build (at least 1)
    pub iterations: u64,
}

impl WorkUnit {
    /// Ladder unit at `depth`
    pub fn ladder(depth: u32, iterations: u64) -> Self {
        Self {
            role: UnitRole::Ladder(depth),
            depth,
            iterations,
        }
    }

    /// Stretch unit (single tree)
    pub fn stretch(depth: u32) -> Self {
        Self {
            role: UnitRole::Stretch,
            depth,
            iterations: 1,
        }
    }

    /// Long-lived unit (single retained tree)
    pub fn long_lived(depth: u32) -> Self {
        Self {
            role: UnitRole::LongLived,
            depth,
            iterations: 1,
        }
    }

    /// Shorthand for `self.role.sort_key()`
    pub fn sort_key(&self) -> u32 {
        self.role.sort_key()
    }
}

/// Derive the full unit list for a configuration
///
/// Ladder units come first, then stretch, then long-lived. The list
/// order is dispatch order only; output order is fixed by `UnitRole`.
pub fn derive_units(config: &ChurnConfig) -> Vec<WorkUnit> {
    let max_depth = config.max_depth();
    let mut units = Vec::with_capacity(config.expected_units());

    for depth in (MIN_DEPTH..=max_depth).step_by(2) {
        let iterations = 1u64 << (max_depth - depth + MIN_DEPTH);
        units.push(WorkUnit::ladder(depth, iterations));
    }

    units.push(WorkUnit::stretch(config.stretch_depth()));
    units.push(WorkUnit::long_lived(max_depth));
    units
}
