//! Per-unit computation and result messages

use std::fmt;

use super::{UnitRole, WorkUnit};
use crate::tree::{self, Tree};

/// Finished output line tagged with the role that orders it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultMessage {
    role: UnitRole,
    line: String,
}

impl ResultMessage {
    /// Create a message
    pub fn new(role: UnitRole, line: impl Into<String>) -> Self {
        Self {
            role,
            line: line.into(),
        }
    }

    /// Role (ordering key)
    pub fn role(&self) -> UnitRole {
        self.role
    }

    /// Numeric sort key of the role
    pub fn sort_key(&self) -> u32 {
        self.role.sort_key()
    }

    /// Formatted text line, without trailing newline
    pub fn line(&self) -> &str {
        &self.line
    }
}

impl fmt::Display for ResultMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

/// What a worker sends back on the completion channel
#[derive(Debug)]
pub struct Completion {
    /// Result line
    pub message: ResultMessage,
    /// Tree kept alive until the collector finishes (long-lived unit only)
    pub retained: Option<Tree>,
}

impl Completion {
    /// Completion with nothing retained
    pub fn message(message: ResultMessage) -> Self {
        Self {
            message,
            retained: None,
        }
    }
}

/// Computation run for each unit on its worker thread
///
/// Implementations must not share mutable state between calls; the
/// scheduler runs many of them at once.
pub trait UnitExecutor: Send + Sync + 'static {
    /// Run one unit to completion
    fn execute(&self, unit: &WorkUnit) -> Completion;
}

/// Builds and counts real trees
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeExecutor;

impl TreeExecutor {
    /// Sum of `count(build(depth))` over `iterations` fresh trees
    pub fn checksum(depth: u32, iterations: u64) -> u64 {
        let mut check = 0u64;
        for _ in 0..iterations {
            let tree = tree::build(depth);
            check += tree::count(&tree);
        }
        check
    }
}

impl UnitExecutor for TreeExecutor {
    fn execute(&self, unit: &WorkUnit) -> Completion {
        match unit.role {
            UnitRole::Ladder(_) => {
                let check = Self::checksum(unit.depth, unit.iterations);
                Completion::message(ResultMessage::new(
                    unit.role,
                    format!(
                        "{}\t trees of depth {}\t check: {}",
                        unit.iterations, unit.depth, check
                    ),
                ))
            }
            UnitRole::Stretch => {
                let check = Self::checksum(unit.depth, 1);
                Completion::message(ResultMessage::new(
                    unit.role,
                    format!("stretch tree of depth {}\t check: {}", unit.depth, check),
                ))
            }
            UnitRole::LongLived => {
                let long_lived = tree::build(unit.depth);
                let check = tree::count(&long_lived);
                Completion {
                    message: ResultMessage::new(
                        unit.role,
                        format!("long lived tree of depth {}\t check: {}", unit.depth, check),
                    ),
                    retained: Some(long_lived),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_line() {
        let done = TreeExecutor.execute(&WorkUnit::ladder(4, 64));
        assert_eq!(done.message.line(), "64\t trees of depth 4\t check: 1984");
        assert_eq!(done.message.sort_key(), 4);
        assert!(done.retained.is_none());
    }

    #[test]
    fn test_stretch_line() {
        let done = TreeExecutor.execute(&WorkUnit::stretch(7));
        assert_eq!(done.message.line(), "stretch tree of depth 7\t check: 255");
        assert_eq!(done.message.sort_key(), 0);
        assert!(done.retained.is_none());
    }

    #[test]
    fn test_long_lived_retains_tree() {
        let done = TreeExecutor.execute(&WorkUnit::long_lived(6));
        assert_eq!(done.message.line(), "long lived tree of depth 6\t check: 127");
        assert_eq!(done.message.sort_key(), u32::MAX);

        let retained = done.retained.expect("long-lived tree is handed back");
        assert_eq!(tree::count(&retained), 127);
    }

    #[test]
    fn test_checksum_is_iterations_times_size() {
        assert_eq!(TreeExecutor::checksum(6, 16), 16 * 127);
        assert_eq!(TreeExecutor::checksum(0, 3), 3);
    }
}
