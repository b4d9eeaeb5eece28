//! Perfect binary trees used as allocation workload
//!
//! Trees are exclusively owned: built inside one worker, counted,
//! then dropped. Nothing is shared, so no locking is involved.

mod node;
mod traversal;

pub use node::Tree;
pub use traversal::{build, count};
