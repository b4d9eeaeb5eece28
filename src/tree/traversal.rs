//! Bottom-up construction and recursive counting

use super::Tree;

/// Build a perfect binary tree of the given depth
///
/// Children are allocated before their parent, right subtree first.
pub fn build(depth: u32) -> Tree {
    if depth == 0 {
        return Tree::leaf();
    }

    let right = build(depth - 1);
    let left = build(depth - 1);
    Tree::node(left, right)
}

/// Count nodes by recursive descent
pub fn count(tree: &Tree) -> u64 {
    match tree.children() {
        None => 1,
        Some((left, right)) => 1 + count(right) + count(left),
    }
}
