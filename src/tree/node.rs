//! Owned binary tree node
//!
//! A node holds two ownership slots. Either both are empty (leaf)
//! or both are filled; a node with a single child cannot be constructed.

/// Binary tree node with no payload
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Tree {
    left: Option<Box<Tree>>,
    right: Option<Box<Tree>>,
}

impl Tree {
    /// Create a leaf (no children)
    #[inline]
    pub fn leaf() -> Self {
        Self {
            left: None,
            right: None,
        }
    }

    /// Create an interior node owning both children
    #[inline]
    pub fn node(left: Tree, right: Tree) -> Self {
        Self {
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    /// Check if leaf
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Borrow both children, or `None` for a leaf
    ///
    /// Returns: (left, right)
    #[inline]
    pub fn children(&self) -> Option<(&Tree, &Tree)> {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }
}
