//! A height-balanced ([AVL]) binary search tree storing a set of unique
//! ordered values.
//!
//! Nodes live in an arena owned by the tree and are released together when
//! the tree is dropped, cleared or overwritten. Cursors walk the in-order
//! sequence in both directions through parent back-links, and
//! [`BalancedTree::lower_bound`] / [`BalancedTree::upper_bound`] locate range
//! boundaries in `O(log n)`.
//!
//! [AVL]: https://en.wikipedia.org/wiki/AVL_tree
#![forbid(unsafe_code)]

mod arena;
mod cursor;
mod tree;

pub use cursor::{Cursor, Iter};
pub use tree::BalancedTree;
