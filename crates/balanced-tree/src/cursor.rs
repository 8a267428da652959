use std::fmt;
use std::iter::FusedIterator;
use std::ptr;

use crate::arena::NodeRef;
use crate::tree::BalancedTree;

/// A position in the in-order sequence of a [`BalancedTree`]: either on a
/// stored value or past-the-end.
///
/// A cursor borrows its tree, so the tree cannot be modified while the
/// cursor is alive. Stepping forward from the largest value reaches
/// past-the-end, which stays put when stepped forward again; stepping back
/// from past-the-end reaches the largest value. Stepping back from the
/// smallest value leaves the cursor where it is.
pub struct Cursor<'a, T> {
    tree: &'a BalancedTree<T>,
    node: Option<NodeRef>,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(tree: &'a BalancedTree<T>, node: Option<NodeRef>) -> Self {
        Cursor { tree, node }
    }

    /// The value under the cursor, `None` when past-the-end.
    pub fn get(&self) -> Option<&'a T> {
        let tree = self.tree;
        self.node.map(|n| &tree.arena[n].value)
    }

    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Steps to the in-order successor.
    pub fn move_next(&mut self) {
        let Some(node) = self.node else {
            return;
        };
        if self.tree.max == Some(node) {
            self.node = None;
            return;
        }
        let arena = &self.tree.arena;
        if let Some(right) = arena[node].right {
            self.node = Some(arena.leftmost(right));
            return;
        }
        let mut child = node;
        let mut parent = arena[node].parent;
        while let Some(p) = parent {
            if arena[p].left == Some(child) {
                break;
            }
            child = p;
            parent = arena[p].parent;
        }
        self.node = parent;
    }

    /// Steps to the in-order predecessor.
    pub fn move_prev(&mut self) {
        let Some(node) = self.node else {
            self.node = self.tree.max;
            return;
        };
        if self.tree.min == Some(node) {
            return;
        }
        let arena = &self.tree.arena;
        if let Some(left) = arena[node].left {
            self.node = Some(arena.rightmost(left));
            return;
        }
        let mut child = node;
        let mut parent = arena[node].parent;
        while let Some(p) = parent {
            if arena[p].right == Some(child) {
                break;
            }
            child = p;
            parent = arena[p].parent;
        }
        if parent.is_some() {
            self.node = parent;
        }
    }

    /// Returns a copy of this cursor moved one step forward.
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn next(mut self) -> Self {
        self.move_next();
        self
    }

    /// Returns a copy of this cursor moved one step back.
    #[must_use]
    pub fn prev(mut self) -> Self {
        self.move_prev();
        self
    }

    /// Number of forward steps from this cursor to `last`.
    ///
    /// Counting stops at past-the-end, so if `last` is not reachable the
    /// result is the number of values from here to the end of the tree.
    pub fn distance_to(&self, last: &Cursor<'a, T>) -> usize {
        let mut cursor = *self;
        let mut steps = 0;
        while cursor != *last && !cursor.is_end() {
            cursor.move_next();
            steps += 1;
        }
        steps
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.node == other.node
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Cursor").field(value).finish(),
            None => f.write_str("Cursor(end)"),
        }
    }
}

/// Borrowing iterator over a [`BalancedTree`] in ascending order.
pub struct Iter<'a, T> {
    front: Cursor<'a, T>,
    back: Cursor<'a, T>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(front: Cursor<'a, T>, back: Cursor<'a, T>, remaining: usize) -> Self {
        Iter {
            front,
            back,
            remaining,
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.front.get();
        self.front.move_next();
        self.remaining -= 1;
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.back.move_prev();
        self.remaining -= 1;
        self.back.get()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use crate::BalancedTree;

    #[test]
    fn cursor_boundaries() {
        let tree: BalancedTree<i32> = [10, 20, 30].into_iter().collect();

        let mut cursor = tree.end();
        cursor.move_next();
        assert!(cursor.is_end());

        cursor.move_prev();
        assert_eq!(cursor.get(), Some(&30));

        let mut first = tree.begin();
        first.move_prev();
        assert_eq!(first.get(), Some(&10));
        assert_eq!(first, tree.begin());
    }

    #[test]
    fn cursor_identity() {
        let a: BalancedTree<i32> = [1].into_iter().collect();
        let b = a.clone();
        assert_eq!(a.end(), a.end());
        assert_ne!(a.end(), b.end());
        assert_ne!(a.begin(), b.begin());
    }

    #[test]
    fn distance() {
        let tree: BalancedTree<i32> = (0..10).collect();
        assert_eq!(tree.begin().distance_to(&tree.end()), 10);
        assert_eq!(tree.lower_bound(&3).distance_to(&tree.upper_bound(&6)), 4);
        assert_eq!(tree.end().distance_to(&tree.end()), 0);
    }

    #[test]
    fn iter_from_both_ends() {
        let tree: BalancedTree<i32> = (0..5).collect();
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next(), Some(&0));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&3));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn debug_output() {
        let tree: BalancedTree<i32> = [2, 1].into_iter().collect();
        assert_eq!(format!("{:?}", tree), "{1, 2}");
        assert_eq!(format!("{:?}", tree.begin()), "Cursor(1)");
        assert_eq!(format!("{:?}", tree.end()), "Cursor(end)");
    }
}
