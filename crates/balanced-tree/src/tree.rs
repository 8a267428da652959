use std::cmp::Ordering;
use std::collections::TryReserveError;
use std::fmt;
use std::io;
use std::mem;

use crate::arena::{NodeArena, NodeRef};
use crate::cursor::{Cursor, Iter};

/// An ordered set of unique values kept in an AVL-balanced binary search
/// tree.
///
/// Every node is owned by an arena that lives exactly as long as the tree.
/// There is no per-value removal; nodes are released together by
/// [`clear`](BalancedTree::clear), by overwriting the tree, or by dropping it.
pub struct BalancedTree<T> {
    pub(crate) arena: NodeArena<T>,
    pub(crate) root: Option<NodeRef>,
    pub(crate) min: Option<NodeRef>,
    pub(crate) max: Option<NodeRef>,
}

impl<T> BalancedTree<T> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        BalancedTree {
            arena: NodeArena::new(),
            root: None,
            min: None,
            max: None,
        }
    }

    /// Returns the number of values stored in the tree.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the root node, `0` for an empty tree.
    pub fn height(&self) -> usize {
        usize::from(self.arena.height(self.root))
    }

    /// Releases every node at once.
    pub fn clear(&mut self) {
        self.arena.release_all();
        self.root = None;
        self.min = None;
        self.max = None;
    }

    /// Smallest value in the tree.
    pub fn first(&self) -> Option<&T> {
        self.min.map(|n| &self.arena[n].value)
    }

    /// Largest value in the tree.
    pub fn last(&self) -> Option<&T> {
        self.max.map(|n| &self.arena[n].value)
    }

    /// Cursor at the smallest value, or past-the-end if the tree is empty.
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.min)
    }

    /// The past-the-end cursor.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self, None)
    }

    /// Iterates over the values in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::BalancedTree;
    ///
    /// let tree: BalancedTree<i32> = [3, 1, 2].into_iter().collect();
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
    /// assert_eq!(tree.iter().rev().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.begin(), self.end(), self.len())
    }

    /// Swaps the whole contents of two trees.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    fn replace_child(&mut self, parent: Option<NodeRef>, old: NodeRef, new: NodeRef) {
        match parent {
            None => self.root = Some(new),
            Some(p) => {
                if self.arena[p].left == Some(old) {
                    self.arena[p].left = Some(new);
                } else {
                    self.arena[p].right = Some(new);
                }
            }
        }
        self.arena[new].parent = parent;
    }

    /// Brings the right child of `q` up; returns the new subtree root.
    fn rotate_left(&mut self, q: NodeRef) -> NodeRef {
        let Some(p) = self.arena[q].right else {
            return q;
        };
        let parent = self.arena[q].parent;
        let inner = self.arena[p].left;

        self.arena[q].right = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(q);
        }
        self.arena[p].left = Some(q);
        self.arena[q].parent = Some(p);
        self.replace_child(parent, q, p);

        self.arena.update_height(q);
        self.arena.update_height(p);
        p
    }

    /// Brings the left child of `q` up; returns the new subtree root.
    fn rotate_right(&mut self, q: NodeRef) -> NodeRef {
        let Some(p) = self.arena[q].left else {
            return q;
        };
        let parent = self.arena[q].parent;
        let inner = self.arena[p].right;

        self.arena[q].left = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(q);
        }
        self.arena[p].right = Some(q);
        self.arena[q].parent = Some(p);
        self.replace_child(parent, q, p);

        self.arena.update_height(q);
        self.arena.update_height(p);
        p
    }

    /// Restores the AVL property at `node`, whose children are already
    /// balanced. Returns the root of the rebalanced subtree.
    fn rebalance(&mut self, node: NodeRef) -> NodeRef {
        match self.arena.balance_factor(node) {
            2 => {
                if let Some(right) = self.arena[node].right {
                    if self.arena.balance_factor(right) < 0 {
                        self.rotate_right(right);
                    }
                }
                self.rotate_left(node)
            }
            -2 => {
                if let Some(left) = self.arena[node].left {
                    if self.arena.balance_factor(left) > 0 {
                        self.rotate_left(left);
                    }
                }
                self.rotate_right(node)
            }
            _ => node,
        }
    }

    /// Recomputes heights from `node` up to the root, rebalancing each
    /// ancestor before moving further up.
    fn retrace(&mut self, mut node: Option<NodeRef>) {
        while let Some(current) = node {
            self.arena.update_height(current);
            let subtree = self.rebalance(current);
            node = self.arena[subtree].parent;
        }
    }

    /// Recursively copies the subtree at `node` of `source` into this tree's
    /// arena, children first. Returns the handle of the copied subtree root.
    fn copy_subtree(&mut self, source: &Self, node: NodeRef) -> Result<NodeRef, TryReserveError>
    where
        T: Clone,
    {
        let src = &source.arena[node];
        let left = match src.left {
            Some(l) => Some(self.copy_subtree(source, l)?),
            None => None,
        };
        let right = match src.right {
            Some(r) => Some(self.copy_subtree(source, r)?),
            None => None,
        };
        self.arena.create(src.value.clone(), left, right)
    }

    /// Builds a structurally independent deep copy of the tree.
    ///
    /// If an allocation fails, every node created for the copy is released
    /// before the error is returned and `self` is left untouched.
    pub fn try_clone(&self) -> Result<Self, TryReserveError>
    where
        T: Clone,
    {
        let mut copy = BalancedTree::new();
        let Some(root) = self.root else {
            return Ok(copy);
        };
        match copy.copy_subtree(self, root) {
            Ok(root) => {
                copy.root = Some(root);
                copy.min = Some(copy.arena.leftmost(root));
                copy.max = Some(copy.arena.rightmost(root));
                Ok(copy)
            }
            Err(e) => {
                copy.arena.release_all();
                Err(e)
            }
        }
    }

    /// Writes the shape of the tree as a Graphviz `dot` digraph.
    pub fn dump<W: io::Write>(&self, out: &mut W) -> io::Result<()>
    where
        T: fmt::Display,
    {
        writeln!(out, "digraph BalancedTree {{")?;
        writeln!(out, "    node [shape=record];")?;
        let mut stack: Vec<NodeRef> = self.root.into_iter().collect();
        while let Some(node) = stack.pop() {
            let n = &self.arena[node];
            writeln!(
                out,
                "    n{} [label=\"{} | h={}\"];",
                node.index(),
                n.value,
                n.height
            )?;
            for (child, side) in [(n.left, "L"), (n.right, "R")] {
                if let Some(child) = child {
                    writeln!(
                        out,
                        "    n{} -> n{} [label=\"{}\"];",
                        node.index(),
                        child.index(),
                        side
                    )?;
                    stack.push(child);
                }
            }
        }
        writeln!(out, "}}")
    }

    /// Used by tests
    #[doc(hidden)]
    pub fn _check_invariants(&self) -> Result<(), &'static str>
    where
        T: Ord,
    {
        let Some(root) = self.root else {
            if self.len() != 0 || self.min.is_some() || self.max.is_some() {
                return Err("empty tree has nodes or cached bounds");
            }
            return Ok(());
        };
        if self.arena[root].parent.is_some() {
            return Err("root node has a parent link");
        }
        if self.min != Some(self.arena.leftmost(root)) {
            return Err("cached minimum is not the leftmost node");
        }
        if self.max != Some(self.arena.rightmost(root)) {
            return Err("cached maximum is not the rightmost node");
        }

        let mut count = 0;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            count += 1;
            let n = &self.arena[node];
            let expected = 1 + self.arena.height(n.left).max(self.arena.height(n.right));
            if n.height != expected {
                return Err("cached height is wrong");
            }
            if !(-1..=1).contains(&self.arena.balance_factor(node)) {
                return Err("node is out of balance");
            }
            if let Some(left) = n.left {
                if self.arena[left].parent != Some(node) {
                    return Err("left child has a broken parent link");
                }
                if self.arena[left].value >= n.value {
                    return Err("left child is not smaller");
                }
                stack.push(left);
            }
            if let Some(right) = n.right {
                if self.arena[right].parent != Some(node) {
                    return Err("right child has a broken parent link");
                }
                if self.arena[right].value <= n.value {
                    return Err("right child is not larger");
                }
                stack.push(right);
            }
        }
        if count != self.len() {
            return Err("unreachable nodes in the arena");
        }

        let mut iter = self.iter();
        if let Some(mut prev) = iter.next() {
            for value in iter {
                if prev >= value {
                    return Err("in-order sequence is not strictly increasing");
                }
                prev = value;
            }
        }
        Ok(())
    }
}

impl<T: Ord> BalancedTree<T> {
    /// Inserts `value`, returning a cursor at the stored value.
    ///
    /// If an equal value is already present the tree is left unchanged and
    /// the cursor points at the existing node.
    ///
    /// The returned cursor borrows the tree, so it must be dropped before
    /// the next insertion. Rotations relink nodes along the insertion path,
    /// which would otherwise invalidate any outstanding cursor.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::BalancedTree;
    ///
    /// let mut tree = BalancedTree::new();
    /// assert_eq!(tree.insert(5).get(), Some(&5));
    /// tree.insert(5);
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> Cursor<'_, T> {
        self.arena.try_reserve(1).unwrap_or_else(|_| allocation_failed());
        match self.try_insert(value) {
            Ok(cursor) => cursor,
            Err(_) => unreachable!("node capacity was reserved"),
        }
    }

    /// Like [`insert`](BalancedTree::insert), but reports allocation
    /// failure instead of aborting. The tree is unchanged on error.
    pub fn try_insert(&mut self, value: T) -> Result<Cursor<'_, T>, TryReserveError> {
        let Some(root) = self.root else {
            let node = self.arena.create(value, None, None)?;
            self.root = Some(node);
            self.min = Some(node);
            self.max = Some(node);
            return Ok(Cursor::new(self, Some(node)));
        };

        let mut parent = root;
        let side = loop {
            let n = &self.arena[parent];
            let (next, go_left) = match value.cmp(&n.value) {
                Ordering::Equal => break None,
                Ordering::Less => (n.left, true),
                Ordering::Greater => (n.right, false),
            };
            match next {
                Some(child) => parent = child,
                None => break Some(go_left),
            }
        };
        let Some(go_left) = side else {
            return Ok(Cursor::new(self, Some(parent)));
        };

        let node = self.arena.create(value, None, None)?;
        self.arena[node].parent = Some(parent);
        if go_left {
            self.arena[parent].left = Some(node);
            if self.min == Some(parent) {
                self.min = Some(node);
            }
        } else {
            self.arena[parent].right = Some(node);
            if self.max == Some(parent) {
                self.max = Some(node);
            }
        }

        self.retrace(Some(parent));
        Ok(Cursor::new(self, Some(node)))
    }

    /// Returns `true` if the tree contains `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.lower_bound(value).get() == Some(value)
    }

    /// Cursor at the smallest value not less than `value`, or past-the-end.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::BalancedTree;
    ///
    /// let tree: BalancedTree<i32> = [1, 3, 5].into_iter().collect();
    /// assert_eq!(tree.lower_bound(&3).get(), Some(&3));
    /// assert_eq!(tree.lower_bound(&2).get(), Some(&3));
    /// assert!(tree.lower_bound(&6).is_end());
    /// ```
    pub fn lower_bound(&self, value: &T) -> Cursor<'_, T> {
        let mut candidate = None;
        let mut current = self.root;
        while let Some(node) = current {
            let n = &self.arena[node];
            match value.cmp(&n.value) {
                Ordering::Equal => return Cursor::new(self, Some(node)),
                Ordering::Less => {
                    candidate = Some(node);
                    current = n.left;
                }
                Ordering::Greater => current = n.right,
            }
        }
        Cursor::new(self, candidate)
    }

    /// Cursor at the smallest value strictly greater than `value`, or
    /// past-the-end.
    pub fn upper_bound(&self, value: &T) -> Cursor<'_, T> {
        let mut cursor = self.lower_bound(value);
        if cursor.get() == Some(value) {
            cursor.move_next();
        }
        cursor
    }
}

#[cold]
fn allocation_failed() -> ! {
    panic!("node allocation failed");
}

impl<T> Default for BalancedTree<T> {
    fn default() -> Self {
        BalancedTree::new()
    }
}

impl<T: Clone> Clone for BalancedTree<T> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|_| allocation_failed())
    }

    /// Copy-then-swap: `self` is only replaced once the copy is complete.
    fn clone_from(&mut self, source: &Self) {
        let mut copy = source.clone();
        self.swap(&mut copy);
    }
}

impl<T: fmt::Debug> fmt::Debug for BalancedTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for BalancedTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for BalancedTree<T> {}

impl<T: Ord> Extend<T> for BalancedTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for BalancedTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = BalancedTree::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, T> IntoIterator for &'a BalancedTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
