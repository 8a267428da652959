use std::collections::TryReserveError;
use std::ops::{Index, IndexMut};

#[cfg(test)]
thread_local! {
    /// Most nodes any arena on the current thread may hold; reserving past
    /// it fails as if the allocator had run out.
    pub(crate) static NODE_LIMIT: std::cell::Cell<Option<usize>> =
        const { std::cell::Cell::new(None) };
}

/// Stable handle to a node inside a [`NodeArena`].
///
/// Handles are only meaningful for the arena that produced them and only
/// until that arena is released.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeRef(usize);

impl NodeRef {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    pub value: T,
    pub left: Option<NodeRef>,
    pub right: Option<NodeRef>,
    /// Non-owning back-link, used for cursor traversal and rebalancing.
    pub parent: Option<NodeRef>,
    pub height: u8,
}

/// Owns every node allocated for one tree.
#[derive(Debug)]
pub(crate) struct NodeArena<T> {
    nodes: Vec<Node<T>>,
}

impl<T> NodeArena<T> {
    pub fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Make room for `additional` nodes up front, so that the next
    /// `additional` calls to `create` cannot fail.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.check_limit(additional)?;
        self.nodes.try_reserve(additional)
    }

    #[cfg(not(test))]
    #[inline]
    fn check_limit(&self, _additional: usize) -> Result<(), TryReserveError> {
        Ok(())
    }

    #[cfg(test)]
    fn check_limit(&self, additional: usize) -> Result<(), TryReserveError> {
        match NODE_LIMIT.with(|limit| limit.get()) {
            Some(limit) if self.nodes.len() + additional > limit => {
                Vec::<u8>::new().try_reserve(usize::MAX)
            }
            _ => Ok(()),
        }
    }

    /// Allocate a node with the given children and register it with the
    /// arena. The children's parent links are pointed at the new node.
    ///
    /// If the allocation fails nothing is registered and `value` is dropped.
    pub fn create(
        &mut self,
        value: T,
        left: Option<NodeRef>,
        right: Option<NodeRef>,
    ) -> Result<NodeRef, TryReserveError> {
        self.try_reserve(1)?;
        let id = NodeRef(self.nodes.len());
        self.nodes.push(Node {
            value,
            left,
            right,
            parent: None,
            height: 1,
        });
        for child in [left, right].into_iter().flatten() {
            self[child].parent = Some(id);
        }
        self.update_height(id);
        Ok(id)
    }

    /// Drop every node this arena ever created. Calling it again is a no-op.
    pub fn release_all(&mut self) {
        self.nodes.clear();
    }

    pub fn height(&self, node: Option<NodeRef>) -> u8 {
        node.map_or(0, |n| self[n].height)
    }

    /// `height(right) - height(left)`.
    pub fn balance_factor(&self, node: NodeRef) -> i16 {
        let n = &self[node];
        i16::from(self.height(n.right)) - i16::from(self.height(n.left))
    }

    pub fn update_height(&mut self, node: NodeRef) {
        let n = &self[node];
        let height = 1 + self.height(n.left).max(self.height(n.right));
        self[node].height = height;
    }

    pub fn leftmost(&self, mut node: NodeRef) -> NodeRef {
        while let Some(left) = self[node].left {
            node = left;
        }
        node
    }

    pub fn rightmost(&self, mut node: NodeRef) -> NodeRef {
        while let Some(right) = self[node].right {
            node = right;
        }
        node
    }
}

impl<T> Index<NodeRef> for NodeArena<T> {
    type Output = Node<T>;

    fn index(&self, index: NodeRef) -> &Node<T> {
        &self.nodes[index.0]
    }
}

impl<T> IndexMut<NodeRef> for NodeArena<T> {
    fn index_mut(&mut self, index: NodeRef) -> &mut Node<T> {
        &mut self.nodes[index.0]
    }
}
