use std::collections::BTreeSet;

use balanced_tree::BalancedTree;

/// An ordered set the driver can fill and query.
pub trait Container<T>: Default {
    fn insert(&mut self, value: T);

    /// Number of stored values `v` with `first <= v <= last`; `0` when
    /// `first > last`.
    fn range_count(&self, first: &T, last: &T) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Ord> Container<T> for BalancedTree<T> {
    fn insert(&mut self, value: T) {
        BalancedTree::insert(self, value);
    }

    fn range_count(&self, first: &T, last: &T) -> usize {
        if first > last {
            return 0;
        }
        self.lower_bound(first).distance_to(&self.upper_bound(last))
    }

    fn len(&self) -> usize {
        BalancedTree::len(self)
    }
}

impl<T: Ord> Container<T> for BTreeSet<T> {
    fn insert(&mut self, value: T) {
        BTreeSet::insert(self, value);
    }

    fn range_count(&self, first: &T, last: &T) -> usize {
        if first > last {
            return 0;
        }
        self.range(first..=last).count()
    }

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }
}

/// Counts the values of `container` in the inclusive range `[first, last]`.
pub fn range_query<C: Container<T>, T>(container: &C, first: &T, last: &T) -> usize {
    container.range_count(first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check<C: Container<i32>>() {
        let mut c = C::default();
        assert!(c.is_empty());
        for v in [1, 3, 5, 3] {
            c.insert(v);
        }
        assert_eq!(c.len(), 3);
        assert_eq!(range_query(&c, &0, &10), 3);
        assert_eq!(range_query(&c, &3, &3), 1);
        assert_eq!(range_query(&c, &2, &4), 1);
        assert_eq!(range_query(&c, &4, &4), 0);
        assert_eq!(range_query(&c, &6, &100), 0);
        assert_eq!(range_query(&c, &5, &1), 0);
    }

    #[test]
    fn balanced_tree_counts() {
        check::<BalancedTree<i32>>();
    }

    #[test]
    fn btreeset_counts() {
        check::<BTreeSet<i32>>();
    }
}
