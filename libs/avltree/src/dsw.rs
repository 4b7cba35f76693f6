// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Day-Stout-Warren rebalancing.
//!
//! The tree is first flattened into a *vine*, a degenerate tree where every node only has a right
//! child, which is then folded back into a tree of minimum height by repeated left rotations along
//! the vine. Both phases work in place and need O(1) extra space.

use core::cmp::Ordering;

use crate::{AvlTree, Link, Linked, utils};

impl<T> AvlTree<T>
where
    T: Linked + ?Sized,
{
    /// Rebuilds the tree into a shape of minimum height.
    ///
    /// After this call the tree is *complete*: every level but the last is full, which makes its
    /// height `floor(log2(len))`. This takes O(n) time and does not allocate.
    ///
    /// Regular insertions and removals keep the tree balanced on their own, this is useful after
    /// bulk loading or to squeeze out the last level before a lookup-heavy phase.
    pub fn rebalance(&mut self) {
        if self.root.is_none() {
            return;
        }

        // Safety: all links reachable from the root point to elements owned by this tree
        unsafe {
            let size = tree_to_vine(&mut self.root);
            debug_assert_eq!(size, self.count);
            vine_to_tree(&mut self.root, size);
        }

        tracing::debug!(
            "rebalanced {} elements to height {}",
            self.count,
            self.height()
        );
    }

    /// Builds a tree from handles yielded in strictly ascending order in linear time.
    ///
    /// This is considerably faster than inserting the elements one by one, the result is the same
    /// minimum-height tree [`Self::rebalance`] produces.
    ///
    /// # Panics
    ///
    /// Panics if the elements are not strictly ascending according to [`Linked::cmp_node`] or if
    /// an element is still linked into a different tree. Elements consumed up to that point are
    /// dropped.
    pub fn from_sorted<I>(handles: I) -> Self
    where
        I: IntoIterator<Item = T::Handle>,
    {
        let mut tree = Self::new();
        let mut tail: Link<T> = None;

        for handle in handles {
            let ptr = T::into_ptr(handle);

            // Safety: `ptr` was just created from an owning handle and the vine only holds
            // elements owned by `tree`
            unsafe {
                let links = T::links(ptr).as_ref();
                assert!(
                    links.left().is_none() && links.right().is_none(),
                    "element is already linked into a tree"
                );
                links.unlink();

                if let Some(tail) = tail {
                    if tail.as_ref().cmp_node(ptr.as_ref()) != Ordering::Less {
                        drop(T::from_ptr(ptr));
                        panic!("elements passed to `from_sorted` must be strictly ascending");
                    }
                }

                set_vine_next(&mut tree.root, tail, Some(ptr));
            }

            tail = Some(ptr);
            tree.count += 1;
        }

        if tree.count > 0 {
            // Safety: `tree.root` is a vine of `tree.count` elements owned by `tree`
            unsafe { vine_to_tree(&mut tree.root, tree.count) };
        }

        tree
    }
}

/// Flattens the tree rooted at `head` into a vine of ascending elements by rotating every left
/// child up, returning the number of elements.
///
/// Elements on the vine have their height reset to `0`.
pub(crate) unsafe fn tree_to_vine<T>(head: &mut Link<T>) -> usize
where
    T: Linked + ?Sized,
{
    let mut tail: Link<T> = None;
    let mut rest = *head;
    let mut size = 0;

    while let Some(node) = rest {
        // Safety: ensured by caller
        unsafe {
            let links = T::links(node).as_ref();

            if let Some(left) = links.left() {
                let left_links = T::links(left).as_ref();
                links.replace_left(left_links.right());
                left_links.replace_right(Some(node));

                rest = Some(left);
                set_vine_next(head, tail, rest);
            } else {
                links.set_height(0);
                size += 1;

                tail = Some(node);
                rest = links.right();
            }
        }
    }

    size
}

/// Folds a vine of `size` elements at `head` into a complete tree.
pub(crate) unsafe fn vine_to_tree<T>(head: &mut Link<T>, size: usize)
where
    T: Linked + ?Sized,
{
    let full = size + 1;
    let leaves = full - (1usize << full.ilog2());

    // Safety: ensured by caller
    unsafe {
        compress(head, leaves);

        let mut remaining = size - leaves;
        while remaining > 1 {
            remaining /= 2;
            compress(head, remaining);
        }

        settle_spine(*head);
    }
}

/// Performs `count` left rotations along the vine, each one moving a vine element down to become
/// the left child of its successor.
unsafe fn compress<T>(head: &mut Link<T>, count: usize)
where
    T: Linked + ?Sized,
{
    let mut scan: Link<T> = None;

    for _ in 0..count {
        // Safety: ensured by caller
        unsafe {
            let Some(child) = vine_next(head, scan) else {
                break;
            };
            let child_links = T::links(child).as_ref();
            let Some(next) = child_links.right() else {
                break;
            };
            let next_links = T::links(next).as_ref();

            set_vine_next(head, scan, Some(next));
            child_links.replace_right(next_links.left());
            next_links.replace_left(Some(child));

            utils::update_height(child);
            utils::update_height(next);

            scan = Some(next);
        }
    }
}

/// Recomputes the heights along the right spine from the bottom up.
///
/// Compression only fixes up the nodes it moves, the nodes that stayed on the spine still see
/// the vine's heights below them.
unsafe fn settle_spine<T>(link: Link<T>)
where
    T: Linked + ?Sized,
{
    let Some(node) = link else {
        return;
    };

    // Safety: ensured by caller
    unsafe {
        settle_spine(T::links(node).as_ref().right());
        utils::update_height(node);
    }
}

/// Returns the element following `scan` on the vine, `scan == None` stands for the vine's head.
unsafe fn vine_next<T>(head: &Link<T>, scan: Link<T>) -> Link<T>
where
    T: Linked + ?Sized,
{
    match scan {
        // Safety: ensured by caller
        Some(scan) => unsafe { T::links(scan).as_ref().right() },
        None => *head,
    }
}

unsafe fn set_vine_next<T>(head: &mut Link<T>, scan: Link<T>, next: Link<T>)
where
    T: Linked + ?Sized,
{
    match scan {
        Some(scan) => {
            // Safety: ensured by caller
            unsafe { T::links(scan).as_ref().replace_right(next) };
        }
        None => *head = next,
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use core::ops::ControlFlow;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use rand::prelude::SliceRandom;

    use super::*;
    use crate::Order;
    use crate::test_utils::{DropCounter, TestEntry, keys, keys_inorder};

    /// Links `1..=n` into a right-leaning vine, bypassing insertion.
    fn vine_of(n: usize) -> AvlTree<TestEntry> {
        let mut tree = AvlTree::new();
        let mut tail = None;
        for value in 1..=n {
            let ptr = TestEntry::into_ptr(TestEntry::new(value));
            // Safety: `ptr` is owned by `tree` from here on
            unsafe { set_vine_next(&mut tree.root, tail, Some(ptr)) };
            tail = Some(ptr);
            tree.count += 1;
        }
        tree
    }

    #[test]
    fn seven_element_vine() {
        let mut tree = vine_of(7);
        assert_eq!(keys_inorder(&tree), (1..=7).collect::<Vec<_>>());

        tree.rebalance();
        tree.assert_valid();

        assert_eq!(tree.height(), 2);
        assert_eq!(tree.root().unwrap().value, 4);
        assert_eq!(keys(&tree, Order::PreOrder), [4, 2, 1, 3, 6, 5, 7]);
    }

    #[test]
    fn minimum_height() {
        for n in 1..=130 {
            let mut tree = vine_of(n);
            tree.rebalance();
            tree.assert_valid();

            assert_eq!(tree.len(), n);
            assert_eq!(tree.height(), i32::try_from(n.ilog2()).unwrap(), "n = {n}");
            assert_eq!(keys_inorder(&tree), (1..=n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn tree_to_vine_flattens() {
        let mut tree: AvlTree<TestEntry> = AvlTree::new();
        for i in [8, 4, 12, 2, 6, 10, 14, 1, 3, 5, 7, 9, 11, 13, 15] {
            tree.insert(TestEntry::new(i)).unwrap();
        }

        // Safety: the tree owns all elements and is restored before it is used again
        unsafe {
            let size = tree_to_vine(&mut tree.root);
            assert_eq!(size, 15);

            let mut expected = 1;
            let mut curr = tree.root;
            while let Some(node) = curr {
                let links = TestEntry::links(node).as_ref();
                assert!(links.left().is_none());
                assert_eq!(node.as_ref().value, expected);
                expected += 1;
                curr = links.right();
            }

            vine_to_tree(&mut tree.root, size);
        }
        tree.assert_valid();
    }

    #[test]
    fn rebalance_is_idempotent() {
        let mut tree: AvlTree<TestEntry> = AvlTree::new();
        let mut nums = (0..1000).collect::<Vec<_>>();
        nums.shuffle(&mut rand::rng());
        for i in nums {
            tree.insert(TestEntry::new(i)).unwrap();
        }

        tree.rebalance();
        tree.assert_valid();
        assert_eq!(tree.height(), 9);
        let shape = keys(&tree, Order::PreOrder);

        tree.rebalance();
        tree.assert_valid();
        assert_eq!(tree.height(), 9);
        assert_eq!(keys(&tree, Order::PreOrder), shape);
    }

    #[test]
    fn operations_after_rebalance() {
        let mut tree = vine_of(100);
        tree.rebalance();

        for i in (1..=100).step_by(3) {
            assert_eq!(tree.remove(&i).unwrap().value, i);
            tree.assert_valid();
        }
        for i in (1..=100).step_by(3) {
            tree.insert(TestEntry::new(i)).unwrap();
            tree.assert_valid();
        }
        assert_eq!(keys_inorder(&tree), (1..=100).collect::<Vec<_>>());
    }

    #[test]
    fn rebalance_empty() {
        let mut tree: AvlTree<TestEntry> = AvlTree::new();
        tree.rebalance();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), -1);
    }

    #[test]
    fn from_sorted() {
        let tree: AvlTree<TestEntry> = AvlTree::from_sorted((0..100).map(TestEntry::new));
        tree.assert_valid();

        assert_eq!(tree.len(), 100);
        assert_eq!(tree.height(), 6);
        for i in 0..100 {
            assert_eq!(tree.find(&i).unwrap().value, i);
        }

        let empty: AvlTree<TestEntry> = AvlTree::from_sorted([]);
        assert!(empty.is_empty());
    }

    #[test]
    fn from_sorted_rejects_unordered() {
        let drops = Cell::new(0);

        let result = catch_unwind(AssertUnwindSafe(|| {
            let handles = [0, 1, 2, 1, 5].map(|i| DropCounter::new(i, &drops));
            AvlTree::<DropCounter<'_>>::from_sorted(handles)
        }));

        assert!(result.is_err());
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn walk_after_from_sorted() {
        let tree: AvlTree<TestEntry> = AvlTree::from_sorted((0..10).map(TestEntry::new));

        let found = tree.revorder(|entry| {
            if entry.value == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(found.map(|entry| entry.value), Some(3));
    }
}
