// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use core::ops::ControlFlow;

use crate::{AvlTree, Link, Linked};

/// The order in which [`AvlTree::walk`] visits elements.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Order {
    /// Left subtree, element, right subtree. Visits elements in ascending order.
    InOrder,
    /// Element, left subtree, right subtree. Visits parents before their children.
    PreOrder,
    /// Right subtree, element, left subtree. Visits elements in descending order.
    ReverseOrder,
}

impl<T> AvlTree<T>
where
    T: Linked + ?Sized,
{
    /// Calls `f` on every element of the tree in the given `order` until it returns
    /// [`ControlFlow::Break`].
    ///
    /// Returns the element the walk stopped at, or `None` if `f` visited every element (or the
    /// tree is empty).
    pub fn walk<F>(&self, order: Order, mut f: F) -> Option<&T>
    where
        F: FnMut(&T) -> ControlFlow<()>,
    {
        // Safety: all links reachable from the root point to elements owned by this tree and
        // the shared borrow of `self` keeps them alive and in place
        unsafe { walk_inner(self.root, order, &mut f).map(|node| node.as_ref()) }
    }

    /// Walks the tree in ascending order, see [`Self::walk`].
    pub fn inorder<F>(&self, f: F) -> Option<&T>
    where
        F: FnMut(&T) -> ControlFlow<()>,
    {
        self.walk(Order::InOrder, f)
    }

    /// Walks the tree parents-first, see [`Self::walk`].
    pub fn preorder<F>(&self, f: F) -> Option<&T>
    where
        F: FnMut(&T) -> ControlFlow<()>,
    {
        self.walk(Order::PreOrder, f)
    }

    /// Walks the tree in descending order, see [`Self::walk`].
    pub fn revorder<F>(&self, f: F) -> Option<&T>
    where
        F: FnMut(&T) -> ControlFlow<()>,
    {
        self.walk(Order::ReverseOrder, f)
    }
}

unsafe fn walk_inner<T, F>(link: Link<T>, order: Order, f: &mut F) -> Link<T>
where
    T: Linked + ?Sized,
    F: FnMut(&T) -> ControlFlow<()>,
{
    let node = link?;

    // Safety: ensured by caller
    unsafe {
        let links = T::links(node).as_ref();
        let (first, second) = match order {
            Order::InOrder | Order::PreOrder => (links.left(), links.right()),
            Order::ReverseOrder => (links.right(), links.left()),
        };

        if order == Order::PreOrder && f(node.as_ref()).is_break() {
            return Some(node);
        }

        if let Some(found) = walk_inner(first, order, f) {
            return Some(found);
        }

        if order != Order::PreOrder && f(node.as_ref()).is_break() {
            return Some(node);
        }

        walk_inner(second, order, f)
    }
}
