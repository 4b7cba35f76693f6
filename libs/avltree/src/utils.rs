// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use core::fmt;
use core::ptr::NonNull;

use crate::{Link, Linked};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

impl Side {
    pub(crate) fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Returns the cached height of the subtree at `link`, `-1` for an empty subtree.
pub unsafe fn height<T: Linked + ?Sized>(link: Link<T>) -> i32 {
    // Safety: ensured by caller
    link.map_or(-1, |node| unsafe { T::links(node).as_ref().height() })
}

/// Returns the balance factor `height(left) - height(right)` of `node`.
pub unsafe fn balance<T: Linked + ?Sized>(node: NonNull<T>) -> i32 {
    // Safety: ensured by caller
    unsafe {
        let links = T::links(node).as_ref();
        height(links.left()) - height(links.right())
    }
}

/// Like [`balance`] but an empty subtree counts as balanced.
pub unsafe fn link_balance<T: Linked + ?Sized>(link: Link<T>) -> i32 {
    // Safety: ensured by caller
    link.map_or(0, |node| unsafe { balance(node) })
}

/// Recomputes the cached height of `node` from the cached heights of its children.
pub unsafe fn update_height<T: Linked + ?Sized>(node: NonNull<T>) {
    // Safety: ensured by caller
    unsafe {
        let links = T::links(node).as_ref();
        links.set_height(height(links.left()).max(height(links.right())) + 1);
    }
}

/// Rotates the subtree rooted at `p` towards `side`, returning the new subtree root.
///
/// The child of `p` on the opposite side is promoted, `p` becomes its `side`-child and the
/// promoted node's inner subtree moves over to `p`. Only the heights of the two nodes involved
/// are recomputed, `p` first since it ends up below the promoted node.
pub unsafe fn rotate<T: Linked + ?Sized>(p: NonNull<T>, side: Side) -> NonNull<T> {
    // Safety: ensured by caller
    unsafe {
        let p_links = T::links(p).as_ref();
        let pivot = p_links
            .child(side.opposite())
            .expect("rotation requires a child to promote");
        let pivot_links = T::links(pivot).as_ref();

        tracing::trace!("rotating {side} at {p:?}, promoting {pivot:?}");

        p_links.replace_child(side.opposite(), pivot_links.child(side));
        pivot_links.replace_child(side, Some(p));

        update_height(p);
        update_height(pivot);

        pivot
    }
}

/// Performs a double rotation at `p` towards `side`.
///
/// For `Side::Right` this is the left-right rotation (left rotation of `p.left`, then right
/// rotation of `p`), for `Side::Left` the mirrored right-left rotation.
pub unsafe fn double_rotate<T: Linked + ?Sized>(p: NonNull<T>, side: Side) -> NonNull<T> {
    // Safety: ensured by caller
    unsafe {
        let p_links = T::links(p).as_ref();
        let child = p_links
            .child(side.opposite())
            .expect("double rotation requires an inner child");

        p_links.replace_child(side.opposite(), Some(rotate(child, side.opposite())));
        rotate(p, side)
    }
}

/// Recomputes the height of `node` and restores the AVL balance rule after one of its subtrees
/// shrank by one level, returning the new subtree root.
///
/// The rotation is chosen from the balance factor of the heavy child.
pub unsafe fn rebalance<T: Linked + ?Sized>(node: NonNull<T>) -> NonNull<T> {
    // Safety: ensured by caller
    unsafe {
        update_height(node);

        let links = T::links(node).as_ref();
        let balance = balance(node);

        let root = if balance > 1 {
            if link_balance(links.left()) >= 0 {
                rotate(node, Side::Right)
            } else {
                double_rotate(node, Side::Right)
            }
        } else if balance < -1 {
            if link_balance(links.right()) <= 0 {
                rotate(node, Side::Left)
            } else {
                double_rotate(node, Side::Left)
            }
        } else {
            node
        };

        debug_assert!(
            self::balance(root).abs() <= 1,
            "AVL rule violation after rebalancing {root:?}: balance factor {}",
            self::balance(root)
        );

        root
    }
}

pub unsafe fn find_minimum<T: Linked + ?Sized>(mut curr: NonNull<T>) -> NonNull<T> {
    // Safety: ensured by caller
    while let Some(left) = unsafe { T::links(curr).as_ref().left() } {
        curr = left;
    }

    curr
}
