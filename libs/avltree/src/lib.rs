// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # An intrusive AVL Tree.
//!
//! A Rust implementation of height-balanced AVL trees whose nodes are *intrusive*, meaning node
//! data (pointers to the children and the cached subtree height) is stored _within_ participating
//! values rather than being allocated and owned by the tree itself.
//!
//! AVL trees keep the heights of the two subtrees of every node within one of each other, which
//! bounds the tree height to ~1.44log2(n). Insertions and deletions restore that rule with
//! rotations on the way back up from the modified leaf, so every operation besides
//! [`AvlTree::rebalance`] and [`AvlTree::clear`] completes in logarithmic time.
//!
//! In addition to per-operation balancing, the tree can be rebuilt into a minimum-height shape in
//! O(n) time and O(1) space using the [Day-Stout-Warren algorithm][dsw] which is useful after bulk
//! loading (see [`AvlTree::from_sorted`]).
//!
//! This crate is self-contained and fully `no_std`. The tree never allocates, elements are handed
//! in and out as owning [`Linked::Handle`]s.
//!
//! ## when to use this
//!
//! - **want binary search** - AVL trees are *sorted* collections that are efficient to search.
//! - **want range lookups** - lookups go through [`Linked::cmp_key`], which is free to report a
//!   match for any key that falls *within* an element, e.g. an address inside a memory region.
//! - **want to avoid hidden allocations** - Because node data is stored _inside_ participating
//!   values, an element can be added without requiring additional heap allocations.
//!
//! ## when not to use this
//!
//! - **need to store primitives** - Intrusive collections require elements to store the node
//!   data, which excludes primitives such as strings or numbers, since they can't hold this
//!   metadata.
//! - **can't use unsafe** - Both this implementation and code consuming it require `unsafe`, the
//!   `Linked` trait is unsafe to implement since it requires implementors uphold special
//!   invariants.
//! - **need to share it between threads** - the tree does no synchronization of its own.
//!
//! ## features
//!
//! The following features are available:
//!
//! | Feature | Default | Explanation                                                                             |
//! |:--------|:--------|:----------------------------------------------------------------------------------------|
//! | `dot`   | `false` | Enables the `AvlTree::dot` method, which allows display of the tree in [graphviz format] |
//!
//! [dsw]: https://en.wikipedia.org/wiki/Day%E2%80%93Stout%E2%80%93Warren_algorithm
//! [graphviz format]: https://graphviz.org/doc/info/lang.html

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "dot")]
mod dot;
mod dsw;
mod error;
#[cfg(test)]
mod test_utils;
mod utils;
mod walk;

use core::cell::UnsafeCell;
use core::cmp::Ordering;
use core::marker::PhantomPinned;
use core::ptr::NonNull;
use core::{fmt, mem, ptr};

#[cfg(feature = "dot")]
pub use dot::Dot;
pub use error::DuplicateKey;
pub use walk::Order;

use crate::utils::Side;

/// Trait implemented by types which can be members of an [intrusive AVL tree][AvlTree].
///
/// In order to be part of an intrusive AVL tree, a type must contain a `Links` type that stores
/// the pointers to other nodes in the tree.
///
/// # Safety
///
/// This is unsafe to implement because it's the implementation's responsibility to ensure that
/// types implementing this trait are valid intrusive collection nodes. In particular:
///
/// - Implementations **must** ensure that implementors are pinned in memory while they are in an
///   intrusive collection. While a given `Linked` type is in an intrusive data structure, it may
///   not be deallocated or moved to a different memory location.
/// - The type implementing this trait **must not** implement [`Unpin`].
/// - [`Linked::cmp_node`] **must** implement a strict total order and [`Linked::cmp_key`] **must**
///   be consistent with it, otherwise lookups and removals will miss elements.
/// - Additional safety requirements for individual methods on this trait are documented on those
///   methods.
///
/// Failure to uphold these invariants will result in corruption of the intrusive data structure,
/// including dangling pointers.
///
/// # Implementing `Linked::links`
///
/// The [`Linked::links`] method provides access to a `Linked` type's `Links` field through a
/// [`NonNull`] pointer. It must be implemented *without* creating a temporary reference to the
/// element, the recommended way is to offset the pointer by the field's position:
///
/// ```
/// use core::cmp::Ordering;
/// use core::mem::offset_of;
/// use core::pin::Pin;
/// use core::ptr::NonNull;
/// use avltree::{Linked, Links};
///
/// struct Area {
///     links: Links<Self>,
///     addr: u64,
///     size: u64,
/// }
///
/// unsafe impl Linked for Area {
///     type Handle = Pin<Box<Self>>;
///     type Key = u64;
///
///     fn into_ptr(handle: Self::Handle) -> NonNull<Self> {
///         unsafe { NonNull::from(Box::leak(Pin::into_inner_unchecked(handle))) }
///     }
///
///     unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
///         unsafe { Pin::new_unchecked(Box::from_raw(ptr.as_ptr())) }
///     }
///
///     unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Self>> {
///         ptr.map_addr(|addr| addr.checked_add(offset_of!(Self, links)).unwrap())
///             .cast()
///     }
///
///     fn cmp_node(&self, other: &Self) -> Ordering {
///         self.addr.cmp(&other.addr)
///     }
///
///     /// An area matches every address it covers.
///     fn cmp_key(&self, addr: &u64) -> Ordering {
///         if (self.addr..self.addr + self.size).contains(addr) {
///             Ordering::Equal
///         } else {
///             self.addr.cmp(addr)
///         }
///     }
/// }
/// ```
///
/// [`Unpin`]: Unpin
pub unsafe trait Linked {
    /// The handle owning nodes in the tree.
    ///
    /// This type must have ownership over a `Self`-typed value. When a `Handle` is dropped, it
    /// should drop the corresponding `Linked` type. Dropping handles is how the tree releases
    /// elements in [`AvlTree::clear`], making `Drop` of the handle the tree's destructor hook.
    ///
    /// A quintessential example of a `Handle` is `Pin<Box<Self>>`.
    type Handle;

    /// The type of keys elements can be looked up by, see [`Linked::cmp_key`].
    type Key: ?Sized;

    /// Convert a [`Self::Handle`] to a raw pointer to `Self`, taking ownership of it in the
    /// process.
    fn into_ptr(r: Self::Handle) -> NonNull<Self>;

    /// Convert a raw pointer to Self into an owning Self::Handle.
    ///
    /// # Safety
    ///
    /// This function is safe to call when:
    /// - It is valid to construct a `Self::Handle` from a raw pointer
    /// - The pointer points to a valid instance of `Self` (e.g. it does not dangle).
    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle;

    /// Return the links of the node pointed to by `ptr`.
    ///
    /// # Safety
    ///
    /// This function is safe to call when the pointer points to a valid instance of `Self`.
    /// See the [the trait-level documentation](#implementing-linkedlinks) for details on how to
    /// correctly implement this method.
    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Self>>;

    /// Compares this element (already part of the tree) against `other`.
    ///
    /// Used to position new elements in [`AvlTree::insert`] and to locate elements in
    /// [`AvlTree::remove_node`]. Returning [`Ordering::Equal`] means both elements are the same
    /// tree entry.
    fn cmp_node(&self, other: &Self) -> Ordering;

    /// Compares this element against a lookup `key`.
    ///
    /// [`Ordering::Equal`] means the element matches the key, [`Ordering::Less`] means the key
    /// is found to the right of this element and [`Ordering::Greater`] to the left. Elements are
    /// free to match a whole range of keys as long as the ranges of different elements don't
    /// overlap.
    fn cmp_key(&self, key: &Self::Key) -> Ordering;
}

type Link<T> = Option<NonNull<T>>;

/// The outcome of a recursive insertion or removal step.
struct Spliced<T: ?Sized> {
    /// The (possibly rotated) root of the subtree the step operated on.
    root: Link<T>,
    /// The element that was linked or unlinked, if any.
    target: Link<T>,
}

/// An intrusive AVL Tree.
///
/// This data structure supports efficient O(log n) lookup of elements and may be used for binary
/// search. Insertions, lookups and removals complete in logarithmic time while [`Self::rebalance`]
/// rebuilds the whole tree into its minimum height in linear time.
///
/// Elements are ordered by [`Linked::cmp_node`] and looked up by [`Linked::cmp_key`].
pub struct AvlTree<T>
where
    T: Linked + ?Sized,
{
    pub(crate) root: Link<T>,
    count: usize,
}

impl<T> Drop for AvlTree<T>
where
    T: Linked + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for AvlTree<T>
where
    T: Linked + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for AvlTree<T>
where
    T: Linked + fmt::Debug + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        self.inorder(|element| {
            list.entry(&element);
            core::ops::ControlFlow::Continue(())
        });
        list.finish()
    }
}

impl<T> AvlTree<T>
where
    T: Linked + ?Sized,
{
    /// Creates a new, empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            count: 0,
        }
    }

    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the tree contains no entries.
    pub fn is_empty(&self) -> bool {
        debug_assert_eq!(self.root.is_none(), self.count == 0);
        self.count == 0
    }

    /// Returns the height of the tree, `-1` if it is empty and `0` if it consists of a single
    /// element.
    pub fn height(&self) -> i32 {
        // Safety: all links reachable from the root point to elements owned by this tree
        unsafe { utils::height(self.root) }
    }

    /// Returns the root element of the tree.
    pub fn root(&self) -> Option<&T> {
        // Safety: the root is owned by this tree and lives as long as `self` is borrowed
        self.root.map(|root| unsafe { root.as_ref() })
    }

    /// Returns the left and right children of `element`, which must be part of this tree.
    ///
    /// This gives read-only access to the shape of the tree, e.g. for printing it.
    pub fn children(&self, element: &T) -> (Option<&T>, Option<&T>) {
        // Safety: `element` belongs to this tree, so its children do too and are kept alive by
        // the shared borrow of `self`
        unsafe {
            let links = T::links(NonNull::from(element)).as_ref();
            (
                links.left().map(|left| left.as_ref()),
                links.right().map(|right| right.as_ref()),
            )
        }
    }

    /// Returns the element matching `key`, see [`Linked::cmp_key`].
    pub fn find(&self, key: &T::Key) -> Option<&T> {
        // Safety: the returned pointer is owned by this tree and `self` stays borrowed
        self.find_ptr(key).map(|ptr| unsafe { ptr.as_ref() })
    }

    /// Returns a raw pointer to the element matching `key`.
    ///
    /// The pointer stays valid for as long as the element remains in the tree, which makes it
    /// suitable for later handing the element to [`Self::remove_node`].
    pub fn find_ptr(&self, key: &T::Key) -> Option<NonNull<T>> {
        let mut tree = self.root;
        while let Some(curr) = tree {
            // Safety: all links reachable from the root point to elements owned by this tree
            unsafe {
                match curr.as_ref().cmp_key(key) {
                    Ordering::Equal => return Some(curr),
                    Ordering::Less => tree = T::links(curr).as_ref().right(),
                    Ordering::Greater => tree = T::links(curr).as_ref().left(),
                }
            }
        }

        None
    }

    /// Insert a new entry into the `AvlTree`, returning a reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKey`] carrying the rejected handle if an entry comparing equal is
    /// already part of the tree. The tree is not modified in that case.
    ///
    /// # Panics
    ///
    /// Panics if the new entry still has children, i.e. it is linked into a different tree.
    pub fn insert(&mut self, element: T::Handle) -> Result<&T, DuplicateKey<T::Handle>> {
        let ptr = T::into_ptr(element);

        // Safety: `ptr` was just created from an owning handle, everything else is owned by us
        unsafe {
            let links = T::links(ptr).as_ref();
            assert!(
                links.left().is_none() && links.right().is_none(),
                "element is already linked into a tree"
            );

            let spliced = Self::insert_at(self.root, ptr);
            self.root = spliced.root;

            match spliced.target {
                Some(target) => {
                    debug_assert!(ptr::addr_eq(target.as_ptr(), ptr.as_ptr()));
                    self.count += 1;
                    Ok(target.as_ref())
                }
                None => {
                    tracing::trace!("refusing to insert duplicate element {ptr:?}");
                    Err(DuplicateKey::new(T::from_ptr(ptr)))
                }
            }
        }
    }

    /// Removes an entry - identified by the given key - from the tree, returning the owned handle
    /// if a matching entry was part of the tree.
    ///
    /// The element's destructor is *not* run, ownership passes back to the caller.
    pub fn remove(&mut self, key: &T::Key) -> Option<T::Handle> {
        // Safety: all links reachable from the root point to elements owned by this tree
        unsafe { self.remove_by(&|node: &T| node.cmp_key(key)) }
    }

    /// Removes the entry comparing equal to `element` (see [`Linked::cmp_node`]) from the tree,
    /// returning the owned handle if it was part of the tree.
    ///
    /// This is meant for callers that already hold the element, e.g. through [`Self::find_ptr`],
    /// and want to remove it without going through its key.
    pub fn remove_node(&mut self, element: &T) -> Option<T::Handle> {
        // Safety: all links reachable from the root point to elements owned by this tree
        unsafe { self.remove_by(&|node: &T| node.cmp_node(element)) }
    }

    /// Removes all elements from the tree.
    ///
    /// This unlinks every entry and drops its handle exactly once. The tree is flattened first so
    /// teardown needs no extra space regardless of its shape.
    pub fn clear(&mut self) {
        let mut vine = self.root.take();
        // Safety: all links reachable from the root point to elements owned by this tree
        let size = unsafe { dsw::tree_to_vine(&mut vine) };
        debug_assert_eq!(size, self.count);
        tracing::debug!("releasing {size} elements");

        self.count = 0;
        while let Some(node) = vine {
            // Safety: the vine holds every element exactly once and none is visited twice
            unsafe {
                let links = T::links(node).as_ref();
                vine = links.right();
                links.unlink();
                drop(T::from_ptr(node));
            }
        }
    }

    /// Asserts as many of the tree's invariants as possible.
    ///
    /// This checks the ordering of all elements, the cached heights, the AVL balance rule at
    /// every node and the element count. The check takes linear time.
    ///
    /// # Panics
    ///
    /// Panics if any invariant is violated.
    #[track_caller]
    pub fn assert_valid(&self) {
        // Safety: all links reachable from the root point to elements owned by this tree
        let (height, count) = unsafe { Self::assert_valid_inner(self.root, None, None) };

        assert_eq!(
            height,
            self.height(),
            "cached tree height does not match the actual height"
        );
        assert_eq!(
            count, self.count,
            "element count does not match the number of reachable elements"
        );
    }

    /// Validates the subtree at `node` whose elements must all lie strictly between `lower` and
    /// `upper`, returning its actual height and size.
    #[track_caller]
    unsafe fn assert_valid_inner(
        node: Link<T>,
        lower: Option<NonNull<T>>,
        upper: Option<NonNull<T>>,
    ) -> (i32, usize) {
        let Some(node) = node else {
            return (-1, 0);
        };

        // Safety: ensured by caller
        unsafe {
            let node_links = T::links(node).as_ref();
            node_links.assert_valid();

            if let Some(lower) = lower {
                assert_eq!(
                    lower.as_ref().cmp_node(node.as_ref()),
                    Ordering::Less,
                    "Ordering violation: {node:?} is not greater than its lower bound {lower:?}"
                );
            }
            if let Some(upper) = upper {
                assert_eq!(
                    upper.as_ref().cmp_node(node.as_ref()),
                    Ordering::Greater,
                    "Ordering violation: {node:?} is not less than its upper bound {upper:?}"
                );
            }

            let (left_height, left_count) =
                Self::assert_valid_inner(node_links.left(), lower, Some(node));
            let (right_height, right_count) =
                Self::assert_valid_inner(node_links.right(), Some(node), upper);

            let height = left_height.max(right_height) + 1;
            assert_eq!(
                node_links.height(),
                height,
                "cached height of {node:?} is stale: {node_links:#?}"
            );
            assert!(
                (left_height - right_height).abs() <= 1,
                "AVL rule violation at {node:?}: subtree heights are {left_height} and {right_height}"
            );

            (height, left_count + right_count + 1)
        }
    }

    /// Returns a graphviz renderer for the tree.
    #[cfg(feature = "dot")]
    pub fn dot(&self) -> Dot<'_, T> {
        Dot { tree: self }
    }

    unsafe fn insert_at(subtree: Link<T>, node: NonNull<T>) -> Spliced<T> {
        let Some(p) = subtree else {
            // Safety: ensured by caller
            unsafe { T::links(node).as_ref().unlink() };
            return Spliced {
                root: Some(node),
                target: Some(node),
            };
        };

        // Safety: ensured by caller
        unsafe {
            let side = match p.as_ref().cmp_node(node.as_ref()) {
                Ordering::Equal => {
                    return Spliced {
                        root: Some(p),
                        target: None,
                    };
                }
                Ordering::Greater => Side::Left,
                Ordering::Less => Side::Right,
            };

            let p_links = T::links(p).as_ref();
            let spliced = Self::insert_at(p_links.child(side), node);
            p_links.replace_child(side, spliced.root);

            // The new node either went to the outer grandchild of `p` in which case a single
            // rotation restores the balance, or to the inner one which needs a double rotation.
            let outer = match side {
                Side::Left => Ordering::Greater,
                Side::Right => Ordering::Less,
            };
            let heavy = match side {
                Side::Left => utils::balance(p) > 1,
                Side::Right => utils::balance(p) < -1,
            };

            let root = if heavy {
                match p_links.child(side) {
                    Some(child) if child.as_ref().cmp_node(node.as_ref()) == outer => {
                        utils::rotate(p, side.opposite())
                    }
                    _ => utils::double_rotate(p, side.opposite()),
                }
            } else {
                p
            };
            utils::update_height(root);

            Spliced {
                root: Some(root),
                target: spliced.target,
            }
        }
    }

    unsafe fn remove_by(&mut self, cmp: &dyn Fn(&T) -> Ordering) -> Option<T::Handle> {
        // Safety: ensured by caller
        let spliced = unsafe { Self::remove_at(self.root, cmp) };
        self.root = spliced.root;

        let target = spliced.target?;
        self.count -= 1;
        // Safety: the target was unlinked and we own it
        Some(unsafe { T::from_ptr(target) })
    }

    /// Removes the element for which `cmp` returns [`Ordering::Equal`] from the subtree at
    /// `subtree`.
    unsafe fn remove_at(subtree: Link<T>, cmp: &dyn Fn(&T) -> Ordering) -> Spliced<T> {
        let Some(p) = subtree else {
            return Spliced {
                root: None,
                target: None,
            };
        };

        // Safety: ensured by caller
        unsafe {
            let ordering = cmp(p.as_ref());
            let p_links = T::links(p).as_ref();

            let (root, target) = match ordering {
                Ordering::Greater => {
                    let spliced = Self::remove_at(p_links.left(), cmp);
                    p_links.replace_left(spliced.root);
                    (p, spliced.target)
                }
                Ordering::Less => {
                    let spliced = Self::remove_at(p_links.right(), cmp);
                    p_links.replace_right(spliced.root);
                    (p, spliced.target)
                }
                Ordering::Equal => {
                    let replacement = match (p_links.left(), p_links.right()) {
                        (left, None) => left,
                        (None, right) => right,
                        (Some(left), Some(right)) => Some(Self::splice_successor(left, right)),
                    };
                    p_links.unlink();

                    let Some(replacement) = replacement else {
                        return Spliced {
                            root: None,
                            target: Some(p),
                        };
                    };
                    (replacement, Some(p))
                }
            };

            Spliced {
                root: Some(utils::rebalance(root)),
                target,
            }
        }
    }

    /// Unlinks the in-order successor of a node with the given children from `right` and gives
    /// it both subtrees, returning the successor as the replacement for the removed node.
    unsafe fn splice_successor(left: NonNull<T>, right: NonNull<T>) -> NonNull<T> {
        // Safety: ensured by caller
        unsafe {
            let successor = utils::find_minimum(right);
            let successor_ref = successor.as_ref();

            let spliced = Self::remove_at(Some(right), &|node: &T| node.cmp_node(successor_ref));
            debug_assert!(
                spliced
                    .target
                    .is_some_and(|target| ptr::addr_eq(target.as_ptr(), successor.as_ptr())),
                "removing the in-order successor {successor:?} unlinked the wrong node"
            );

            let successor_links = T::links(successor).as_ref();
            successor_links.replace_left(Some(left));
            successor_links.replace_right(spliced.root);

            successor
        }
    }
}

/// Links to other nodes in an [`AvlTree`].
///
/// In order to be part of an [`AvlTree`], a type must contain an instance of this type, and must
/// implement the [`Linked`] trait.
///
/// Next to the child pointers, `Links` cache the height of the subtree rooted at their element.
pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

struct LinksInner<T: ?Sized> {
    left: Link<T>,
    right: Link<T>,
    height: i32,
    /// Links must always be `!Unpin`, in order to ensure that they never receive LLVM `noalias`
    /// annotations; see also <https://github.com/rust-lang/rust/issues/63818>.
    _unpin: PhantomPinned,
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("self", &format_args!("{self:p}"))
            .field("height", &self.height())
            .field("left", &self.left())
            .field("right", &self.right())
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized> Links<T> {
    /// Returns new links for an [AVL tree][AvlTree].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                left: None,
                right: None,
                // nodes start out as leaves
                height: 0,
                _unpin: PhantomPinned,
            }),
        }
    }

    /// Returns the cached height of the subtree rooted at this node, `0` for a leaf.
    pub fn height(&self) -> i32 {
        // Safety: the tree never hands out references into `inner`
        unsafe { (*self.inner.get()).height }
    }

    /// Resets this node to an unlinked leaf.
    ///
    /// Calling this on a node with children that are still part of a tree leaks them out of the
    /// tree, callers must have moved the children elsewhere.
    fn unlink(&self) {
        // Safety: the tree never hands out references into `inner`
        let inner = unsafe { &mut *self.inner.get() };
        inner.left = None;
        inner.right = None;
        inner.height = 0;
    }

    #[inline]
    fn set_height(&self, height: i32) {
        // Safety: the tree never hands out references into `inner`
        unsafe { (*self.inner.get()).height = height };
    }

    #[inline]
    pub(crate) fn left(&self) -> Link<T> {
        // Safety: the tree never hands out references into `inner`
        unsafe { (*self.inner.get()).left }
    }
    #[inline]
    pub(crate) fn right(&self) -> Link<T> {
        // Safety: the tree never hands out references into `inner`
        unsafe { (*self.inner.get()).right }
    }

    #[inline]
    fn replace_left(&self, lk: Link<T>) -> Link<T> {
        // Safety: the tree never hands out references into `inner`
        unsafe { mem::replace(&mut (*self.inner.get()).left, lk) }
    }
    #[inline]
    fn replace_right(&self, lk: Link<T>) -> Link<T> {
        // Safety: the tree never hands out references into `inner`
        unsafe { mem::replace(&mut (*self.inner.get()).right, lk) }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Link<T> {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }
    #[inline]
    fn replace_child(&self, side: Side, child: Link<T>) -> Link<T> {
        match side {
            Side::Left => self.replace_left(child),
            Side::Right => self.replace_right(child),
        }
    }

    /// Asserts as many invariants about this particular node as possible.
    ///
    /// # Panics
    ///
    /// Panics if the node links to itself, links the same child twice or caches a negative
    /// height.
    #[track_caller]
    pub fn assert_valid(&self)
    where
        T: Linked,
    {
        if let Some(left) = self.left() {
            assert_ne!(
                // Safety: the links of a linked node point to valid elements
                unsafe { T::links(left) },
                NonNull::from(self),
                "node's left child cannot be itself; node={self:#?}"
            );
        }

        if let Some(right) = self.right() {
            assert_ne!(
                // Safety: the links of a linked node point to valid elements
                unsafe { T::links(right) },
                NonNull::from(self),
                "node's right child cannot be itself; node={self:#?}"
            );
        }

        if let (Some(left), Some(right)) = (self.left(), self.right()) {
            assert_ne!(
                // Safety: the links of a linked node point to valid elements
                unsafe { T::links(left) },
                // Safety: the links of a linked node point to valid elements
                unsafe { T::links(right) },
                "node's left and right children cannot be the same; node={self:#?}"
            );
        }

        assert!(
            self.height() >= 0,
            "node height cannot be negative; node={self:#?}"
        );
    }
}
