// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use core::cell::Cell;
use core::cmp::Ordering;
use core::fmt;
use core::mem::offset_of;
use core::ops::ControlFlow;
use core::pin::Pin;
use core::ptr::NonNull;

use crate::{AvlTree, Linked, Links, Order};

#[derive(Default)]
pub struct TestEntry {
    pub value: usize,
    pub links: Links<Self>,
}

impl TestEntry {
    pub fn new(value: usize) -> Pin<Box<Self>> {
        Box::pin(Self {
            value,
            links: Links::new(),
        })
    }
}

impl fmt::Debug for TestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestEntry")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

// Safety: elements are only linked through `Pin<Box<Self>>` handles and `Links` is `!Unpin`
unsafe impl Linked for TestEntry {
    type Handle = Pin<Box<Self>>;
    type Key = usize;

    fn into_ptr(handle: Self::Handle) -> NonNull<Self> {
        // Safety: the tree never moves the element out of its allocation
        unsafe { NonNull::from(Box::leak(Pin::into_inner_unchecked(handle))) }
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        // Safety: `NonNull` *must* be constructed from a pinned reference
        // which the tree implementation upholds.
        unsafe { Pin::new_unchecked(Box::from_raw(ptr.as_ptr())) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Self>> {
        ptr.map_addr(|addr| {
            let offset = offset_of!(Self, links);
            addr.checked_add(offset).unwrap()
        })
        .cast()
    }

    fn cmp_node(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }

    fn cmp_key(&self, key: &Self::Key) -> Ordering {
        self.value.cmp(key)
    }
}

/// An entry that counts how often it has been dropped.
pub struct DropCounter<'a> {
    value: usize,
    drops: &'a Cell<usize>,
    links: Links<Self>,
}

impl<'a> DropCounter<'a> {
    pub fn new(value: usize, drops: &'a Cell<usize>) -> Pin<Box<Self>> {
        Box::pin(Self {
            value,
            drops,
            links: Links::new(),
        })
    }
}

impl Drop for DropCounter<'_> {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

// Safety: elements are only linked through `Pin<Box<Self>>` handles and `Links` is `!Unpin`
unsafe impl Linked for DropCounter<'_> {
    type Handle = Pin<Box<Self>>;
    type Key = usize;

    fn into_ptr(handle: Self::Handle) -> NonNull<Self> {
        // Safety: the tree never moves the element out of its allocation
        unsafe { NonNull::from(Box::leak(Pin::into_inner_unchecked(handle))) }
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        // Safety: ensured by caller
        unsafe { Pin::new_unchecked(Box::from_raw(ptr.as_ptr())) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Self>> {
        ptr.map_addr(|addr| {
            let offset = offset_of!(Self, links);
            addr.checked_add(offset).unwrap()
        })
        .cast()
    }

    fn cmp_node(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }

    fn cmp_key(&self, key: &Self::Key) -> Ordering {
        self.value.cmp(key)
    }
}

pub fn keys(tree: &AvlTree<TestEntry>, order: Order) -> Vec<usize> {
    let mut keys = Vec::with_capacity(tree.len());
    tree.walk(order, |entry| {
        keys.push(entry.value);
        ControlFlow::Continue(())
    });
    keys
}

pub fn keys_inorder(tree: &AvlTree<TestEntry>) -> Vec<usize> {
    keys(tree, Order::InOrder)
}
