// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use core::cmp::Ordering;
use core::fmt;
use core::mem::offset_of;
use core::pin::Pin;
use core::ptr::NonNull;

use avltree::{Linked, Links};

/// A region of the address space `[addr, addr + size)`.
pub struct Area {
    pub addr: i64,
    pub size: i64,
    links: Links<Self>,
}

impl Area {
    pub fn new(addr: i64, size: i64) -> Pin<Box<Self>> {
        Box::pin(Self {
            addr,
            size,
            links: Links::new(),
        })
    }

    pub fn height(&self) -> i32 {
        self.links.height()
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Area addr={} height={}", self.addr, self.height())
    }
}

impl fmt::Debug for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Area")
            .field("addr", &self.addr)
            .field("size", &self.size)
            .field("links", &self.links)
            .finish()
    }
}

impl Drop for Area {
    fn drop(&mut self) {
        tracing::trace!(addr = self.addr, "freeing area");
    }
}

// Safety: areas are only ever linked through `Pin<Box<Area>>` handles and `Links` is `!Unpin`
unsafe impl Linked for Area {
    type Handle = Pin<Box<Self>>;
    type Key = i64;

    fn into_ptr(handle: Self::Handle) -> NonNull<Self> {
        // Safety: the tree never moves the area out of its allocation
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
        self.addr.cmp(&other.addr)
    }

    /// An area matches every address it covers.
    fn cmp_key(&self, addr: &i64) -> Ordering {
        if (self.addr..self.addr + self.size).contains(addr) {
            Ordering::Equal
        } else {
            self.addr.cmp(addr)
        }
    }
}
