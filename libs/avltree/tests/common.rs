#![allow(unused, reason = "not used by all tests")]

use std::cmp::Ordering;
use std::fmt;
use std::mem::offset_of;
use std::ops::ControlFlow;
use std::pin::Pin;
use std::ptr::NonNull;

use avltree::{AvlTree, Linked, Links, Order};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

/// A memory area `[addr, addr + size)`, looked up by any address it covers.
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

    /// Returns the height cached in the area's links.
    pub fn height(&self) -> i32 {
        self.links.height()
    }
}

impl fmt::Debug for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Area")
            .field("addr", &self.addr)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

// Safety: elements are only linked through `Pin<Box<Self>>` handles and `Links` is `!Unpin`
unsafe impl Linked for Area {
    type Handle = Pin<Box<Self>>;
    type Key = i64;

    fn into_ptr(handle: Self::Handle) -> NonNull<Self> {
        // Safety: the tree never moves the area out of its allocation
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
        self.addr.cmp(&other.addr)
    }

    fn cmp_key(&self, addr: &i64) -> Ordering {
        if (self.addr..self.addr + self.size).contains(addr) {
            Ordering::Equal
        } else {
            self.addr.cmp(addr)
        }
    }
}

pub fn setup_tracing() -> DefaultGuard {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .set_default()
}

/// Builds a tree of unit sized areas by inserting `addrs` in order.
pub fn tree_of(addrs: impl IntoIterator<Item = i64>) -> AvlTree<Area> {
    let mut tree = AvlTree::new();
    for addr in addrs {
        tracing::debug!("inserting area {addr}");
        tree.insert(Area::new(addr, 1)).unwrap();
        tree.assert_valid();
    }
    tree
}

pub fn addrs(tree: &AvlTree<Area>, order: Order) -> Vec<i64> {
    let mut addrs = Vec::with_capacity(tree.len());
    tree.walk(order, |area| {
        addrs.push(area.addr);
        ControlFlow::Continue(())
    });
    addrs
}
