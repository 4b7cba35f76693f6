#![no_main]

use std::cmp::Ordering;
use std::fmt;
use std::mem::offset_of;
use std::pin::Pin;
use std::ptr::NonNull;

use avltree::{AvlTree, Linked, Links};
use libfuzzer_sys::fuzz_target;

struct TestEntry {
    value: u16,
    links: Links<Self>,
}
impl TestEntry {
    pub fn new(value: u16) -> Pin<Box<Self>> {
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
    type Key = u16;
    fn into_ptr(handle: Self::Handle) -> NonNull<Self> {
        // Safety: the tree never moves the element out of its allocation
        unsafe { NonNull::from(Box::leak(Pin::into_inner_unchecked(handle))) }
    }
    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        // Safety: `NonNull` *must* be constructed from a pinned reference
        // which the tree implementation upholds.
        unsafe { Pin::new_unchecked(Box::from_raw(ptr.as_ptr())) }
    }
    unsafe fn links(target: NonNull<Self>) -> NonNull<Links<TestEntry>> {
        target
            .map_addr(|addr| {
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

fuzz_target!(|inserts_removals: (Vec<u16>, Vec<u16>, bool)| {
    let (inserts, removals, rebalance) = inserts_removals;
    let mut tree: AvlTree<TestEntry> = AvlTree::new();

    for i in inserts {
        let _ = tree.insert(TestEntry::new(i));
        tree.assert_valid();
    }

    if rebalance {
        tree.rebalance();
        tree.assert_valid();
    }

    for i in removals {
        if let Some(entry) = tree.remove(&i) {
            assert_eq!(entry.value, i);
        }
        tree.assert_valid();
    }
});
