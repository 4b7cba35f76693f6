// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use core::fmt;

/// Error returned by [`AvlTree::insert`][crate::AvlTree::insert] when an element comparing equal
/// to the new one is already part of the tree.
///
/// The tree is left untouched and ownership of the rejected element is handed back through
/// [`DuplicateKey::into_inner`].
pub struct DuplicateKey<H> {
    handle: H,
}

impl<H> DuplicateKey<H> {
    pub(crate) const fn new(handle: H) -> Self {
        Self { handle }
    }

    /// Returns a reference to the rejected element's handle.
    pub const fn get_ref(&self) -> &H {
        &self.handle
    }

    /// Consumes the error, returning the rejected element's handle.
    pub fn into_inner(self) -> H {
        self.handle
    }
}

impl<H> fmt::Debug for DuplicateKey<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplicateKey").finish_non_exhaustive()
    }
}

impl<H> fmt::Display for DuplicateKey<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an element with an equal key is already linked into the tree")
    }
}

impl<H> core::error::Error for DuplicateKey<H> {}
