// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use core::fmt;
use core::ptr::NonNull;

use crate::utils::Side;
use crate::{AvlTree, Linked};

/// Renders an [`AvlTree`] in graphviz format, returned by [`AvlTree::dot`].
pub struct Dot<'a, T>
where
    T: Linked + ?Sized,
{
    pub(crate) tree: &'a AvlTree<T>,
}

impl<T> Dot<'_, T>
where
    T: Linked + fmt::Debug + ?Sized,
{
    #[allow(
        clippy::only_used_in_recursion,
        reason = "need to ensure tree is borrowed for the entire time we operate on it"
    )]
    fn node_fmt(&self, f: &mut fmt::Formatter, node: NonNull<T>) -> fmt::Result {
        // Safety: the borrowed tree owns `node` and all of its descendants
        unsafe {
            let node_links = T::links(node).as_ref();

            let id = node.as_ptr().cast::<u8>().addr();
            writeln!(
                f,
                r#"    {id} [label="{:?}\nheight = {}"];"#,
                node.as_ref(),
                node_links.height(),
            )?;

            for side in [Side::Left, Side::Right] {
                if let Some(child) = node_links.child(side) {
                    writeln!(
                        f,
                        r#"    {id} -> {} [label="{side}"];"#,
                        child.as_ptr().cast::<u8>().addr(),
                    )?;
                    self.node_fmt(f, child)?;
                }
            }
        }

        Ok(())
    }
}

impl<T> fmt::Display for Dot<'_, T>
where
    T: Linked + fmt::Debug + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("digraph {\n")?;
        if let Some(root) = self.tree.root {
            self.node_fmt(f, root)?;
        }
        f.write_str("}\n")
    }
}

impl<T> fmt::Debug for Dot<'_, T>
where
    T: Linked + fmt::Debug + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use crate::AvlTree;
    use crate::test_utils::TestEntry;

    #[test]
    fn renders_every_edge() {
        let mut tree: AvlTree<TestEntry> = AvlTree::new();
        for i in [2, 1, 3] {
            tree.insert(TestEntry::new(i)).unwrap();
        }

        let dot = tree.dot().to_string();
        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.ends_with("}\n"));
        assert_eq!(dot.matches("digraph").count(), 1);
        assert_eq!(dot.matches(" -> ").count(), 2);
        assert_eq!(dot.matches(r#"[label="left"]"#).count(), 1);
        assert_eq!(dot.matches(r#"[label="right"]"#).count(), 1);
        assert!(dot.contains(r"height = 1"));
    }

    #[test]
    fn empty_graph() {
        let tree: AvlTree<TestEntry> = AvlTree::new();
        assert_eq!(tree.dot().to_string(), "digraph {\n}\n");
    }
}
