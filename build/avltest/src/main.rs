// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

mod area;
mod logger;

use std::ops::ControlFlow;

use avltree::AvlTree;
use clap::{ArgAction, Parser};
use color_eyre::eyre::{Context, bail, ensure, eyre};
use rand::Rng;

use crate::area::Area;

/// Helper for passing VERSION to opt.
/// If `CARGO_VERSION_INFO` is set, use it, otherwise use `CARGO_PKG_VERSION`.
fn version() -> &'static str {
    option_env!("CARGO_VERSION_INFO").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Inserts, looks up, removes and re-inserts a set of memory areas, checking the tree's
/// invariants after every step.
#[derive(Debug, Parser)]
#[clap(version = version())]
struct Args {
    /// Number of areas to insert, their addresses run from `count` down to 1
    #[clap(short = 'n', long, default_value_t = 16, value_parser = clap::value_parser!(i64).range(1..))]
    count: i64,
    /// Number of search and random delete/insert iterations
    #[clap(short, long, default_value_t = 1)]
    iter: u32,
    /// Prints the tree after each phase
    #[clap(short, long)]
    list: bool,
    /// Rebuilds the tree into its minimum height before the final checks
    #[clap(short, long)]
    balance: bool,
    /// Enables verbose logging
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    logger::init(args.verbose)?;

    run(&args)
}

fn run(args: &Args) -> color_eyre::Result<()> {
    let mut tree: AvlTree<Area> = AvlTree::new();

    for addr in (1..=args.count).rev() {
        tree.insert(Area::new(addr, 1))
            .map_err(|err| eyre!("failed to insert area {addr}: {err}"))?;
    }
    tracing::info!(
        "inserted {} areas, tree height is {}",
        tree.len(),
        tree.height()
    );
    check_height(&tree)?;
    if args.list {
        print_tree(&tree);
    }

    for _ in 0..args.iter {
        for addr in 1..=args.count {
            let area = tree
                .find(&addr)
                .ok_or_else(|| eyre!("area {addr} is missing"))?;
            ensure!(
                area.addr == addr,
                "looking up {addr} found area {}",
                area.addr
            );
        }
    }
    tracing::info!("looked up every area {} times", args.iter);

    for addr in 1..=args.count {
        let Some(area) = tree.remove(&addr) else {
            continue;
        };
        ensure!(area.addr == addr, "removing {addr} unlinked area {}", area.addr);
        check_height(&tree).wrap_err_with(|| format!("after removing area {addr}"))?;

        tree.insert(area)
            .map_err(|err| eyre!("failed to re-insert area {addr}: {err}"))?;
        check_height(&tree).wrap_err_with(|| format!("after re-inserting area {addr}"))?;
    }
    tracing::info!("removed and re-inserted every area in order");
    if args.list {
        print_tree(&tree);
    }

    let mut rng = rand::rng();
    for _ in 0..args.iter {
        let addr = rng.random_range(1..=args.count);

        let ptr = tree
            .find_ptr(&addr)
            .ok_or_else(|| eyre!("area {addr} is missing"))?;
        // Safety: `ptr` was just returned by `find_ptr` and the tree wasn't modified since
        let area = tree
            .remove_node(unsafe { ptr.as_ref() })
            .ok_or_else(|| eyre!("area {addr} was found but could not be removed"))?;
        ensure!(area.addr == addr, "removing {addr} unlinked area {}", area.addr);
        check_height(&tree).wrap_err_with(|| format!("after removing area {addr}"))?;

        tree.insert(area)
            .map_err(|err| eyre!("failed to re-insert area {addr}: {err}"))?;
        check_height(&tree).wrap_err_with(|| format!("after re-inserting area {addr}"))?;
    }
    tracing::info!("removed and re-inserted {} random areas", args.iter);
    if args.list {
        print_tree(&tree);
    }

    if args.balance {
        tree.rebalance();
        check_height(&tree).wrap_err("after rebalancing")?;
        tracing::info!("rebalanced tree to height {}", tree.height());
        if args.list {
            print_tree(&tree);
        }
    }

    check_order(&tree)?;
    tracing::info!("in-order and reverse-order walks are sorted");

    tree.clear();
    ensure!(tree.root().is_none(), "tree still has a root after clearing it");
    tracing::info!("released all areas");

    Ok(())
}

/// Checks the balance rule and the cached height of every area, returning the tree height.
fn check_height(tree: &AvlTree<Area>) -> color_eyre::Result<i32> {
    fn check(tree: &AvlTree<Area>, area: Option<&Area>) -> color_eyre::Result<i32> {
        let Some(area) = area else {
            return Ok(-1);
        };

        let (left, right) = tree.children(area);
        let left = check(tree, left)?;
        let right = check(tree, right)?;

        if (left - right).abs() > 1 {
            bail!(
                "area {} is unbalanced: subtree heights are {left} and {right}",
                area.addr
            );
        }
        ensure!(
            area.height() == left.max(right) + 1,
            "area {} caches height {} but its subtree is {} high",
            area.addr,
            area.height(),
            left.max(right) + 1
        );

        Ok(area.height())
    }

    let height = check(tree, tree.root())?;
    ensure!(
        height == tree.height(),
        "tree reports height {} but is {height} high",
        tree.height()
    );
    Ok(height)
}

fn check_order(tree: &AvlTree<Area>) -> color_eyre::Result<()> {
    let mut prev: Option<i64> = None;
    if let Some(area) = tree.inorder(|area| {
        let sorted = prev.is_none_or(|prev| prev < area.addr);
        prev = Some(area.addr);
        if sorted {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    }) {
        bail!("in-order walk is not ascending at area {}", area.addr);
    }

    let mut prev: Option<i64> = None;
    if let Some(area) = tree.revorder(|area| {
        let sorted = prev.is_none_or(|prev| prev > area.addr);
        prev = Some(area.addr);
        if sorted {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    }) {
        bail!("reverse-order walk is not descending at area {}", area.addr);
    }

    Ok(())
}

/// Prints the tree sideways, in order and indented by depth.
fn print_tree(tree: &AvlTree<Area>) {
    fn print_level(tree: &AvlTree<Area>, area: &Area, level: usize) {
        let (left, right) = tree.children(area);
        if let Some(left) = left {
            print_level(tree, left, level + 1);
        }
        println!("{}{area}", "-".repeat(level));
        if let Some(right) = right {
            print_level(tree, right, level + 1);
        }
    }

    if let Some(root) = tree.root() {
        print_level(tree, root, 0);
    }
    println!("------------------------");
}
