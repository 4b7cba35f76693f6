// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use color_eyre::eyre::eyre;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Installs the global subscriber, `RUST_LOG` directives take precedence over `verbosity`.
pub fn init(verbosity: u8) -> color_eyre::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(verbosity_level(verbosity)).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity > 0)
        .without_time()
        .try_init()
        .map_err(|err| eyre!("failed to install the log subscriber: {err}"))
}

/// This maps the occurrence of `--verbose` flags to the correct log level
fn verbosity_level(num: u8) -> Level {
    match num {
        0 => Level::INFO,
        1 => Level::DEBUG,
        2.. => Level::TRACE,
    }
}
