// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Log output for the demo programs.

use tracing_subscriber::EnvFilter;

/// The filter used when `RUST_LOG` is unset or can't be parsed.
pub const DEFAULT_FILTER: &str = "debug";

/// Installs a `fmt` subscriber filtered by `RUST_LOG`.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
