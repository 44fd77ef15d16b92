// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Miscellaneous helpers.

macro_rules! log_x11 {
    ($val:expr) => {
        if let Err(e) = $val {
            // We probably don't want to include file/line numbers. This logging is done in
            // a context where X11 errors probably just mean that the connection to the X server
            // was lost.
            tracing::error!("X11 error: {}", e);
        }
    };
}
