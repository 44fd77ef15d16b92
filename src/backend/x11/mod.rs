// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! X11 implementation of [`DisplayServer`](crate::DisplayServer).

// # Notes on error handling in X11
//
// In XCB, errors are reported asynchronously by default, by sending them to the event
// loop. You can also request a synchronous error for a given call; we do that for requests
// that create resources, so that a failure shows up where it happened. Everything else takes
// the async route, and the error event comes back out of `poll_for_event` as an `Err`.
//
// When checking for X11 errors synchronously, there are two places where the error could
// happen. An error on the request means the connection is broken. There's no need for
// extra error context here, because the fact that the connection broke has nothing to do
// with what we're trying to do. An error on the reply means there was something wrong with
// the request, and so the session adds context.

pub mod connection;
#[cfg(feature = "glx")]
pub mod xlib;

pub use connection::X11Server;
#[cfg(feature = "glx")]
pub use xlib::{VisualInfo, XlibDisplay};
