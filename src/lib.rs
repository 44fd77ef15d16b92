// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Minimal X11 window sessions.
//!
//! A [`Session`] owns the connection to the X server, one top-level window and every
//! resource hanging off that window. It runs a polling event loop that hands exposure
//! events to a [`FrameHandler`] and stops when the window manager asks the window to
//! close. Everything the session acquired is released in reverse order when it is torn
//! down or dropped.
//!
//! The protocol surface is abstracted by [`DisplayServer`]; [`backend::x11`] implements it
//! on top of `x11rb`. With the `glx` feature, [`glx`] adds a GLX context that draws a
//! static triangle every frame.

#[macro_use]
mod util;

pub mod backend;
pub mod config;
pub mod error;
pub mod event;
#[cfg(feature = "glx")]
pub mod glx;
pub mod logging;
pub mod paint;
pub mod server;
pub mod session;

#[cfg(test)]
mod tests;

pub use config::{VisualChoice, WindowConfig};
pub use error::Error;
pub use event::{Rect, WindowEvent};
pub use paint::RectanglePainter;
pub use server::{DisplayServer, ScreenInfo};
pub use session::{FrameHandler, MappedWindow, Phase, ProtocolAtoms, Session};
