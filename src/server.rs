// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! The part of the X11 protocol a session talks to.
//!
//! Requests are buffered and only reach the server on [`DisplayServer::flush`] or when a
//! reply is needed. Calls that create resources check for errors synchronously; everything
//! else reports errors asynchronously, through [`DisplayServer::poll_for_event`].

use crate::error::Error;
use crate::event::{Atom, Rect, WindowEvent, WindowId};

/// The screen new windows are created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenInfo {
    pub root: WindowId,
    pub root_depth: u8,
    pub root_visual: u32,
    pub black_pixel: u32,
}

/// Arguments of a `CreateWindow` request.
///
/// The window is always an input-output top-level window at the origin, with no border,
/// listening for exposure events only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateWindow {
    pub id: WindowId,
    pub parent: WindowId,
    pub width: u16,
    pub height: u16,
    pub depth: u8,
    pub visual: u32,
    pub background_pixel: u32,
    pub colormap: Option<u32>,
}

/// A connection to an X server, seen through the requests a session makes.
pub trait DisplayServer {
    /// The screen selected when connecting.
    fn screen(&self) -> ScreenInfo;

    /// Allocates a new resource id. No request is sent.
    fn generate_id(&self) -> Result<u32, Error>;

    /// Looks up `name`, waiting for the reply.
    ///
    /// With `only_if_exists`, a name the server doesn't know yields `x11rb::NONE`.
    fn intern_atom(&self, name: &str, only_if_exists: bool) -> Result<Atom, Error>;

    fn create_colormap(&self, id: u32, window: WindowId, visual: u32) -> Result<(), Error>;

    fn create_window(&self, request: &CreateWindow) -> Result<(), Error>;

    /// Sets `WM_NAME`.
    fn set_title(&self, window: WindowId, title: &str) -> Result<(), Error>;

    /// Replaces the window's `WM_PROTOCOLS` property with `protocols`.
    fn set_wm_protocols(
        &self,
        window: WindowId,
        wm_protocols: Atom,
        protocols: &[Atom],
    ) -> Result<(), Error>;

    /// Creates a graphics context drawing with `foreground`, without graphics exposures.
    fn create_gc(&self, id: u32, drawable: WindowId, foreground: u32) -> Result<(), Error>;

    fn fill_rectangle(&self, drawable: WindowId, gc: u32, area: Rect) -> Result<(), Error>;

    fn map_window(&self, window: WindowId) -> Result<(), Error>;

    /// Sends every buffered request to the server.
    fn flush(&self) -> Result<(), Error>;

    /// Returns the next queued event, if any, without blocking.
    fn poll_for_event(&self) -> Result<Option<WindowEvent>, Error>;

    fn free_gc(&self, gc: u32) -> Result<(), Error>;

    fn free_colormap(&self, colormap: u32) -> Result<(), Error>;

    fn destroy_window(&self, window: WindowId) -> Result<(), Error>;
}
