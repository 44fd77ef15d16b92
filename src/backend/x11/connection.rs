// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! The connection to the X server.

use std::ffi::CString;
use std::marker::PhantomData;

use x11rb::connection::Connection;
use x11rb::errors::ConnectError;
use x11rb::protocol::xproto::{
    AtomEnum, ColormapAlloc, ConnectionExt, CreateGCAux, CreateWindowAux, EventMask, PropMode,
    Rectangle, WindowClass,
};
use x11rb::protocol::Event;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::xcb_ffi::XCBConnection;

use crate::error::Error;
use crate::event::{Atom, Rect, WindowEvent, WindowId};
use crate::server::{CreateWindow, DisplayServer, ScreenInfo};

#[cfg(feature = "glx")]
use super::xlib::XlibDisplay;

/// A [`DisplayServer`] backed by an XCB connection.
///
/// The lifetime ties a connection borrowed from Xlib to the display it came from; a
/// connection of our own is `X11Server<'static>`. Dropping the server disconnects, unless
/// the connection belongs to Xlib, in which case closing the display does.
pub struct X11Server<'d> {
    /// The connection to the X server.
    ///
    /// This connection is associated with a single display.
    /// The X server might also host other displays.
    ///
    /// A display is a collection of screens.
    conn: XCBConnection,
    /// The screen selected by the display name (or `$DISPLAY`).
    screen_num: usize,
    screen: ScreenInfo,
    marker: PhantomData<&'d ()>,
}

impl X11Server<'static> {
    /// Connects to the display named by `$DISPLAY`.
    pub fn connect() -> Result<X11Server<'static>, Error> {
        X11Server::connect_to(None)
    }

    /// Connects to `display_name`, or to `$DISPLAY` if there is none.
    pub fn connect_to(display_name: Option<&str>) -> Result<X11Server<'static>, Error> {
        let display_name = display_name
            .map(CString::new)
            .transpose()
            .map_err(|_| ConnectError::DisplayParsingError)?;
        let (conn, screen_num) = XCBConnection::connect(display_name.as_deref())?;
        X11Server::new(conn, screen_num)
    }
}

#[cfg(feature = "glx")]
impl<'d> X11Server<'d> {
    /// Wraps the XCB connection underneath an Xlib display.
    ///
    /// GLX needs the Xlib display, while everything else goes through XCB. The display has
    /// to hand its event queue to XCB first, which [`XlibDisplay::open`] does.
    pub fn from_xlib(display: &'d XlibDisplay) -> Result<X11Server<'d>, Error> {
        // SAFETY: the pointer comes from a live display, and `'d` keeps the display open for
        // as long as the server exists. Xlib keeps ownership of the connection.
        let conn =
            unsafe { XCBConnection::from_raw_xcb_connection(display.xcb_connection(), false)? };
        X11Server::new(conn, display.screen_num())
    }
}

impl<'d> X11Server<'d> {
    fn new(conn: XCBConnection, screen_num: usize) -> Result<X11Server<'d>, Error> {
        let screen = {
            let screen = conn
                .setup()
                .roots
                .get(screen_num)
                .ok_or(ConnectError::InvalidScreen)?;
            ScreenInfo {
                root: screen.root,
                root_depth: screen.root_depth,
                root_visual: screen.root_visual,
                black_pixel: screen.black_pixel,
            }
        };
        tracing::debug!(
            "connected to screen {} (root {:#x}, depth {})",
            screen_num,
            screen.root,
            screen.root_depth
        );
        Ok(X11Server {
            conn,
            screen_num,
            screen,
            marker: PhantomData,
        })
    }

    #[inline]
    pub fn screen_num(&self) -> usize {
        self.screen_num
    }
}

impl DisplayServer for X11Server<'_> {
    fn screen(&self) -> ScreenInfo {
        self.screen
    }

    fn generate_id(&self) -> Result<u32, Error> {
        Ok(self.conn.generate_id()?)
    }

    fn intern_atom(&self, name: &str, only_if_exists: bool) -> Result<Atom, Error> {
        let reply = self
            .conn
            .intern_atom(only_if_exists, name.as_bytes())?
            .reply()?;
        Ok(reply.atom)
    }

    fn create_colormap(&self, id: u32, window: WindowId, visual: u32) -> Result<(), Error> {
        self.conn
            .create_colormap(ColormapAlloc::NONE, id, window, visual)?
            .check()?;
        Ok(())
    }

    fn create_window(&self, request: &CreateWindow) -> Result<(), Error> {
        let mut cw_values = CreateWindowAux::new()
            .background_pixel(request.background_pixel)
            .event_mask(EventMask::EXPOSURE);
        if let Some(colormap) = request.colormap {
            // A visual of our own needs an explicit border, the parent's won't match it.
            cw_values = cw_values
                .border_pixel(self.screen.black_pixel)
                .colormap(colormap);
        }
        self.conn
            .create_window(
                // Window depth
                request.depth,
                // The new window's ID
                request.id,
                // Parent window of this new window
                request.parent,
                // X-coordinate of the new window
                0,
                // Y-coordinate of the new window
                0,
                // Width of the new window
                request.width,
                // Height of the new window
                request.height,
                // Border width
                0,
                // Window class type
                WindowClass::INPUT_OUTPUT,
                // Visual ID
                request.visual,
                // Window properties mask
                &cw_values,
            )?
            .check()?;
        Ok(())
    }

    fn set_title(&self, window: WindowId, title: &str) -> Result<(), Error> {
        // This is technically incorrect. STRING encoding is *not* UTF8, but window managers
        // cope with ASCII titles just fine.
        self.conn.change_property8(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_NAME,
            AtomEnum::STRING,
            title.as_bytes(),
        )?;
        Ok(())
    }

    fn set_wm_protocols(
        &self,
        window: WindowId,
        wm_protocols: Atom,
        protocols: &[Atom],
    ) -> Result<(), Error> {
        self.conn
            .change_property32(
                PropMode::REPLACE,
                window,
                wm_protocols,
                AtomEnum::ATOM,
                protocols,
            )?
            .check()?;
        Ok(())
    }

    fn create_gc(&self, id: u32, drawable: WindowId, foreground: u32) -> Result<(), Error> {
        let values = CreateGCAux::new()
            .foreground(foreground)
            .graphics_exposures(0);
        self.conn.create_gc(id, drawable, &values)?.check()?;
        Ok(())
    }

    fn fill_rectangle(&self, drawable: WindowId, gc: u32, area: Rect) -> Result<(), Error> {
        match to_rectangle(area) {
            Some(rectangle) => {
                self.conn.poly_fill_rectangle(drawable, gc, &[rectangle])?;
            }
            None => tracing::trace!("nothing to fill at {:?}", area),
        }
        Ok(())
    }

    fn map_window(&self, window: WindowId) -> Result<(), Error> {
        self.conn.map_window(window)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        self.conn.flush()?;
        Ok(())
    }

    fn poll_for_event(&self) -> Result<Option<WindowEvent>, Error> {
        match self.conn.poll_for_event()? {
            Some(event) => translate(event).map(Some),
            None => Ok(None),
        }
    }

    fn free_gc(&self, gc: u32) -> Result<(), Error> {
        self.conn.free_gc(gc)?;
        Ok(())
    }

    fn free_colormap(&self, colormap: u32) -> Result<(), Error> {
        self.conn.free_colormap(colormap)?;
        Ok(())
    }

    fn destroy_window(&self, window: WindowId) -> Result<(), Error> {
        self.conn.destroy_window(window)?;
        Ok(())
    }
}

/// Converts `area` to a protocol rectangle, clipped to the `i16` coordinate space drawing
/// requests use. Returns `None` if nothing of it is left.
fn to_rectangle(area: Rect) -> Option<Rectangle> {
    let limit = i16::MAX as u16;
    if area.x >= limit || area.y >= limit {
        return None;
    }
    let width = area.width.min(limit - area.x);
    let height = area.height.min(limit - area.y);
    if width == 0 || height == 0 {
        return None;
    }
    Some(Rectangle {
        x: area.x as i16,
        y: area.y as i16,
        width,
        height,
    })
}

/// Reduces an x11rb event to a [`WindowEvent`]. Error events become errors.
fn translate(event: Event) -> Result<WindowEvent, Error> {
    let event = match event {
        Event::Expose(ev) => WindowEvent::Expose {
            window: ev.window,
            area: Rect::new(ev.x, ev.y, ev.width, ev.height),
            count: ev.count,
        },
        Event::ClientMessage(ev) => WindowEvent::ClientMessage {
            window: ev.window,
            format: ev.format,
            type_: ev.type_,
            data: ev.data.as_data32(),
        },
        Event::Error(e) => return Err(e.into()),
        _ => WindowEvent::Ignored,
    };
    Ok(event)
}
