// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! The Xlib display underneath a GLX-capable connection.
//!
//! GLX only talks Xlib, so an OpenGL window needs an Xlib display even though every other
//! request goes through XCB. See <https://xcb.freedesktop.org/opengl/> for background.

use std::ffi::c_void;
use std::marker::PhantomData;
use std::os::raw::c_int;
use std::ptr::{self, NonNull};

use x11::{glx, xlib, xlib_xcb};

use crate::config::VisualChoice;
use crate::error::Error;

// Missing from x11-rs.
mod missing_bits {
    use std::os::raw::c_int;
    use x11::xlib::Display;

    /// `XCBOwnsEventQueue` from `enum XEventQueueOwner`.
    pub const XCB_OWNS_EVENT_QUEUE: c_int = 1;

    #[link(name = "X11-xcb")]
    extern "C" {
        pub fn XSetEventQueueOwner(display: *mut Display, owner: c_int);
    }
}

/// An open Xlib display. Closing it also closes its XCB connection.
#[derive(Debug)]
pub struct XlibDisplay {
    display: NonNull<xlib::Display>,
    screen_num: c_int,
}

impl XlibDisplay {
    /// Opens the display named by `$DISPLAY` and hands its event queue to XCB.
    pub fn open() -> Result<XlibDisplay, Error> {
        let display =
            NonNull::new(unsafe { xlib::XOpenDisplay(ptr::null()) }).ok_or(Error::NoDisplay)?;
        // This has to happen before anything reads events. If Xlib keeps the queue it may
        // take events out from under XCB and we would never see them.
        unsafe {
            missing_bits::XSetEventQueueOwner(
                display.as_ptr(),
                missing_bits::XCB_OWNS_EVENT_QUEUE,
            )
        };
        let screen_num = unsafe { xlib::XDefaultScreen(display.as_ptr()) };
        Ok(XlibDisplay {
            display,
            screen_num,
        })
    }

    #[inline]
    pub fn as_ptr(&self) -> *mut xlib::Display {
        self.display.as_ptr()
    }

    #[inline]
    pub fn screen_num(&self) -> usize {
        usize::try_from(self.screen_num).unwrap_or_default()
    }

    /// The XCB connection Xlib uses underneath. It stays owned by the display.
    pub(crate) fn xcb_connection(&self) -> *mut c_void {
        unsafe { xlib_xcb::XGetXCBConnection(self.as_ptr()) as *mut c_void }
    }

    /// The GLX version supported by the server, as `(major, minor)`.
    pub fn glx_version(&self) -> Result<(i32, i32), Error> {
        let (mut major, mut minor) = (0, 0);
        if unsafe { glx::glXQueryVersion(self.as_ptr(), &mut major, &mut minor) } == xlib::False {
            return Err(Error::Glx("glXQueryVersion"));
        }
        Ok((major, minor))
    }

    /// Picks a double-buffered RGBA visual on the default screen.
    pub fn choose_visual(&self) -> Result<VisualInfo<'_>, Error> {
        let mut attributes = [glx::GLX_RGBA, glx::GLX_DOUBLEBUFFER, 0];
        let info = unsafe {
            glx::glXChooseVisual(self.as_ptr(), self.screen_num, attributes.as_mut_ptr())
        };
        let info = NonNull::new(info).ok_or(Error::Glx("glXChooseVisual"))?;
        Ok(VisualInfo {
            info,
            marker: PhantomData,
        })
    }
}

impl Drop for XlibDisplay {
    fn drop(&mut self) {
        unsafe { xlib::XCloseDisplay(self.as_ptr()) };
    }
}

/// A visual picked by GLX, freed with `XFree` when dropped.
#[derive(Debug)]
pub struct VisualInfo<'d> {
    info: NonNull<xlib::XVisualInfo>,
    marker: PhantomData<&'d XlibDisplay>,
}

impl VisualInfo<'_> {
    #[inline]
    pub fn as_ptr(&self) -> *mut xlib::XVisualInfo {
        self.info.as_ptr()
    }

    /// The visual id and depth, in the form X11 requests want them.
    pub fn choice(&self) -> Result<VisualChoice, Error> {
        let info = unsafe { self.info.as_ref() };
        let id = u32::try_from(info.visualid).map_err(|_| Error::Glx("glXChooseVisual"))?;
        let depth = u8::try_from(info.depth).map_err(|_| Error::Glx("glXChooseVisual"))?;
        Ok(VisualChoice { id, depth })
    }
}

impl Drop for VisualInfo<'_> {
    fn drop(&mut self) {
        unsafe { xlib::XFree(self.info.as_ptr().cast()) };
    }
}
