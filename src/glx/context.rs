// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

use std::ffi::{c_void, CString};
use std::ptr;

use x11::{glx, xlib};

use crate::backend::x11::{VisualInfo, XlibDisplay};
use crate::error::Error;
use crate::session::MappedWindow;

/// An OpenGL version, as reported by the current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlVersion {
    pub major: i32,
    pub minor: i32,
}

/// A direct GLX context, current on one window for as long as it lives.
pub struct GlxContext<'d> {
    display: &'d XlibDisplay,
    context: glx::GLXContext,
    drawable: glx::GLXDrawable,
}

impl<'d> GlxContext<'d> {
    /// Creates a context for `visual` and makes it current on `window`.
    ///
    /// The window must have been created with the same visual.
    pub fn new(
        display: &'d XlibDisplay,
        visual: &VisualInfo<'d>,
        window: MappedWindow,
    ) -> Result<GlxContext<'d>, Error> {
        let context = unsafe {
            glx::glXCreateContext(display.as_ptr(), visual.as_ptr(), ptr::null_mut(), xlib::True)
        };
        if context.is_null() {
            return Err(Error::Glx("glXCreateContext"));
        }
        let context = GlxContext {
            display,
            context,
            drawable: glx::GLXDrawable::from(window.id()),
        };
        let current =
            unsafe { glx::glXMakeCurrent(display.as_ptr(), context.drawable, context.context) };
        if current == xlib::False {
            return Err(Error::Glx("glXMakeCurrent"));
        }
        Ok(context)
    }

    /// Loads the GL entry points for this context and returns its version.
    pub fn load_gl(&self) -> Result<GlVersion, Error> {
        gl::load_with(|symbol| match CString::new(symbol) {
            Ok(name) => unsafe {
                glx::glXGetProcAddress(name.as_ptr().cast())
                    .map_or(ptr::null(), |f| f as *const c_void)
            },
            Err(_) => ptr::null(),
        });
        if !gl::GetIntegerv::is_loaded() || !gl::CreateShader::is_loaded() {
            return Err(Error::Glx("glXGetProcAddress"));
        }
        let (mut major, mut minor) = (0, 0);
        unsafe {
            gl::GetIntegerv(gl::MAJOR_VERSION, &mut major);
            gl::GetIntegerv(gl::MINOR_VERSION, &mut minor);
        }
        Ok(GlVersion { major, minor })
    }

    pub fn swap_buffers(&self) {
        unsafe { glx::glXSwapBuffers(self.display.as_ptr(), self.drawable) };
    }
}

impl Drop for GlxContext<'_> {
    fn drop(&mut self) {
        unsafe {
            glx::glXMakeCurrent(self.display.as_ptr(), 0, ptr::null_mut());
            glx::glXDestroyContext(self.display.as_ptr(), self.context);
        }
    }
}
