// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Core-protocol drawing for windows without a rendering context.

use anyhow::{Context, Error};

use crate::event::{Rect, WindowId};
use crate::server::DisplayServer;
use crate::session::FrameHandler;

/// Draws one filled rectangle in the foreground of a graphics context, and redraws the part
/// of it that each exposure uncovers. The rest of the window keeps its background.
///
/// The context is owned by the session that created it (see
/// [`Session::create_gc`](crate::Session::create_gc)); the painter only draws with it.
#[derive(Debug)]
pub struct RectanglePainter {
    gc: u32,
    shape: Rect,
}

impl RectanglePainter {
    pub fn new(gc: u32, shape: Rect) -> RectanglePainter {
        RectanglePainter { gc, shape }
    }

    /// A painter for a rectangle half the window's size, in its middle.
    pub fn centered(gc: u32, width: u16, height: u16) -> RectanglePainter {
        let shape = Rect::new(width / 4, height / 4, width / 2, height / 2);
        RectanglePainter::new(gc, shape)
    }

    pub fn gc(&self) -> u32 {
        self.gc
    }

    pub fn shape(&self) -> Rect {
        self.shape
    }
}

impl FrameHandler for RectanglePainter {
    fn expose(
        &mut self,
        server: &dyn DisplayServer,
        window: WindowId,
        area: Rect,
    ) -> Result<(), Error> {
        let damaged = match self.shape.intersect(area) {
            Some(damaged) => damaged,
            None => return Ok(()),
        };
        server
            .fill_rectangle(window, self.gc, damaged)
            .context("fill exposed rectangle")?;
        server.flush()?;
        Ok(())
    }
}
