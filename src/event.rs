// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Events coming off the wire, reduced to the ones a session cares about.

/// X11 window id.
pub type WindowId = u32;
/// X11 atom.
pub type Atom = u32;
/// X11 server timestamp, in milliseconds.
pub type Timestamp = u32;

/// A rectangle in window coordinates, as carried by an `Expose` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// The part of `self` that is also inside `other`, if there is one.
    pub fn intersect(&self, other: Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (u32::from(self.x) + u32::from(self.width))
            .min(u32::from(other.x) + u32::from(other.width));
        let y1 = (u32::from(self.y) + u32::from(self.height))
            .min(u32::from(other.y) + u32::from(other.height));
        if x1 <= u32::from(x0) || y1 <= u32::from(y0) {
            return None;
        }
        // Both extents are bounded by one of the two widths/heights, so they fit.
        Some(Rect {
            x: x0,
            y: y0,
            width: (x1 - u32::from(x0)) as u16,
            height: (y1 - u32::from(y0)) as u16,
        })
    }
}

/// An event delivered to the session.
///
/// Every event type other than the two the session reacts to collapses into
/// [`WindowEvent::Ignored`]. X11 errors never show up here; the backend turns them into
/// errors from [`DisplayServer::poll_for_event`](crate::DisplayServer::poll_for_event).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// Part of `window` has to be drawn again.
    Expose {
        window: WindowId,
        area: Rect,
        /// How many more `Expose` events for the same window follow this one.
        count: u16,
    },
    /// A message sent by another client, usually the window manager.
    ClientMessage {
        window: WindowId,
        format: u8,
        type_: Atom,
        data: [u32; 5],
    },
    Ignored,
}
