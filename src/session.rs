// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! One window, its resources, and the loop that keeps it on screen.

use anyhow::{Context, Error};
use tracing::{debug, info};

use crate::config::WindowConfig;
use crate::error::Error as SessionError;
use crate::event::{Atom, Rect, Timestamp, WindowEvent, WindowId};
use crate::server::{CreateWindow, DisplayServer};

/// Where a [`Session`] is in its life.
///
/// The order is strictly linear; the only edge that depends on anything is
/// `Running -> Closing`, taken when the window manager asks the window to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Connected, but the window doesn't exist yet.
    Connected,
    Created,
    Mapped,
    Running,
    Closing,
    TornDown,
}

/// The atoms needed to receive a close request from the window manager.
///
/// WM_PROTOCOLS
///
/// List of atoms that identify the communications protocols between the client and
/// window manager in which the client is willing to participate.
///
/// https://www.x.org/releases/X11R7.6/doc/xorg-docs/specs/ICCCM/icccm.html#wm_protocols_property
///
/// WM_DELETE_WINDOW
///
/// Including this atom in the WM_PROTOCOLS property of a window makes the window manager
/// send us a message instead of killing our connection when the user closes the window.
///
/// https://www.x.org/releases/X11R7.6/doc/xorg-docs/specs/ICCCM/icccm.html#window_deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_snake_case)]
pub struct ProtocolAtoms {
    pub WM_PROTOCOLS: Atom,
    pub WM_DELETE_WINDOW: Atom,
}

impl ProtocolAtoms {
    /// Interns both atoms. They are predefined by every ICCCM-compliant server, so a lookup
    /// that comes back empty means something is badly wrong.
    pub fn lookup(server: &dyn DisplayServer) -> Result<ProtocolAtoms, Error> {
        let intern = |name: &'static str| -> Result<Atom, Error> {
            let atom = server
                .intern_atom(name, true)
                .with_context(|| format!("intern {name}"))?;
            if atom == x11rb::NONE {
                return Err(SessionError::MissingAtom(name).into());
            }
            Ok(atom)
        };
        Ok(ProtocolAtoms {
            WM_PROTOCOLS: intern("WM_PROTOCOLS")?,
            WM_DELETE_WINDOW: intern("WM_DELETE_WINDOW")?,
        })
    }
}

/// Proof that the session's window has been mapped.
///
/// Only [`Session::map_and_flush`] hands these out, so anything that needs a visible
/// window (a rendering context, say) can ask for one instead of trusting the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedWindow {
    id: WindowId,
    width: u16,
    height: u16,
}

impl MappedWindow {
    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }
}

/// What a session does with its window, apart from keeping it alive.
pub trait FrameHandler {
    /// Called once per loop iteration, before the event queue is drained.
    fn render(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Called once for every exposure of the session's window.
    #[allow(unused_variables)]
    fn expose(
        &mut self,
        server: &dyn DisplayServer,
        window: WindowId,
        area: Rect,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Called when the window manager asked the window to close. The loop stops after the
    /// current batch of events.
    #[allow(unused_variables)]
    fn close_requested(&mut self, timestamp: Timestamp) {}
}

/// Something the session created and has to give back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resource {
    Colormap(u32),
    Window(WindowId),
    Gc(u32),
}

impl Resource {
    fn release(self, server: &dyn DisplayServer) -> Result<(), SessionError> {
        match self {
            Resource::Colormap(id) => server.free_colormap(id),
            Resource::Window(id) => server.destroy_window(id),
            Resource::Gc(id) => server.free_gc(id),
        }
    }
}

/// A connection to the X server with one top-level window on it.
///
/// Everything the session creates is released in reverse order by [`Session::teardown`],
/// or by `Drop` if the session goes away some other way. The connection itself is closed
/// last, when `server` is dropped.
pub struct Session<S: DisplayServer> {
    config: WindowConfig,
    phase: Phase,
    window: WindowId,
    atoms: Option<ProtocolAtoms>,
    /// Resources in the order they were created.
    resources: Vec<Resource>,
    /// Cleared by the close request, and never set again.
    running: bool,
    close_time: Option<Timestamp>,
    server: S,
}

impl<S: DisplayServer> Session<S> {
    /// Creates the session's window on an already connected server.
    ///
    /// The window is not visible until [`Session::map_and_flush`].
    pub fn new(server: S, config: WindowConfig) -> Result<Session<S>, Error> {
        config.validate()?;
        let mut session = Session {
            config,
            phase: Phase::Connected,
            window: x11rb::NONE,
            atoms: None,
            resources: Vec::new(),
            running: true,
            close_time: None,
            server,
        };
        if session.config.close_protocol() {
            session.atoms = Some(session.lookup_protocol_atoms()?);
        }
        session.create_window()?;
        Ok(session)
    }

    fn lookup_protocol_atoms(&self) -> Result<ProtocolAtoms, Error> {
        ProtocolAtoms::lookup(&self.server).context("look up protocol atoms")
    }

    fn create_window(&mut self) -> Result<(), Error> {
        self.expect_phase(Phase::Connected, "create the window")?;
        let screen = self.server.screen();

        let (depth, visual, colormap) = match self.config.visual() {
            Some(choice) => {
                let colormap = self.server.generate_id()?;
                self.server
                    .create_colormap(colormap, screen.root, choice.id)
                    .context("create colormap")?;
                self.resources.push(Resource::Colormap(colormap));
                (choice.depth, choice.id, Some(colormap))
            }
            None => (screen.root_depth, screen.root_visual, None),
        };

        let id = self.server.generate_id()?;
        self.server
            .create_window(&CreateWindow {
                id,
                parent: screen.root,
                width: self.config.width(),
                height: self.config.height(),
                depth,
                visual,
                background_pixel: self.config.background_pixel(),
                colormap,
            })
            .context("create window")?;
        self.resources.push(Resource::Window(id));
        self.window = id;

        self.server
            .set_title(id, self.config.title())
            .context("set WM_NAME")?;
        if let Some(atoms) = self.atoms {
            // Replace the window's WM_PROTOCOLS with the following.
            self.server
                .set_wm_protocols(id, atoms.WM_PROTOCOLS, &[atoms.WM_DELETE_WINDOW])
                .context("set WM_PROTOCOLS")?;
        }

        self.phase = Phase::Created;
        debug!("created window {:#x}", id);
        Ok(())
    }

    /// Makes the window visible and pushes every buffered request to the server.
    pub fn map_and_flush(&mut self) -> Result<MappedWindow, Error> {
        self.expect_phase(Phase::Created, "map the window")?;
        self.server.map_window(self.window)?;
        self.server.flush().context("flush after mapping the window")?;
        self.phase = Phase::Mapped;
        Ok(MappedWindow {
            id: self.window,
            width: self.config.width(),
            height: self.config.height(),
        })
    }

    /// Creates a graphics context on the window, released together with the session.
    pub fn create_gc(&mut self, foreground: u32) -> Result<u32, Error> {
        self.expect_phase(Phase::Mapped, "create a graphics context")?;
        let gc = self.server.generate_id()?;
        self.server
            .create_gc(gc, self.window, foreground)
            .context("create graphics context")?;
        self.resources.push(Resource::Gc(gc));
        Ok(gc)
    }

    /// Runs the event loop until the window manager asks the window to close.
    ///
    /// Every iteration renders a frame and then drains the event queue without blocking.
    /// Nothing here ever waits: when there is nothing to do, this spins.
    pub fn run<H: FrameHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), Error> {
        self.expect_phase(Phase::Mapped, "run the event loop")?;
        self.phase = Phase::Running;
        while self.running {
            handler.render().context("render frame")?;
            self.drain_events(handler)?;
        }
        self.phase = Phase::Closing;
        if let Some(timestamp) = self.close_time {
            info!("window closed at {} ms", timestamp);
        }
        Ok(())
    }

    /// Dispatches every event currently queued, returning how many there were.
    ///
    /// Stopping the session doesn't interrupt this; the whole queue is drained either way.
    pub fn drain_events<H: FrameHandler + ?Sized>(
        &mut self,
        handler: &mut H,
    ) -> Result<usize, Error> {
        let mut dispatched = 0;
        while let Some(event) = self.server.poll_for_event()? {
            self.dispatch(event, handler)?;
            dispatched += 1;
        }
        Ok(dispatched)
    }

    fn dispatch<H: FrameHandler + ?Sized>(
        &mut self,
        event: WindowEvent,
        handler: &mut H,
    ) -> Result<(), Error> {
        match event {
            WindowEvent::Expose { window, area, .. } if window == self.window => {
                debug!(
                    "part of the window needs to be drawn, x: {}, y: {}, width: {}, height: {}",
                    area.x, area.y, area.width, area.height
                );
                handler
                    .expose(&self.server, window, area)
                    .context("EXPOSE - failed to handle")?;
            }
            // https://www.x.org/releases/X11R7.6/doc/xorg-docs/specs/ICCCM/icccm.html#window_deletion
            WindowEvent::ClientMessage { window, data, .. } if window == self.window => {
                let is_delete = self
                    .atoms
                    .map_or(false, |atoms| data[0] == atoms.WM_DELETE_WINDOW);
                if is_delete {
                    let timestamp = data[1];
                    debug!("WM_DELETE_WINDOW was sent at {} ms", timestamp);
                    if self.stop(timestamp) {
                        handler.close_requested(timestamp);
                    }
                }
            }
            WindowEvent::Expose { .. }
            | WindowEvent::ClientMessage { .. }
            | WindowEvent::Ignored => {}
        }
        Ok(())
    }

    /// Clears the running flag. Returns `false` if it was already cleared.
    fn stop(&mut self, timestamp: Timestamp) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.close_time = Some(timestamp);
        true
    }

    /// Releases everything the session created, newest first, and closes the connection.
    pub fn teardown(mut self) -> Result<(), Error> {
        let result = self.release_resources();
        self.phase = Phase::TornDown;
        result
    }

    fn release_resources(&mut self) -> Result<(), Error> {
        let mut first_error = None;
        while let Some(resource) = self.resources.pop() {
            if let Err(e) = resource.release(&self.server) {
                tracing::error!("failed to release {:?}: {}", resource, e);
                first_error.get_or_insert(e);
            }
        }
        // The connection may be gone already; releasing is best-effort from here on.
        log_x11!(self.server.flush());
        match first_error {
            Some(e) => Err(Error::new(e).context("release session resources")),
            None => Ok(()),
        }
    }

    fn expect_phase(&self, expected: Phase, operation: &'static str) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::WrongPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    #[inline]
    pub fn window(&self) -> WindowId {
        self.window
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The server timestamp of the close request, once there has been one.
    #[inline]
    pub fn close_time(&self) -> Option<Timestamp> {
        self.close_time
    }

    #[inline]
    pub fn atoms(&self) -> Option<ProtocolAtoms> {
        self.atoms
    }

    #[inline]
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    #[inline]
    pub fn server(&self) -> &S {
        &self.server
    }
}

impl<S: DisplayServer> Drop for Session<S> {
    fn drop(&mut self) {
        if !self.resources.is_empty() {
            if let Err(e) = self.release_resources() {
                tracing::error!("{:#}", e);
            }
        }
        self.phase = Phase::TornDown;
    }
}
