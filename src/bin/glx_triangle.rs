// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! A GLX window drawing one triangle, closed by the window manager.

use anyhow::{Context, Error};
use xwin_session::backend::x11::{X11Server, XlibDisplay};
use xwin_session::glx::TriangleRenderer;
use xwin_session::{logging, Session, WindowConfig};

fn run() -> Result<(), Error> {
    let display = XlibDisplay::open()?;
    let (major, minor) = display.glx_version()?;
    tracing::info!("Loaded GLX {}.{}", major, minor);

    let visual = display.choose_visual()?;
    let mut config = WindowConfig::default();
    config.set_visual(visual.choice()?);

    let server = X11Server::from_xlib(&display).context("wrap the Xlib connection")?;
    let mut session = Session::new(server, config)?;
    let window = session.map_and_flush()?;

    let mut renderer = TriangleRenderer::new(&display, &visual, window, session.config())?;
    session.run(&mut renderer)?;
    // The GL objects and the context go before the window they draw on.
    drop(renderer);
    session.teardown()
}

fn main() {
    logging::init();
    if let Err(e) = run() {
        tracing::error!("{:#}", e);
        std::process::abort();
    }
}
