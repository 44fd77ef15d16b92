// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! A window that can't be closed.
//!
//! No WM_DELETE_WINDOW is registered, so the window manager kills the connection when the
//! window is closed and the program aborts on the broken connection.

use anyhow::Error;
use xwin_session::backend::x11::X11Server;
use xwin_session::{logging, RectanglePainter, Session, WindowConfig};

fn run() -> Result<(), Error> {
    let mut config = WindowConfig::default();
    config.set_close_protocol(false);
    let foreground = config.foreground_pixel();
    let (width, height) = (config.width(), config.height());

    let server = X11Server::connect()?;
    let mut session = Session::new(server, config)?;
    session.map_and_flush()?;
    let gc = session.create_gc(foreground)?;
    let mut painter = RectanglePainter::centered(gc, width, height);
    session.run(&mut painter)?;
    session.teardown()
}

fn main() {
    logging::init();
    if let Err(e) = run() {
        tracing::error!("{:#}", e);
        std::process::abort();
    }
}
