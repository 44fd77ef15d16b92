// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Session tests that run against a recording server instead of a real X server.


use test_log::test;

use crate::config::{VisualChoice, WindowConfig};
use crate::error::Error as SessionError;
use crate::event::{Rect, WindowEvent};
use crate::paint::RectanglePainter;
use crate::session::{Phase, Session};
use recording::*;

fn session_with(config: WindowConfig) -> (Session<RecordingServer>, CallLog, EventQueue) {
    let server = RecordingServer::new();
    let log = server.log();
    let events = server.events();
    let session = Session::new(server, config).unwrap();
    (session, log, events)
}

fn mapped_session() -> (Session<RecordingServer>, CallLog, EventQueue) {
    let (mut session, log, events) = session_with(WindowConfig::default());
    session.map_and_flush().unwrap();
    (session, log, events)
}

fn close(session: &Session<RecordingServer>, events: &EventQueue, timestamp: u32) {
    let atoms = session.atoms().unwrap();
    events.delete_window(
        session.window(),
        atoms.WM_PROTOCOLS,
        atoms.WM_DELETE_WINDOW,
        timestamp,
    );
}

#[test]
fn window_is_created_after_the_atoms() {
    let (session, log, _) = session_with(WindowConfig::default());
    let window = session.window();
    let calls = log.calls();
    let create = log
        .position(|c| matches!(c, Call::CreateWindow(_)))
        .unwrap();
    let last_atom = log
        .position(|c| matches!(c, Call::InternAtom(name, true) if name == "WM_DELETE_WINDOW"))
        .unwrap();
    assert!(last_atom < create);
    assert_eq!(
        calls[create],
        Call::CreateWindow(crate::server::CreateWindow {
            id: window,
            parent: ROOT,
            width: 1280,
            height: 720,
            depth: ROOT_DEPTH,
            visual: ROOT_VISUAL,
            background_pixel: 0x1e1e2e,
            colormap: None,
        })
    );
    assert_eq!(calls[create - 1], Call::GenerateId(window));
    assert_eq!(
        calls[create + 1..],
        [
            Call::SetTitle(window, "Test X11".into()),
            Call::SetWmProtocols(window, 301, vec![302]),
        ]
    );
    assert_eq!(session.phase(), Phase::Created);
}

#[test]
fn plain_window_skips_the_close_protocol() {
    let mut config = WindowConfig::default();
    config.set_close_protocol(false);
    let (session, log, _) = session_with(config);
    assert_eq!(session.atoms(), None);
    assert!(log
        .calls()
        .iter()
        .all(|c| !matches!(c, Call::InternAtom(..) | Call::SetWmProtocols(..))));
}

#[test]
fn missing_atom_creates_nothing() {
    let server = RecordingServer::new().without_atom("WM_PROTOCOLS");
    let log = server.log();
    let err = Session::new(server, WindowConfig::default()).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::MissingAtom("WM_PROTOCOLS"))
    ));
    assert!(log.generated_ids().is_empty());
    assert_eq!(log.calls().last(), Some(&Call::Disconnect));
}

#[test]
fn chosen_visual_gets_a_colormap() {
    let mut config = WindowConfig::default();
    config.set_visual(VisualChoice { id: 0x55, depth: 32 });
    let (session, log, _) = session_with(config);
    let colormap = log.generated_ids()[0];
    let calls = log.calls();
    assert!(calls.contains(&Call::CreateColormap {
        id: colormap,
        visual: 0x55
    }));
    let create = calls
        .iter()
        .find_map(|c| match c {
            Call::CreateWindow(request) => Some(*request),
            _ => None,
        })
        .unwrap();
    assert_eq!(create.id, session.window());
    assert_eq!((create.depth, create.visual), (32, 0x55));
    assert_eq!(create.colormap, Some(colormap));
}

#[test]
fn map_flushes() {
    let (mut session, log, _) = session_with(WindowConfig::default());
    log.clear();
    let mapped = session.map_and_flush().unwrap();
    assert_eq!(mapped.id(), session.window());
    assert_eq!((mapped.width(), mapped.height()), (1280, 720));
    assert_eq!(
        log.calls(),
        vec![Call::MapWindow(session.window()), Call::Flush]
    );
    assert_eq!(session.phase(), Phase::Mapped);
}

#[test]
fn failed_flush_is_an_error() {
    let server = RecordingServer::new().failing_flush();
    let mut session = Session::new(server, WindowConfig::default()).unwrap();
    assert!(session.map_and_flush().is_err());
    assert_eq!(session.phase(), Phase::Created);
}

#[test]
fn map_twice_is_refused() {
    let (mut session, _, _) = mapped_session();
    let err = session.map_and_flush().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::WrongPhase {
            phase: Phase::Mapped,
            ..
        })
    ));
}

#[test]
fn gc_needs_a_mapped_window() {
    let (mut session, log, _) = session_with(WindowConfig::default());
    assert!(session.create_gc(0xffffff).is_err());
    assert!(log
        .calls()
        .iter()
        .all(|c| !matches!(c, Call::CreateGc { .. })));

    session.map_and_flush().unwrap();
    let gc = session.create_gc(0xffffff).unwrap();
    assert!(log.calls().contains(&Call::CreateGc {
        id: gc,
        drawable: session.window(),
        foreground: 0xffffff,
    }));
}

#[test]
fn loop_needs_a_mapped_window() {
    let (mut session, _, events) = session_with(WindowConfig::default());
    close(&session, &events, 0);
    let mut handler = RecordingHandler::default();
    assert!(session.run(&mut handler).is_err());
    assert_eq!(handler.frames, 0);
    assert_eq!(events.len(), 1);
}

#[test]
fn expose_is_handled_once_with_its_rectangle() {
    let (mut session, _, events) = mapped_session();
    let window = session.window();
    let area = Rect::new(10, 20, 300, 40);
    events.expose(window, area);

    let mut handler = RecordingHandler::default();
    assert_eq!(session.drain_events(&mut handler).unwrap(), 1);
    assert_eq!(handler.exposed, vec![(window, area)]);
    assert!(session.is_running());
}

#[test]
fn events_for_other_windows_are_ignored() {
    let (mut session, _, events) = mapped_session();
    let other = session.window() + 1;
    let atoms = session.atoms().unwrap();
    events.expose(other, Rect::new(0, 0, 5, 5));
    events.delete_window(other, atoms.WM_PROTOCOLS, atoms.WM_DELETE_WINDOW, 7);
    events.push(WindowEvent::Ignored);

    let mut handler = RecordingHandler::default();
    assert_eq!(session.drain_events(&mut handler).unwrap(), 3);
    assert!(handler.exposed.is_empty());
    assert!(handler.close_requests.is_empty());
    assert!(session.is_running());
}

#[test]
fn other_client_messages_do_not_close() {
    let (mut session, _, events) = mapped_session();
    events.push(WindowEvent::ClientMessage {
        window: session.window(),
        format: 32,
        type_: 301,
        data: [999, 5, 0, 0, 0],
    });
    let mut handler = RecordingHandler::default();
    session.drain_events(&mut handler).unwrap();
    assert!(session.is_running());
    assert_eq!(session.close_time(), None);
}

#[test]
fn draining_an_empty_queue_does_nothing() {
    let (mut session, _, _) = mapped_session();
    let mut handler = RecordingHandler::default();
    for _ in 0..3 {
        assert_eq!(session.drain_events(&mut handler).unwrap(), 0);
    }
    assert!(handler.exposed.is_empty());
    assert!(session.is_running());
    assert_eq!(session.phase(), Phase::Mapped);
}

#[test]
fn close_request_stops_the_loop() {
    let (mut session, _, events) = mapped_session();
    let window = session.window();
    let atoms = session.atoms().unwrap();

    // Nothing arrives for a couple of frames, then the window manager closes the window.
    let queue = events.clone();
    let mut handler = RecordingHandler::on_render(move |frame| {
        if frame == 2 {
            queue.delete_window(window, atoms.WM_PROTOCOLS, atoms.WM_DELETE_WINDOW, 1234);
        }
        Ok(())
    });
    session.run(&mut handler).unwrap();

    assert_eq!(handler.frames, 3);
    assert_eq!(handler.close_requests, vec![1234]);
    assert_eq!(session.close_time(), Some(1234));
    assert!(!session.is_running());
    assert_eq!(session.phase(), Phase::Closing);
}

#[test]
fn close_request_does_not_cut_the_drain_short() {
    let (mut session, _, events) = mapped_session();
    let window = session.window();
    close(&session, &events, 10);
    events.expose(window, Rect::new(1, 2, 3, 4));
    close(&session, &events, 20);

    let mut handler = RecordingHandler::default();
    session.run(&mut handler).unwrap();

    assert_eq!(handler.frames, 1);
    assert_eq!(handler.exposed, vec![(window, Rect::new(1, 2, 3, 4))]);
    assert_eq!(events.len(), 0);
    // The flag only flips once; the first request wins.
    assert_eq!(handler.close_requests, vec![10]);
    assert_eq!(session.close_time(), Some(10));
}

#[test]
fn render_errors_end_the_loop() {
    let (mut session, _, _) = mapped_session();
    let mut handler = RecordingHandler::on_render(|_| Err(anyhow::anyhow!("lost the context")));
    let err = session.run(&mut handler).unwrap_err();
    assert!(format!("{err:#}").contains("lost the context"));
}

#[test]
fn teardown_releases_everything_in_reverse() {
    let mut config = WindowConfig::default();
    config.set_visual(VisualChoice { id: 0x55, depth: 24 });
    let (mut session, log, events) = session_with(config);
    session.map_and_flush().unwrap();
    let gc = session.create_gc(0).unwrap();
    close(&session, &events, 0);
    session.run(&mut RecordingHandler::default()).unwrap();
    let window = session.window();
    session.teardown().unwrap();

    let mut generated = log.generated_ids();
    generated.reverse();
    assert_eq!(log.released_ids(), generated);

    let calls = log.calls();
    let n = calls.len();
    let colormap = generated[2];
    assert_eq!(
        calls[n - 5..],
        [
            Call::FreeGc(gc),
            Call::DestroyWindow(window),
            Call::FreeColormap(colormap),
            Call::Flush,
            Call::Disconnect,
        ]
    );
}

#[test]
fn dropping_a_session_releases_everything() {
    let (mut session, log, _) = mapped_session();
    let gc = session.create_gc(0).unwrap();
    let window = session.window();
    drop(session);
    assert_eq!(log.released_ids(), vec![gc, window]);
    assert_eq!(log.calls().last(), Some(&Call::Disconnect));
}

#[test]
fn painter_fills_its_shape_on_a_full_expose() {
    let (mut session, log, events) = mapped_session();
    let window = session.window();
    let gc = session.create_gc(0xcdd6f4).unwrap();
    let mut painter = RectanglePainter::centered(gc, 1280, 720);
    assert_eq!(painter.shape(), Rect::new(320, 180, 640, 360));
    events.expose(window, Rect::new(0, 0, 1280, 720));
    close(&session, &events, 0);
    log.clear();

    session.run(&mut painter).unwrap();
    assert_eq!(
        log.calls(),
        vec![
            Call::FillRectangle(window, gc, Rect::new(320, 180, 640, 360)),
            Call::Flush
        ]
    );
}

#[test]
fn painter_only_redraws_what_was_exposed() {
    let (mut session, log, events) = mapped_session();
    let window = session.window();
    let gc = session.create_gc(0xcdd6f4).unwrap();
    let mut painter = RectanglePainter::new(gc, Rect::new(320, 180, 640, 360));
    // One corner of the shape, then a strip of plain background.
    events.expose(window, Rect::new(0, 0, 400, 200));
    events.expose(window, Rect::new(0, 600, 1280, 120));
    close(&session, &events, 0);
    log.clear();

    session.run(&mut painter).unwrap();
    assert_eq!(
        log.calls(),
        vec![
            Call::FillRectangle(window, gc, Rect::new(320, 180, 80, 20)),
            Call::Flush
        ]
    );
}

#[test]
fn error_events_end_the_loop() {
    let (mut session, _, events) = mapped_session();
    let window = session.window();
    events.expose(window, Rect::new(0, 0, 10, 10));
    events.error(bad_window(window + 7));
    events.expose(window, Rect::new(10, 10, 10, 10));
    close(&session, &events, 3);

    let mut handler = RecordingHandler::default();
    let err = session.run(&mut handler).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::XError(_))
    ));
    // Whatever was queued behind the error is never dispatched.
    assert_eq!(handler.exposed, vec![(window, Rect::new(0, 0, 10, 10))]);
    assert_eq!(events.len(), 2);
    assert!(handler.close_requests.is_empty());
    assert!(session.is_running());
}

#[test]
fn error_events_fail_a_drain() {
    let (mut session, _, events) = mapped_session();
    events.error(bad_window(session.window()));
    let mut handler = RecordingHandler::default();
    assert!(session.drain_events(&mut handler).is_err());
    assert_eq!(events.len(), 0);
    assert_eq!(session.drain_events(&mut handler).unwrap(), 0);
}

#[test]
fn failed_release_does_not_stop_teardown() {
    let server = RecordingServer::new().failing_destroy();
    let log = server.log();
    let mut config = WindowConfig::default();
    config.set_visual(VisualChoice { id: 0x55, depth: 24 });
    let mut session = Session::new(server, config).unwrap();
    session.map_and_flush().unwrap();
    let gc = session.create_gc(0).unwrap();
    let window = session.window();
    let colormap = log.generated_ids()[0];

    let err = session.teardown().unwrap_err();
    assert!(format!("{err:#}").contains("release session resources"));
    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::XError(_))
    ));
    assert_eq!(log.released_ids(), vec![gc, window, colormap]);
    let calls = log.calls();
    assert_eq!(
        calls[calls.len() - 2..],
        [Call::Flush, Call::Disconnect]
    );
}
