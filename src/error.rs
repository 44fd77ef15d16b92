// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Errors at the session level.

use std::fmt;
use std::sync::Arc;

use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::x11_utils::X11Error;

use crate::session::Phase;

/// Session errors.
#[derive(Debug, Clone)]
pub enum Error {
    /// Connecting to the X server failed.
    Connect(Arc<ConnectError>),
    /// Xlib could not open the default display.
    NoDisplay,
    /// An X11 request failed, or the server answered with an error.
    XError(Arc<ReplyError>),
    /// The server ran out of resource ids for this client.
    IdsExhausted,
    /// An atom that has to exist on the server was not found.
    MissingAtom(&'static str),
    /// The window configuration cannot be turned into a window.
    InvalidConfig(&'static str),
    /// An operation was attempted before its preconditions were met.
    WrongPhase {
        operation: &'static str,
        phase: Phase,
    },
    /// A GLX call failed.
    Glx(&'static str),
    /// A shader failed to compile, or the program failed to link.
    Shader(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Error::Connect(e) => write!(f, "failed to connect to the X server: {e}"),
            Error::NoDisplay => write!(f, "failed to open the default X display"),
            Error::XError(e) => e.fmt(f),
            Error::IdsExhausted => write!(f, "the X server ran out of resource ids"),
            Error::MissingAtom(name) => write!(f, "atom {name} does not exist on the server"),
            Error::InvalidConfig(reason) => write!(f, "invalid window configuration: {reason}"),
            Error::WrongPhase { operation, phase } => {
                write!(f, "cannot {operation} while the session is {phase:?}")
            }
            Error::Glx(call) => write!(f, "{call} failed"),
            Error::Shader(log) => write!(f, "shader error: {log}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConnectError> for Error {
    fn from(err: ConnectError) -> Error {
        Error::Connect(Arc::new(err))
    }
}

impl From<X11Error> for Error {
    fn from(err: X11Error) -> Error {
        Error::XError(Arc::new(ReplyError::X11Error(err)))
    }
}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Error {
        Error::XError(Arc::new(ReplyError::ConnectionError(err)))
    }
}

impl From<ReplyError> for Error {
    fn from(err: ReplyError) -> Error {
        Error::XError(Arc::new(err))
    }
}

impl From<ReplyOrIdError> for Error {
    fn from(err: ReplyOrIdError) -> Error {
        match err {
            ReplyOrIdError::IdsExhausted => Error::IdsExhausted,
            ReplyOrIdError::ConnectionError(e) => e.into(),
            ReplyOrIdError::X11Error(e) => e.into(),
        }
    }
}
