// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! OpenGL rendering through GLX.
//!
//! The context is created on a window that is already mapped, and it has to be current
//! before any GL entry point is loaded. [`TriangleRenderer`] bundles both with the one
//! pipeline it draws.

mod context;
mod triangle;

pub use context::{GlVersion, GlxContext};
pub use triangle::{fragment_shader, TriangleRenderer, TRIANGLE, VERTEX_SHADER};
