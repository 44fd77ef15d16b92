// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Window parameters.

/// The title every demo window gets unless told otherwise.
pub const DEFAULT_TITLE: &str = "Test X11";
/// Default window width, in pixels.
pub const DEFAULT_WIDTH: u16 = 1280;
/// Default window height, in pixels.
pub const DEFAULT_HEIGHT: u16 = 720;
/// `#1e1e2e`
pub const DEFAULT_BACKGROUND: u32 = 0x1e1e2e;
/// `#cdd6f4`
pub const DEFAULT_FOREGROUND: u32 = 0xcdd6f4;

/// A visual picked by someone other than the session, e.g. by GLX.
///
/// When set, the window is created with this visual and depth, and with a colormap
/// allocated for the visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualChoice {
    pub id: u32,
    pub depth: u8,
}

/// Everything needed to create the session's window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    title: String,
    width: u16,
    height: u16,
    background_pixel: u32,
    foreground_pixel: u32,
    close_protocol: bool,
    visual: Option<VisualChoice>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            title: DEFAULT_TITLE.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background_pixel: DEFAULT_BACKGROUND,
            foreground_pixel: DEFAULT_FOREGROUND,
            close_protocol: true,
            visual: None,
        }
    }
}

impl WindowConfig {
    pub fn set_title<S: Into<String>>(&mut self, title: S) {
        self.title = title.into();
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn set_background_pixel(&mut self, pixel: u32) {
        self.background_pixel = pixel;
    }

    /// The pixel value used for drawing on top of the background.
    pub fn set_foreground_pixel(&mut self, pixel: u32) {
        self.foreground_pixel = pixel;
    }

    /// Whether to register `WM_DELETE_WINDOW`.
    ///
    /// Without it the window manager has no way of asking us to close, and will simply kill
    /// the connection instead.
    pub fn set_close_protocol(&mut self, close_protocol: bool) {
        self.close_protocol = close_protocol;
    }

    pub fn set_visual(&mut self, visual: VisualChoice) {
        self.visual = Some(visual);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn background_pixel(&self) -> u32 {
        self.background_pixel
    }

    pub fn foreground_pixel(&self) -> u32 {
        self.foreground_pixel
    }

    pub fn close_protocol(&self) -> bool {
        self.close_protocol
    }

    pub fn visual(&self) -> Option<VisualChoice> {
        self.visual
    }

    /// X rejects windows with a zero dimension, so catch that before asking.
    pub(crate) fn validate(&self) -> Result<(), crate::Error> {
        if self.width == 0 || self.height == 0 {
            return Err(crate::Error::InvalidConfig("window size must be non-zero"));
        }
        Ok(())
    }
}

/// Splits a `0xRRGGBB` pixel into normalized color components, with full alpha.
pub fn pixel_to_rgba(pixel: u32) -> [f32; 4] {
    let channel = |shift: u32| ((pixel >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0), 1.0]
}
