use std::path::PathBuf;

use crate::color::{Color, ColorMode};

pub const DEFAULT_WIDTH: usize = 240;
pub const DEFAULT_HEIGHT: usize = 240;

/// What to do with a pixel coordinate outside the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    /// Drop the write silently, like most display drivers.
    #[default]
    Ignore,
    /// Report `DisplayError::OutOfBounds`.
    Strict,
}

/// Construction-time settings for a [`crate::DisplaySurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    pub color_mode: ColorMode,
    pub bounds: BoundsPolicy,
    /// Used by drawing calls that do not name a color.
    pub pen: Color,
    /// When set and existing, every presented frame is saved here.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            color_mode: ColorMode::default(),
            bounds: BoundsPolicy::default(),
            pen: Color::WHITE,
            snapshot_dir: None,
        }
    }
}

impl DisplayConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }

    pub fn with_pen(mut self, pen: Color) -> Self {
        self.pen = pen;
        self
    }

    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }
}
