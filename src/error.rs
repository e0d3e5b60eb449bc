// One error type for the whole simulator.
// Every variant states *where* things went wrong.
use crate::color::ColorMode;

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("Invalid display size {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    // Host render target cannot hold the requested display
    #[error("Render target {target_width}x{target_height} is too small for {width}x{height}")]
    TargetTooSmall {
        width: usize,
        height: usize,
        target_width: usize,
        target_height: usize,
    },

    #[error("Pixel ({x}, {y}) is outside the {width}x{height} display")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    #[error("Bitmap size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("{operation} is not supported in color mode {mode:?}")]
    Unsupported {
        operation: &'static str,
        mode: ColorMode,
    },

    // The consumer side of the presentation bridge is gone
    #[error("Presentation target closed")]
    PresenterClosed,

    #[error("Frame {frame_width}x{frame_height} does not fit render target {target_width}x{target_height}")]
    FrameTooLarge {
        frame_width: usize,
        frame_height: usize,
        target_width: usize,
        target_height: usize,
    },

    #[error("Window init error: {0}")]
    WindowInit(String),

    #[error("Window update error: {0}")]
    WindowUpdate(String),

    // Frame byte count disagrees with its dimensions
    #[error("Frame {width}x{height} carries {len} bytes, not 4 per pixel")]
    MalformedFrame { width: usize, height: usize, len: usize },

    #[error("Snapshot encode error: {0}")]
    Snapshot(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
