//! Desktop stand-in for an embedded display.
//!
//! Drawing code runs on its own thread against a [`DisplaySurface`]. Each
//! `present()` packs the frame and hands it to the thread owning the host
//! render target, optionally saving a PNG snapshot on the way.

pub mod color;
pub mod config;
pub mod display;
pub mod error;
pub mod pixel_store;
pub mod present;
pub mod snapshot;

pub use color::{Color, ColorMode};
pub use config::{BoundsPolicy, DisplayConfig};
pub use display::{BitmapMode, DisplaySurface};
pub use error::DisplayError;
pub use pixel_store::PixelStore;
pub use present::{Frame, MemoryTarget, PresentQueue, Presenter, QueueStatus, RenderTarget};
pub use snapshot::SnapshotSink;
