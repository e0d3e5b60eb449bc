// Hands finished frames from the drawing thread to the thread that owns the
// host render target.
// The producer's `present()` blocks until the target has been updated, so
// frames are applied one at a time and in submission order.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use image::RgbaImage;

use crate::error::DisplayError;
use crate::snapshot::SnapshotSink;

/// One packed frame: `width * height` pixels, 4 bytes each in
/// blue-green-red-alpha order, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub bytes: Vec<u8>,
}

impl Frame {
    /// BGRA bytes of pixel (x, y).
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.bytes[i], self.bytes[i + 1], self.bytes[i + 2], self.bytes[i + 3]]
    }

    /// Copy into a 0x00RRGGBB buffer (minifb layout) with the given row
    /// stride. The frame lands in the top-left corner.
    pub fn write_0rgb(&self, dst: &mut [u32], stride: usize) {
        for (y, row) in self.bytes.chunks_exact(self.width * 4).enumerate() {
            let out = &mut dst[y * stride..y * stride + self.width];
            for (px, bgra) in out.iter_mut().zip(row.chunks_exact(4)) {
                let (b, g, r) = (bgra[0] as u32, bgra[1] as u32, bgra[2] as u32);
                *px = (r << 16) | (g << 8) | b;
            }
        }
    }

    /// Convert to an RGBA image for encoding.
    /// `None` when `bytes` does not hold exactly `width * height` pixels.
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        let expected = self.width.checked_mul(self.height)?.checked_mul(4)?;
        if self.bytes.len() != expected {
            return None;
        }
        let mut rgba = self.bytes.clone();
        for px in rgba.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
        RgbaImage::from_raw(u32::try_from(self.width).ok()?, u32::try_from(self.height).ok()?, rgba)
    }
}

/// The host-side surface frames are published to. Only ever touched from
/// the thread that runs the [`PresentQueue`].
pub trait RenderTarget {
    /// Target dimensions in pixels.
    fn size(&self) -> (usize, usize);

    /// Apply a whole frame. The frame may be smaller than the target.
    fn write_frame(&mut self, frame: &Frame) -> Result<(), DisplayError>;
}

/// Check a frame fits a target before writing it.
pub fn check_fits(frame: &Frame, target: (usize, usize)) -> Result<(), DisplayError> {
    let (target_width, target_height) = target;
    if frame.width > target_width || frame.height > target_height {
        return Err(DisplayError::FrameTooLarge {
            frame_width: frame.width,
            frame_height: frame.height,
            target_width,
            target_height,
        });
    }
    Ok(())
}

struct Submission {
    frame: Frame,
    snapshot_dir: Option<PathBuf>,
    reply: SyncSender<Result<Frame, DisplayError>>,
}

/// Create a connected producer/consumer pair for a target of the given size.
pub fn rendezvous(target_width: usize, target_height: usize) -> (Presenter, PresentQueue) {
    let (tx, rx) = mpsc::sync_channel(0);
    (
        Presenter {
            tx,
            target_size: (target_width, target_height),
        },
        PresentQueue {
            rx,
            snapshots: SnapshotSink::default(),
            presented: 0,
        },
    )
}

/// Producer side of the bridge, owned by a display surface.
pub struct Presenter {
    tx: SyncSender<Submission>,
    target_size: (usize, usize),
}

impl Presenter {
    pub fn target_size(&self) -> (usize, usize) {
        self.target_size
    }

    /// Publish `frame` and wait until the consumer has applied it.
    /// The frame's buffer comes back so the caller can reuse it.
    pub fn present(&self, frame: Frame, snapshot_dir: Option<&Path>) -> Result<Frame, DisplayError> {
        let (reply, done) = mpsc::sync_channel(1);
        self.tx
            .send(Submission {
                frame,
                snapshot_dir: snapshot_dir.map(Path::to_path_buf),
                reply,
            })
            .map_err(|_| DisplayError::PresenterClosed)?;
        done.recv().map_err(|_| DisplayError::PresenterClosed)?
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    Presented,
    Idle,
    Closed,
}

/// Consumer side of the bridge. Lives on the thread owning the target.
pub struct PresentQueue {
    rx: Receiver<Submission>,
    snapshots: SnapshotSink,
    presented: u64,
}

impl PresentQueue {
    pub fn with_snapshots(mut self, sink: SnapshotSink) -> Self {
        self.snapshots = sink;
        self
    }

    /// Number of frames applied to a target so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Apply frames until every presenter has been dropped.
    pub fn serve<T: RenderTarget + ?Sized>(&mut self, target: &mut T) {
        while let Ok(sub) = self.rx.recv() {
            self.apply(target, sub);
        }
    }

    /// Apply at most one frame, waiting up to `timeout` for it.
    pub fn serve_next<T: RenderTarget + ?Sized>(
        &mut self,
        target: &mut T,
        timeout: Duration,
    ) -> QueueStatus {
        match self.rx.recv_timeout(timeout) {
            Ok(sub) => {
                self.apply(target, sub);
                QueueStatus::Presented
            }
            Err(RecvTimeoutError::Timeout) => QueueStatus::Idle,
            Err(RecvTimeoutError::Disconnected) => QueueStatus::Closed,
        }
    }

    fn apply<T: RenderTarget + ?Sized>(&mut self, target: &mut T, sub: Submission) {
        let Submission {
            frame,
            snapshot_dir,
            reply,
        } = sub;

        let result = target.write_frame(&frame);
        if result.is_ok() {
            self.presented += 1;
            if let Some(dir) = &snapshot_dir {
                if let Err(e) = self.snapshots.capture(dir, &frame) {
                    log::warn!("Snapshot to {} failed: {e}", dir.display());
                }
            }
        }

        // The producer may have given up waiting; nothing to do then.
        let _ = reply.send(result.map(|()| frame));
    }
}

/// Headless render target that keeps the last frame it received.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    width: usize,
    height: usize,
    last: Option<Frame>,
    frames: usize,
}

impl MemoryTarget {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            last: None,
            frames: 0,
        }
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last.as_ref()
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }
}

impl RenderTarget for MemoryTarget {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        check_fits(frame, self.size())?;
        self.last = Some(frame.clone());
        self.frames += 1;
        Ok(())
    }
}

/// Run a [`MemoryTarget`] consumer on its own thread. The handle yields the
/// target once every presenter has been dropped.
pub fn spawn_headless(width: usize, height: usize) -> (Presenter, JoinHandle<MemoryTarget>) {
    let (presenter, mut queue) = rendezvous(width, height);
    let handle = thread::spawn(move || {
        let mut target = MemoryTarget::new(width, height);
        queue.serve(&mut target);
        target
    });
    (presenter, handle)
}
