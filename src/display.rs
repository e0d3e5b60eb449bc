//! The addressable display drawing code talks to.
//!
//! A [`DisplaySurface`] owns a [`PixelStore`], applies the bounds policy to
//! every pixel write and publishes frames through a [`Presenter`]. One
//! surface belongs to one drawing thread.

use std::path::{Path, PathBuf};

use rand::RngCore;

use crate::color::{Color, ColorMode};
use crate::config::{BoundsPolicy, DisplayConfig};
use crate::error::DisplayError;
use crate::pixel_store::PixelStore;
use crate::present::Presenter;

/// Ink used for the set bits of a monochrome bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapMode {
    /// Draw set bits in the surface's pen color.
    Pen,
    /// Draw set bits in this color.
    Color(Color),
}

pub struct DisplaySurface {
    width: usize,
    height: usize,
    color_mode: ColorMode,
    pen: Color,
    bounds: BoundsPolicy,
    snapshot_dir: Option<PathBuf>,
    store: PixelStore,
    presenter: Presenter,
    present_count: u64,
}

impl DisplaySurface {
    /// Create a surface and show power-on noise from the thread RNG.
    pub fn new(config: DisplayConfig, presenter: Presenter) -> Result<Self, DisplayError> {
        Self::with_rng(config, presenter, &mut rand::rng())
    }

    /// Create a surface, fill it with noise from `rng` and present once,
    /// like a real panel before the application clears it.
    pub fn with_rng<R: RngCore + ?Sized>(
        config: DisplayConfig,
        presenter: Presenter,
        rng: &mut R,
    ) -> Result<Self, DisplayError> {
        let DisplayConfig {
            width,
            height,
            color_mode,
            bounds,
            pen,
            snapshot_dir,
        } = config;

        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidDimensions { width, height });
        }
        let (target_width, target_height) = presenter.target_size();
        if target_width < width || target_height < height {
            return Err(DisplayError::TargetTooSmall {
                width,
                height,
                target_width,
                target_height,
            });
        }

        let mut store = PixelStore::new(width, height);
        store.randomize(rng);

        let mut surface = Self {
            width,
            height,
            color_mode,
            pen,
            bounds,
            snapshot_dir,
            store,
            presenter,
            present_count: 0,
        };
        log::info!("Display {width}x{height} ({color_mode:?}) created, showing noise until cleared");
        surface.present()?;
        Ok(surface)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn pen_color(&self) -> Color {
        self.pen
    }

    pub fn set_pen_color(&mut self, pen: Color) {
        self.pen = pen;
    }

    pub fn bounds_policy(&self) -> BoundsPolicy {
        self.bounds
    }

    pub fn set_bounds_policy(&mut self, bounds: BoundsPolicy) {
        self.bounds = bounds;
    }

    pub fn snapshot_dir(&self) -> Option<&Path> {
        self.snapshot_dir.as_deref()
    }

    /// `None` disables snapshots.
    pub fn set_snapshot_dir(&mut self, dir: Option<PathBuf>) {
        self.snapshot_dir = dir;
    }

    pub fn pixel_buffer(&self) -> &PixelStore {
        &self.store
    }

    /// Frames successfully presented, including the power-on frame.
    pub fn present_count(&self) -> u64 {
        self.present_count
    }

    /// Color at (x, y), or `None` outside the display.
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.locate(x as i64, y as i64).map(|(x, y)| self.store.get(x, y))
    }

    fn locate(&self, x: i64, y: i64) -> Option<(usize, usize)> {
        let inside = x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64;
        inside.then_some((x as usize, y as usize))
    }

    // Apply the bounds policy. Ok(None) means "ignored".
    fn checked(&self, x: i64, y: i64) -> Result<Option<(usize, usize)>, DisplayError> {
        match self.locate(x, y) {
            Some(pos) => Ok(Some(pos)),
            None if self.bounds == BoundsPolicy::Ignore => Ok(None),
            None => Err(DisplayError::OutOfBounds {
                x: saturate(x),
                y: saturate(y),
                width: self.width,
                height: self.height,
            }),
        }
    }

    pub fn clear(&mut self, present: bool) -> Result<(), DisplayError> {
        log::debug!("Clear (present: {present})");
        self.store.clear();
        if present {
            self.present()?;
        }
        Ok(())
    }

    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<(), DisplayError> {
        if let Some((x, y)) = self.checked(x as i64, y as i64)? {
            self.store.set(x, y, color);
        }
        Ok(())
    }

    /// `true` draws in the pen color, `false` in opaque black.
    pub fn draw_pen_pixel(&mut self, x: i32, y: i32, colored: bool) -> Result<(), DisplayError> {
        let color = if colored { self.pen } else { Color::BLACK };
        self.draw_pixel(x, y, color)
    }

    /// Complement the color channels of one pixel; alpha is kept.
    pub fn invert_pixel(&mut self, x: i32, y: i32) -> Result<(), DisplayError> {
        if self.color_mode.is_monochrome() {
            return Err(DisplayError::Unsupported {
                operation: "invert_pixel",
                mode: self.color_mode,
            });
        }
        if let Some((x, y)) = self.checked(x as i64, y as i64)? {
            let c = self.store.get(x, y);
            self.store.set(x, y, c.inverted());
        }
        Ok(())
    }

    /// Draw a monochrome bitmap packed 8 pixels per byte, most significant
    /// bit leftmost. `width_bytes` is the row length in bytes.
    /// Unset bits leave the surface untouched.
    pub fn draw_bitmap(
        &mut self,
        x: i32,
        y: i32,
        width_bytes: usize,
        height: usize,
        bits: &[u8],
        mode: BitmapMode,
    ) -> Result<(), DisplayError> {
        // a size that does not fit in usize can never match
        let expected = width_bytes.checked_mul(height).unwrap_or(usize::MAX);
        if bits.len() != expected {
            return Err(DisplayError::SizeMismatch {
                expected,
                actual: bits.len(),
            });
        }
        let color = match mode {
            BitmapMode::Pen => self.pen,
            BitmapMode::Color(c) => c,
        };

        // Strict: refuse the whole bitmap before touching anything.
        if self.bounds == BoundsPolicy::Strict {
            for (px, py) in set_bits(x, y, width_bytes, bits) {
                self.checked(px, py)?;
            }
        }

        for (px, py) in set_bits(x, y, width_bytes, bits) {
            if let Some((px, py)) = self.locate(px, py) {
                self.store.set(px, py, color);
            }
        }
        Ok(())
    }

    /// Blit `source` with its top-left corner at (x, y), clipped to the display.
    pub fn write_buffer(&mut self, x: i32, y: i32, source: &PixelStore) -> Result<(), DisplayError> {
        let Some((x0, x1)) = clip_span(x, source.width(), self.width) else {
            return Ok(());
        };
        let Some((y0, y1)) = clip_span(y, source.height(), self.height) else {
            return Ok(());
        };

        for ty in y0..y1 {
            let sy = (ty as i64 - y as i64) as usize;
            for tx in x0..x1 {
                let sx = (tx as i64 - x as i64) as usize;
                self.store.set(tx, ty, source.get(sx, sy));
            }
        }
        Ok(())
    }

    /// Fill a rectangle, clipped to the display.
    pub fn fill(
        &mut self,
        x: i32,
        y: i32,
        width: usize,
        height: usize,
        color: Color,
        present: bool,
    ) -> Result<(), DisplayError> {
        if let (Some((x0, x1)), Some((y0, y1))) = (
            clip_span(x, width, self.width),
            clip_span(y, height, self.height),
        ) {
            self.store.fill(x0, y0, x1 - x0, y1 - y0, color);
        }
        if present {
            self.present()?;
        }
        Ok(())
    }

    pub fn fill_all(&mut self, color: Color, present: bool) -> Result<(), DisplayError> {
        self.store.fill_all(color);
        if present {
            self.present()?;
        }
        Ok(())
    }

    /// Publish the whole frame and wait until the host has shown it.
    pub fn present(&mut self) -> Result<(), DisplayError> {
        log::debug!("Present #{}", self.present_count);
        let frame = self.store.pack_frame();
        let frame = self.presenter.present(frame, self.snapshot_dir.as_deref())?;
        self.store.recycle(frame);
        self.present_count += 1;
        Ok(())
    }

    /// Partial updates are not implemented; the region is ignored and the
    /// full frame is published.
    pub fn present_region(&mut self, _left: i32, _top: i32, _right: i32, _bottom: i32) -> Result<(), DisplayError> {
        self.present()
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Overlap of `[origin, origin + len)` with `[0, limit)`.
fn clip_span(origin: i32, len: usize, limit: usize) -> Option<(usize, usize)> {
    let origin = origin as i64;
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let start = origin.max(0);
    let end = origin.saturating_add(len).min(limit as i64);
    (start < end).then_some((start as usize, end as usize))
}

// Surface coordinates of every set bit.
fn set_bits(x: i32, y: i32, width_bytes: usize, bits: &[u8]) -> impl Iterator<Item = (i64, i64)> + '_ {
    bits.iter().enumerate().flat_map(move |(i, &byte)| {
        let row = (i / width_bytes) as i64;
        let col = (i % width_bytes) as i64 * 8;
        (0..8i64)
            .filter(move |&bit| byte & (0x80u8 >> bit) != 0)
            .map(move |bit| (x as i64 + col + bit, y as i64 + row))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::present::{self, MemoryTarget};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::thread::JoinHandle;

    fn surface(config: DisplayConfig) -> (DisplaySurface, JoinHandle<MemoryTarget>) {
        let (presenter, host) = present::spawn_headless(config.width, config.height);
        let surface = DisplaySurface::with_rng(config, presenter, &mut StdRng::seed_from_u64(1)).unwrap();
        (surface, host)
    }

    fn cleared(width: usize, height: usize, bounds: BoundsPolicy) -> (DisplaySurface, JoinHandle<MemoryTarget>) {
        let (mut s, host) = surface(DisplayConfig::new(width, height).with_bounds(bounds));
        s.clear(false).unwrap();
        (s, host)
    }

    #[test]
    fn construction_presents_noise_once() {
        let (s, host) = surface(DisplayConfig::new(8, 8));
        assert_eq!(s.present_count(), 1);
        drop(s);

        let target = host.join().unwrap();
        assert_eq!(target.frames_written(), 1);
        let frame = target.last_frame().unwrap();
        assert!(frame.bytes.chunks_exact(4).any(|px| px != [0, 0, 0, 255]));
    }

    #[test]
    fn construction_rejects_small_target() {
        let (presenter, _queue) = present::rendezvous(10, 10);
        let err = DisplaySurface::new(DisplayConfig::new(11, 10), presenter).err().unwrap();
        assert!(matches!(err, DisplayError::TargetTooSmall { target_width: 10, .. }));
    }

    #[test]
    fn construction_rejects_zero_size() {
        let (presenter, _queue) = present::rendezvous(10, 10);
        let err = DisplaySurface::new(DisplayConfig::new(0, 10), presenter).err().unwrap();
        assert!(matches!(err, DisplayError::InvalidDimensions { .. }));
    }

    #[test]
    fn ignore_policy_drops_out_of_range_pixels() {
        let (mut s, _host) = cleared(4, 4, BoundsPolicy::Ignore);
        s.draw_pixel(-1, 0, Color::RED).unwrap();
        s.draw_pixel(4, 0, Color::RED).unwrap();
        s.draw_pixel(0, 4, Color::RED).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(s.get_pixel(x, y), Some(Color::BLACK));
            }
        }
    }

    #[test]
    fn strict_policy_names_the_coordinate() {
        let (mut s, _host) = cleared(4, 4, BoundsPolicy::Strict);
        let err = s.draw_pixel(4, 2, Color::RED).unwrap_err();
        assert!(matches!(err, DisplayError::OutOfBounds { x: 4, y: 2, .. }));
        assert!(s.draw_pixel(3, 3, Color::RED).is_ok());
    }

    #[test]
    fn pen_pixel_uses_pen_or_black() {
        let (mut s, _host) = cleared(4, 4, BoundsPolicy::Ignore);
        s.set_pen_color(Color::GREEN);
        s.draw_pen_pixel(1, 1, true).unwrap();
        assert_eq!(s.get_pixel(1, 1), Some(Color::GREEN));
        s.draw_pen_pixel(1, 1, false).unwrap();
        assert_eq!(s.get_pixel(1, 1), Some(Color::BLACK));
    }

    #[test]
    fn invert_twice_restores() {
        let (mut s, _host) = cleared(4, 4, BoundsPolicy::Ignore);
        let c = Color::rgba(12, 130, 250, 40);
        s.draw_pixel(2, 1, c).unwrap();
        s.invert_pixel(2, 1).unwrap();
        assert_eq!(s.get_pixel(2, 1), Some(Color::rgba(243, 125, 5, 40)));
        s.invert_pixel(2, 1).unwrap();
        assert_eq!(s.get_pixel(2, 1), Some(c));
    }

    #[test]
    fn invert_unsupported_on_monochrome() {
        let config = DisplayConfig::new(4, 4).with_color_mode(ColorMode::Format1bpp);
        let (mut s, _host) = surface(config);
        let err = s.invert_pixel(0, 0).unwrap_err();
        assert!(matches!(err, DisplayError::Unsupported { .. }));
    }

    #[test]
    fn bitmap_draws_only_set_bits() {
        let (mut s, _host) = cleared(16, 2, BoundsPolicy::Ignore);
        s.fill(0, 0, 16, 2, Color::BLUE, false).unwrap();
        // row 0: 1000_0001 0000_0000, row 1: 0000_0000 0000_0001
        let bits = [0b1000_0001, 0x00, 0x00, 0b0000_0001];
        s.draw_bitmap(0, 0, 2, 2, &bits, BitmapMode::Color(Color::RED)).unwrap();

        assert_eq!(s.get_pixel(0, 0), Some(Color::RED));
        assert_eq!(s.get_pixel(7, 0), Some(Color::RED));
        assert_eq!(s.get_pixel(15, 1), Some(Color::RED));
        // unset bits keep what was there
        assert_eq!(s.get_pixel(1, 0), Some(Color::BLUE));
        assert_eq!(s.get_pixel(8, 0), Some(Color::BLUE));
    }

    #[test]
    fn bitmap_pen_mode_and_clipping() {
        let (mut s, _host) = cleared(4, 4, BoundsPolicy::Ignore);
        s.set_pen_color(Color::WHITE);
        s.draw_bitmap(2, 3, 1, 1, &[0xFF], BitmapMode::Pen).unwrap();
        assert_eq!(s.get_pixel(2, 3), Some(Color::WHITE));
        assert_eq!(s.get_pixel(3, 3), Some(Color::WHITE));
        assert_eq!(s.get_pixel(1, 3), Some(Color::BLACK));
    }

    #[test]
    fn bitmap_size_mismatch_leaves_store_alone() {
        let (mut s, _host) = cleared(8, 8, BoundsPolicy::Ignore);
        let before = s.pixel_buffer().clone();
        let err = s.draw_bitmap(0, 0, 2, 2, &[0xFF; 3], BitmapMode::Pen).unwrap_err();
        assert!(matches!(err, DisplayError::SizeMismatch { expected: 4, actual: 3 }));
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(s.pixel_buffer().get(x, y), before.get(x, y));
            }
        }
    }

    #[test]
    fn oversized_bitmap_dimensions_are_a_mismatch() {
        let (mut s, _host) = cleared(4, 4, BoundsPolicy::Ignore);
        let err = s.draw_bitmap(0, 0, usize::MAX, 2, &[0xFF], BitmapMode::Pen).unwrap_err();
        assert!(matches!(
            err,
            DisplayError::SizeMismatch { expected: usize::MAX, actual: 1 }
        ));
        // width * height wrapping to zero must not pass as an empty bitmap
        let err = s.draw_bitmap(0, 0, 1 << (usize::BITS - 1), 2, &[], BitmapMode::Pen).unwrap_err();
        assert!(matches!(err, DisplayError::SizeMismatch { actual: 0, .. }));
        assert_eq!(s.get_pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn strict_bitmap_fails_without_partial_drawing() {
        let (mut s, _host) = cleared(4, 4, BoundsPolicy::Strict);
        let err = s.draw_bitmap(0, 0, 1, 1, &[0xFF], BitmapMode::Pen).unwrap_err();
        assert!(matches!(err, DisplayError::OutOfBounds { x: 4, y: 0, .. }));
        assert_eq!(s.get_pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn write_buffer_clips_negative_origin() {
        let (mut s, _host) = cleared(4, 4, BoundsPolicy::Strict);
        let mut src = PixelStore::new(3, 3);
        src.set(2, 2, Color::GREEN);
        src.set(0, 0, Color::RED);
        s.write_buffer(-2, -2, &src).unwrap();
        assert_eq!(s.get_pixel(0, 0), Some(Color::GREEN));
        assert_eq!(s.get_pixel(1, 1), Some(Color::BLACK));
    }

    #[test]
    fn fill_clips_and_presents() {
        let (mut s, host) = cleared(4, 4, BoundsPolicy::Ignore);
        s.fill(-1, -1, 2, 2, Color::RED, true).unwrap();
        assert_eq!(s.get_pixel(0, 0), Some(Color::RED));
        assert_eq!(s.get_pixel(1, 0), Some(Color::BLACK));
        assert_eq!(s.present_count(), 2);
        drop(s);

        let target = host.join().unwrap();
        assert_eq!(target.last_frame().unwrap().pixel(0, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn present_region_publishes_everything() {
        let (mut s, host) = cleared(4, 4, BoundsPolicy::Ignore);
        s.draw_pixel(3, 3, Color::BLUE).unwrap();
        s.present_region(0, 0, 1, 1).unwrap();
        drop(s);

        let target = host.join().unwrap();
        assert_eq!(target.last_frame().unwrap().pixel(3, 3), [255, 0, 0, 255]);
    }

    #[test]
    fn present_after_host_closed_fails() {
        let (presenter, mut queue) = present::rendezvous(2, 2);
        let host = std::thread::spawn(move || {
            let mut target = MemoryTarget::new(2, 2);
            // take the power-on frame, then go away
            queue.serve_next(&mut target, std::time::Duration::from_secs(5));
        });
        let mut s = DisplaySurface::new(DisplayConfig::new(2, 2), presenter).unwrap();
        host.join().unwrap();

        assert!(matches!(s.present(), Err(DisplayError::PresenterClosed)));
        // the store survives a lost frame
        s.clear(false).unwrap();
        assert_eq!(s.get_pixel(1, 1), Some(Color::BLACK));
    }
}
