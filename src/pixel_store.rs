// Raw pixel memory for one frame.
// The Color grid is the source of truth; the packed BGRA mirror is rebuilt
// from it right before every presentation.
// No bounds checks on single pixels here: `DisplaySurface` enforces them.

use rand::RngCore;

use crate::color::{Color, ColorMode};
use crate::present::Frame;

const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Clone)]
pub struct PixelStore {
    width: usize,
    height: usize,
    colors: Vec<Color>, // row-major, length = width * height
    packed: Vec<u8>,    // B G R A per pixel, derived from `colors`
}

impl PixelStore {
    /// New store cleared to opaque black.
    pub fn new(width: usize, height: usize) -> Self {
        let mut store = Self {
            width,
            height,
            colors: vec![Color::BLACK; width * height],
            packed: Vec::new(),
        };
        store.clear();
        store
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Storage format, independent of what the owning display advertises.
    pub fn color_mode(&self) -> ColorMode {
        ColorMode::Format32bppRgba8888
    }

    pub fn bit_depth(&self) -> u8 {
        24
    }

    /// Size of the packed mirror in bytes.
    pub fn byte_count(&self) -> usize {
        self.width * self.height * BYTES_PER_PIXEL
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of range");
        y * self.width + x
    }

    /// Store `color` at (x, y). Caller validates bounds.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        let i = self.index(x, y);
        self.colors[i] = color;
    }

    /// Color at (x, y). Caller validates bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Color {
        self.colors[self.index(x, y)]
    }

    /// Fill a rectangle, clipped to the store.
    pub fn fill(&mut self, origin_x: usize, origin_y: usize, width: usize, height: usize, color: Color) {
        let x_end = origin_x.saturating_add(width).min(self.width);
        let y_end = origin_y.saturating_add(height).min(self.height);
        if origin_x >= x_end || origin_y >= y_end {
            return;
        }

        for y in origin_y..y_end {
            let row = y * self.width;
            self.colors[row + origin_x..row + x_end].fill(color);
        }
    }

    pub fn fill_all(&mut self, color: Color) {
        self.colors.fill(color);
    }

    /// Opaque black everywhere; the packed mirror is reallocated at nominal size.
    pub fn clear(&mut self) {
        self.packed = vec![0; self.byte_count()];
        self.colors.resize(self.width * self.height, Color::BLACK);
        self.fill_all(Color::BLACK);
    }

    /// Overwrite every pixel with opaque noise.
    pub fn randomize<R: RngCore + ?Sized>(&mut self, rng: &mut R) {
        let mut px = [0u8; 4];
        for c in &mut self.colors {
            rng.fill_bytes(&mut px);
            *c = Color::rgb(px[0], px[1], px[2]);
        }
    }

    /// Copy all of `source` in at the given offset; pixels landing outside
    /// this store are dropped.
    pub fn write_sub_buffer(&mut self, origin_x: usize, origin_y: usize, source: &PixelStore) {
        for y in 0..source.height {
            let ty = origin_y.saturating_add(y);
            if ty >= self.height {
                break;
            }
            for x in 0..source.width {
                let tx = origin_x.saturating_add(x);
                if tx >= self.width {
                    break;
                }
                self.set(tx, ty, source.get(x, y));
            }
        }
    }

    /// Rebuild the packed mirror from the Color grid and return it.
    pub fn to_packed_bytes(&mut self) -> &[u8] {
        let len = self.byte_count();
        if self.packed.len() != len {
            self.packed = vec![0; len];
        }

        for (dst, c) in self.packed.chunks_exact_mut(BYTES_PER_PIXEL).zip(&self.colors) {
            dst.copy_from_slice(&c.to_bgra());
        }
        &self.packed
    }

    /// Rebuild the mirror and move it out as a frame, leaving the store
    /// without one until [`PixelStore::recycle`] hands it back.
    pub fn pack_frame(&mut self) -> Frame {
        self.to_packed_bytes();
        Frame {
            width: self.width,
            height: self.height,
            bytes: std::mem::take(&mut self.packed),
        }
    }

    /// Take back a frame's allocation after presentation.
    pub fn recycle(&mut self, frame: Frame) {
        if frame.bytes.len() == self.byte_count() {
            self.packed = frame.bytes;
        }
    }
}
