// Color value stored per pixel, plus the color-mode tag a display advertises.

use std::ops::{Add, Sub};

/// RGBA color. Channels are normalized values quantized to 8 bits at
/// construction (`channel * 255`, truncated), so the packed form is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Build from normalized channels in `[0, 1]`. Out-of-range values are
    /// clamped; no gamma correction is applied.
    pub fn from_normalized(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::rgba(quantize(r), quantize(g), quantize(b), quantize(a))
    }

    /// Channels as normalized `[r, g, b, a]`.
    pub fn to_normalized(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a].map(|c| c as f32 / 255.0)
    }

    /// Complement the color channels; alpha is kept.
    pub fn inverted(self) -> Self {
        Self::rgba(255 - self.r, 255 - self.g, 255 - self.b, self.a)
    }

    /// Byte layout used by the packed mirror: blue, green, red, alpha.
    #[inline]
    pub fn to_bgra(self) -> [u8; 4] {
        [self.b, self.g, self.r, self.a]
    }

    #[inline]
    pub fn from_bgra(px: [u8; 4]) -> Self {
        Self::rgba(px[2], px[1], px[0], px[3])
    }
}

#[inline]
fn quantize(c: f32) -> u8 {
    // NaN clamps to 0 through the saturating cast
    (c.clamp(0.0, 1.0) * 255.0) as u8
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::rgba(
            self.r.saturating_add(rhs.r),
            self.g.saturating_add(rhs.g),
            self.b.saturating_add(rhs.b),
            self.a.saturating_add(rhs.a),
        )
    }
}

impl Sub for Color {
    type Output = Color;

    fn sub(self, rhs: Color) -> Color {
        Color::rgba(
            self.r.saturating_sub(rhs.r),
            self.g.saturating_sub(rhs.g),
            self.b.saturating_sub(rhs.b),
            self.a.saturating_sub(rhs.a),
        )
    }
}

/// Pixel format a display advertises to drawing code. It is a tag only;
/// storage is always full RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    Format1bpp,
    Format4bppGray,
    Format12bppRgb444,
    Format16bppRgb565,
    Format24bppRgb888,
    #[default]
    Format32bppRgba8888,
}

impl ColorMode {
    pub fn bits_per_pixel(self) -> u8 {
        match self {
            ColorMode::Format1bpp => 1,
            ColorMode::Format4bppGray => 4,
            ColorMode::Format12bppRgb444 => 12,
            ColorMode::Format16bppRgb565 => 16,
            ColorMode::Format24bppRgb888 => 24,
            ColorMode::Format32bppRgba8888 => 32,
        }
    }

    /// Single-bit modes have no per-pixel color to invert.
    pub fn is_monochrome(self) -> bool {
        matches!(self, ColorMode::Format1bpp)
    }
}
