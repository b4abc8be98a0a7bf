// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned RGBA8 pixel buffers.
//!
//! [`Raster`] is the CPU-side pixel store shared by image assets, the noise
//! buffer and the per-pixel compositors. Pixels are straight (not
//! premultiplied) RGBA, row-major, top row first, matching what a 2D canvas
//! hands out from `getImageData`.

use alloc::vec;
use alloc::vec::Vec;

/// An RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Bytes per pixel.
pub const CHANNELS: usize = 4;

/// Owned, row-major RGBA8 image.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl core::fmt::Debug for Raster {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl Raster {
    /// Creates a fully transparent raster.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height)],
        }
    }

    /// Creates a raster filled with one color.
    #[must_use]
    pub fn solid(width: u32, height: u32, color: Rgba8) -> Self {
        let mut r = Self::new(width, height);
        r.fill(color);
        r
    }

    /// Wraps existing RGBA8 bytes.
    ///
    /// Returns `None` when `data.len()` does not match `width * height * 4`.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == byte_len(width, height)).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the raster has no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw RGBA8 bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Iterates pixels mutably as `[r, g, b, a]` chunks.
    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        self.data.chunks_exact_mut(CHANNELS)
    }

    /// Returns the pixel at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Writes the pixel at `(x, y)`; out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, px: Rgba8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&px);
    }

    /// Fills every pixel with one color.
    pub fn fill(&mut self, color: Rgba8) {
        for px in self.pixels_mut() {
            px.copy_from_slice(&color);
        }
    }

    /// Source-over blends `color` at `alpha` into rows `y0..y0 + rows`.
    ///
    /// Rows past the bottom edge are skipped. Only the color channels are
    /// blended; the destination alpha is left as is.
    pub fn blend_rows(&mut self, y0: u32, rows: u32, color: Rgba8, alpha: f64) {
        let a = alpha.clamp(0.0, 1.0);
        let y1 = y0.saturating_add(rows).min(self.height);
        for y in y0..y1 {
            for x in 0..self.width {
                let i = self.offset(x, y);
                for c in 0..3 {
                    let dst = f64::from(self.data[i + c]);
                    let src = f64::from(color[c]);
                    self.data[i + c] = to_u8(dst + (src - dst) * a);
                }
            }
        }
    }

    /// Reallocates to a new size, clearing to transparent.
    ///
    /// No-op (pixels kept) when the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(byte_len(width, height), 0);
    }

    /// Draws `src` scaled to fill this raster with bilinear filtering.
    ///
    /// Equivalent to drawing an image into a same-sized canvas with
    /// smoothing enabled: every destination pixel is overwritten.
    pub fn draw_scaled_from(&mut self, src: &Self) {
        if self.is_empty() {
            return;
        }
        if src.is_empty() {
            self.fill([0, 0, 0, 0]);
            return;
        }
        if src.dimensions() == self.dimensions() {
            self.data.copy_from_slice(&src.data);
            return;
        }

        let sx = f64::from(src.width) / f64::from(self.width);
        let sy = f64::from(src.height) / f64::from(self.height);
        let max_x = f64::from(src.width - 1);
        let max_y = f64::from(src.height - 1);

        for y in 0..self.height {
            let fy = ((f64::from(y) + 0.5) * sy - 0.5).clamp(0.0, max_y);
            let y0 = floor_index(fy);
            let y1 = (y0 + 1).min(src.height - 1);
            let ty = fy - f64::from(y0);
            for x in 0..self.width {
                let fx = ((f64::from(x) + 0.5) * sx - 0.5).clamp(0.0, max_x);
                let x0 = floor_index(fx);
                let x1 = (x0 + 1).min(src.width - 1);
                let tx = fx - f64::from(x0);

                let i00 = src.offset(x0, y0);
                let i10 = src.offset(x1, y0);
                let i01 = src.offset(x0, y1);
                let i11 = src.offset(x1, y1);
                let o = self.offset(x, y);
                for c in 0..CHANNELS {
                    let top = lerp(src.data[i00 + c], src.data[i10 + c], tx);
                    let bottom = lerp(src.data[i01 + c], src.data[i11 + c], tx);
                    let v = top + (bottom - top) * ty;
                    self.data[o + c] = to_u8(v);
                }
            }
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

fn lerp(a: u8, b: u8, t: f64) -> f64 {
    let a = f64::from(a);
    a + (f64::from(b) - a) * t
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "input is clamped to [0, max index] before the cast"
)]
fn floor_index(v: f64) -> u32 {
    libm::floor(v) as u32
}

/// Rounds and clamps a channel value to `u8`.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "value is clamped to [0, 255] before the cast"
)]
pub fn to_u8(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    libm::round(v.clamp(0.0, 255.0)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_checks_length() {
        assert!(Raster::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(Raster::from_rgba(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn pixel_access_is_bounds_checked() {
        let mut r = Raster::new(3, 2);
        r.set_pixel(2, 1, [1, 2, 3, 4]);
        r.set_pixel(3, 0, [9, 9, 9, 9]);
        assert_eq!(r.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(r.pixel(3, 0), None);
        assert_eq!(r.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn scaling_a_solid_image_keeps_its_color() {
        let src = Raster::solid(7, 5, [120, 60, 30, 255]);
        let mut dst = Raster::new(23, 11);
        dst.draw_scaled_from(&src);
        for y in 0..11 {
            for x in 0..23 {
                assert_eq!(dst.pixel(x, y), Some([120, 60, 30, 255]), "at {x},{y}");
            }
        }
    }

    #[test]
    fn downscale_averages_neighbours() {
        let mut src = Raster::new(2, 1);
        src.set_pixel(0, 0, [0, 0, 0, 255]);
        src.set_pixel(1, 0, [200, 200, 200, 255]);
        let mut dst = Raster::new(1, 1);
        dst.draw_scaled_from(&src);
        assert_eq!(dst.pixel(0, 0), Some([100, 100, 100, 255]), "midpoint sample");
    }

    #[test]
    fn resize_clears_only_on_change() {
        let mut r = Raster::solid(2, 2, [5, 5, 5, 5]);
        r.resize(2, 2);
        assert_eq!(r.pixel(1, 1), Some([5, 5, 5, 5]), "same size keeps pixels");
        r.resize(4, 1);
        assert_eq!(r.dimensions(), (4, 1));
        assert_eq!(r.as_bytes().len(), 16);
        assert_eq!(r.pixel(3, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn blend_rows_mixes_color_and_stops_at_edge() {
        let mut r = Raster::solid(2, 3, [0, 0, 0, 255]);
        r.blend_rows(2, 5, [200, 100, 0, 255], 0.5);
        assert_eq!(r.pixel(0, 1), Some([0, 0, 0, 255]), "rows above untouched");
        assert_eq!(r.pixel(1, 2), Some([100, 50, 0, 255]));
    }

    #[test]
    fn to_u8_clamps() {
        assert_eq!(to_u8(-3.0), 0);
        assert_eq!(to_u8(300.0), 255);
        assert_eq!(to_u8(127.6), 128);
        assert_eq!(to_u8(f64::NAN), 0);
    }
}
