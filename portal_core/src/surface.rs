// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface dimensions as reported by the host.
//!
//! The engine never queries the viewport itself. The host computes a
//! [`SurfaceSize`] on startup and on every resize notification and hands it to
//! the session, which treats it as an immutable snapshot for each tick.

use kurbo::{Point, Rect, Size};

/// Coarse viewport class used to pick cost-sensitive settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DeviceClass {
    /// Phones and narrow windows: lower noise resolution and rate.
    Narrow,
    /// Everything else.
    #[default]
    Wide,
}

impl DeviceClass {
    /// CSS width below which a viewport counts as [`Narrow`](Self::Narrow).
    pub const NARROW_BREAKPOINT_CSS_PX: f64 = 768.0;

    /// Classifies a viewport by its CSS pixel width.
    #[must_use]
    pub fn from_css_width(css_width: f64) -> Self {
        if css_width < Self::NARROW_BREAKPOINT_CSS_PX {
            Self::Narrow
        } else {
            Self::Wide
        }
    }
}

/// Drawing surface size in device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSize {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
    /// Device pixel ratio after clamping.
    pub device_pixel_ratio: f64,
    /// Viewport class derived from the CSS width.
    pub device_class: DeviceClass,
}

impl SurfaceSize {
    /// Lowest device pixel ratio honored.
    pub const MIN_DPR: f64 = 1.0;
    /// Highest device pixel ratio honored; denser screens render at 2x.
    pub const MAX_DPR: f64 = 2.0;

    /// Zero-sized surface, before the host reports a viewport.
    pub const EMPTY: Self = Self::from_pixels(0, 0, DeviceClass::Wide);

    /// Derives the device-pixel surface for a CSS viewport.
    ///
    /// The ratio is clamped to `[MIN_DPR, MAX_DPR]` (a missing or non-finite
    /// ratio counts as 1) and each side is floored.
    #[must_use]
    pub fn from_viewport(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> Self {
        let dpr = if device_pixel_ratio.is_finite() {
            device_pixel_ratio.clamp(Self::MIN_DPR, Self::MAX_DPR)
        } else {
            Self::MIN_DPR
        };
        Self {
            width: floor_px(css_width * dpr),
            height: floor_px(css_height * dpr),
            device_pixel_ratio: dpr,
            device_class: DeviceClass::from_css_width(css_width),
        }
    }

    /// A surface given directly in device pixels at a ratio of 1.
    #[must_use]
    pub const fn from_pixels(width: u32, height: u32, device_class: DeviceClass) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio: 1.0,
            device_class,
        }
    }

    /// Whether either side is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size in device pixels as floating point.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// The full surface rectangle anchored at the origin.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.size().to_rect()
    }

    /// Surface center.
    #[must_use]
    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// The shorter side in device pixels.
    #[must_use]
    pub fn min_side(&self) -> f64 {
        f64::from(self.width.min(self.height))
    }

    /// The longer side in device pixels.
    #[must_use]
    pub fn max_side(&self) -> f64 {
        f64::from(self.width.max(self.height))
    }
}

/// Floors a non-negative pixel extent to `u32`, mapping negatives and NaN to 0.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "value is floored and the float-to-int cast saturates"
)]
pub fn floor_px(v: f64) -> u32 {
    if v.is_nan() || v <= 0.0 {
        0
    } else {
        libm::floor(v) as u32
    }
}

/// Rounds a non-negative pixel extent to `u32` (half away from zero).
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "value is rounded and the float-to-int cast saturates"
)]
pub fn round_px(v: f64) -> u32 {
    if v.is_nan() || v <= 0.0 {
        0
    } else {
        libm::round(v) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpr_is_clamped() {
        let hi = SurfaceSize::from_viewport(400.0, 800.0, 3.0);
        assert_eq!(hi.device_pixel_ratio, 2.0, "3x screens render at 2x");
        assert_eq!((hi.width, hi.height), (800, 1600));

        let lo = SurfaceSize::from_viewport(1280.0, 720.0, 0.5);
        assert_eq!(lo.device_pixel_ratio, 1.0, "ratios below 1 count as 1");
        assert_eq!((lo.width, lo.height), (1280, 720));

        let nan = SurfaceSize::from_viewport(100.0, 100.0, f64::NAN);
        assert_eq!(nan.device_pixel_ratio, 1.0, "missing ratio counts as 1");
    }

    #[test]
    fn sides_are_floored() {
        let s = SurfaceSize::from_viewport(333.3, 200.9, 1.5);
        assert_eq!(s.width, 499, "333.3 * 1.5 = 499.95");
        assert_eq!(s.height, 301, "200.9 * 1.5 = 301.35");
    }

    #[test]
    fn device_class_uses_css_width() {
        assert_eq!(
            SurfaceSize::from_viewport(767.0, 1000.0, 2.0).device_class,
            DeviceClass::Narrow
        );
        assert_eq!(
            SurfaceSize::from_viewport(768.0, 1000.0, 1.0).device_class,
            DeviceClass::Wide,
            "breakpoint itself is wide"
        );
    }

    #[test]
    fn pixel_helpers_clamp_garbage() {
        assert_eq!(floor_px(-4.0), 0);
        assert_eq!(floor_px(f64::NAN), 0);
        assert_eq!(round_px(2.5), 3);
        assert_eq!(round_px(2.49), 2);
    }

    #[test]
    fn empty_surface() {
        assert!(SurfaceSize::from_pixels(0, 10, DeviceClass::Wide).is_empty());
        assert!(!SurfaceSize::from_pixels(1, 1, DeviceClass::Wide).is_empty());
    }
}
