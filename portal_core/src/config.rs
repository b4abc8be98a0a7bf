// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunables for the gate sequence.
//!
//! Every struct has a `const` constructor carrying the shipped values; fields
//! are public so a host can override one value without restating the rest:
//!
//! ```
//! use portal_core::config::GateConfig;
//!
//! let mut config = GateConfig::portal();
//! config.overlay.draw_chance = 1.0;
//! ```

use crate::surface::DeviceClass;
use crate::timeline::Timeline;

/// Straight-alpha color with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha in `[0, 1]`.
    pub a: f64,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color with alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// The same color at a different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// RGBA8 with the alpha scaled to 0..=255.
    #[must_use]
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            self.r,
            self.g,
            self.b,
            crate::raster::to_u8(self.a * 255.0),
        ]
    }
}

/// Noise generator settings for one device class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseConfig {
    /// Surface pixels per noise cell along each axis.
    pub scale_divisor: u32,
    /// Minimum buffer width.
    pub min_width: u32,
    /// Minimum buffer height.
    pub min_height: u32,
    /// Minimum time between regenerations.
    pub interval_ms: f64,
    /// Minimum time between regenerations while collapsed.
    pub collapse_interval_ms: f64,
    /// Lowest normal luminance.
    pub luma_base: f64,
    /// Width of the normal luminance range.
    pub luma_range: f64,
    /// Lowest collapsed luminance.
    pub collapse_luma_base: f64,
    /// Width of the collapsed luminance range.
    pub collapse_luma_range: f64,
    /// Scan-line probability per regeneration, before `slow` scaling.
    pub scanline_chance: f64,
    /// Scan-line probability while collapsed, before `slow` scaling.
    pub collapse_scanline_chance: f64,
    /// Blit opacity while collapsed.
    pub collapse_alpha: f64,
    /// Vignette inner radius as a share of the shorter surface side.
    pub vignette_inner: f64,
    /// Vignette outer radius as a share of the longer surface side.
    pub vignette_outer: f64,
    /// Vignette edge darkness at full fade.
    pub vignette_alpha: f64,
}

impl NoiseConfig {
    /// Quarter resolution, regenerated at up to 60 Hz.
    #[must_use]
    pub const fn wide() -> Self {
        Self {
            scale_divisor: 4,
            min_width: 160,
            min_height: 90,
            interval_ms: 16.0,
            collapse_interval_ms: 8.0,
            luma_base: 120.0,
            luma_range: 100.0,
            collapse_luma_base: 8.0,
            collapse_luma_range: 15.0,
            scanline_chance: 0.09,
            collapse_scanline_chance: 0.02,
            collapse_alpha: 0.12,
            vignette_inner: 0.2,
            vignette_outer: 0.7,
            vignette_alpha: 0.35,
        }
    }

    /// Sixth resolution, regenerated at up to 30 Hz, never faster.
    #[must_use]
    pub const fn narrow() -> Self {
        Self {
            scale_divisor: 6,
            interval_ms: 33.0,
            collapse_interval_ms: 33.0,
            ..Self::wide()
        }
    }

    /// The preset for `class`.
    #[must_use]
    pub const fn for_device(class: DeviceClass) -> Self {
        match class {
            DeviceClass::Narrow => Self::narrow(),
            DeviceClass::Wide => Self::wide(),
        }
    }

    /// Noise buffer size for a surface.
    #[must_use]
    pub fn buffer_size(&self, width: u32, height: u32) -> (u32, u32) {
        let div = self.scale_divisor.max(1);
        (
            (width / div).max(self.min_width),
            (height / div).max(self.min_height),
        )
    }
}

/// Mask overlay recoloring and placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayConfig {
    /// Overlay width as a multiple of surface width.
    pub width_factor: f64,
    /// Mean RGB below which a pixel becomes transparent.
    pub cutoff: f64,
    /// Channel multiplier for kept pixels.
    pub darken: f64,
    /// Horizontal offset from center, in device pixels.
    pub x_bias: f64,
    /// Full width of the positional jitter.
    pub jitter: f64,
    /// Probability the overlay is drawn on a given tick.
    pub draw_chance: f64,
}

impl OverlayConfig {
    /// Shipped values.
    #[must_use]
    pub const fn portal() -> Self {
        Self {
            width_factor: 1.2376,
            cutoff: 50.0,
            darken: 0.8,
            x_bias: -50.0,
            jitter: 6.0,
            draw_chance: 0.9,
        }
    }
}

/// Text lines and typography for the plant window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextConfig {
    /// Lines in cue order.
    pub lines: [&'static str; crate::script::LINE_COUNT],
    /// Floor for the base size.
    pub min_px: f64,
    /// Shorter surface side divided by this gives the base size.
    pub size_divisor: f64,
    /// Rendered font size is the base size times this.
    pub size_scale: f64,
    /// Vertical center as a share of surface height.
    pub center_y: f64,
    /// Flat wash drawn under the text.
    pub wash: Color,
    /// Text fill.
    pub fill: Color,
    /// Horizontal advance per character, in em.
    pub advance_em: f64,
    /// Gap between the text and the cursor.
    pub cursor_gap_px: f64,
}

impl TextConfig {
    /// Shipped lines and styling.
    #[must_use]
    pub const fn portal() -> Self {
        Self {
            lines: [
                "a hard drive was found",
                "this was on it",
                "Only one lives",
                "You decide which",
            ],
            min_px: 14.0,
            size_divisor: 34.0,
            size_scale: 2.0,
            center_y: 0.46,
            wash: Color::rgba(0, 0, 0, 0.22),
            fill: Color::rgb(0xe9, 0xe9, 0xea),
            advance_em: 0.6,
            cursor_gap_px: 6.0,
        }
    }

    /// Font size in device pixels for a surface whose shorter side is
    /// `min_side`.
    #[must_use]
    pub fn font_px(&self, min_side: f64) -> f64 {
        let base = libm::floor(min_side / self.size_divisor).max(self.min_px);
        base * self.size_scale
    }
}

/// Reveal image keying, placement and glitch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealConfig {
    /// Width cap as a share of surface width.
    pub width_cap: f64,
    /// Height cap as a share of surface height.
    pub height_cap: f64,
    /// Luma above this is keyed out.
    pub luma_high: f64,
    /// Luma below this is keyed out.
    pub luma_low: f64,
    /// Per-pixel glitch probability.
    pub glitch_chance: f64,
    /// Upper bound of the per-pixel glitch intensity.
    pub glitch_intensity: f64,
    /// Channel offset span at full intensity.
    pub glitch_offset: f64,
    /// Opacity at progress 0.
    pub base_alpha: f64,
    /// Opacity gained as progress completes.
    pub alpha_gain: f64,
    /// Progress multiplier for the opacity ramp.
    pub alpha_rate: f64,
    /// Jitter width in the stable path.
    pub stable_jitter: f64,
    /// Jitter width while glitching.
    pub glitch_jitter: f64,
    /// Width of the random scale band around 1 while glitching.
    pub glitch_scale_spread: f64,
}

impl RevealConfig {
    /// Shipped values.
    #[must_use]
    pub const fn portal() -> Self {
        Self {
            width_cap: 0.763_733_124,
            height_cap: 0.58,
            luma_high: 200.0,
            luma_low: 50.0,
            glitch_chance: 0.3,
            glitch_intensity: 0.6,
            glitch_offset: 100.0,
            base_alpha: 0.25,
            alpha_gain: 0.55,
            alpha_rate: 1.2,
            stable_jitter: 2.0,
            glitch_jitter: 8.0,
            glitch_scale_spread: 0.1,
        }
    }
}

/// Everything a gate session is configured with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GateConfig {
    /// Window table.
    pub timeline: Timeline,
    /// Noise on wide viewports.
    pub noise_wide: NoiseConfig,
    /// Noise on narrow viewports.
    pub noise_narrow: NoiseConfig,
    /// Mask overlay.
    pub overlay: OverlayConfig,
    /// Typewriter text.
    pub text: TextConfig,
    /// Reveal image.
    pub reveal: RevealConfig,
}

impl GateConfig {
    /// Shipped configuration.
    #[must_use]
    pub const fn portal() -> Self {
        Self {
            timeline: Timeline::portal(),
            noise_wide: NoiseConfig::wide(),
            noise_narrow: NoiseConfig::narrow(),
            overlay: OverlayConfig::portal(),
            text: TextConfig::portal(),
            reveal: RevealConfig::portal(),
        }
    }

    /// Noise settings for `class`.
    #[must_use]
    pub const fn noise(&self, class: DeviceClass) -> &NoiseConfig {
        match class {
            DeviceClass::Narrow => &self.noise_narrow,
            DeviceClass::Wide => &self.noise_wide,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::portal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_noise_is_coarser_and_slower() {
        let wide = NoiseConfig::wide();
        let narrow = NoiseConfig::narrow();
        assert!(narrow.scale_divisor > wide.scale_divisor);
        assert!(narrow.interval_ms > wide.interval_ms);
        assert_eq!(wide.collapse_interval_ms, wide.interval_ms * 0.5, "halved");
        assert!(
            narrow.collapse_interval_ms >= narrow.interval_ms,
            "narrow collapse never speeds up"
        );
        assert_eq!(NoiseConfig::for_device(DeviceClass::Narrow), narrow);
    }

    #[test]
    fn noise_buffer_has_a_floor() {
        let wide = NoiseConfig::wide();
        assert_eq!(wide.buffer_size(1920, 1080), (480, 270));
        assert_eq!(wide.buffer_size(320, 200), (160, 90), "minimums apply");
        assert_eq!(NoiseConfig::narrow().buffer_size(1200, 2400), (200, 400));
    }

    #[test]
    fn font_size_scales_with_short_side() {
        let text = TextConfig::portal();
        assert_eq!(text.font_px(1080.0), 62.0, "floor(1080/34)=31, doubled");
        assert_eq!(text.font_px(300.0), 28.0, "minimum 14, doubled");
    }

    #[test]
    fn lines_fill_every_cue() {
        let text = TextConfig::portal();
        assert!(text.lines.iter().all(|l| !l.is_empty()));
        assert_eq!(text.lines[3], "You decide which");
    }

    #[test]
    fn color_alpha_to_u8() {
        assert_eq!(Color::rgba(1, 2, 3, 0.5).to_rgba8(), [1, 2, 3, 128]);
        assert_eq!(Color::WHITE.with_alpha(0.0).to_rgba8()[3], 0);
    }
}
