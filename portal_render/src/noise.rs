// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Noise generator: the static behind every phase.
//!
//! A low-resolution luminance buffer is regenerated at a capped rate and
//! blitted, unsmoothed, over the whole surface on every tick whether or not
//! it was just regenerated. A radial vignette follows.

use portal_core::config::NoiseConfig;
use portal_core::raster::{Raster, to_u8};
use portal_core::surface::SurfaceSize;
use rand::Rng;

use crate::plan::{ImageItem, RenderItem, RenderPlan, VignetteItem};
use crate::resource::ResourceKey;

/// Per-tick inputs from the scheduler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseParams {
    /// Tick time in milliseconds.
    pub now_ms: f64,
    /// Blit opacity and vignette strength.
    pub fade: f64,
    /// Scan-line rate multiplier.
    pub slow: f64,
    /// Collapsed palette and opacity.
    pub collapse: bool,
}

/// What a regeneration produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Regenerated {
    /// Whether a scan line was stamped.
    pub scanline: bool,
}

/// Owns the noise buffer and its rate limiter.
#[derive(Debug, Default)]
pub struct NoiseGenerator {
    buffer: Raster,
    generation: u64,
    last_regen_ms: Option<f64>,
}

impl NoiseGenerator {
    /// An empty generator; call [`resize`](Self::resize) before rendering.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes the buffer for `surface` and forces a regeneration.
    pub fn resize(&mut self, config: &NoiseConfig, surface: &SurfaceSize) {
        let (w, h) = config.buffer_size(surface.width, surface.height);
        self.buffer.resize(w, h);
        self.last_regen_ms = None;
    }

    /// Forces a regeneration on the next render.
    pub fn invalidate(&mut self) {
        self.last_regen_ms = None;
    }

    /// The buffer.
    #[must_use]
    pub fn raster(&self) -> &Raster {
        &self.buffer
    }

    /// Bumped on every regeneration.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a regeneration is due at `now_ms`.
    #[must_use]
    pub fn due(&self, config: &NoiseConfig, now_ms: f64, collapse: bool) -> bool {
        let interval = if collapse {
            config.collapse_interval_ms
        } else {
            config.interval_ms
        };
        match self.last_regen_ms {
            None => true,
            Some(last) => now_ms < last || now_ms - last >= interval,
        }
    }

    /// Regenerates if due, then appends the blit and vignette to `plan`.
    ///
    /// Returns `Some` when the buffer was regenerated. Does nothing if the
    /// buffer has not been sized.
    pub fn render<R: Rng + ?Sized>(
        &mut self,
        params: NoiseParams,
        config: &NoiseConfig,
        surface: &SurfaceSize,
        rng: &mut R,
        plan: &mut RenderPlan,
    ) -> Option<Regenerated> {
        if self.buffer.is_empty() || surface.is_empty() {
            return None;
        }

        let regenerated = if self.due(config, params.now_ms, params.collapse) {
            self.last_regen_ms = Some(params.now_ms);
            Some(self.regenerate(params, config, rng))
        } else {
            None
        };

        let fade = params.fade.clamp(0.0, 1.0);
        plan.push(RenderItem::Image(ImageItem {
            key: ResourceKey::NOISE,
            dest: surface.rect(),
            alpha: if params.collapse {
                config.collapse_alpha
            } else {
                fade
            },
            smoothing: false,
            shadow: None,
            filter: None,
        }));
        plan.push(RenderItem::Vignette(VignetteItem {
            center: surface.center(),
            inner_radius: surface.min_side() * config.vignette_inner,
            outer_radius: surface.max_side() * config.vignette_outer,
            edge_alpha: config.vignette_alpha * fade,
        }));

        regenerated
    }

    fn regenerate<R: Rng + ?Sized>(
        &mut self,
        params: NoiseParams,
        config: &NoiseConfig,
        rng: &mut R,
    ) -> Regenerated {
        let (base, range) = if params.collapse {
            (config.collapse_luma_base, config.collapse_luma_range)
        } else {
            (config.luma_base, config.luma_range)
        };
        for px in self.buffer.pixels_mut() {
            let v = to_u8(base + rng.random::<f64>() * range);
            px.copy_from_slice(&[v, v, v, 255]);
        }

        let chance = if params.collapse {
            config.collapse_scanline_chance
        } else {
            config.scanline_chance
        } * params.slow;
        let scanline = rng.random_bool(chance.clamp(0.0, 1.0));
        if scanline {
            let h = self.buffer.height();
            let y = rng.random_range(0..h);
            let rows = rng.random_range(1..=2);
            let (color, alpha) = if params.collapse {
                ([0x44, 0x44, 0x44, 255], 0.3)
            } else {
                ([255, 255, 255, 255], 0.75)
            };
            self.buffer.blend_rows(y, rows, color, alpha);
        }

        self.generation = self.generation.wrapping_add(1);
        Regenerated { scanline }
    }
}
