// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chroma-key compositor for the reveal image.
//!
//! Pixels whose luma falls outside `[luma_low, luma_high]` are keyed out.
//! While glitching, surviving pixels randomly get per-channel offsets and the
//! result is rebuilt on every call. The stable (non-glitch) result depends
//! only on target size and source image, so it lives in a single-slot cache
//! and is rebuilt only when either changes.

use kurbo::{Point, Rect, Size, Vec2};
use portal_core::asset::ReadyAsset;
use portal_core::config::RevealConfig;
use portal_core::flicker::{glitch_brightness, glitch_glow, jitter, stable_brightness, stable_glow};
use portal_core::raster::{Raster, to_u8};
use portal_core::surface::{SurfaceSize, floor_px};
use portal_core::timeline::RevealPhase;
use rand::Rng;

use crate::cache::{CacheKey, CacheUse, SingleSlot};
use crate::glow::{GlowParams, push_passes};
use crate::plan::{Filter, ImageItem, RenderItem, RenderPlan};
use crate::resource::ResourceKey;

/// Rec. 709 luma of an RGB triple.
#[must_use]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b)
}

/// Where the reveal image sits on the surface.
///
/// Computed once per tick and shared by the compositor and by hosts that
/// anchor UI under the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealGeometry {
    /// Fitted size before truncation.
    pub size: Size,
    /// Processed raster width (truncated).
    pub width: u32,
    /// Processed raster height (truncated).
    pub height: u32,
    /// Surface center.
    pub center: Point,
}

impl RevealGeometry {
    /// Fits an image with `aspect_ratio = h / w` inside both caps, keeping
    /// the aspect ratio and centering it.
    #[must_use]
    pub fn fit(config: &RevealConfig, surface: &SurfaceSize, aspect_ratio: f64) -> Self {
        let s = surface.size();
        let max_h = s.height * config.height_cap;
        let width_bound = Size::new(s.width * config.width_cap, s.width * config.width_cap * aspect_ratio);
        let size = if width_bound.height <= max_h || aspect_ratio <= 0.0 {
            width_bound
        } else {
            Size::new(max_h / aspect_ratio, max_h)
        };
        Self {
            size,
            width: floor_px(size.width),
            height: floor_px(size.height),
            center: surface.center(),
        }
    }

    /// Whether there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Fitted rectangle, centered.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.center, self.size)
    }

    /// Bottom edge of the fitted rectangle.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.center.y + self.size.height / 2.0
    }

    fn cache_key(&self, asset_generation: u32) -> CacheKey {
        CacheKey {
            width: self.width,
            height: self.height,
            asset_generation,
        }
    }
}

/// Keys out too-light and too-dark pixels; with `glitch`, perturbs a share
/// of the survivors.
///
/// Kept pixels become fully opaque.
pub fn key_pixels<R: Rng + ?Sized>(raster: &mut Raster, config: &RevealConfig, mut glitch: Option<&mut R>) {
    for px in raster.pixels_mut() {
        let y = luma(px[0], px[1], px[2]);
        if y > config.luma_high || y < config.luma_low {
            px[3] = 0;
            continue;
        }
        px[3] = 255;
        if let Some(rng) = glitch.as_deref_mut() {
            if rng.random_bool(config.glitch_chance.clamp(0.0, 1.0)) {
                let intensity = rng.random::<f64>() * config.glitch_intensity;
                for c in &mut px[..3] {
                    let offset = (rng.random::<f64>() - 0.5) * config.glitch_offset * intensity;
                    *c = to_u8(f64::from(*c) + offset);
                }
            }
        }
    }
}

/// Owns the glitch scratch and the stable cache.
#[derive(Debug, Default)]
pub struct ChromaKeyCompositor {
    glitch: Raster,
    glitch_generation: u64,
    stable: SingleSlot,
}

impl ChromaKeyCompositor {
    /// Empty scratch and cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the stable cache. Returns whether an entry existed.
    pub fn invalidate_stable(&mut self) -> bool {
        self.stable.clear()
    }

    /// Glitch scratch pixels.
    #[must_use]
    pub fn glitch_raster(&self) -> &Raster {
        &self.glitch
    }

    /// Bumped each time the glitch scratch is rebuilt.
    #[must_use]
    pub fn glitch_generation(&self) -> u64 {
        self.glitch_generation
    }

    /// Stable cache pixels.
    #[must_use]
    pub fn stable_raster(&self) -> &Raster {
        self.stable.raster()
    }

    /// Bumped each time the stable cache is rebuilt.
    #[must_use]
    pub fn stable_generation(&self) -> u64 {
        self.stable.generation()
    }

    /// Appends the reveal for `phase`.
    ///
    /// Returns the stable cache outcome, or `None` for the glitch path and
    /// for an empty target.
    pub fn render<R: Rng + ?Sized>(
        &mut self,
        phase: RevealPhase,
        now_ms: f64,
        config: &RevealConfig,
        geometry: &RevealGeometry,
        asset: &ReadyAsset,
        rng: &mut R,
        plan: &mut RenderPlan,
    ) -> Option<CacheUse> {
        if geometry.is_empty() {
            return None;
        }
        let time_s = now_ms / 1_000.0;
        match phase {
            RevealPhase::Glitch {
                progress,
                glow,
                climax_boost,
            } => {
                self.rebuild_glitch(config, geometry, asset, rng);
                let mut alpha = base_alpha(config, progress);
                let offset = Vec2::new(
                    jitter(rng, config.glitch_jitter),
                    jitter(rng, config.glitch_jitter),
                );
                alpha *= 0.4 + rng.random::<f64>() * 0.6;
                let scale = 1.0 - config.glitch_scale_spread / 2.0
                    + rng.random::<f64>() * config.glitch_scale_spread;
                let dest = Rect::from_center_size(geometry.center + offset, geometry.size * scale);

                let glow_params = GlowParams::glitch(glow, climax_boost, glitch_glow(time_s, rng));
                push_passes(plan, ResourceKey::REVEAL_GLITCH, dest, alpha, &glow_params);

                let brightness = ((0.8 + glow * 0.8) * glitch_brightness(time_s, rng)).max(0.0);
                let filter = if rng.random_bool(0.2) {
                    Filter::HueRotate {
                        degrees: rng.random::<f64>() * 360.0,
                        brightness: brightness + rng.random::<f64>() * 0.2,
                    }
                } else {
                    Filter::Brightness(brightness)
                };
                plan.push(RenderItem::Image(ImageItem {
                    key: ResourceKey::REVEAL_GLITCH,
                    dest,
                    alpha: alpha.clamp(0.0, 1.0),
                    smoothing: true,
                    shadow: None,
                    filter: Some(filter),
                }));
                None
            }
            RevealPhase::Stable { glow_progress, .. } => {
                let key = geometry.cache_key(asset.generation);
                let used = if self.stable.get(key).is_some() {
                    CacheUse::Hit
                } else {
                    let slot = self.stable.fill_in_place(key);
                    slot.resize(geometry.width, geometry.height);
                    slot.draw_scaled_from(&asset.image);
                    key_pixels::<R>(slot, config, None);
                    CacheUse::Miss
                };

                let alpha = base_alpha(config, 1.0).clamp(0.0, 1.0);
                let offset = Vec2::new(
                    jitter(rng, config.stable_jitter),
                    jitter(rng, config.stable_jitter),
                );
                let natural = Size::new(f64::from(geometry.width), f64::from(geometry.height));
                let origin = geometry.center - natural.to_vec2() / 2.0 + offset;
                let dest = Rect::from_origin_size(origin, natural);

                if let Some(glow_params) = GlowParams::stable(glow_progress, stable_glow(time_s, rng)) {
                    push_passes(plan, ResourceKey::REVEAL_STABLE, dest, alpha, &glow_params);
                }
                let brightness =
                    ((1.2 + glow_progress * 0.8) * stable_brightness(time_s, rng)).max(0.0);
                plan.push(RenderItem::Image(ImageItem {
                    key: ResourceKey::REVEAL_STABLE,
                    dest,
                    alpha,
                    smoothing: true,
                    shadow: None,
                    filter: Some(Filter::Brightness(brightness)),
                }));
                Some(used)
            }
        }
    }

    fn rebuild_glitch<R: Rng + ?Sized>(
        &mut self,
        config: &RevealConfig,
        geometry: &RevealGeometry,
        asset: &ReadyAsset,
        rng: &mut R,
    ) {
        self.glitch.resize(geometry.width, geometry.height);
        self.glitch.draw_scaled_from(&asset.image);
        key_pixels(&mut self.glitch, config, Some(rng));
        self.glitch_generation = self.glitch_generation.wrapping_add(1);
    }
}

fn base_alpha(config: &RevealConfig, progress: f64) -> f64 {
    config.base_alpha + config.alpha_gain * (progress * config.alpha_rate).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::asset::AssetSlot;
    use portal_core::output::OutputId;
    use portal_core::surface::DeviceClass;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn ready(image: Raster) -> ReadyAsset {
        let mut slot = AssetSlot::Pending;
        let _ = slot.load(image, 0);
        slot.ready().cloned().unwrap_or_else(|| panic!("asset must be ready"))
    }

    fn stable() -> RevealPhase {
        RevealPhase::Stable {
            glow_progress: 0.5,
            boosted: false,
        }
    }

    #[test]
    fn bright_pixels_are_keyed_out() {
        let mut r = Raster::solid(1, 1, [210, 210, 210, 255]);
        key_pixels::<SmallRng>(&mut r, &RevealConfig::portal(), None);
        assert_eq!(r.pixel(0, 0).map(|p| p[3]), Some(0), "luma 210 > 200");
    }

    #[test]
    fn mid_pixels_stay_opaque() {
        let mut r = Raster::solid(1, 1, [120, 120, 120, 10]);
        key_pixels::<SmallRng>(&mut r, &RevealConfig::portal(), None);
        assert_eq!(r.pixel(0, 0), Some([120, 120, 120, 255]), "luma 120 kept as is");
    }

    #[test]
    fn dark_pixels_are_keyed_out() {
        let mut r = Raster::solid(1, 1, [30, 40, 60, 255]);
        key_pixels::<SmallRng>(&mut r, &RevealConfig::portal(), None);
        assert_eq!(r.pixel(0, 0).map(|p| p[3]), Some(0));
    }

    #[test]
    fn glitch_perturbs_only_kept_pixels() {
        let mut config = RevealConfig::portal();
        config.glitch_chance = 1.0;
        let mut rng = SmallRng::seed_from_u64(5);
        let mut r = Raster::solid(64, 1, [120, 120, 120, 255]);
        r.set_pixel(0, 0, [250, 250, 250, 255]);
        key_pixels(&mut r, &config, Some(&mut rng));
        assert_eq!(r.pixel(0, 0), Some([250, 250, 250, 0]), "keyed pixel untouched");
        let changed = (1..64).filter(|&x| r.pixel(x, 0) != Some([120, 120, 120, 255])).count();
        assert!(changed > 0, "glitch must move some channels");
        for x in 1..64 {
            let p = r.pixel(x, 0).unwrap_or_default();
            assert_eq!(p[3], 255);
            for c in &p[..3] {
                assert!((90..=150).contains(c), "offset at most ±30: {c}");
            }
        }
    }

    #[test]
    fn out_of_range_glitch_chance_is_clamped() {
        let mut rng = SmallRng::seed_from_u64(8);
        let mut config = RevealConfig::portal();
        config.glitch_chance = 1.5;
        let mut r = Raster::solid(8, 1, [120, 120, 120, 255]);
        key_pixels(&mut r, &config, Some(&mut rng));
        assert!(
            (0..8).all(|x| r.pixel(x, 0).map(|p| p[3]) == Some(255)),
            "kept pixels stay opaque"
        );

        config.glitch_chance = -0.5;
        let mut r = Raster::solid(8, 1, [120, 120, 120, 255]);
        key_pixels(&mut r, &config, Some(&mut rng));
        assert!(
            (0..8).all(|x| r.pixel(x, 0) == Some([120, 120, 120, 255])),
            "negative chance never glitches"
        );
    }

    #[test]
    fn geometry_picks_the_tighter_cap() {
        let config = RevealConfig::portal();
        // Wide surface, square image: height cap binds.
        let wide = SurfaceSize::from_pixels(2000, 1000, DeviceClass::Wide);
        let g = RevealGeometry::fit(&config, &wide, 1.0);
        assert!((g.size.height - 580.0).abs() < 1e-9);
        assert!((g.size.width - 580.0).abs() < 1e-9);
        // Tall surface: width cap binds.
        let tall = SurfaceSize::from_pixels(1000, 2000, DeviceClass::Narrow);
        let g = RevealGeometry::fit(&config, &tall, 1.0);
        assert_eq!(g.width, 763);
        assert!((g.rect().center().x - 500.0).abs() < 1e-9, "centered");
        assert!((g.bottom() - (1000.0 + g.size.height / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn stable_cache_is_reused_then_invalidated_by_resize() {
        let config = RevealConfig::portal();
        let asset = ready(Raster::solid(40, 20, [120, 120, 120, 255]));
        let mut chroma = ChromaKeyCompositor::new();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut plan = RenderPlan::new(OutputId(0));
        let small = SurfaceSize::from_pixels(400, 400, DeviceClass::Wide);
        let large = SurfaceSize::from_pixels(800, 800, DeviceClass::Wide);

        let g = RevealGeometry::fit(&config, &small, asset.aspect_ratio());
        let hit = |c: &mut ChromaKeyCompositor, g: &RevealGeometry, rng: &mut SmallRng, plan: &mut RenderPlan| {
            c.render(stable(), 0.0, &config, g, &asset, rng, plan)
        };
        assert_eq!(hit(&mut chroma, &g, &mut rng, &mut plan), Some(CacheUse::Miss));
        assert_eq!(hit(&mut chroma, &g, &mut rng, &mut plan), Some(CacheUse::Hit));

        let g2 = RevealGeometry::fit(&config, &large, asset.aspect_ratio());
        assert_eq!(
            hit(&mut chroma, &g2, &mut rng, &mut plan),
            Some(CacheUse::Miss),
            "new size must reprocess"
        );
        assert_eq!(chroma.stable_raster().dimensions(), (g2.width, g2.height));

        assert!(chroma.invalidate_stable());
        assert_eq!(hit(&mut chroma, &g2, &mut rng, &mut plan), Some(CacheUse::Miss));
    }

    #[test]
    fn asset_reload_invalidates_stable_cache() {
        let config = RevealConfig::portal();
        let surface = SurfaceSize::from_pixels(400, 400, DeviceClass::Wide);
        let first = ready(Raster::solid(40, 20, [120, 120, 120, 255]));
        let mut reloaded = first.clone();
        reloaded.generation += 1;
        let g = RevealGeometry::fit(&config, &surface, first.aspect_ratio());
        let mut chroma = ChromaKeyCompositor::new();
        let mut rng = SmallRng::seed_from_u64(2);
        let mut plan = RenderPlan::new(OutputId(0));
        let _ = chroma.render(stable(), 0.0, &config, &g, &first, &mut rng, &mut plan);
        assert_eq!(
            chroma.render(stable(), 0.0, &config, &g, &reloaded, &mut rng, &mut plan),
            Some(CacheUse::Miss)
        );
    }

    #[test]
    fn glitch_path_never_touches_the_cache() {
        let config = RevealConfig::portal();
        let surface = SurfaceSize::from_pixels(400, 400, DeviceClass::Wide);
        let asset = ready(Raster::solid(40, 20, [120, 120, 120, 255]));
        let g = RevealGeometry::fit(&config, &surface, asset.aspect_ratio());
        let mut chroma = ChromaKeyCompositor::new();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut plan = RenderPlan::new(OutputId(0));
        let phase = RevealPhase::Glitch {
            progress: 0.5,
            glow: 0.3,
            climax_boost: true,
        };
        assert_eq!(chroma.render(phase, 100.0, &config, &g, &asset, &mut rng, &mut plan), None);
        assert_eq!(chroma.stable_generation(), 0, "stable cache untouched");
        assert_eq!(chroma.glitch_generation(), 1);
        let main = plan.images(ResourceKey::REVEAL_GLITCH).last().copied();
        let Some(main) = main else {
            panic!("glitch image drawn");
        };
        assert!(main.filter.is_some(), "glitch draws with a filter");
        assert!(main.shadow.is_none(), "main pass has no glow");
        let w = main.dest.width() / f64::from(g.width);
        assert!((0.94..1.06).contains(&w), "scale jitter within ±5%: {w}");
    }

    #[test]
    fn stable_alpha_is_full_ramp() {
        let config = RevealConfig::portal();
        assert!((base_alpha(&config, 1.0) - 0.8).abs() < 1e-12);
        assert!((base_alpha(&config, 0.0) - 0.25).abs() < 1e-12);
    }
}
