// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay recolorer for the mask flicker.
//!
//! The mask image is scaled to a multiple of the surface width, its dark
//! background keyed out and the rest darkened. The processed pixels depend
//! only on target size and source image, so they are cached until either
//! changes; each tick only re-rolls placement jitter and opacity.

use kurbo::Rect;
use portal_core::asset::ReadyAsset;
use portal_core::config::OverlayConfig;
use portal_core::flicker::{jitter, mask_alpha};
use portal_core::raster::Raster;
use portal_core::surface::{SurfaceSize, round_px};
use rand::Rng;

use crate::cache::{CacheKey, CacheUse, SingleSlot};
use crate::plan::{ImageItem, RenderItem, RenderPlan};
use crate::resource::ResourceKey;

/// Owns the processed overlay scratch.
#[derive(Debug, Default)]
pub struct OverlayRecolorer {
    slot: SingleSlot,
}

impl OverlayRecolorer {
    /// An empty recolorer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the processed pixels.
    pub fn invalidate(&mut self) -> bool {
        self.slot.clear()
    }

    /// Processed pixels (stale or empty until the first render).
    #[must_use]
    pub fn raster(&self) -> &Raster {
        self.slot.raster()
    }

    /// Bumped whenever the pixels are reprocessed.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.slot.generation()
    }

    /// Overlay size: `width_factor × W`, height from the aspect ratio, both
    /// rounded.
    #[must_use]
    pub fn target_size(config: &OverlayConfig, surface: &SurfaceSize, asset: &ReadyAsset) -> (u32, u32) {
        let w = surface.size().width * config.width_factor;
        let h = w * asset.aspect_ratio();
        (round_px(w), round_px(h))
    }

    /// Appends one jittered overlay blit for sub-cycle progress `progress`.
    ///
    /// Returns `None` when the target size is empty.
    pub fn render<R: Rng + ?Sized>(
        &mut self,
        progress: f64,
        config: &OverlayConfig,
        surface: &SurfaceSize,
        asset: &ReadyAsset,
        rng: &mut R,
        plan: &mut RenderPlan,
    ) -> Option<CacheUse> {
        let (w, h) = Self::target_size(config, surface, asset);
        if w == 0 || h == 0 {
            return None;
        }
        let key = CacheKey {
            width: w,
            height: h,
            asset_generation: asset.generation,
        };
        let used = if self.slot.get(key).is_some() {
            CacheUse::Hit
        } else {
            let scratch = self.slot.fill_in_place(key);
            scratch.resize(w, h);
            scratch.draw_scaled_from(&asset.image);
            recolor(scratch, config);
            CacheUse::Miss
        };

        let (wf, hf) = (f64::from(w), f64::from(h));
        let center = surface.center();
        let x = center.x - wf / 2.0 + config.x_bias + jitter(rng, config.jitter);
        let y = center.y - hf / 2.0 + jitter(rng, config.jitter);
        plan.push(RenderItem::Image(ImageItem {
            key: ResourceKey::MASK,
            dest: Rect::new(x, y, x + wf, y + hf),
            alpha: mask_alpha(progress),
            smoothing: true,
            shadow: None,
            filter: None,
        }));
        Some(used)
    }
}

/// Keys out pixels whose mean RGB is below the cutoff and darkens the rest.
pub fn recolor(raster: &mut Raster, config: &OverlayConfig) {
    for px in raster.pixels_mut() {
        let mean = (f64::from(px[0]) + f64::from(px[1]) + f64::from(px[2])) / 3.0;
        if mean < config.cutoff {
            px[3] = 0;
        } else {
            for c in &mut px[..3] {
                *c = darken(*c, config.darken);
            }
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "factor is at most 1, so the floored product fits in u8"
)]
fn darken(c: u8, factor: f64) -> u8 {
    libm::floor(f64::from(c) * factor.clamp(0.0, 1.0)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::asset::{AssetSlot, ReadyAsset};
    use portal_core::output::OutputId;
    use portal_core::surface::DeviceClass;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn asset(image: Raster) -> ReadyAsset {
        let mut slot = AssetSlot::Pending;
        let _ = slot.load(image, 0);
        slot.ready().cloned().unwrap_or_else(|| panic!("asset must be ready"))
    }

    #[test]
    fn dark_background_is_keyed_out() {
        let mut r = Raster::new(2, 1);
        r.set_pixel(0, 0, [40, 50, 55, 255]);
        r.set_pixel(1, 0, [100, 200, 51, 255]);
        recolor(&mut r, &OverlayConfig::portal());
        assert_eq!(r.pixel(0, 0).map(|p| p[3]), Some(0), "mean 48.3 < 50");
        assert_eq!(r.pixel(1, 0), Some([80, 160, 40, 255]), "darkened by 20%");
    }

    #[test]
    fn target_width_tracks_surface() {
        let surface = SurfaceSize::from_pixels(1000, 800, DeviceClass::Wide);
        let a = asset(Raster::solid(200, 100, [255; 4]));
        let size = OverlayRecolorer::target_size(&OverlayConfig::portal(), &surface, &a);
        assert_eq!(size, (1238, 619), "1237.6 and 618.8 rounded");
    }

    #[test]
    fn pixels_are_reused_until_resize() {
        let config = OverlayConfig::portal();
        let a = asset(Raster::solid(20, 10, [200, 200, 200, 255]));
        let mut overlay = OverlayRecolorer::new();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut plan = RenderPlan::new(OutputId(0));
        let small = SurfaceSize::from_pixels(100, 100, DeviceClass::Wide);
        let large = SurfaceSize::from_pixels(200, 100, DeviceClass::Wide);

        assert_eq!(overlay.render(0.1, &config, &small, &a, &mut rng, &mut plan), Some(CacheUse::Miss));
        assert_eq!(overlay.render(0.9, &config, &small, &a, &mut rng, &mut plan), Some(CacheUse::Hit));
        assert_eq!(overlay.render(0.5, &config, &large, &a, &mut rng, &mut plan), Some(CacheUse::Miss));
        assert_eq!(overlay.raster().width(), 248);
    }

    #[test]
    fn placement_is_biased_left_and_jittered() {
        let config = OverlayConfig::portal();
        let a = asset(Raster::solid(10, 10, [200, 200, 200, 255]));
        let surface = SurfaceSize::from_pixels(100, 100, DeviceClass::Wide);
        let mut overlay = OverlayRecolorer::new();
        let mut rng = SmallRng::seed_from_u64(2);
        let mut plan = RenderPlan::new(OutputId(0));
        let _ = overlay.render(0.0, &config, &surface, &a, &mut rng, &mut plan);
        let Some(img) = plan.images(ResourceKey::MASK).next() else {
            panic!("overlay drawn");
        };
        // w = 124, centered at 50 with a -50 bias: x0 = 50 - 62 - 50 = -62 ± 3.
        assert!((img.dest.x0 + 62.0).abs() <= 3.0, "x0 = {}", img.dest.x0);
        assert!((img.dest.width() - 124.0).abs() < 1e-9);
        assert!((img.alpha - 0.18).abs() < 1e-12);
    }
}
