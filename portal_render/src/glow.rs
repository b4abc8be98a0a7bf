// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glow compositor: light bloom from repeated blurred draws.
//!
//! A raster is drawn [`PASSES`] times under a white shadow whose blur grows
//! and whose opacity shrinks with each pass. Intensity and radius come from a
//! flicker multiplier, so the bloom breathes and spikes.

use kurbo::Rect;

use crate::plan::{Color, ImageItem, RenderItem, RenderPlan, Shadow};
use crate::resource::ResourceKey;

/// Number of glow passes.
pub const PASSES: u32 = 4;

/// Ceiling for the glitch intensity after the climax boost.
pub const CLIMAX_INTENSITY_CAP: f64 = 2.5;

/// Resolved bloom for one draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowParams {
    /// Overall intensity multiplier.
    pub intensity: f64,
    /// Blur radius of the widest pass.
    pub radius: f64,
    /// Opacity share of the first pass; pass `i` gets `per_pass / i`.
    pub per_pass: f64,
}

impl GlowParams {
    /// Bloom while the reveal glitches in.
    ///
    /// `flicker` comes from [`glitch_glow`](portal_core::flicker::glitch_glow).
    /// The climax boost multiplies intensity by 2.2 (capped) and radius by
    /// 1.6.
    #[must_use]
    pub fn glitch(glow_progress: f64, climax_boost: bool, flicker: f64) -> Self {
        let mut intensity = (0.6 + glow_progress * 0.4) * flicker;
        let mut radius = (12.0 + 16.0 * glow_progress) * (0.5 + flicker * 0.8);
        if climax_boost {
            intensity = (intensity * 2.2).min(CLIMAX_INTENSITY_CAP);
            radius *= 1.6;
        }
        Self {
            intensity,
            radius,
            per_pass: 0.6,
        }
    }

    /// Bloom on the stable reveal, or `None` before the glow starts.
    ///
    /// `flicker` comes from [`stable_glow`](portal_core::flicker::stable_glow).
    #[must_use]
    pub fn stable(glow_progress: f64, flicker: f64) -> Option<Self> {
        (glow_progress > 0.0).then(|| Self {
            intensity: glow_progress * 1.2 * flicker,
            radius: 35.0 * glow_progress * (0.4 + flicker),
            per_pass: 0.25,
        })
    }

    /// Opacity of pass `i` (1-based) for a layer drawn at `alpha`, in
    /// `[0, 1]`.
    #[must_use]
    pub fn pass_alpha(&self, alpha: f64, i: u32) -> f64 {
        (alpha * self.intensity * self.per_pass / f64::from(i)).clamp(0.0, 1.0)
    }

    /// Blur of pass `i` (1-based), never negative.
    #[must_use]
    pub fn pass_blur(&self, i: u32) -> f64 {
        (self.radius * f64::from(i) / f64::from(PASSES)).max(0.0)
    }
}

/// Appends the glow passes for `key` drawn into `dest`.
///
/// Passes that would be invisible are skipped. Returns how many were pushed.
pub fn push_passes(
    plan: &mut RenderPlan,
    key: ResourceKey,
    dest: Rect,
    alpha: f64,
    params: &GlowParams,
) -> u32 {
    let mut pushed = 0;
    for i in 1..=PASSES {
        let pass_alpha = params.pass_alpha(alpha, i);
        if pass_alpha <= 0.0 {
            continue;
        }
        plan.push(RenderItem::Image(ImageItem {
            key,
            dest,
            alpha: pass_alpha,
            smoothing: true,
            shadow: Some(Shadow::glow(Color::WHITE, params.pass_blur(i))),
            filter: None,
        }));
        pushed += 1;
    }
    pushed
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::output::OutputId;

    #[test]
    fn passes_widen_and_fade() {
        let params = GlowParams::glitch(0.5, false, 1.0);
        for i in 1..PASSES {
            assert!(params.pass_blur(i + 1) > params.pass_blur(i), "blur grows");
            assert!(params.pass_alpha(0.8, i + 1) < params.pass_alpha(0.8, i), "alpha shrinks");
        }
    }

    #[test]
    fn climax_boost_is_capped() {
        let plain = GlowParams::glitch(1.0, false, 1.9);
        let boosted = GlowParams::glitch(1.0, true, 1.9);
        assert_eq!(boosted.intensity, CLIMAX_INTENSITY_CAP, "1.9 * 2.2 > 2.5");
        assert!((boosted.radius - plain.radius * 1.6).abs() < 1e-9);
    }

    #[test]
    fn stable_glow_waits_for_progress() {
        assert!(GlowParams::stable(0.0, 1.0).is_none());
        let p = GlowParams::stable(1.0, 1.0).unwrap_or_else(|| panic!("glow on"));
        assert!((p.intensity - 1.2).abs() < 1e-12);
        assert!((p.radius - 49.0).abs() < 1e-9);
    }

    #[test]
    fn negative_flicker_pushes_nothing() {
        let mut plan = RenderPlan::new(OutputId(0));
        let params = GlowParams::glitch(0.2, false, -0.5);
        let n = push_passes(&mut plan, ResourceKey::REVEAL_GLITCH, Rect::ZERO, 0.8, &params);
        assert_eq!(n, 0);
        assert!(plan.items.is_empty());
    }

    #[test]
    fn pushed_passes_carry_white_glow() {
        let mut plan = RenderPlan::new(OutputId(0));
        let params = GlowParams::glitch(1.0, false, 1.0);
        let n = push_passes(&mut plan, ResourceKey::REVEAL_GLITCH, Rect::ZERO, 1.0, &params);
        assert_eq!(n, PASSES);
        for img in plan.images(ResourceKey::REVEAL_GLITCH) {
            let shadow = img.shadow.unwrap_or_else(|| panic!("glow pass without shadow"));
            assert_eq!(shadow.color, Color::WHITE);
            assert!((0.0..=1.0).contains(&img.alpha));
        }
    }
}
