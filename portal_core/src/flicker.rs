// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flicker and jitter functions.
//!
//! Each function combines sinusoids of time with draws from a caller-supplied
//! generator. Two runs are not expected to match; what is guaranteed is the
//! value range stated on each function, and that values keep oscillating
//! rather than settling. Tests pass a seeded generator to make paths
//! reproducible.

use core::f64::consts::PI;

use rand::Rng;

/// Uniform offset in `[-k/2, k/2)`.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, k: f64) -> f64 {
    rng.random::<f64>() * k - k / 2.0
}

/// Overlay opacity for mask sub-cycle progress `p`.
///
/// Range: `[0.18, 0.33]`.
#[must_use]
pub fn mask_alpha(p: f64) -> f64 {
    0.18 + 0.15 * libm::fabs(libm::sin(p * PI * 2.1))
}

/// Glow multiplier for the glitching reveal.
///
/// Three sinusoids, each at a frequency re-drawn per call, times a random
/// spike or drop. Range: `(-2, 2)`; negative values suppress the glow.
pub fn glitch_glow<R: Rng + ?Sized>(time_s: f64, rng: &mut R) -> f64 {
    let f1 = libm::sin(time_s * (1.3 + rng.random::<f64>() * 2.8)) * 0.8 + 0.2;
    let f2 = libm::sin(time_s * (2.1 + rng.random::<f64>() * 3.4)) * 0.7 + 0.3;
    let f3 = libm::cos(time_s * (0.7 + rng.random::<f64>() * 1.8)) * 0.6 + 0.4;
    let spike = if rng.random_bool(0.4) {
        0.1 + rng.random::<f64>() * 1.9
    } else {
        0.5 + rng.random::<f64>() * 0.8
    };
    f1 * f2 * f3 * spike
}

/// Glow multiplier for the stable reveal.
///
/// Fixed frequencies with larger swings than [`glitch_glow`], plus rare
/// bright spikes and dark drops. Range: `(-0.6, 3)`.
pub fn stable_glow<R: Rng + ?Sized>(time_s: f64, rng: &mut R) -> f64 {
    let base = time_s * 4.0;
    let primary = libm::sin(base * 1.2) * 0.6 + 0.4;
    let secondary = libm::sin(base * 2.8) * 0.4 + 0.6;
    let tertiary = libm::sin(base * 4.1) * 0.3 + 0.7;
    let spike = if rng.random_bool(0.15) {
        2.0 + rng.random::<f64>()
    } else {
        1.0
    };
    let drop = if rng.random_bool(0.1) {
        0.1 + rng.random::<f64>() * 0.3
    } else {
        1.0
    };
    primary * secondary * tertiary * spike * drop
}

/// Brightness multiplier for the glitching reveal. Range: `[0, 1.5)`.
pub fn glitch_brightness<R: Rng + ?Sized>(time_s: f64, rng: &mut R) -> f64 {
    let wave = libm::sin(time_s * 5.0 * 1.8) * 0.5 + 0.5;
    let irregular = if rng.random_bool(0.2) {
        0.2 + rng.random::<f64>() * 1.3
    } else {
        1.0
    };
    wave * irregular
}

/// Brightness multiplier for the stable reveal. Range: `(-0.32, 1.6)`.
///
/// Callers clamp the final brightness at 0.
pub fn stable_brightness<R: Rng + ?Sized>(time_s: f64, rng: &mut R) -> f64 {
    let wave = libm::sin(time_s * 6.0 * 1.9) * 0.6 + 0.4;
    let unstable = if rng.random_bool(0.25) {
        0.2 + rng.random::<f64>() * 1.4
    } else {
        1.0
    };
    wave * unstable
}

/// Opacity of a failing bulb: mostly lit, sometimes nearly out.
///
/// Range: `[0.1, 1)`.
pub fn dying_bulb<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.random_bool(0.7) {
        0.4 + rng.random::<f64>() * 0.6
    } else {
        0.1
    }
}

/// Free-running 500 ms on / 500 ms off blink.
#[must_use]
pub fn cursor_visible(now_ms: f64) -> bool {
    libm::fmod(libm::floor(now_ms / 500.0), 2.0) == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    const SAMPLES: u32 = 5_000;

    fn times() -> impl Iterator<Item = f64> {
        (0..SAMPLES).map(|i| f64::from(i) * 0.016_7)
    }

    #[test]
    fn jitter_is_centered() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..SAMPLES {
            let j = jitter(&mut rng, 8.0);
            assert!((-4.0..4.0).contains(&j), "got {j}");
        }
    }

    #[test]
    fn mask_alpha_bounds() {
        for i in 0..=1000 {
            let a = mask_alpha(f64::from(i) / 1000.0);
            assert!((0.18..=0.33 + 1e-12).contains(&a), "got {a}");
        }
        assert!((mask_alpha(0.0) - 0.18).abs() < 1e-12, "starts dim");
    }

    #[test]
    fn glitch_glow_bounds() {
        let mut rng = SmallRng::seed_from_u64(7);
        for t in times() {
            let v = glitch_glow(t, &mut rng);
            assert!(v > -2.0 && v < 2.0, "t={t}: {v}");
        }
    }

    #[test]
    fn stable_glow_bounds() {
        let mut rng = SmallRng::seed_from_u64(8);
        for t in times() {
            let v = stable_glow(t, &mut rng);
            assert!(v > -0.6 && v < 3.0, "t={t}: {v}");
        }
    }

    #[test]
    fn brightness_bounds() {
        let mut rng = SmallRng::seed_from_u64(9);
        for t in times() {
            let g = glitch_brightness(t, &mut rng);
            assert!((0.0..1.5).contains(&g), "glitch t={t}: {g}");
            let s = stable_brightness(t, &mut rng);
            assert!(s > -0.32 && s < 1.6, "stable t={t}: {s}");
        }
    }

    #[test]
    fn dying_bulb_bounds() {
        let mut rng = SmallRng::seed_from_u64(10);
        let mut saw_dim = false;
        for _ in 0..SAMPLES {
            let a = dying_bulb(&mut rng);
            assert!((0.1..1.0).contains(&a), "got {a}");
            saw_dim |= a == 0.1;
        }
        assert!(saw_dim, "the bulb must drop out sometimes");
    }

    #[test]
    fn flicker_oscillates() {
        let mut rng = SmallRng::seed_from_u64(11);
        let values: alloc::vec::Vec<f64> = times().map(|t| stable_glow(t, &mut rng)).collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(max - min > 1.0, "visible oscillation, got {min}..{max}");
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SmallRng::seed_from_u64(3);
        let mut b = SmallRng::seed_from_u64(3);
        for t in times().take(50) {
            assert_eq!(glitch_glow(t, &mut a), glitch_glow(t, &mut b));
        }
    }

    #[test]
    fn cursor_blinks_every_500ms() {
        assert!(cursor_visible(0.0));
        assert!(cursor_visible(499.9));
        assert!(!cursor_visible(500.0));
        assert!(!cursor_visible(999.0));
        assert!(cursor_visible(1_000.0));
    }
}
