// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The phase timeline: a named window table and its per-tick resolver.
//!
//! One loop lasts [`Timeline::loop_ms`]. Each [`Window`] is a half-open
//! interval `[start, end)` in loop-relative milliseconds; windows may overlap
//! or abut. [`Timeline::sample`] is the single resolver: given the
//! loop-relative time it returns every active window with its progress plus
//! all parameters derived from them, so no phase re-derives timing on its own.
//!
//! ```text
//!   0      1000  1500                      9574 9674 9794   11174 11304        18304     25000
//!   ├static─┤mask┤──────────plant────────────┼────┤                ├────cta──────┤          │
//!                                          climax├────drive───────┤
//! ```

use crate::script::{PlantScript, TextCue};
use crate::state::CtaSignal;

/// Named windows, in table order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WindowId {
    /// Noise only.
    Static,
    /// Flickering overlay.
    Mask,
    /// Typewriter text.
    Plant,
    /// Invert flash then collapse.
    Climax,
    /// Glitching reveal.
    Drive,
    /// Call to action.
    Cta,
}

impl WindowId {
    /// Every window in table order.
    pub const ALL: [Self; 6] = [
        Self::Static,
        Self::Mask,
        Self::Plant,
        Self::Climax,
        Self::Drive,
        Self::Cta,
    ];

    /// Position in [`ALL`](Self::ALL).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Mask => "mask",
            Self::Plant => "plant",
            Self::Climax => "climax",
            Self::Drive => "drive",
            Self::Cta => "cta",
        }
    }

    /// Inverse of [`index`](Self::index).
    #[must_use]
    pub const fn from_index(i: usize) -> Option<Self> {
        if i < Self::ALL.len() {
            Some(Self::ALL[i])
        } else {
            None
        }
    }
}

/// Clamps to `[0, 1]`, mapping NaN to 0.
#[must_use]
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// A half-open interval of loop-relative milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    /// Inclusive start.
    pub start_ms: f64,
    /// Exclusive end.
    pub end_ms: f64,
}

impl Window {
    /// Creates a window.
    #[must_use]
    pub const fn new(start_ms: f64, end_ms: f64) -> Self {
        Self { start_ms, end_ms }
    }

    /// `end - start`.
    #[must_use]
    pub fn span_ms(&self) -> f64 {
        self.end_ms - self.start_ms
    }

    /// Whether `t` lies in `[start, end)`.
    #[must_use]
    pub fn contains(&self, t_ms: f64) -> bool {
        t_ms >= self.start_ms && t_ms < self.end_ms
    }

    /// `clamp01((t - start) / span)`; 0 for an empty window.
    #[must_use]
    pub fn progress(&self, t_ms: f64) -> f64 {
        let span = self.span_ms();
        if span <= 0.0 {
            return 0.0;
        }
        clamp01((t_ms - self.start_ms) / span)
    }
}

/// Active windows and their progress for one instant.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ActiveWindows {
    progress: [Option<f64>; 6],
}

impl ActiveWindows {
    /// Progress of `id`, if active.
    #[must_use]
    pub fn progress(&self, id: WindowId) -> Option<f64> {
        self.progress[id.index()]
    }

    /// Whether `id` is active.
    #[must_use]
    pub fn is_active(&self, id: WindowId) -> bool {
        self.progress[id.index()].is_some()
    }

    /// Active windows in table order.
    pub fn iter(&self) -> impl Iterator<Item = (WindowId, f64)> + '_ {
        WindowId::ALL
            .iter()
            .filter_map(|&id| self.progress(id).map(|p| (id, p)))
    }

    /// One bit per active window, bit `i` for `WindowId::ALL[i]`.
    #[must_use]
    pub fn bits(&self) -> u8 {
        WindowId::ALL
            .iter()
            .filter(|id| self.is_active(**id))
            .fold(0, |acc, id| acc | (1 << id.index()))
    }
}

/// Where the session is within the repeating loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopPosition {
    /// Completed loops since the session started.
    pub loop_index: u64,
    /// Loop-relative time in `[0, loop_ms)`.
    pub t_ms: f64,
}

/// Invert / collapse state around the climax.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ClimaxMode {
    /// Neither.
    #[default]
    Steady,
    /// Whole-surface color inversion this tick.
    Invert,
    /// Near-black noise and suppressed effects.
    Collapse,
}

/// Noise opacity and artifact-rate multipliers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticLevels {
    /// Noise opacity in `[0.3, 1]`.
    pub fade: f64,
    /// Scan-line rate multiplier in `[0.2, 1]`.
    pub slow: f64,
}

impl StaticLevels {
    /// Both multipliers at 1.
    pub const FULL: Self = Self {
        fade: 1.0,
        slow: 1.0,
    };
}

/// Which rendering path the reveal image takes this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RevealPhase {
    /// Drive window: per-pixel glitch, no caching.
    Glitch {
        /// Drive window progress.
        progress: f64,
        /// Glow level, `1 - fade`.
        glow: f64,
        /// Past the climax window but still in drive.
        climax_boost: bool,
    },
    /// After drive until the end of cta: cached pixels.
    Stable {
        /// Glow level in `[0, 2]`.
        glow_progress: f64,
        /// Within the boosted first part of the span.
        boosted: bool,
    },
}

/// Everything the scheduler needs for one tick, derived from one time sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseSample {
    /// Loop index and loop-relative time.
    pub position: LoopPosition,
    /// Active windows.
    pub active: ActiveWindows,
    /// Noise multipliers.
    pub static_levels: StaticLevels,
    /// Invert / collapse.
    pub climax: ClimaxMode,
    /// Overlay sub-cycle progress while the mask window is active.
    pub mask_progress: Option<f64>,
    /// Active text cue while the plant window is active.
    pub text: Option<TextCue>,
    /// Reveal image path, if any.
    pub reveal: Option<RevealPhase>,
    /// CTA signal the timeline asks for.
    pub cta: CtaSignal,
}

/// Share of climax progress spent inverted before collapsing.
pub const INVERT_FRACTION: f64 = 0.45;
/// Noise opacity lost over the drive window.
pub const DRIVE_FADE_DEPTH: f64 = 0.7;
/// Scan-line rate lost over the drive window.
pub const DRIVE_SLOW_DEPTH: f64 = 0.8;
/// Share of the stable span with boosted glow.
pub const STABLE_BOOST_FRACTION: f64 = 0.3;
/// Glow gain during the boost.
pub const STABLE_BOOST_GAIN: f64 = 1.8;
/// Glow ceiling during the boost.
pub const STABLE_BOOST_CAP: f64 = 2.0;

/// The window table plus the few timing constants that hang off it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timeline {
    /// Loop period.
    pub loop_ms: f64,
    /// Window bounds, indexed by [`WindowId::index`].
    pub windows: [Window; 6],
    /// Overlay flicker sub-cycle; mask progress saturates after this long.
    pub mask_cycle_ms: f64,
    /// How long the CTA stays boosted after the cta window opens.
    pub cta_boost_ms: f64,
    /// Text cues inside the plant window.
    pub script: PlantScript,
}

impl Timeline {
    /// The 25 s gate sequence.
    #[must_use]
    pub const fn portal() -> Self {
        Self {
            loop_ms: 25_000.0,
            windows: [
                Window::new(0.0, 1_000.0),
                Window::new(1_000.0, 1_500.0),
                Window::new(1_500.0, 9_674.0),
                Window::new(9_574.0, 9_794.0),
                Window::new(9_674.0, 11_174.0),
                Window::new(11_304.0, 18_304.0),
            ],
            mask_cycle_ms: 250.0,
            cta_boost_ms: 1_500.0,
            script: PlantScript::portal(),
        }
    }

    /// Bounds of `id`.
    #[must_use]
    pub fn window(&self, id: WindowId) -> Window {
        self.windows[id.index()]
    }

    /// Span over which the stable reveal plays: from the end of drive to the
    /// end of cta.
    #[must_use]
    pub fn stable_span(&self) -> Window {
        Window::new(
            self.window(WindowId::Drive).end_ms,
            self.window(WindowId::Cta).end_ms,
        )
    }

    /// Folds elapsed session time into the loop.
    ///
    /// Negative or NaN input counts as 0.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "loop counts beyond u64 are not reachable in a page session"
    )]
    pub fn position(&self, elapsed_ms: f64) -> LoopPosition {
        let elapsed = if elapsed_ms.is_nan() || elapsed_ms < 0.0 {
            0.0
        } else {
            elapsed_ms
        };
        if self.loop_ms <= 0.0 {
            return LoopPosition {
                loop_index: 0,
                t_ms: 0.0,
            };
        }
        let loops = libm::floor(elapsed / self.loop_ms);
        let t = libm::fmod(elapsed, self.loop_ms);
        LoopPosition {
            loop_index: loops as u64,
            t_ms: t,
        }
    }

    /// Active windows at loop time `t`.
    #[must_use]
    pub fn active(&self, t_ms: f64) -> ActiveWindows {
        let mut out = ActiveWindows::default();
        for (slot, w) in out.progress.iter_mut().zip(&self.windows) {
            if w.contains(t_ms) {
                *slot = Some(w.progress(t_ms));
            }
        }
        out
    }

    /// Noise fade/slow; ramps across drive and holds its final value after.
    #[must_use]
    pub fn static_levels(&self, t_ms: f64) -> StaticLevels {
        let drive = self.window(WindowId::Drive);
        if t_ms < drive.start_ms {
            return StaticLevels::FULL;
        }
        let p = drive.progress(t_ms);
        StaticLevels {
            fade: 1.0 - DRIVE_FADE_DEPTH * p,
            slow: 1.0 - DRIVE_SLOW_DEPTH * p,
        }
    }

    /// Invert during the first part of climax; collapse for the rest of
    /// climax and up to the end of drive.
    #[must_use]
    pub fn climax_mode(&self, t_ms: f64) -> ClimaxMode {
        let climax = self.window(WindowId::Climax);
        let drive = self.window(WindowId::Drive);
        if climax.contains(t_ms) {
            if climax.progress(t_ms) < INVERT_FRACTION {
                ClimaxMode::Invert
            } else {
                ClimaxMode::Collapse
            }
        } else if t_ms >= climax.end_ms && t_ms < drive.end_ms {
            ClimaxMode::Collapse
        } else {
            ClimaxMode::Steady
        }
    }

    /// The CTA signal the timeline asks for at loop time `t`.
    ///
    /// Shown from the start of cta to the end of the loop, boosted for the
    /// first [`cta_boost_ms`](Self::cta_boost_ms).
    #[must_use]
    pub fn cta_signal(&self, t_ms: f64) -> CtaSignal {
        let cta = self.window(WindowId::Cta);
        if t_ms < cta.start_ms {
            CtaSignal::Hidden
        } else if t_ms - cta.start_ms < self.cta_boost_ms {
            CtaSignal::ShownBoosted
        } else {
            CtaSignal::Shown
        }
    }

    /// Resolves one time sample into every per-tick parameter.
    #[must_use]
    pub fn sample(&self, position: LoopPosition) -> PhaseSample {
        let t = position.t_ms;
        let active = self.active(t);
        let static_levels = self.static_levels(t);
        let climax = self.climax_mode(t);

        let mask_progress = active.is_active(WindowId::Mask).then(|| {
            let elapsed = t - self.window(WindowId::Mask).start_ms;
            if self.mask_cycle_ms > 0.0 {
                clamp01(elapsed / self.mask_cycle_ms)
            } else {
                1.0
            }
        });

        let text = active
            .progress(WindowId::Plant)
            .and_then(|p| self.script.cue_at(p));

        let reveal = if let Some(progress) = active.progress(WindowId::Drive) {
            let climax_end = self.window(WindowId::Climax).end_ms;
            Some(RevealPhase::Glitch {
                progress,
                glow: 1.0 - static_levels.fade,
                climax_boost: t >= climax_end,
            })
        } else {
            let span = self.stable_span();
            span.contains(t).then(|| {
                let p = span.progress(t);
                let ramp = (p * 2.0).min(1.0);
                let boosted = p < STABLE_BOOST_FRACTION;
                let glow_progress = if boosted {
                    (ramp * STABLE_BOOST_GAIN).min(STABLE_BOOST_CAP)
                } else {
                    ramp
                };
                RevealPhase::Stable {
                    glow_progress,
                    boosted,
                }
            })
        };

        PhaseSample {
            position,
            active,
            static_levels,
            climax,
            mask_progress,
            text,
            reveal,
            cta: self.cta_signal(t),
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::portal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(t_ms: f64) -> PhaseSample {
        Timeline::portal().sample(LoopPosition {
            loop_index: 0,
            t_ms,
        })
    }

    #[test]
    fn window_bounds_lie_inside_the_loop() {
        let tl = Timeline::portal();
        for id in WindowId::ALL {
            let w = tl.window(id);
            assert!(w.start_ms >= 0.0 && w.end_ms <= tl.loop_ms, "{id:?} in loop");
            assert!(w.start_ms < w.end_ms, "{id:?} non-empty");
        }
    }

    #[test]
    fn progress_is_zero_at_start_and_bounded() {
        let tl = Timeline::portal();
        for id in WindowId::ALL {
            let w = tl.window(id);
            assert_eq!(w.progress(w.start_ms), 0.0, "{id:?} starts at 0");
            let mut t = w.start_ms;
            while t < w.end_ms {
                let p = w.progress(t);
                assert!((0.0..=1.0).contains(&p), "{id:?} at {t}: {p}");
                t += 7.3;
            }
            assert_eq!(w.progress(w.end_ms + 500.0), 1.0, "clamped above");
            assert_eq!(w.progress(w.start_ms - 500.0), 0.0, "clamped below");
        }
    }

    #[test]
    fn position_folds_elapsed_time() {
        let tl = Timeline::portal();
        let p = tl.position(2.0 * 25_000.0 + 9_700.0);
        assert_eq!(p.loop_index, 2);
        assert!((p.t_ms - 9_700.0).abs() < 1e-9);
        assert_eq!(tl.position(-5.0).t_ms, 0.0, "negative clamps");
        assert_eq!(tl.position(f64::NAN).loop_index, 0);
    }

    #[test]
    fn late_climax_collapses() {
        let s = at(9_700.0);
        assert_eq!(s.climax, ClimaxMode::Collapse);
        let p = s.active.progress(WindowId::Climax).unwrap_or(-1.0);
        assert!((p - 126.0 / 220.0).abs() < 1e-9, "58% through climax");
    }

    #[test]
    fn early_climax_inverts() {
        assert_eq!(at(9_600.0).climax, ClimaxMode::Invert);
    }

    #[test]
    fn collapse_runs_until_drive_ends() {
        assert_eq!(at(10_000.0).climax, ClimaxMode::Collapse);
        assert_eq!(at(11_173.0).climax, ClimaxMode::Collapse);
        assert_eq!(at(11_174.0).climax, ClimaxMode::Steady);
        assert_eq!(at(9_000.0).climax, ClimaxMode::Steady);
    }

    #[test]
    fn climax_and_drive_overlap() {
        let s = at(9_700.0);
        assert!(s.active.is_active(WindowId::Climax));
        assert!(s.active.is_active(WindowId::Drive));
        assert!(!s.active.is_active(WindowId::Plant), "plant ended at 9674");
        let bits = s.active.bits();
        assert_eq!(
            bits,
            (1 << WindowId::Climax.index()) | (1 << WindowId::Drive.index())
        );
    }

    #[test]
    fn static_levels_ramp_then_hold() {
        assert_eq!(at(5_000.0).static_levels, StaticLevels::FULL);
        let mid = at(9_674.0 + 750.0).static_levels;
        assert!((mid.fade - 0.65).abs() < 1e-9);
        assert!((mid.slow - 0.6).abs() < 1e-9);
        let after = at(20_000.0).static_levels;
        assert!((after.fade - 0.3).abs() < 1e-9, "fade persists after drive");
        assert!((after.slow - 0.2).abs() < 1e-9);
    }

    #[test]
    fn mask_uses_a_short_sub_cycle() {
        assert_eq!(at(999.0).mask_progress, None);
        assert_eq!(at(1_000.0).mask_progress, Some(0.0));
        assert_eq!(at(1_125.0).mask_progress, Some(0.5));
        assert_eq!(at(1_400.0).mask_progress, Some(1.0), "saturates after 250 ms");
        assert_eq!(at(1_500.0).mask_progress, None);
    }

    #[test]
    fn reveal_paths() {
        assert_eq!(at(9_000.0).reveal, None);
        assert!(matches!(
            at(9_700.0).reveal,
            Some(RevealPhase::Glitch {
                climax_boost: false,
                ..
            })
        ));
        assert!(matches!(
            at(10_000.0).reveal,
            Some(RevealPhase::Glitch {
                climax_boost: true,
                ..
            })
        ));
        let Some(RevealPhase::Stable {
            glow_progress,
            boosted,
        }) = at(11_174.0 + 0.1 * 7_130.0).reveal
        else {
            panic!("stable right after drive");
        };
        assert!(boosted);
        assert!((glow_progress - 0.36).abs() < 1e-9, "0.2 ramp * 1.8");

        let Some(RevealPhase::Stable {
            glow_progress,
            boosted,
        }) = at(11_174.0 + 0.8 * 7_130.0).reveal
        else {
            panic!("stable late in the span");
        };
        assert!(!boosted);
        assert_eq!(glow_progress, 1.0);
        assert_eq!(at(18_304.0).reveal, None, "span ends with cta");
    }

    #[test]
    fn boosted_glow_never_exceeds_cap() {
        let tl = Timeline::portal();
        let span = tl.stable_span();
        let mut t = span.start_ms;
        while t < span.end_ms {
            if let Some(RevealPhase::Stable { glow_progress, .. }) = at(t).reveal {
                assert!((0.0..=STABLE_BOOST_CAP).contains(&glow_progress), "at {t}");
            }
            t += 13.0;
        }
    }

    #[test]
    fn cta_shows_from_window_start_to_loop_end() {
        assert_eq!(at(11_303.0).cta, CtaSignal::Hidden);
        assert_eq!(at(11_304.0).cta, CtaSignal::ShownBoosted);
        assert_eq!(at(12_803.0).cta, CtaSignal::ShownBoosted);
        assert_eq!(at(12_804.0).cta, CtaSignal::Shown);
        assert_eq!(at(24_999.0).cta, CtaSignal::Shown, "stays after cta window");
    }

    #[test]
    fn text_only_during_plant() {
        assert!(at(1_499.0).text.is_none());
        assert_eq!(at(1_500.0).text.map(|c| c.line), Some(0));
        assert_eq!(at(9_673.0).text.map(|c| c.line), Some(3));
        assert!(at(9_674.0).text.is_none());
    }

    #[test]
    fn window_ids_round_trip_their_index() {
        for id in WindowId::ALL {
            assert_eq!(WindowId::from_index(id.index()), Some(id));
        }
        assert_eq!(WindowId::from_index(6), None);
    }
}
