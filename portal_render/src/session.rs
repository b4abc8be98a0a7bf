// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The phase scheduler.
//!
//! [`GateSession`] owns every piece of per-session mutable state: start time,
//! noise buffer, overlay scratch, reveal caches, CTA state and the generator.
//! Each [`tick`](GateSession::tick) resolves the timeline once, then runs the
//! compositors in a fixed order into a reusable [`RenderPlan`]:
//!
//! 1. noise (every active tick) and vignette
//! 2. mask overlay (mask window, asset ready, 90% of ticks)
//! 3. wash and typewriter text (plant window)
//! 4. reveal image (drive window, then the stable span)
//! 5. CTA signal
//!
//! Hosts draw the plan with a [`Presenter`](crate::Presenter), passing the
//! session itself as the [`Resources`].

use kurbo::Point;
use portal_core::asset::{AssetKind, Assets};
use portal_core::config::GateConfig;
use portal_core::invalidate::{CacheSlot, Invalidated, Invalidation};
use portal_core::raster::Raster;
use portal_core::state::{CtaSignal, CtaState, CtaTransition, SessionState};
use portal_core::surface::SurfaceSize;
use portal_core::time::{HostTime, Timebase};
use portal_core::timeline::{ClimaxMode, PhaseSample, WindowId};
use portal_core::timing::FrameTick;
use portal_core::trace::{
    CtaEvent, FrameTickEvent, LoopSampleEvent, NoiseRegenEvent, SessionStateEvent, Tracer,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "trace-rich")]
use portal_core::trace::{CacheEvent, CacheOutcome, WindowEdge, WindowEdgeEvent};

use crate::backend::{ResourceView, Resources};
use crate::cache::CacheUse;
use crate::chroma::{ChromaKeyCompositor, RevealGeometry};
use crate::noise::{NoiseGenerator, NoiseParams};
use crate::overlay::OverlayRecolorer;
use crate::plan::{DisplayFilter, RenderItem, RenderPlan};
use crate::resource::ResourceKey;
use crate::typewriter;

/// What a tick did and what the host should do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// Whether [`GateSession::plan`] holds a fresh plan to present.
    pub rendered: bool,
    /// CTA signal after the tick.
    pub cta: CtaSignal,
    /// Whether the host should request another tick.
    pub reschedule: bool,
    /// Whether the noise buffer changed this tick.
    pub noise_regenerated: bool,
}

/// One visitor's run of the gate sequence.
#[derive(Debug)]
pub struct GateSession {
    config: GateConfig,
    timebase: Timebase,
    rng: SmallRng,
    state: SessionState,
    start: Option<HostTime>,
    cta: CtaState,
    reduced_motion: bool,
    surface: SurfaceSize,
    assets: Assets,
    invalidation: Invalidation,
    noise: NoiseGenerator,
    overlay: OverlayRecolorer,
    chroma: ChromaKeyCompositor,
    plan: RenderPlan,
    last_sample: Option<PhaseSample>,
    last_frame: u64,
    #[cfg_attr(
        not(feature = "trace-rich"),
        expect(dead_code, reason = "only read when emitting window edges")
    )]
    prev_active: u8,
}

impl GateSession {
    /// A session in [`SessionState::Idle`] with an empty surface and no
    /// assets.
    ///
    /// `timebase` converts tick timestamps to milliseconds; `seed` drives
    /// every random choice, so equal seeds and inputs give equal plans.
    #[must_use]
    pub fn new(config: GateConfig, timebase: Timebase, seed: u64) -> Self {
        Self {
            config,
            timebase,
            rng: SmallRng::seed_from_u64(seed),
            state: SessionState::Idle,
            start: None,
            cta: CtaState::new(),
            reduced_motion: false,
            surface: SurfaceSize::EMPTY,
            assets: Assets::new(),
            invalidation: Invalidation::new(),
            noise: NoiseGenerator::new(),
            overlay: OverlayRecolorer::new(),
            chroma: ChromaKeyCompositor::new(),
            plan: RenderPlan::default(),
            last_sample: None,
            last_frame: 0,
            prev_active: 0,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// CTA signal and terminal flag.
    #[must_use]
    pub fn cta(&self) -> CtaState {
        self.cta
    }

    /// Current surface size.
    #[must_use]
    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    /// Whether the reduced-motion escape hatch is on.
    #[must_use]
    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// The plan built by the last rendered tick.
    #[must_use]
    pub fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    /// The timeline sample of the last rendered tick.
    #[must_use]
    pub fn last_sample(&self) -> Option<&PhaseSample> {
        self.last_sample.as_ref()
    }

    /// Center-bottom of the reveal image, where hosts anchor the CTA.
    ///
    /// `None` until the reveal asset is ready.
    #[must_use]
    pub fn cta_anchor(&self) -> Option<Point> {
        let asset = self.assets.slot(AssetKind::Reveal).ready()?;
        let g = RevealGeometry::fit(&self.config.reveal, &self.surface, asset.aspect_ratio());
        Some(Point::new(g.center.x, g.bottom()))
    }

    /// Adopts a new surface size.
    ///
    /// Every size-dependent buffer is invalidated for the next tick. Returns
    /// `false` when the size did not change.
    pub fn resize(&mut self, surface: SurfaceSize) -> bool {
        if surface == self.surface {
            return false;
        }
        self.surface = surface;
        self.noise
            .resize(self.config.noise(surface.device_class), &surface);
        self.invalidation.surface_resized();
        true
    }

    /// Installs a decoded image and returns its generation.
    ///
    /// An empty raster leaves the asset pending.
    pub fn set_asset(&mut self, kind: AssetKind, image: Raster) -> u32 {
        let generation = self.assets.set(kind, image);
        self.invalidation.asset_reloaded(kind);
        generation
    }

    /// Turns the reduced-motion escape hatch on or off.
    ///
    /// Turning it on shows the CTA immediately. Turning it off lets the loop
    /// run again once the host resumes ticking.
    pub fn set_reduced_motion(&mut self, on: bool, tracer: &mut Tracer<'_>) {
        self.reduced_motion = on;
        if on {
            let t = self.cta.force_shown();
            self.trace_cta(t, tracer);
        }
    }

    /// The click collaborator: final CTA state and the terminal flag.
    ///
    /// No later tick changes anything. Calling it again does nothing.
    pub fn complete(&mut self, tracer: &mut Tracer<'_>) {
        let t = self.cta.complete();
        self.trace_cta(t, tracer);
        self.set_state(SessionState::Completed, tracer);
    }

    /// Runs one frame.
    pub fn tick(&mut self, tick: &FrameTick, tracer: &mut Tracer<'_>) -> TickOutcome {
        let frame_index = tick.frame_index;
        self.last_frame = frame_index;
        tracer.frame_tick(&FrameTickEvent::from(tick));

        if self.cta.is_completed() {
            return self.outcome(false, false, false);
        }
        if self.reduced_motion {
            let t = self.cta.force_shown();
            self.trace_cta(t, tracer);
            return self.outcome(false, false, false);
        }
        if !tick.visible {
            return self.outcome(false, true, false);
        }

        let start = match self.start {
            Some(start) => start,
            None => {
                self.start = Some(tick.now);
                self.set_state(SessionState::Running, tracer);
                tick.now
            }
        };
        let elapsed_ms = tick
            .now
            .saturating_duration_since(start)
            .to_millis_f64(self.timebase);

        let invalidated = self.invalidation.drain();
        self.apply_invalidations(invalidated, tracer);

        let timeline = &self.config.timeline;
        let sample = timeline.sample(timeline.position(elapsed_ms));
        tracer.loop_sample(&LoopSampleEvent::new(frame_index, &sample));
        #[cfg(feature = "trace-rich")]
        self.trace_window_edges(&sample, tracer);
        self.prev_active = sample.active.bits();

        self.plan.clear();
        self.plan.output = tick.output;
        self.plan.frame_index = frame_index;
        if sample.climax == ClimaxMode::Invert {
            self.plan.display_filter = Some(DisplayFilter::CLIMAX);
        }

        let noise_regenerated = self.render_noise(&sample, elapsed_ms, tracer);
        self.render_mask(&sample, tracer);
        self.render_text(&sample, elapsed_ms);
        self.render_reveal(&sample, elapsed_ms, tracer);

        let t = self.cta.apply(sample.cta);
        self.trace_cta(t, tracer);

        self.last_sample = Some(sample);
        self.outcome(true, true, noise_regenerated)
    }

    fn outcome(&self, rendered: bool, reschedule: bool, noise_regenerated: bool) -> TickOutcome {
        TickOutcome {
            rendered,
            cta: self.cta.signal(),
            reschedule: reschedule && !self.cta.is_completed(),
            noise_regenerated,
        }
    }

    fn render_noise(&mut self, sample: &PhaseSample, now_ms: f64, tracer: &mut Tracer<'_>) -> bool {
        let collapse = sample.climax == ClimaxMode::Collapse;
        let params = NoiseParams {
            now_ms,
            fade: sample.static_levels.fade,
            slow: sample.static_levels.slow,
            collapse,
        };
        let config = self.config.noise(self.surface.device_class);
        let regenerated = self
            .noise
            .render(params, config, &self.surface, &mut self.rng, &mut self.plan);
        let Some(regen) = regenerated else {
            return false;
        };
        let (width, height) = self.noise.raster().dimensions();
        tracer.noise_regen(&NoiseRegenEvent {
            frame_index: self.last_frame,
            width,
            height,
            collapse,
            scanline: regen.scanline,
        });
        true
    }

    fn render_mask(&mut self, sample: &PhaseSample, tracer: &mut Tracer<'_>) {
        let Some(progress) = sample.mask_progress else {
            return;
        };
        let Some(asset) = self.assets.slot(AssetKind::Mask).ready() else {
            return;
        };
        if !self.rng.random_bool(self.config.overlay.draw_chance.clamp(0.0, 1.0)) {
            return;
        }
        let used = self.overlay.render(
            progress,
            &self.config.overlay,
            &self.surface,
            asset,
            &mut self.rng,
            &mut self.plan,
        );
        trace_cache_use(self.last_frame, CacheSlot::MaskOverlay, used, tracer);
    }

    fn render_text(&mut self, sample: &PhaseSample, now_ms: f64) {
        if !sample.active.is_active(WindowId::Plant) {
            return;
        }
        self.plan.push(RenderItem::Fill {
            rect: self.surface.rect(),
            color: self.config.text.wash,
        });
        if let Some(cue) = sample.text {
            let _ = typewriter::render(
                cue,
                now_ms,
                &self.config.text,
                &self.surface,
                &mut self.rng,
                &mut self.plan,
            );
        }
    }

    fn render_reveal(&mut self, sample: &PhaseSample, now_ms: f64, tracer: &mut Tracer<'_>) {
        let Some(phase) = sample.reveal else {
            return;
        };
        let Some(asset) = self.assets.slot(AssetKind::Reveal).ready() else {
            return;
        };
        let geometry = RevealGeometry::fit(&self.config.reveal, &self.surface, asset.aspect_ratio());
        let used = self.chroma.render(
            phase,
            now_ms,
            &self.config.reveal,
            &geometry,
            asset,
            &mut self.rng,
            &mut self.plan,
        );
        trace_cache_use(self.last_frame, CacheSlot::RevealStable, used, tracer);
    }

    fn apply_invalidations(&mut self, invalidated: Invalidated, tracer: &mut Tracer<'_>) {
        for slot in invalidated.iter() {
            match slot {
                CacheSlot::Noise => self.noise.invalidate(),
                CacheSlot::MaskOverlay => {
                    let _ = self.overlay.invalidate();
                }
                CacheSlot::RevealStable => {
                    let _ = self.chroma.invalidate_stable();
                }
            }
            #[cfg(feature = "trace-rich")]
            tracer.cache(&CacheEvent {
                frame_index: self.last_frame,
                slot,
                outcome: CacheOutcome::Invalidated,
            });
        }
        _ = tracer;
    }

    #[cfg(feature = "trace-rich")]
    fn trace_window_edges(&self, sample: &PhaseSample, tracer: &mut Tracer<'_>) {
        let now = sample.active.bits();
        for id in WindowId::ALL {
            let bit = 1_u8 << id.index();
            let edge = match (self.prev_active & bit != 0, now & bit != 0) {
                (false, true) => WindowEdge::Enter,
                (true, false) => WindowEdge::Exit,
                _ => continue,
            };
            tracer.window_edge(&WindowEdgeEvent {
                frame_index: self.last_frame,
                window: id,
                edge,
            });
        }
    }

    fn set_state(&mut self, to: SessionState, tracer: &mut Tracer<'_>) {
        if self.state == to {
            return;
        }
        let from = self.state;
        self.state = to;
        tracer.session_state(&SessionStateEvent {
            frame_index: self.last_frame,
            from,
            to,
        });
    }

    fn trace_cta(&self, transition: Option<CtaTransition>, tracer: &mut Tracer<'_>) {
        if let Some(t) = transition {
            tracer.cta(&CtaEvent {
                frame_index: self.last_frame,
                from: t.from,
                to: t.to,
                completed: self.cta.is_completed(),
            });
        }
    }
}

fn trace_cache_use(frame_index: u64, slot: CacheSlot, used: Option<CacheUse>, tracer: &mut Tracer<'_>) {
    #[cfg(feature = "trace-rich")]
    if let Some(used) = used {
        tracer.cache(&CacheEvent {
            frame_index,
            slot,
            outcome: match used {
                CacheUse::Hit => CacheOutcome::Hit,
                CacheUse::Miss => CacheOutcome::Miss,
            },
        });
    }
    #[cfg(not(feature = "trace-rich"))]
    {
        _ = (frame_index, slot, used, tracer);
    }
}

impl Resources for GateSession {
    fn resource(&self, key: ResourceKey) -> Option<ResourceView<'_>> {
        let (raster, generation) = match key {
            ResourceKey::NOISE => (self.noise.raster(), self.noise.generation()),
            ResourceKey::MASK => (self.overlay.raster(), self.overlay.generation()),
            ResourceKey::REVEAL_GLITCH => (self.chroma.glitch_raster(), self.chroma.glitch_generation()),
            ResourceKey::REVEAL_STABLE => (self.chroma.stable_raster(), self.chroma.stable_generation()),
            _ => return None,
        };
        (!raster.is_empty()).then_some(ResourceView { raster, generation })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use portal_core::surface::DeviceClass;

    const TB: Timebase = Timebase::NANOS;

    fn at(ms: u64, frame_index: u64) -> FrameTick {
        FrameTick::visible(HostTime::from_millis(ms, TB), frame_index)
    }

    fn session() -> GateSession {
        let mut s = GateSession::new(GateConfig::portal(), TB, 7);
        let _ = s.resize(SurfaceSize::from_pixels(640, 480, DeviceClass::Wide));
        s
    }

    fn with_assets() -> GateSession {
        let mut s = session();
        let _ = s.set_asset(AssetKind::Mask, Raster::solid(32, 16, [200, 200, 200, 255]));
        let _ = s.set_asset(AssetKind::Reveal, Raster::solid(40, 20, [120, 120, 120, 255]));
        s
    }

    /// Starts the clock at 0 and jumps to `ms`.
    fn run_to(s: &mut GateSession, ms: u64) -> TickOutcome {
        let mut tracer = Tracer::none();
        let _ = s.tick(&at(0, 0), &mut tracer);
        s.tick(&at(ms, 1), &mut tracer)
    }

    #[test]
    fn first_tick_starts_the_session() {
        let mut s = session();
        assert_eq!(s.state(), SessionState::Idle);
        let out = s.tick(&at(5_000, 0), &mut Tracer::none());
        assert_eq!(s.state(), SessionState::Running);
        assert!(out.rendered && out.reschedule);
        let t = s.last_sample().map(|p| p.position.t_ms);
        assert_eq!(t, Some(0.0), "clock starts at the first tick");
    }

    #[test]
    fn noise_is_drawn_every_tick_first() {
        let mut s = session();
        let mut tracer = Tracer::none();
        for (i, ms) in [0_u64, 5, 10, 40].into_iter().enumerate() {
            let _ = s.tick(&at(ms, i as u64), &mut tracer);
            assert!(
                matches!(s.plan().items.first(), Some(RenderItem::Image(img)) if img.key == ResourceKey::NOISE),
                "noise blit leads the plan"
            );
        }
    }

    #[test]
    fn missing_assets_skip_their_phases() {
        let mut s = session();
        let _ = run_to(&mut s, 1_200);
        assert_eq!(s.plan().images(ResourceKey::MASK).count(), 0);
        let _ = run_to(&mut s, 10_000);
        assert_eq!(s.plan().images(ResourceKey::REVEAL_GLITCH).count(), 0);
        assert!(s.resource(ResourceKey::REVEAL_GLITCH).is_none());
    }

    #[test]
    fn plant_window_draws_wash_then_text() {
        let mut s = with_assets();
        let _ = run_to(&mut s, 3_000);
        let fill = s
            .plan()
            .items
            .iter()
            .position(|i| matches!(i, RenderItem::Fill { .. }));
        let text = s
            .plan()
            .items
            .iter()
            .position(|i| matches!(i, RenderItem::Text(_)));
        assert!(fill.is_some(), "wash drawn");
        assert!(fill < text, "wash under text");
    }

    #[test]
    fn climax_inverts_then_collapses() {
        let mut s = with_assets();
        let _ = run_to(&mut s, 9_600);
        assert_eq!(s.plan().display_filter, Some(DisplayFilter::CLIMAX));
        let _ = run_to(&mut s, 9_700);
        assert_eq!(s.plan().display_filter, None);
        assert_eq!(s.last_sample().map(|p| p.climax), Some(ClimaxMode::Collapse));
        assert!(s.plan().images(ResourceKey::REVEAL_GLITCH).count() > 0, "drive overlaps collapse");
    }

    #[test]
    fn cta_follows_the_timeline_until_completed() {
        let mut s = with_assets();
        let mut tracer = Tracer::none();
        let _ = s.tick(&at(0, 0), &mut tracer);
        assert_eq!(s.tick(&at(11_400, 1), &mut tracer).cta, CtaSignal::ShownBoosted);
        assert_eq!(s.tick(&at(13_000, 2), &mut tracer).cta, CtaSignal::Shown);
        assert_eq!(s.tick(&at(26_000, 3), &mut tracer).cta, CtaSignal::Hidden, "next loop");
        let _ = s.tick(&at(36_400, 4), &mut tracer);
        s.complete(&mut tracer);
        assert_eq!(s.state(), SessionState::Completed);
        assert_eq!(s.cta().signal(), CtaSignal::ShownBoosted);

        let before = s.plan().items.len();
        for (i, ms) in [40_000_u64, 51_000, 60_000, 500_000].into_iter().enumerate() {
            let out = s.tick(&at(ms, 5 + i as u64), &mut tracer);
            assert!(!out.rendered && !out.reschedule, "completed is terminal");
            assert_eq!(out.cta, CtaSignal::ShownBoosted);
        }
        assert_eq!(s.plan().items.len(), before, "plan untouched");
    }

    #[test]
    fn reduced_motion_shows_cta_and_stops() {
        let mut s = with_assets();
        let mut tracer = Tracer::none();
        s.set_reduced_motion(true, &mut tracer);
        assert_eq!(s.cta().signal(), CtaSignal::Shown);
        let out = s.tick(&at(0, 0), &mut tracer);
        assert!(!out.rendered && !out.reschedule);
        assert_eq!(s.state(), SessionState::Idle, "timeline never started");

        s.set_reduced_motion(false, &mut tracer);
        let out = s.tick(&at(100, 1), &mut tracer);
        assert!(out.rendered && out.reschedule, "resumes when turned off");
    }

    #[test]
    fn reduced_motion_mid_run_stops_on_next_tick() {
        let mut s = with_assets();
        let mut tracer = Tracer::none();
        let out = run_to(&mut s, 3_000);
        assert!(out.rendered && out.reschedule);
        assert_eq!(out.cta, CtaSignal::Hidden, "plant window precedes the CTA");

        s.set_reduced_motion(true, &mut tracer);
        let out = s.tick(&at(3_016, 2), &mut tracer);
        assert_eq!(out.cta, CtaSignal::Shown);
        assert!(!out.rendered && !out.reschedule);
        assert_eq!(s.cta().signal(), CtaSignal::Shown);
    }

    #[test]
    fn hidden_ticks_keep_the_loop_alive() {
        let mut s = with_assets();
        let mut tracer = Tracer::none();
        let _ = s.tick(&at(0, 0), &mut tracer);
        let mut hidden = at(5_000, 1);
        hidden.visible = false;
        let out = s.tick(&hidden, &mut tracer);
        assert!(!out.rendered && out.reschedule);
        let _ = s.tick(&at(10_000, 2), &mut tracer);
        let t = s.last_sample().map(|p| p.position.t_ms);
        assert_eq!(t, Some(10_000.0), "hidden time still elapses");
    }

    #[test]
    fn resize_forces_stable_reprocessing() {
        let mut s = with_assets();
        let mut tracer = Tracer::none();
        let _ = s.tick(&at(0, 0), &mut tracer);
        let _ = s.tick(&at(12_000, 1), &mut tracer);
        let g1 = s.resource(ResourceKey::REVEAL_STABLE).map(|r| r.generation);
        let _ = s.tick(&at(12_016, 2), &mut tracer);
        let g2 = s.resource(ResourceKey::REVEAL_STABLE).map(|r| r.generation);
        assert_eq!(g1, g2, "cache reused between ticks");

        assert!(s.resize(SurfaceSize::from_pixels(1280, 720, DeviceClass::Wide)));
        let _ = s.tick(&at(12_032, 3), &mut tracer);
        let view = s.resource(ResourceKey::REVEAL_STABLE);
        assert_ne!(view.map(|r| r.generation), g2, "reprocessed after resize");
        let expected = RevealGeometry::fit(&s.config().reveal, &s.surface(), 0.5);
        assert_eq!(
            view.map(|r| r.raster.dimensions()),
            Some((expected.width, expected.height))
        );
    }

    #[test]
    fn equal_seeds_give_equal_plans() {
        let mut a = with_assets();
        let mut b = with_assets();
        for ms in [0_u64, 1_100, 9_700, 12_000] {
            let _ = run_to(&mut a, ms);
            let _ = run_to(&mut b, ms);
            assert_eq!(a.plan().items, b.plan().items);
        }
    }

    #[test]
    fn cta_anchor_sits_under_the_reveal() {
        let mut s = session();
        assert!(s.cta_anchor().is_none());
        let _ = s.set_asset(AssetKind::Reveal, Raster::solid(40, 20, [120, 120, 120, 255]));
        let anchor = s.cta_anchor().unwrap_or_else(|| panic!("anchor once ready"));
        assert!((anchor.x - 320.0).abs() < 1e-9);
        assert!(anchor.y > 240.0, "below the center");
    }

    #[test]
    fn active_windows_match_the_sample() {
        let mut s = with_assets();
        let _ = run_to(&mut s, 9_700);
        let active: Vec<WindowId> = s
            .last_sample()
            .map(|p| p.active.iter().map(|(id, _)| id).collect())
            .unwrap_or_default();
        assert_eq!(active, [WindowId::Climax, WindowId::Drive]);
    }

    #[cfg(feature = "trace-rich")]
    #[test]
    fn rich_trace_reports_edges_and_cache_use() {
        use portal_core::trace::TraceSink;

        #[derive(Default)]
        struct Collect {
            edges: Vec<(WindowId, WindowEdge)>,
            cache: Vec<(CacheSlot, CacheOutcome)>,
        }
        impl TraceSink for Collect {
            fn on_window_edge(&mut self, e: &WindowEdgeEvent) {
                self.edges.push((e.window, e.edge));
            }
            fn on_cache(&mut self, e: &CacheEvent) {
                self.cache.push((e.slot, e.outcome));
            }
        }

        let mut s = with_assets();
        let mut sink = Collect::default();
        let mut tracer = Tracer::new(&mut sink);
        let _ = s.tick(&at(0, 0), &mut tracer);
        let _ = s.tick(&at(12_000, 1), &mut tracer);
        let _ = s.tick(&at(12_016, 2), &mut tracer);
        assert!(sink.edges.contains(&(WindowId::Static, WindowEdge::Enter)));
        assert!(sink.edges.contains(&(WindowId::Static, WindowEdge::Exit)));
        assert!(sink.cache.contains(&(CacheSlot::RevealStable, CacheOutcome::Invalidated)));
        assert!(sink.cache.contains(&(CacheSlot::RevealStable, CacheOutcome::Miss)));
        assert!(sink.cache.contains(&(CacheSlot::RevealStable, CacheOutcome::Hit)));
    }
}
