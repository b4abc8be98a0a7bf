// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless run of the portal sequence that exercises the tracing and
//! diagnostics pipeline.
//!
//! Drives a [`GateSession`] through two loops at 60 Hz with synthetic assets.
//! Along the way the page is hidden for a second, the viewport is resized,
//! and the visitor clicks the CTA near the end of the second loop. Every
//! event goes to a [`RecorderSink`]; state changes and a periodic frame
//! summary go to a [`PrettyPrintSink`] on stdout. The recording is then
//! exported as a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use portal_core::asset::AssetKind;
use portal_core::config::GateConfig;
use portal_core::output::OutputId;
use portal_core::raster::Raster;
use portal_core::surface::SurfaceSize;
use portal_core::time::{HostTime, Timebase};
use portal_core::timing::{FixedRateTicks, FrameTick};
use portal_core::trace::{
    CacheEvent, CacheOutcome, CtaEvent, FrameSummary, FrameSummaryBuilder, FrameTickEvent,
    LoopSampleEvent, NoiseRegenEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    SessionStateEvent, TraceSink, Tracer, WindowEdgeEvent,
};
use portal_render::{GateSession, Presenter, RenderPlan, ResourceKey, Resources};

use portal_debug::pretty::PrettyPrintSink;
use portal_debug::recorder::RecorderSink;

/// Web-style microsecond ticks.
const TIMEBASE: Timebase = Timebase::MICROS;
/// ≈60 Hz in microseconds.
const FRAME_INTERVAL_US: u64 = 16_667;
/// Two full loops.
const FRAME_COUNT: usize = 3_000;
/// Page hidden for one second during the plant window.
const HIDDEN_FRAMES: std::ops::Range<u64> = 240..300;
/// Viewport rotates to portrait partway into the first CTA window.
const RESIZE_FRAME: u64 = 840;
/// Click during the second loop's CTA window (≈43 s in).
const CLICK_FRAME: u64 = 2_580;
/// Print every n-th frame summary.
const SUMMARY_EVERY: u64 = 300;

/// Fans events out: everything to the recorder, the interesting ones to the
/// console.
struct Sinks {
    pretty: PrettyPrintSink,
    recorder: RecorderSink,
}

impl TraceSink for Sinks {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        self.recorder.on_frame_tick(e);
    }

    fn on_loop_sample(&mut self, e: &LoopSampleEvent) {
        self.recorder.on_loop_sample(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.recorder.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.recorder.on_phase_end(e);
    }

    fn on_noise_regen(&mut self, e: &NoiseRegenEvent) {
        self.recorder.on_noise_regen(e);
        if e.collapse {
            self.pretty.on_noise_regen(e);
        }
    }

    fn on_cta(&mut self, e: &CtaEvent) {
        self.recorder.on_cta(e);
        self.pretty.on_cta(e);
    }

    fn on_session_state(&mut self, e: &SessionStateEvent) {
        self.recorder.on_session_state(e);
        self.pretty.on_session_state(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.recorder.on_frame_summary(s);
        if s.frame_index % SUMMARY_EVERY == 0 {
            self.pretty.on_frame_summary(s);
        }
    }

    fn on_window_edge(&mut self, e: &WindowEdgeEvent) {
        self.recorder.on_window_edge(e);
        self.pretty.on_window_edge(e);
    }

    fn on_cache(&mut self, e: &CacheEvent) {
        self.recorder.on_cache(e);
        if e.outcome != CacheOutcome::Hit {
            self.pretty.on_cache(e);
        }
    }
}

/// Stands in for a surface backend: tracks uploads by generation the way a
/// real presenter would, and counts what it would draw.
#[derive(Debug, Default)]
struct CountingPresenter {
    generations: Vec<(ResourceKey, u64)>,
    uploads: u64,
    items: u64,
}

impl Presenter for CountingPresenter {
    fn apply(&mut self, resources: &dyn Resources, plan: &RenderPlan) {
        for key in ResourceKey::ALL {
            let Some(view) = resources.resource(key) else {
                continue;
            };
            match self.generations.iter_mut().find(|(k, _)| *k == key) {
                Some((_, generation)) if *generation == view.generation => {}
                Some((_, generation)) => {
                    *generation = view.generation;
                    self.uploads += 1;
                }
                None => {
                    self.generations.push((key, view.generation));
                    self.uploads += 1;
                }
            }
        }
        self.items += plan.items.len() as u64;
    }
}

/// Gray mask with a dark border the recolorer keys out.
fn synthetic_mask() -> Raster {
    let (w, h) = (480, 270);
    let mut r = Raster::solid(w, h, [30, 30, 30, 255]);
    for y in 20..h - 20 {
        for x in 20..w - 20 {
            let v = 120 + u8::try_from((x + y) % 100).unwrap_or(0);
            r.set_pixel(x, y, [v, v, v, 255]);
        }
    }
    r
}

/// Mid-gray drive on a white backdrop the chroma key removes.
fn synthetic_reveal() -> Raster {
    let (w, h) = (320, 200);
    let mut r = Raster::solid(w, h, [250, 250, 250, 255]);
    for y in 50..150 {
        for x in 60..260 {
            r.set_pixel(x, y, [110, 120, 140, 255]);
        }
    }
    r
}

fn elapsed_ticks(since: Instant) -> u64 {
    // Web ticks are microseconds.
    u64::try_from(since.elapsed().as_micros()).unwrap_or(u64::MAX)
}

fn main() -> std::io::Result<()> {
    let mut sinks = Sinks {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout()), TIMEBASE),
        recorder: RecorderSink::new(),
    };
    let mut presenter = CountingPresenter::default();

    let mut session = GateSession::new(GateConfig::portal(), TIMEBASE, 0x5eed);
    session.resize(SurfaceSize::from_viewport(1280.0, 720.0, 2.0));
    session.set_asset(AssetKind::Mask, synthetic_mask());
    session.set_asset(AssetKind::Reveal, synthetic_reveal());

    let ticks = FixedRateTicks::new(HostTime(1_000_000), FRAME_INTERVAL_US, OutputId(0));
    let mut frames = 0;
    for mut tick in ticks.take(FRAME_COUNT) {
        let frame_index = tick.frame_index;
        tick.visible = !HIDDEN_FRAMES.contains(&frame_index);

        if frame_index == RESIZE_FRAME {
            session.resize(SurfaceSize::from_viewport(390.0, 844.0, 3.0));
            println!("[demo] frame={frame_index} resized to 390x844 css @3x");
        }
        if frame_index == CLICK_FRAME {
            let mut tracer = Tracer::new(&mut sinks);
            session.complete(&mut tracer);
            println!("[demo] frame={frame_index} clicked");
        }

        let more = run_frame(&mut session, &mut presenter, &mut sinks, &tick);
        frames += 1;
        if !more {
            println!("[demo] frame={frame_index} loop parked");
            break;
        }
    }

    let anchor = session.cta_anchor();
    println!(
        "[demo] {frames} frames, {} items drawn, {} raster uploads, cta anchor {anchor:?}",
        presenter.items, presenter.uploads,
    );

    let path = "trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    portal_debug::chrome::export(sinks.recorder.as_bytes(), TIMEBASE, &mut writer)?;
    println!("Wrote {path}");
    Ok(())
}

/// One host frame: plan, present, summarize. Returns whether to continue.
fn run_frame(
    session: &mut GateSession,
    presenter: &mut CountingPresenter,
    sinks: &mut Sinks,
    tick: &FrameTick,
) -> bool {
    let frame_index = tick.frame_index;
    let tick_event = FrameTickEvent::from(tick);
    let mut builder = FrameSummaryBuilder::new(&tick_event);

    let wall = Instant::now();
    let plan_start = tick.now;
    emit(sinks, frame_index, PhaseKind::Plan, plan_start, true);
    let outcome = {
        let mut tracer = Tracer::new(&mut *sinks);
        session.tick(tick, &mut tracer)
    };
    let plan_end = HostTime(plan_start.ticks() + elapsed_ticks(wall));
    emit(sinks, frame_index, PhaseKind::Plan, plan_end, false);
    builder.phase_begin(PhaseKind::Plan, plan_start);
    builder.phase_end(PhaseKind::Plan, plan_end);

    if outcome.rendered {
        let wall = Instant::now();
        emit(sinks, frame_index, PhaseKind::Present, plan_end, true);
        presenter.apply(&*session, session.plan());
        let present_end = HostTime(plan_end.ticks() + elapsed_ticks(wall));
        emit(sinks, frame_index, PhaseKind::Present, present_end, false);
        builder.phase_begin(PhaseKind::Present, plan_end);
        builder.phase_end(PhaseKind::Present, present_end);

        if let Some(sample) = session.last_sample() {
            builder.loop_sample(&LoopSampleEvent::new(frame_index, sample));
        }
        builder.set_item_count(session.plan().items.len());
        builder.set_noise_regenerated(outcome.noise_regenerated);
    }

    sinks.on_frame_summary(&builder.finish());
    outcome.reschedule
}

fn emit(sinks: &mut Sinks, frame_index: u64, phase: PhaseKind, timestamp: HostTime, begin: bool) {
    if begin {
        sinks.on_phase_begin(&PhaseBeginEvent {
            frame_index,
            phase,
            timestamp,
        });
    } else {
        sinks.on_phase_end(&PhaseEndEvent {
            frame_index,
            phase,
            timestamp,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::invalidate::CacheSlot;
    use portal_debug::recorder::{RecordedEvent, decode};

    fn quiet_sinks() -> Sinks {
        Sinks {
            pretty: PrettyPrintSink::new(Box::new(std::io::sink()), TIMEBASE),
            recorder: RecorderSink::new(),
        }
    }

    #[test]
    fn first_second_records_static_then_mask() {
        let mut sinks = quiet_sinks();
        let mut presenter = CountingPresenter::default();
        let mut session = GateSession::new(GateConfig::portal(), TIMEBASE, 1);
        session.resize(SurfaceSize::from_viewport(800.0, 600.0, 1.0));
        session.set_asset(AssetKind::Mask, synthetic_mask());

        let ticks = FixedRateTicks::new(HostTime(0), FRAME_INTERVAL_US, OutputId(0));
        for tick in ticks.take(90) {
            assert!(run_frame(&mut session, &mut presenter, &mut sinks, &tick), "keeps going");
        }

        let events: Vec<_> = decode(sinks.recorder.as_bytes()).collect();
        let summaries = events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::FrameSummary(s) if s.rendered))
            .count();
        assert_eq!(summaries, 90, "every visible frame rendered");
        assert!(
            events.iter().any(|e| matches!(
                e,
                RecordedEvent::Cache(CacheEvent {
                    slot: CacheSlot::Noise,
                    ..
                }) | RecordedEvent::NoiseRegen(_)
            )),
            "noise activity recorded"
        );
        assert!(presenter.uploads > 0, "noise raster uploaded");
    }

    #[test]
    fn click_parks_the_loop() {
        let mut sinks = quiet_sinks();
        let mut presenter = CountingPresenter::default();
        let mut session = GateSession::new(GateConfig::portal(), TIMEBASE, 2);
        session.resize(SurfaceSize::from_viewport(800.0, 600.0, 1.0));

        let tick = FrameTick::visible(HostTime(0), 0);
        assert!(run_frame(&mut session, &mut presenter, &mut sinks, &tick), "running");
        session.complete(&mut Tracer::new(&mut sinks));
        let tick = FrameTick::visible(HostTime(16_667), 1);
        assert!(!run_frame(&mut session, &mut presenter, &mut sinks, &tick), "terminal");
    }
}
