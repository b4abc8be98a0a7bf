// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the gate loop.
//!
//! The session reports what each tick did through a [`TraceSink`]. Every
//! method defaults to a no-op, so sinks implement only what they need.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. With the `trace`
//! feature **off** every `Tracer` method compiles to nothing; with it **on**,
//! each call is one `Option` branch before dispatch.
//!
//! [`FrameSummaryBuilder`] gathers host-measured phase timestamps and the
//! session's loop sample into one [`FrameSummary`] per tick.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies.
//! - `trace-rich` (implies `trace`) adds [`WindowEdgeEvent`] and
//!   [`CacheEvent`] plus the matching `TraceSink` methods.

use crate::output::OutputId;
use crate::state::{CtaSignal, SessionState};
use crate::time::HostTime;
use crate::timeline::{ClimaxMode, PhaseSample};
use crate::timing::FrameTick;

#[cfg(feature = "trace-rich")]
use crate::invalidate::CacheSlot;
#[cfg(feature = "trace-rich")]
use crate::timeline::WindowId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Host-measured stage of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// `GateSession::tick` building the render plan.
    Plan,
    /// The presenter drawing the plan.
    Present,
}

/// Whether a window opened or closed between two ticks.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WindowEdge {
    /// The window became active.
    Enter,
    /// The window became inactive.
    Exit,
}

/// What happened to a cache slot this tick.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheOutcome {
    /// Reused without processing.
    Hit,
    /// Processed from the source image.
    Miss,
    /// Dropped by a resize or reload.
    Invalidated,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every tick the session receives.
#[derive(Clone, Copy, Debug)]
pub struct FrameTickEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Which output this tick targets.
    pub output: OutputId,
    /// Host time of the tick.
    pub now: HostTime,
    /// Whether the page was visible.
    pub visible: bool,
}

impl From<&FrameTick> for FrameTickEvent {
    fn from(tick: &FrameTick) -> Self {
        Self {
            frame_index: tick.frame_index,
            output: tick.output,
            now: tick.now,
            visible: tick.visible,
        }
    }
}

/// Emitted after the timeline resolves an active tick.
#[derive(Clone, Copy, Debug)]
pub struct LoopSampleEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Completed loops since start.
    pub loop_index: u64,
    /// Loop-relative time.
    pub t_ms: f64,
    /// Active window bits, see [`ActiveWindows::bits`](crate::timeline::ActiveWindows::bits).
    pub active: u8,
    /// Invert / collapse.
    pub climax: ClimaxMode,
}

impl LoopSampleEvent {
    /// Builds the event for a resolved sample.
    #[must_use]
    pub fn new(frame_index: u64, sample: &PhaseSample) -> Self {
        Self {
            frame_index,
            loop_index: sample.position.loop_index,
            t_ms: sample.position.t_ms,
            active: sample.active.bits(),
            climax: sample.climax,
        }
    }
}

/// Marks the beginning of a host-measured phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a host-measured phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted when the noise buffer is regenerated rather than reused.
#[derive(Clone, Copy, Debug)]
pub struct NoiseRegenEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Buffer width.
    pub width: u32,
    /// Buffer height.
    pub height: u32,
    /// Whether the collapsed palette was used.
    pub collapse: bool,
    /// Whether a scan line was stamped.
    pub scanline: bool,
}

/// Emitted when the CTA signal changes.
#[derive(Clone, Copy, Debug)]
pub struct CtaEvent {
    /// Frame counter of the tick (or the last tick, for host-driven changes).
    pub frame_index: u64,
    /// Previous signal.
    pub from: CtaSignal,
    /// New signal.
    pub to: CtaSignal,
    /// Whether the terminal flag is set after the change.
    pub completed: bool,
}

/// Emitted when the session changes lifecycle state.
#[derive(Clone, Copy, Debug)]
pub struct SessionStateEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Previous state.
    pub from: SessionState,
    /// New state.
    pub to: SessionState,
}

/// A window edge between two consecutive rendered ticks.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct WindowEdgeEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which window.
    pub window: WindowId,
    /// Enter or exit.
    pub edge: WindowEdge,
}

/// A cache slot outcome.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct CacheEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which cache.
    pub slot: CacheSlot,
    /// What happened.
    pub outcome: CacheOutcome,
}

/// Per-tick summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Which output.
    pub output: OutputId,
    /// Host time of the tick.
    pub now: HostTime,
    /// Whether the tick produced a render plan.
    pub rendered: bool,
    /// Completed loops since start (0 if not rendered).
    pub loop_index: u64,
    /// Loop-relative time (0 if not rendered).
    pub t_ms: f64,
    /// Active window bits (0 if not rendered).
    pub active: u8,
    /// Number of items in the render plan.
    pub item_count: u32,
    /// Whether the noise buffer was regenerated.
    pub noise_regenerated: bool,
    /// Plan phase duration in ticks (0 if not measured).
    pub plan_ticks: u64,
    /// Present phase duration in ticks (0 if not measured).
    pub present_ticks: u64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the gate loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for every tick.
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        _ = e;
    }

    /// Called after the timeline resolves an active tick.
    fn on_loop_sample(&mut self, e: &LoopSampleEvent) {
        _ = e;
    }

    /// Called at the beginning of a host-measured phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a host-measured phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when the noise buffer is regenerated.
    fn on_noise_regen(&mut self, e: &NoiseRegenEvent) {
        _ = e;
    }

    /// Called when the CTA signal changes.
    fn on_cta(&mut self, e: &CtaEvent) {
        _ = e;
    }

    /// Called when the session changes lifecycle state.
    fn on_session_state(&mut self, e: &SessionStateEvent) {
        _ = e;
    }

    /// Called with a per-tick summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called when a window opens or closes (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_window_edge(&mut self, e: &WindowEdgeEvent) {
        _ = e;
    }

    /// Called with a cache outcome (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_cache(&mut self, e: &CacheEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$doc:meta])* $name:ident, $method:ident, $ty:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    dispatch!(
        /// Emits a [`FrameTickEvent`].
        frame_tick, on_frame_tick, FrameTickEvent
    );
    dispatch!(
        /// Emits a [`LoopSampleEvent`].
        loop_sample, on_loop_sample, LoopSampleEvent
    );
    dispatch!(
        /// Emits a [`PhaseBeginEvent`].
        phase_begin, on_phase_begin, PhaseBeginEvent
    );
    dispatch!(
        /// Emits a [`PhaseEndEvent`].
        phase_end, on_phase_end, PhaseEndEvent
    );
    dispatch!(
        /// Emits a [`NoiseRegenEvent`].
        noise_regen, on_noise_regen, NoiseRegenEvent
    );
    dispatch!(
        /// Emits a [`CtaEvent`].
        cta, on_cta, CtaEvent
    );
    dispatch!(
        /// Emits a [`SessionStateEvent`].
        session_state, on_session_state, SessionStateEvent
    );
    dispatch!(
        /// Emits a [`FrameSummary`].
        frame_summary, on_frame_summary, FrameSummary
    );

    /// Emits a window edge (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn window_edge(&mut self, e: &WindowEdgeEvent) {
        if let Some(s) = &mut self.sink {
            s.on_window_edge(e);
        }
    }

    /// Emits a cache outcome (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn cache(&mut self, e: &CacheEvent) {
        if let Some(s) = &mut self.sink {
            s.on_cache(e);
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps during a tick and produces a [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    tick: FrameTickEvent,
    sample: Option<LoopSampleEvent>,
    item_count: u32,
    noise_regenerated: bool,
    phase_starts: [Option<HostTime>; 2],
    phase_ends: [Option<HostTime>; 2],
}

impl FrameSummaryBuilder {
    /// Starts building a summary for the given tick.
    #[must_use]
    pub fn new(tick: &FrameTickEvent) -> Self {
        Self {
            tick: *tick,
            sample: None,
            item_count: 0,
            noise_regenerated: false,
            phase_starts: [None; 2],
            phase_ends: [None; 2],
        }
    }

    /// Records the loop sample of a rendered tick.
    pub fn loop_sample(&mut self, e: &LoopSampleEvent) {
        self.sample = Some(*e);
    }

    /// Records the render plan's item count.
    pub fn set_item_count(&mut self, n: usize) {
        self.item_count = u32::try_from(n).unwrap_or(u32::MAX);
    }

    /// Records whether the noise buffer was regenerated.
    pub fn set_noise_regenerated(&mut self, regenerated: bool) {
        self.noise_regenerated = regenerated;
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_starts[phase_index(phase)] = Some(t);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_ends[phase_index(phase)] = Some(t);
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            frame_index: self.tick.frame_index,
            output: self.tick.output,
            now: self.tick.now,
            rendered: self.sample.is_some(),
            loop_index: self.sample.map_or(0, |s| s.loop_index),
            t_ms: self.sample.map_or(0.0, |s| s.t_ms),
            active: self.sample.map_or(0, |s| s.active),
            item_count: self.item_count,
            noise_regenerated: self.noise_regenerated,
            plan_ticks: self.phase_duration(PhaseKind::Plan),
            present_ticks: self.phase_duration(PhaseKind::Present),
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase_index(phase);
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).ticks(),
            _ => 0,
        }
    }
}

const fn phase_index(phase: PhaseKind) -> usize {
    match phase {
        PhaseKind::Plan => 0,
        PhaseKind::Present => 1,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{LoopPosition, Timeline};

    fn sample_tick() -> FrameTickEvent {
        FrameTickEvent {
            frame_index: 42,
            output: OutputId(0),
            now: HostTime(1_000_000),
            visible: true,
        }
    }

    #[test]
    fn frame_tick_event_from_frame_tick() {
        let tick = FrameTick {
            now: HostTime(100),
            frame_index: 7,
            output: OutputId(1),
            visible: false,
        };
        let evt = FrameTickEvent::from(&tick);
        assert_eq!(evt.frame_index, 7);
        assert_eq!(evt.output, OutputId(1));
        assert_eq!(evt.now, HostTime(100));
        assert!(!evt.visible);
    }

    #[test]
    fn loop_sample_event_carries_window_bits() {
        let sample = Timeline::portal().sample(LoopPosition {
            loop_index: 3,
            t_ms: 9_600.0,
        });
        let evt = LoopSampleEvent::new(9, &sample);
        assert_eq!(evt.loop_index, 3);
        assert_eq!(evt.climax, ClimaxMode::Invert);
        assert_eq!(evt.active, sample.active.bits());
        assert_ne!(evt.active, 0);
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_frame_tick(&sample_tick());
        sink.on_cta(&CtaEvent {
            frame_index: 0,
            from: CtaSignal::Hidden,
            to: CtaSignal::Shown,
            completed: false,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.frame_tick(&sample_tick());
        tracer.session_state(&SessionStateEvent {
            frame_index: 0,
            from: SessionState::Idle,
            to: SessionState::Running,
        });
    }

    #[test]
    fn summary_builder_computes_durations() {
        let tick = sample_tick();
        let mut builder = FrameSummaryBuilder::new(&tick);
        builder.phase_begin(PhaseKind::Plan, HostTime(1_000_000));
        builder.phase_end(PhaseKind::Plan, HostTime(1_000_120));
        builder.phase_begin(PhaseKind::Present, HostTime(1_000_120));
        builder.phase_end(PhaseKind::Present, HostTime(1_002_000));
        builder.loop_sample(&LoopSampleEvent {
            frame_index: 42,
            loop_index: 1,
            t_ms: 500.0,
            active: 1,
            climax: ClimaxMode::Steady,
        });
        builder.set_item_count(3);
        builder.set_noise_regenerated(true);

        let summary = builder.finish();
        assert_eq!(summary.plan_ticks, 120);
        assert_eq!(summary.present_ticks, 1880);
        assert!(summary.rendered);
        assert_eq!(summary.loop_index, 1);
        assert_eq!(summary.item_count, 3);
        assert!(summary.noise_regenerated);
    }

    #[test]
    fn summary_without_sample_is_not_rendered() {
        let summary = FrameSummaryBuilder::new(&sample_tick()).finish();
        assert!(!summary.rendered);
        assert_eq!(summary.plan_ticks, 0);
        assert_eq!(summary.present_ticks, 0);
        assert_eq!(summary.t_ms, 0.0);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            ticks: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_frame_tick(&mut self, e: &FrameTickEvent) {
                self.ticks.push(e.frame_index);
            }
        }

        let mut sink = RecordingSink { ticks: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.frame_tick(&sample_tick());
        drop(tracer);
        assert_eq!(sink.ticks, &[42]);
    }
}
