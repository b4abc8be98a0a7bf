// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Host
//! timestamps are converted to microseconds using a [`Timebase`]; loop
//! positions are already in milliseconds and are printed as such.

use std::io::Write;

use portal_core::invalidate::CacheSlot;
use portal_core::state::{CtaSignal, SessionState};
use portal_core::time::{HostTime, Timebase};
use portal_core::timeline::{ClimaxMode, WindowId};
use portal_core::trace::{
    CacheEvent, CacheOutcome, CtaEvent, FrameSummary, FrameTickEvent, LoopSampleEvent,
    NoiseRegenEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, SessionStateEvent, TraceSink,
    WindowEdge, WindowEdgeEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Plan => "plan",
        PhaseKind::Present => "present",
    }
}

fn climax_name(climax: ClimaxMode) -> &'static str {
    match climax {
        ClimaxMode::Steady => "steady",
        ClimaxMode::Invert => "invert",
        ClimaxMode::Collapse => "collapse",
    }
}

fn cta_name(signal: CtaSignal) -> &'static str {
    match signal {
        CtaSignal::Hidden => "hidden",
        CtaSignal::Shown => "shown",
        CtaSignal::ShownBoosted => "boosted",
    }
}

fn state_name(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "idle",
        SessionState::Running => "running",
        SessionState::Completed => "completed",
    }
}

fn slot_name(slot: CacheSlot) -> &'static str {
    match slot {
        CacheSlot::Noise => "noise",
        CacheSlot::MaskOverlay => "mask-overlay",
        CacheSlot::RevealStable => "reveal-stable",
    }
}

/// Comma-separated names of the windows set in `active`, or `-`.
fn active_names(active: u8) -> String {
    let names: Vec<&str> = WindowId::ALL
        .iter()
        .filter(|w| active & (1 << w.index()) != 0)
        .map(|w| w.name())
        .collect();
    if names.is_empty() {
        String::from("-")
    } else {
        names.join(",")
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        let _ = writeln!(
            self.writer,
            "[tick] frame={} output={} now={:.1}µs visible={}",
            e.frame_index,
            e.output.0,
            self.host_us(e.now),
            e.visible,
        );
    }

    fn on_loop_sample(&mut self, e: &LoopSampleEvent) {
        let _ = writeln!(
            self.writer,
            "[loop] frame={} loop={} t={:.1}ms active={} climax={}",
            e.frame_index,
            e.loop_index,
            e.t_ms,
            active_names(e.active),
            climax_name(e.climax),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.1}µs",
            e.frame_index,
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.1}µs",
            e.frame_index,
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_noise_regen(&mut self, e: &NoiseRegenEvent) {
        let mut flags = String::new();
        if e.collapse {
            flags.push_str(" collapse");
        }
        if e.scanline {
            flags.push_str(" scanline");
        }
        let _ = writeln!(
            self.writer,
            "[noise] frame={} {}x{}{flags}",
            e.frame_index, e.width, e.height,
        );
    }

    fn on_cta(&mut self, e: &CtaEvent) {
        let done = if e.completed { " completed" } else { "" };
        let _ = writeln!(
            self.writer,
            "[cta] frame={} {} -> {}{done}",
            e.frame_index,
            cta_name(e.from),
            cta_name(e.to),
        );
    }

    fn on_session_state(&mut self, e: &SessionStateEvent) {
        let _ = writeln!(
            self.writer,
            "[session] frame={} {} -> {}",
            e.frame_index,
            state_name(e.from),
            state_name(e.to),
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let rendered = if s.rendered { "drawn" } else { "skipped" };
        let _ = writeln!(
            self.writer,
            "[summary] frame={} {rendered} loop={} t={:.1}ms items={} noise={} \
             plan={:.1}µs present={:.1}µs",
            s.frame_index,
            s.loop_index,
            s.t_ms,
            s.item_count,
            s.noise_regenerated,
            self.ticks_to_us(s.plan_ticks),
            self.ticks_to_us(s.present_ticks),
        );
    }

    fn on_window_edge(&mut self, e: &WindowEdgeEvent) {
        let edge = match e.edge {
            WindowEdge::Enter => "enter",
            WindowEdge::Exit => "exit",
        };
        let _ = writeln!(
            self.writer,
            "[window] frame={} {} {edge}",
            e.frame_index,
            e.window.name(),
        );
    }

    fn on_cache(&mut self, e: &CacheEvent) {
        let outcome = match e.outcome {
            CacheOutcome::Hit => "hit",
            CacheOutcome::Miss => "miss",
            CacheOutcome::Invalidated => "invalidated",
        };
        let _ = writeln!(
            self.writer,
            "[cache] frame={} {} {outcome}",
            e.frame_index,
            slot_name(e.slot),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::output::OutputId;

    fn lines(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn pretty_print_tick() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_frame_tick(&FrameTickEvent {
            frame_index: 1,
            output: OutputId(0),
            now: HostTime(1_000_000),
            visible: true,
        });
        let output = lines(sink);
        assert!(output.contains("[tick]"), "got: {output}");
        assert!(output.contains("frame=1"), "got: {output}");
        assert!(output.contains("now=1000.0µs"), "got: {output}");
    }

    #[test]
    fn loop_sample_names_active_windows() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        let active = (1 << WindowId::Static.index()) | (1 << WindowId::Climax.index());
        sink.on_loop_sample(&LoopSampleEvent {
            frame_index: 4,
            loop_index: 0,
            t_ms: 9_600.0,
            active,
            climax: ClimaxMode::Invert,
        });
        let output = lines(sink);
        assert!(output.contains("active=static,climax"), "got: {output}");
        assert!(output.contains("climax=invert"), "got: {output}");
    }

    #[test]
    fn empty_active_set_prints_dash() {
        assert_eq!(active_names(0), "-");
    }

    #[test]
    fn cta_and_cache_lines() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::MICROS);
        sink.on_cta(&CtaEvent {
            frame_index: 9,
            from: CtaSignal::Shown,
            to: CtaSignal::Hidden,
            completed: true,
        });
        sink.on_cache(&CacheEvent {
            frame_index: 9,
            slot: CacheSlot::RevealStable,
            outcome: CacheOutcome::Hit,
        });
        let output = lines(sink);
        assert!(output.contains("[cta] frame=9 shown -> hidden completed"), "got: {output}");
        assert!(output.contains("[cache] frame=9 reveal-stable hit"), "got: {output}");
    }
}
