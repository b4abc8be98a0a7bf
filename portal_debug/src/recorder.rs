// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`]. Floating-point fields are stored as
//! their IEEE 754 bits.

use portal_core::invalidate::CacheSlot;
use portal_core::output::OutputId;
use portal_core::state::{CtaSignal, SessionState};
use portal_core::time::HostTime;
use portal_core::timeline::{ClimaxMode, WindowId};
use portal_core::trace::{
    CacheEvent, CacheOutcome, CtaEvent, FrameSummary, FrameTickEvent, LoopSampleEvent,
    NoiseRegenEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, SessionStateEvent, TraceSink,
    WindowEdge, WindowEdgeEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_TICK: u8 = 1;
const TAG_LOOP_SAMPLE: u8 = 2;
const TAG_PHASE_BEGIN: u8 = 3;
const TAG_PHASE_END: u8 = 4;
const TAG_NOISE_REGEN: u8 = 5;
const TAG_CTA: u8 = 6;
const TAG_SESSION_STATE: u8 = 7;
const TAG_FRAME_SUMMARY: u8 = 8;
const TAG_WINDOW_EDGE: u8 = 9;
const TAG_CACHE: u8 = 10;

// ---------------------------------------------------------------------------
// Enum codes
// ---------------------------------------------------------------------------

fn phase_code(p: PhaseKind) -> u8 {
    match p {
        PhaseKind::Plan => 0,
        PhaseKind::Present => 1,
    }
}

fn phase_from(v: u8) -> PhaseKind {
    match v {
        0 => PhaseKind::Plan,
        _ => PhaseKind::Present,
    }
}

fn climax_code(c: ClimaxMode) -> u8 {
    match c {
        ClimaxMode::Steady => 0,
        ClimaxMode::Invert => 1,
        ClimaxMode::Collapse => 2,
    }
}

fn climax_from(v: u8) -> ClimaxMode {
    match v {
        1 => ClimaxMode::Invert,
        2 => ClimaxMode::Collapse,
        _ => ClimaxMode::Steady,
    }
}

fn cta_code(s: CtaSignal) -> u8 {
    match s {
        CtaSignal::Hidden => 0,
        CtaSignal::Shown => 1,
        CtaSignal::ShownBoosted => 2,
    }
}

fn cta_from(v: u8) -> CtaSignal {
    match v {
        1 => CtaSignal::Shown,
        2 => CtaSignal::ShownBoosted,
        _ => CtaSignal::Hidden,
    }
}

fn state_code(s: SessionState) -> u8 {
    match s {
        SessionState::Idle => 0,
        SessionState::Running => 1,
        SessionState::Completed => 2,
    }
}

fn state_from(v: u8) -> SessionState {
    match v {
        1 => SessionState::Running,
        2 => SessionState::Completed,
        _ => SessionState::Idle,
    }
}

fn slot_code(s: CacheSlot) -> u8 {
    match s {
        CacheSlot::Noise => 0,
        CacheSlot::MaskOverlay => 1,
        CacheSlot::RevealStable => 2,
    }
}

fn slot_from(v: u8) -> Option<CacheSlot> {
    match v {
        0 => Some(CacheSlot::Noise),
        1 => Some(CacheSlot::MaskOverlay),
        2 => Some(CacheSlot::RevealStable),
        _ => None,
    }
}

fn outcome_code(o: CacheOutcome) -> u8 {
    match o {
        CacheOutcome::Hit => 0,
        CacheOutcome::Miss => 1,
        CacheOutcome::Invalidated => 2,
    }
}

fn outcome_from(v: u8) -> CacheOutcome {
    match v {
        0 => CacheOutcome::Hit,
        1 => CacheOutcome::Miss,
        _ => CacheOutcome::Invalidated,
    }
}

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        self.write_u8(TAG_FRAME_TICK);
        self.write_u64(e.frame_index);
        self.write_u32(e.output.0);
        self.write_u64(e.now.ticks());
        self.write_bool(e.visible);
    }

    fn on_loop_sample(&mut self, e: &LoopSampleEvent) {
        self.write_u8(TAG_LOOP_SAMPLE);
        self.write_u64(e.frame_index);
        self.write_u64(e.loop_index);
        self.write_f64(e.t_ms);
        self.write_u8(e.active);
        self.write_u8(climax_code(e.climax));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_u8(phase_code(e.phase));
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_u8(phase_code(e.phase));
        self.write_u64(e.timestamp.ticks());
    }

    fn on_noise_regen(&mut self, e: &NoiseRegenEvent) {
        self.write_u8(TAG_NOISE_REGEN);
        self.write_u64(e.frame_index);
        self.write_u32(e.width);
        self.write_u32(e.height);
        self.write_bool(e.collapse);
        self.write_bool(e.scanline);
    }

    fn on_cta(&mut self, e: &CtaEvent) {
        self.write_u8(TAG_CTA);
        self.write_u64(e.frame_index);
        self.write_u8(cta_code(e.from));
        self.write_u8(cta_code(e.to));
        self.write_bool(e.completed);
    }

    fn on_session_state(&mut self, e: &SessionStateEvent) {
        self.write_u8(TAG_SESSION_STATE);
        self.write_u64(e.frame_index);
        self.write_u8(state_code(e.from));
        self.write_u8(state_code(e.to));
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u32(s.output.0);
        self.write_u64(s.now.ticks());
        self.write_bool(s.rendered);
        self.write_u64(s.loop_index);
        self.write_f64(s.t_ms);
        self.write_u8(s.active);
        self.write_u32(s.item_count);
        self.write_bool(s.noise_regenerated);
        self.write_u64(s.plan_ticks);
        self.write_u64(s.present_ticks);
    }

    fn on_window_edge(&mut self, e: &WindowEdgeEvent) {
        self.write_u8(TAG_WINDOW_EDGE);
        self.write_u64(e.frame_index);
        self.write_u8(u8::try_from(e.window.index()).unwrap_or(u8::MAX));
        self.write_bool(e.edge == WindowEdge::Enter);
    }

    fn on_cache(&mut self, e: &CacheEvent) {
        self.write_u8(TAG_CACHE);
        self.write_u64(e.frame_index);
        self.write_u8(slot_code(e.slot));
        self.write_u8(outcome_code(e.outcome));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`FrameTickEvent`].
    FrameTick(FrameTickEvent),
    /// A [`LoopSampleEvent`].
    LoopSample(LoopSampleEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`NoiseRegenEvent`].
    NoiseRegen(NoiseRegenEvent),
    /// A [`CtaEvent`].
    Cta(CtaEvent),
    /// A [`SessionStateEvent`].
    SessionState(SessionStateEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
    /// A [`WindowEdgeEvent`].
    WindowEdge(WindowEdgeEvent),
    /// A [`CacheEvent`].
    Cache(CacheEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated record or unknown tag.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn decode_frame_tick(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameTick(FrameTickEvent {
            frame_index: self.read_u64()?,
            output: OutputId(self.read_u32()?),
            now: HostTime(self.read_u64()?),
            visible: self.read_bool()?,
        }))
    }

    fn decode_loop_sample(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::LoopSample(LoopSampleEvent {
            frame_index: self.read_u64()?,
            loop_index: self.read_u64()?,
            t_ms: self.read_f64()?,
            active: self.read_u8()?,
            climax: climax_from(self.read_u8()?),
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: phase_from(self.read_u8()?),
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: phase_from(self.read_u8()?),
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_noise_regen(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::NoiseRegen(NoiseRegenEvent {
            frame_index: self.read_u64()?,
            width: self.read_u32()?,
            height: self.read_u32()?,
            collapse: self.read_bool()?,
            scanline: self.read_bool()?,
        }))
    }

    fn decode_cta(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Cta(CtaEvent {
            frame_index: self.read_u64()?,
            from: cta_from(self.read_u8()?),
            to: cta_from(self.read_u8()?),
            completed: self.read_bool()?,
        }))
    }

    fn decode_session_state(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SessionState(SessionStateEvent {
            frame_index: self.read_u64()?,
            from: state_from(self.read_u8()?),
            to: state_from(self.read_u8()?),
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            output: OutputId(self.read_u32()?),
            now: HostTime(self.read_u64()?),
            rendered: self.read_bool()?,
            loop_index: self.read_u64()?,
            t_ms: self.read_f64()?,
            active: self.read_u8()?,
            item_count: self.read_u32()?,
            noise_regenerated: self.read_bool()?,
            plan_ticks: self.read_u64()?,
            present_ticks: self.read_u64()?,
        }))
    }

    fn decode_window_edge(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let window = WindowId::from_index(usize::from(self.read_u8()?))?;
        let edge = if self.read_bool()? {
            WindowEdge::Enter
        } else {
            WindowEdge::Exit
        };
        Some(RecordedEvent::WindowEdge(WindowEdgeEvent {
            frame_index,
            window,
            edge,
        }))
    }

    fn decode_cache(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let slot = slot_from(self.read_u8()?)?;
        let outcome = outcome_from(self.read_u8()?);
        Some(RecordedEvent::Cache(CacheEvent {
            frame_index,
            slot,
            outcome,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME_TICK => self.decode_frame_tick(),
            TAG_LOOP_SAMPLE => self.decode_loop_sample(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_NOISE_REGEN => self.decode_noise_regen(),
            TAG_CTA => self.decode_cta(),
            TAG_SESSION_STATE => self.decode_session_state(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            TAG_WINDOW_EDGE => self.decode_window_edge(),
            TAG_CACHE => self.decode_cache(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
