// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use portal_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
/// Events that carry no host timestamp of their own (loop samples, noise
/// regeneration, CTA and session changes, window edges, cache outcomes) are
/// placed at the most recent frame tick.
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut tick_us = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameTick(e) => {
                tick_us = ticks_to_us(e.now.ticks(), timebase);
                events.push(json!({
                    "ph": "i",
                    "name": "FrameTick",
                    "cat": "Loop",
                    "ts": tick_us,
                    "pid": e.output.0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "visible": e.visible,
                    }
                }));
            }
            RecordedEvent::LoopSample(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "LoopSample",
                    "cat": "Loop",
                    "ts": tick_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "loop_index": e.loop_index,
                        "t_ms": e.t_ms,
                        "active": e.active,
                        "climax": format!("{:?}", e.climax),
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::NoiseRegen(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "NoiseRegen",
                    "cat": "Frame",
                    "ts": tick_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "width": e.width,
                        "height": e.height,
                        "collapse": e.collapse,
                        "scanline": e.scanline,
                    }
                }));
            }
            RecordedEvent::Cta(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Cta",
                    "cat": "State",
                    "ts": tick_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "from": format!("{:?}", e.from),
                        "to": format!("{:?}", e.to),
                        "completed": e.completed,
                    }
                }));
            }
            RecordedEvent::SessionState(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "SessionState",
                    "cat": "State",
                    "ts": tick_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "from": format!("{:?}", e.from),
                        "to": format!("{:?}", e.to),
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameSummary",
                    "cat": "Summary",
                    "ts": ticks_to_us(s.now.ticks(), timebase),
                    "pid": s.output.0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": s.frame_index,
                        "rendered": s.rendered,
                        "loop_index": s.loop_index,
                        "t_ms": s.t_ms,
                        "active": s.active,
                        "item_count": s.item_count,
                        "noise_regenerated": s.noise_regenerated,
                        "plan_us": ticks_to_us(s.plan_ticks, timebase),
                        "present_us": ticks_to_us(s.present_ticks, timebase),
                    }
                }));
            }
            RecordedEvent::WindowEdge(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "WindowEdge",
                    "cat": "Rich",
                    "ts": tick_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "frame_index": e.frame_index,
                        "window": e.window.name(),
                        "edge": format!("{:?}", e.edge),
                    }
                }));
            }
            RecordedEvent::Cache(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Cache",
                    "cat": "Rich",
                    "ts": tick_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "frame_index": e.frame_index,
                        "slot": format!("{:?}", e.slot),
                        "outcome": format!("{:?}", e.outcome),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use portal_core::output::OutputId;
    use portal_core::time::HostTime;
    use portal_core::timeline::{ClimaxMode, WindowId};
    use portal_core::trace::{
        FrameTickEvent, LoopSampleEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink,
        WindowEdge, WindowEdgeEvent,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_frame_tick(&FrameTickEvent {
            frame_index: 0,
            output: OutputId(0),
            now: HostTime(1_000_000),
            visible: true,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Plan,
            timestamp: HostTime(1_000_000),
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 0,
            phase: PhaseKind::Plan,
            timestamp: HostTime(1_000_100),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), Timebase::NANOS, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "FrameTick");

        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "Plan");

        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["name"], "Plan");
    }

    #[test]
    fn untimed_events_sit_on_last_tick() {
        let mut rec = RecorderSink::new();
        rec.on_frame_tick(&FrameTickEvent {
            frame_index: 3,
            output: OutputId(0),
            now: HostTime(2_000),
            visible: true,
        });
        rec.on_loop_sample(&LoopSampleEvent {
            frame_index: 3,
            loop_index: 0,
            t_ms: 1_250.0,
            active: 0b11,
            climax: ClimaxMode::Steady,
        });
        rec.on_window_edge(&WindowEdgeEvent {
            frame_index: 3,
            window: WindowId::Mask,
            edge: WindowEdge::Enter,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), Timebase::MICROS, &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1]["name"], "LoopSample");
        assert_eq!(parsed[1]["ts"], parsed[0]["ts"]);
        assert_eq!(parsed[1]["args"]["t_ms"], 1_250.0);
        assert_eq!(parsed[2]["args"]["window"], "mask");
        assert_eq!(parsed[2]["ts"], 2_000.0);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], Timebase::NANOS, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
