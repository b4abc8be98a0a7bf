// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core model for a looping, time-windowed portal sequence.
//!
//! `portal_core` holds everything about the gate sequence that does not touch
//! pixels on a real surface: host time, the phase timeline, flicker math,
//! asset readiness, cache invalidation, and CTA state. It is `no_std`
//! compatible (with `alloc`).
//!
//! # Architecture
//!
//! A host tick source feeds the session in `portal_render`, which consults
//! this crate once per tick:
//!
//! ```text
//!   Backend (tick source, resize, asset loads)
//!       │
//!       ▼
//!   FrameTick ──► Timeline::position() ──► Timeline::sample() ──► PhaseSample
//!                                                                    │
//!       ┌────────────────────────────────────────────────────────────┘
//!       ▼
//!   noise ─► overlay ─► text ─► reveal ─► CtaState::apply()
//!       │
//!       ▼
//!   RenderPlan ──► Presenter::apply()
//! ```
//!
//! **[`timeline`]** is the named window table and its resolver. One call per
//! tick yields active windows, progress, invert/collapse, noise levels, the
//! text cue, the reveal path and the requested CTA signal.
//!
//! **[`script`]** splits the plant window into per-line text cues.
//!
//! **[`flicker`]** holds the randomized intensity functions. Each takes an
//! injected generator.
//!
//! **[`state`]** is the session lifecycle and the CTA signal with its
//! terminal completion flag.
//!
//! **[`invalidate`]** tracks resize and asset-reload invalidations on two
//! `understory_dirty` channels.
//!
//! **[`surface`]**, **[`asset`]**, **[`raster`]** model what the host hands
//! in: surface size, image readiness, and RGBA8 pixels.
//!
//! **[`config`]** carries the shipped constants as `const` constructors.
//!
//! **[`time`]**, **[`timing`]**, **[`output`]** are host time, ticks and
//! surface ids.
//!
//! **[`trace`]** has the [`TraceSink`](trace::TraceSink) trait and event types
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates window-edge
//!   and cache events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod asset;
pub mod config;
pub mod flicker;
pub mod invalidate;
pub mod output;
pub mod raster;
pub mod script;
pub mod state;
pub mod surface;
pub mod time;
pub mod timeline;
pub mod timing;
pub mod trace;
