// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, recording, and Chrome trace export for portal
//! diagnostics.
//!
//! This crate provides [`TraceSink`](portal_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//!
//! Window edges and cache outcomes are only emitted by sessions built with
//! `portal_render/trace-rich`; this crate always understands them.

pub mod chrome;
pub mod pretty;
pub mod recorder;
