// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame ticks delivered by the host's frame-callback mechanism.
//!
//! A backend produces one [`FrameTick`] per paint opportunity (e.g. each
//! `requestAnimationFrame` callback). The tick is the *only* clock sample the
//! phase scheduler consults during a frame: loop-relative time, noise
//! throttling, cursor blink and flicker phases all derive from `now`.

use crate::output::OutputId;
use crate::time::HostTime;

/// A frame opportunity delivered by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameTick {
    /// Host time when the tick was generated.
    pub now: HostTime,
    /// Monotonically increasing frame counter.
    pub frame_index: u64,
    /// Which surface this tick is for.
    pub output: OutputId,
    /// Whether the host page is currently visible.
    ///
    /// Hidden ticks do no rendering work but keep the loop alive; because the
    /// timeline is wall-clock based, hidden time simply elapses.
    pub visible: bool,
}

impl FrameTick {
    /// Creates a visible tick for output 0.
    ///
    /// Convenient for headless drivers and tests.
    #[must_use]
    pub const fn visible(now: HostTime, frame_index: u64) -> Self {
        Self {
            now,
            frame_index,
            output: OutputId(0),
            visible: true,
        }
    }
}

/// Generates evenly spaced visible ticks, as a fixed-rate display would.
///
/// Headless runs use this in place of a platform tick source.
#[derive(Clone, Debug)]
pub struct FixedRateTicks {
    next: HostTime,
    interval_ticks: u64,
    frame_index: u64,
    output: OutputId,
}

impl FixedRateTicks {
    /// Starts a tick stream at `start`, advancing `interval_ticks` per frame.
    #[must_use]
    pub const fn new(start: HostTime, interval_ticks: u64, output: OutputId) -> Self {
        Self {
            next: start,
            interval_ticks,
            frame_index: 0,
            output,
        }
    }
}

impl Iterator for FixedRateTicks {
    type Item = FrameTick;

    fn next(&mut self) -> Option<FrameTick> {
        let tick = FrameTick {
            now: self.next,
            frame_index: self.frame_index,
            output: self.output,
            visible: true,
        };
        self.next = HostTime(self.next.ticks().checked_add(self.interval_ticks)?);
        self.frame_index += 1;
        Some(tick)
    }
}
