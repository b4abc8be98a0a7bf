// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for the portal sequence.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`RafLoop`]: `requestAnimationFrame` tick source with page visibility
//! - [`CanvasPresenter`]: Canvas 2D [`Presenter`] for render plans
//! - [`assets`]: cache-busted image loading into [`Raster`]s
//! - [`motion`]: `prefers-reduced-motion` listener
//! - [`cta`]: CTA element binding and the post-click hand-off
//! - [`mount`]: wires all of the above to one [`GateSession`]
//!
//! [`Raster`]: portal_core::raster::Raster
//! [`GateSession`]: portal_render::GateSession

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

pub mod assets;
pub mod cta;
pub mod motion;

mod gate;
mod presenter;
mod raf;

pub use gate::{Gate, MountOptions, main, mount};
pub use portal_render::Presenter;
pub use presenter::CanvasPresenter;
pub use raf::RafLoop;

use portal_core::time::{HostTime, Timebase};

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks. Use [`timebase`] to
/// convert to nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    raf::ms_to_host_time(raf::performance_now())
}

/// Returns the web [`Timebase`]: 1 tick = 1 µs = 1000 ns.
#[must_use]
pub fn timebase() -> Timebase {
    Timebase::MICROS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timebase_is_microsecond() {
        let tb = timebase();
        // 1 tick = 1 µs = 1000 ns
        assert_eq!(tb.ticks_to_nanos(1), 1000);
        assert_eq!(tb.ticks_to_nanos(1_000_000), 1_000_000_000);
    }

    #[test]
    fn timestamps_become_microsecond_ticks() {
        assert_eq!(raf::ms_to_host_time(16.5), HostTime(16_500));
        assert_eq!(raf::ms_to_host_time(-3.0), HostTime(0), "clamped at zero");
    }
}
