// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for surface integrations.
//!
//! A backend provides:
//!
//! - **Tick source**: produces [`FrameTick`] values from a platform
//!   mechanism (e.g. `requestAnimationFrame`). Not abstracted by a trait;
//!   setup and lifecycle differ per platform.
//!
//! - **Time**: `now() -> HostTime` and `timebase() -> Timebase` free
//!   functions reading the platform's monotonic clock.
//!
//! - **Presenter**: implements [`Presenter`] to draw a [`RenderPlan`],
//!   reading rasters through [`Resources`].
//!
//! [`FrameTick`]: portal_core::timing::FrameTick

use portal_core::raster::Raster;

use crate::plan::RenderPlan;
use crate::resource::ResourceKey;

/// A raster plus its content generation.
#[derive(Clone, Copy, Debug)]
pub struct ResourceView<'a> {
    /// Pixels.
    pub raster: &'a Raster,
    /// Bumped whenever the pixels change; equal generations mean equal
    /// pixels.
    pub generation: u64,
}

/// Read access to the rasters a plan references.
pub trait Resources {
    /// Looks up `key`. `None` when the raster does not exist yet.
    fn resource(&self, key: ResourceKey) -> Option<ResourceView<'_>>;
}

/// Draws render plans onto a platform surface.
///
/// # Frame loop pseudocode
///
/// ```rust,ignore
/// fn on_frame(tick: FrameTick) {
///     let outcome = session.tick(&tick, &mut tracer);
///     if outcome.rendered {
///         presenter.apply(&session, session.plan());
///     }
///     host.show_cta(outcome.cta);
///     if outcome.reschedule {
///         request_next_frame();
///     }
/// }
/// ```
pub trait Presenter {
    /// Draws `plan`, fetching rasters from `resources` as needed.
    fn apply(&mut self, resources: &dyn Resources, plan: &RenderPlan);
}
