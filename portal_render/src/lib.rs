// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plans, compositors and the phase scheduler for the portal gate.
//!
//! This crate turns [`portal_core`]'s timeline samples into draw commands.
//! It defines:
//!
//! - [`GateSession`]: the per-visitor phase scheduler; one `tick` per frame
//! - [`RenderPlan`] / [`RenderItem`]: the ordered draw commands for one tick
//! - [`ResourceKey`]: handle for the CPU rasters a plan refers to
//! - [`Presenter`] / [`Resources`]: the contract a surface backend implements
//!
//! and the per-pixel compositors the scheduler drives:
//!
//! - [`noise`]: throttled low-resolution static plus vignette
//! - [`overlay`]: keyed and darkened mask flicker
//! - [`typewriter`]: layered typewriter text with a blinking cursor
//! - [`chroma`]: luma-keyed reveal image with glitch and a stable cache
//! - [`glow`]: multi-pass bloom
//!
//! Everything is deterministic for a given seed and tick sequence.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace`: Forwards to `portal_core/trace`.
//! - `trace-rich`: Forwards to `portal_core/trace-rich`; the session then also
//!   reports window edges and cache outcomes.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod backend;
mod cache;
mod plan;
mod resource;
mod session;

pub mod chroma;
pub mod glow;
pub mod noise;
pub mod overlay;
pub mod typewriter;

pub use backend::{Presenter, ResourceView, Resources};
pub use cache::{CacheKey, CacheUse, SingleSlot};
pub use plan::{
    Color, DisplayFilter, Filter, ImageItem, RenderItem, RenderPlan, Shadow, TextItem, VignetteItem,
};
pub use resource::ResourceKey;
pub use session::{GateSession, TickOutcome};
