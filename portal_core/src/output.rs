// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display surface identification.
//!
//! [`OutputId`] names the surface a tick and its render plan belong to. The
//! gate screen has one surface, but backends still tag ticks so traces from
//! several pages (or a page plus a headless run) stay distinguishable.

use core::fmt;

/// Identifies a display surface.
///
/// Backends assign output IDs; core code passes them through without
/// interpreting the value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OutputId(pub u32);

impl fmt::Debug for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputId({})", self.0)
    }
}
