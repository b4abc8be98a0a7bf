// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keys for the CPU rasters a render plan refers to.

use core::fmt;

/// A handle to a raster owned by the session.
///
/// Plans reference pixels by key; presenters look the key up through
/// [`Resources`](crate::Resources) and upload only when its generation moves.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey(pub u64);

impl ResourceKey {
    /// Low-resolution noise buffer.
    pub const NOISE: Self = Self(1);
    /// Recolored mask overlay.
    pub const MASK: Self = Self(2);
    /// Reveal image processed this tick with glitch.
    pub const REVEAL_GLITCH: Self = Self(3);
    /// Cached stable reveal image.
    pub const REVEAL_STABLE: Self = Self(4);

    /// Every key the session can hand out.
    pub const ALL: [Self; 4] = [
        Self::NOISE,
        Self::MASK,
        Self::REVEAL_GLITCH,
        Self::REVEAL_STABLE,
    ];
}

impl fmt::Debug for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NOISE => f.write_str("ResourceKey(noise)"),
            Self::MASK => f.write_str("ResourceKey(mask)"),
            Self::REVEAL_GLITCH => f.write_str("ResourceKey(reveal-glitch)"),
            Self::REVEAL_STABLE => f.write_str("ResourceKey(reveal-stable)"),
            Self(n) => write!(f, "ResourceKey({n})"),
        }
    }
}
