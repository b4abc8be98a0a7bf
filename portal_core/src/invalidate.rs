// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cache invalidation channels.
//!
//! Host notifications (resize, asset reload) can arrive between any two
//! ticks. They mark cache slots dirty on a per-cause channel via
//! [`understory_dirty`]; the session drains both channels at the top of its
//! next active tick and drops the affected caches before any phase runs.
//!
//! Draining is an early-out, not the only guard: each cache also compares its
//! stored size and asset generation on use, so a missed notification can at
//! worst cost one regeneration, never a stale frame.

use understory_dirty::{Channel, CycleHandling, DirtyTracker};

use crate::asset::AssetKind;

/// The surface was resized.
pub const SURFACE: Channel = Channel::new(0);

/// An image asset finished (re)loading.
pub const ASSET: Channel = Channel::new(1);

/// Size- or asset-dependent buffers owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheSlot {
    /// Low-resolution noise buffer.
    Noise,
    /// Recolored overlay scratch.
    MaskOverlay,
    /// Single-slot stable reveal cache.
    RevealStable,
}

impl CacheSlot {
    /// Every slot.
    pub const ALL: [Self; 3] = [Self::Noise, Self::MaskOverlay, Self::RevealStable];

    const fn key(self) -> u32 {
        self as u32
    }

    const fn from_key(key: u32) -> Option<Self> {
        match key {
            0 => Some(Self::Noise),
            1 => Some(Self::MaskOverlay),
            2 => Some(Self::RevealStable),
            _ => None,
        }
    }

    /// The slot built from `kind`.
    #[must_use]
    pub const fn for_asset(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Mask => Self::MaskOverlay,
            AssetKind::Reveal => Self::RevealStable,
        }
    }
}

/// Set of invalidated slots produced by one drain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Invalidated {
    bits: u8,
}

impl Invalidated {
    /// Whether `slot` was invalidated.
    #[must_use]
    pub const fn contains(&self, slot: CacheSlot) -> bool {
        self.bits & (1 << slot.key()) != 0
    }

    /// Whether nothing was invalidated.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Invalidated slots in declaration order.
    pub fn iter(self) -> impl Iterator<Item = CacheSlot> {
        CacheSlot::ALL.into_iter().filter(move |s| self.contains(*s))
    }

    fn insert(&mut self, slot: CacheSlot) {
        self.bits |= 1 << slot.key();
    }
}

/// Pending invalidations, keyed by cache slot.
pub struct Invalidation {
    dirty: DirtyTracker<u32>,
}

impl core::fmt::Debug for Invalidation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Invalidation").finish_non_exhaustive()
    }
}

impl Default for Invalidation {
    fn default() -> Self {
        Self::new()
    }
}

impl Invalidation {
    /// Nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    /// Every buffer sized from the surface is stale.
    pub fn surface_resized(&mut self) {
        for slot in CacheSlot::ALL {
            self.dirty.mark(slot.key(), SURFACE);
        }
    }

    /// The cache built from `kind` is stale.
    pub fn asset_reloaded(&mut self, kind: AssetKind) {
        self.dirty.mark(CacheSlot::for_asset(kind).key(), ASSET);
    }

    /// Drains both channels.
    pub fn drain(&mut self) -> Invalidated {
        let mut out = Invalidated::default();
        for channel in [SURFACE, ASSET] {
            for key in self.dirty.drain(channel).deterministic().run() {
                if let Some(slot) = CacheSlot::from_key(key) {
                    out.insert(slot);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_invalidates_every_slot_once() {
        let mut inv = Invalidation::new();
        inv.surface_resized();
        inv.surface_resized();
        let drained = inv.drain();
        for slot in CacheSlot::ALL {
            assert!(drained.contains(slot), "{slot:?}");
        }
        assert!(inv.drain().is_empty(), "drain consumes the marks");
    }

    #[test]
    fn asset_reload_targets_its_cache() {
        let mut inv = Invalidation::new();
        inv.asset_reloaded(AssetKind::Reveal);
        let drained = inv.drain();
        assert!(drained.contains(CacheSlot::RevealStable));
        assert!(!drained.contains(CacheSlot::MaskOverlay));
        assert!(!drained.contains(CacheSlot::Noise));
        assert_eq!(drained.iter().count(), 1);
    }

    #[test]
    fn nothing_pending_drains_empty() {
        let mut inv = Invalidation::new();
        assert!(inv.drain().is_empty());
    }
}
