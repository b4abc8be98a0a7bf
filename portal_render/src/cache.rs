// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-slot pixel caches keyed by target size and source generation.

use portal_core::raster::Raster;

/// Identity of a processed raster: exact pixel size plus the asset load it
/// was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// Source asset generation.
    pub asset_generation: u32,
}

/// Whether a render reused cached pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheUse {
    /// Cached pixels were reused.
    Hit,
    /// Pixels were processed from the source.
    Miss,
}

/// One processed raster and the key it is valid for.
///
/// Holds at most one entry. A lookup with any other key is a miss; there is
/// no eviction policy because there is nothing else to evict.
#[derive(Debug, Default)]
pub struct SingleSlot {
    raster: Raster,
    key: Option<CacheKey>,
    generation: u64,
}

impl SingleSlot {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached raster when its key matches.
    #[must_use]
    pub fn get(&self, key: CacheKey) -> Option<&Raster> {
        (self.key == Some(key)).then_some(&self.raster)
    }

    /// Hands out the slot's raster for in-place processing under `key`.
    ///
    /// The entry counts as filled once this returns; callers must finish
    /// writing before the next lookup.
    pub fn fill_in_place(&mut self, key: CacheKey) -> &mut Raster {
        self.key = Some(key);
        self.generation = self.generation.wrapping_add(1);
        &mut self.raster
    }

    /// Drops the entry. Returns whether there was one.
    pub fn clear(&mut self) -> bool {
        self.key.take().is_some()
    }

    /// The raster regardless of key (possibly stale or empty).
    #[must_use]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Bumped on every fill.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: CacheKey = CacheKey {
        width: 4,
        height: 2,
        asset_generation: 1,
    };

    #[test]
    fn lookup_requires_exact_key() {
        let mut slot = SingleSlot::new();
        assert!(slot.get(KEY).is_none());
        slot.fill_in_place(KEY).resize(4, 2);
        assert_eq!(slot.get(KEY).map(Raster::dimensions), Some((4, 2)));
        assert!(slot.get(CacheKey { width: 5, ..KEY }).is_none(), "other size");
        assert!(
            slot.get(CacheKey {
                asset_generation: 2,
                ..KEY
            })
            .is_none(),
            "other asset load"
        );
    }

    #[test]
    fn clear_empties_the_slot() {
        let mut slot = SingleSlot::new();
        let _ = slot.fill_in_place(KEY);
        assert!(slot.clear());
        assert!(!slot.clear(), "already empty");
        assert!(slot.get(KEY).is_none());
    }

    #[test]
    fn fills_bump_generation() {
        let mut slot = SingleSlot::new();
        let g0 = slot.generation();
        let _ = slot.fill_in_place(KEY);
        let _ = slot.fill_in_place(CacheKey { width: 8, ..KEY });
        assert_eq!(slot.generation(), g0 + 2);
    }
}
