// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image assets and their readiness.
//!
//! Assets load asynchronously on the host. Until a load completes the slot is
//! [`AssetSlot::Pending`] and every phase that reads it is a no-op for the
//! tick. Each completed load bumps the slot's generation so per-size caches
//! built from an older image can tell they are stale.

use crate::raster::Raster;

/// The two image inputs of the sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// The flickering overlay shown during the mask window.
    Mask,
    /// The image revealed by the drive and cta windows.
    Reveal,
}

/// A decoded image that is ready to sample.
#[derive(Clone, Debug)]
pub struct ReadyAsset {
    /// Decoded pixels.
    pub image: Raster,
    /// Load counter; starts at 1 for the first successful load.
    pub generation: u32,
}

impl ReadyAsset {
    /// `height / width` of the source image.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.image.height()) / f64::from(self.image.width())
    }
}

/// Readiness state of one image input.
#[derive(Clone, Debug, Default)]
pub enum AssetSlot {
    /// Not loaded yet (or the last load produced no pixels).
    #[default]
    Pending,
    /// Decoded and usable.
    Ready(ReadyAsset),
}

impl AssetSlot {
    /// Installs a freshly decoded image and returns its generation.
    ///
    /// An empty image leaves the slot pending, but still consumes a
    /// generation so caches built from the previous image are dropped.
    pub fn load(&mut self, image: Raster, previous_generation: u32) -> u32 {
        let generation = previous_generation.wrapping_add(1).max(1);
        *self = if image.is_empty() {
            Self::Pending
        } else {
            Self::Ready(ReadyAsset { image, generation })
        };
        generation
    }

    /// The ready image, if any.
    #[must_use]
    pub fn ready(&self) -> Option<&ReadyAsset> {
        match self {
            Self::Ready(a) => Some(a),
            Self::Pending => None,
        }
    }

    /// Whether the slot holds a usable image.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Generation of the ready image, or 0 while pending.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.ready().map_or(0, |a| a.generation)
    }
}

/// Both asset slots with a shared load counter.
#[derive(Clone, Debug, Default)]
pub struct Assets {
    mask: AssetSlot,
    reveal: AssetSlot,
    loads: u32,
}

impl Assets {
    /// Both slots pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs an image for `kind` and returns its generation.
    pub fn set(&mut self, kind: AssetKind, image: Raster) -> u32 {
        let loads = self.loads;
        let generation = self.slot_mut(kind).load(image, loads);
        self.loads = generation;
        generation
    }

    /// The slot for `kind`.
    #[must_use]
    pub fn slot(&self, kind: AssetKind) -> &AssetSlot {
        match kind {
            AssetKind::Mask => &self.mask,
            AssetKind::Reveal => &self.reveal,
        }
    }

    fn slot_mut(&mut self, kind: AssetKind) -> &mut AssetSlot {
        match kind {
            AssetKind::Mask => &mut self.mask,
            AssetKind::Reveal => &mut self.reveal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_until_loaded() {
        let mut assets = Assets::new();
        assert!(!assets.slot(AssetKind::Reveal).is_ready());
        assert_eq!(assets.slot(AssetKind::Reveal).generation(), 0);

        let g = assets.set(AssetKind::Reveal, Raster::solid(4, 2, [1, 2, 3, 255]));
        let slot = assets.slot(AssetKind::Reveal);
        assert!(slot.is_ready());
        assert_eq!(slot.generation(), g);
        assert_eq!(slot.ready().map(ReadyAsset::aspect_ratio), Some(0.5), "h / w");
        assert!(!assets.slot(AssetKind::Mask).is_ready(), "other slot untouched");
    }

    #[test]
    fn reload_bumps_generation() {
        let mut assets = Assets::new();
        let a = assets.set(AssetKind::Mask, Raster::solid(1, 1, [0; 4]));
        let b = assets.set(AssetKind::Mask, Raster::solid(1, 1, [0; 4]));
        assert!(b > a, "reload must produce a newer generation");
    }

    #[test]
    fn empty_image_is_not_ready() {
        let mut assets = Assets::new();
        let g = assets.set(AssetKind::Mask, Raster::new(0, 10));
        assert!(g > 0, "generation still advances");
        assert!(!assets.slot(AssetKind::Mask).is_ready());
    }
}
