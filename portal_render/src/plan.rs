// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: an ordered sequence of draw items for one tick.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Vec2};
use portal_core::output::OutputId;

pub use portal_core::config::Color;

use crate::resource::ResourceKey;

/// A blurred, offset copy drawn beneath an item (canvas `shadow*`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    /// Shadow color.
    pub color: Color,
    /// Blur radius in device pixels, never negative.
    pub blur: f64,
    /// Offset from the item.
    pub offset: Vec2,
}

impl Shadow {
    /// An unoffset glow of `color`.
    #[must_use]
    pub fn glow(color: Color, blur: f64) -> Self {
        Self {
            color,
            blur: blur.max(0.0),
            offset: Vec2::ZERO,
        }
    }
}

/// Per-item color filter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Filter {
    /// Linear brightness multiplier, never negative.
    Brightness(f64),
    /// Hue rotation followed by brightness.
    HueRotate {
        /// Rotation in degrees.
        degrees: f64,
        /// Brightness multiplier, never negative.
        brightness: f64,
    },
}

/// Whole-surface filter applied at display time (no pixel rewrite).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DisplayFilter {
    /// Full color inversion with brightness and contrast.
    Invert {
        /// Brightness multiplier.
        brightness: f64,
        /// Contrast multiplier.
        contrast: f64,
    },
}

impl DisplayFilter {
    /// The climax flash.
    pub const CLIMAX: Self = Self::Invert {
        brightness: 1.2,
        contrast: 1.4,
    };
}

/// A raster blit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageItem {
    /// Which raster.
    pub key: ResourceKey,
    /// Destination rectangle in device pixels; the raster is stretched to it.
    pub dest: Rect,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
    /// Bilinear (`true`) or nearest-neighbor (`false`) sampling.
    pub smoothing: bool,
    /// Optional shadow/glow.
    pub shadow: Option<Shadow>,
    /// Optional color filter.
    pub filter: Option<Filter>,
}

/// A radial darkening toward the edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VignetteItem {
    /// Gradient center.
    pub center: Point,
    /// Radius where darkening starts (transparent).
    pub inner_radius: f64,
    /// Radius where darkening reaches `edge_alpha`.
    pub outer_radius: f64,
    /// Black alpha at and beyond the outer radius.
    pub edge_alpha: f64,
}

/// A single line of bold monospace text centered on a point.
#[derive(Clone, Debug, PartialEq)]
pub struct TextItem {
    /// Text to draw.
    pub text: String,
    /// Center of the text box.
    pub center: Point,
    /// Font size in device pixels.
    pub font_px: f64,
    /// Fill color.
    pub fill: Color,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
    /// Optional shadow/glow.
    pub shadow: Option<Shadow>,
}

/// A single draw command.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderItem {
    /// Raster blit.
    Image(ImageItem),
    /// Flat rectangle fill.
    Fill {
        /// Area to fill.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// Radial vignette.
    Vignette(VignetteItem),
    /// Text.
    Text(TextItem),
}

/// An ordered list of draw commands for a single tick on a single output.
///
/// Items are in back-to-front order. The presenter clears nothing: the
/// first item (the noise blit) covers the surface.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// Target output for this plan.
    pub output: OutputId,
    /// Tick this plan was built for.
    pub frame_index: u64,
    /// Whole-surface filter for this tick.
    pub display_filter: Option<DisplayFilter>,
    /// Draw items in back-to-front order.
    pub items: Vec<RenderItem>,
}

impl RenderPlan {
    /// Creates an empty render plan for the given output.
    #[must_use]
    pub fn new(output: OutputId) -> Self {
        Self {
            output,
            frame_index: 0,
            display_filter: None,
            items: Vec::new(),
        }
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
        self.display_filter = None;
    }

    /// Appends an item.
    pub fn push(&mut self, item: RenderItem) {
        self.items.push(item);
    }

    /// Image items referring to `key`.
    pub fn images(&self, key: ResourceKey) -> impl Iterator<Item = &ImageItem> {
        self.items.iter().filter_map(move |item| match item {
            RenderItem::Image(img) if img.key == key => Some(img),
            _ => None,
        })
    }

    /// Text items in order.
    pub fn texts(&self) -> impl Iterator<Item = &TextItem> {
        self.items.iter().filter_map(|item| match item {
            RenderItem::Text(t) => Some(t),
            _ => None,
        })
    }
}
