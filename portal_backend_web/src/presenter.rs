// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canvas 2D presenter.
//!
//! Draws a [`RenderPlan`] onto an `HtmlCanvasElement`. Each raster the plan
//! references is mirrored into its own offscreen canvas and re-uploaded only
//! when its generation moves; the visible canvas then blits from those
//! mirrors with the item's alpha, smoothing, shadow and filter. The
//! whole-surface [`DisplayFilter`] is applied as a CSS `filter` on the
//! visible canvas so no pixels are rewritten.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;

use kurbo::Rect;
use portal_core::surface::SurfaceSize;
use portal_render::{
    Color, DisplayFilter, Filter, ImageItem, Presenter, RenderItem, RenderPlan, ResourceKey,
    Resources, Shadow, TextItem, VignetteItem,
};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::{Clamped, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, ImageData};

/// CSS color string for `color`.
pub(crate) fn color_css(color: Color) -> String {
    format!(
        "rgba({},{},{},{})",
        color.r,
        color.g,
        color.b,
        color.a.clamp(0.0, 1.0)
    )
}

/// Canvas `filter` value for a per-item filter.
pub(crate) fn filter_css(filter: Option<Filter>) -> String {
    match filter {
        None => String::from("none"),
        Some(Filter::Brightness(b)) => format!("brightness({b})"),
        Some(Filter::HueRotate {
            degrees,
            brightness,
        }) => format!("hue-rotate({degrees}deg) brightness({brightness})"),
    }
}

/// CSS `filter` value for the whole surface.
pub(crate) fn display_filter_css(filter: DisplayFilter) -> String {
    match filter {
        DisplayFilter::Invert {
            brightness,
            contrast,
        } => format!("invert(1) brightness({brightness}) contrast({contrast})"),
    }
}

/// Font stack for the sequence's text. Courier's 0.6em advance is what
/// cursor placement assumes.
pub(crate) const FONT_FAMILY: &str = "\"Courier New\", Courier, monospace";

/// Canvas `font` value for the sequence's bold text.
pub(crate) fn font_css(font_px: f64) -> String {
    format!("bold {font_px}px {FONT_FAMILY}")
}

/// Fetches the 2D context of `canvas`.
pub(crate) fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?;
    Ok(ctx.dyn_into::<CanvasRenderingContext2d>()?)
}

/// Creates a detached canvas.
pub(crate) fn create_canvas(document: &Document) -> Result<HtmlCanvasElement, JsValue> {
    Ok(document.create_element("canvas")?.dyn_into::<HtmlCanvasElement>()?)
}

/// Offscreen mirror of one session raster.
struct Upload {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    generation: u64,
}

/// Draws render plans onto a visible canvas.
pub struct CanvasPresenter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    document: Document,
    uploads: BTreeMap<ResourceKey, Upload>,
    display_filter: Option<DisplayFilter>,
}

impl core::fmt::Debug for CanvasPresenter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CanvasPresenter")
            .field("canvas", &"HtmlCanvasElement")
            .field("uploads", &self.uploads.len())
            .field("display_filter", &self.display_filter)
            .finish_non_exhaustive()
    }
}

impl CanvasPresenter {
    /// Creates a presenter drawing into `canvas`.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = context_2d(&canvas)?;
        let document = canvas
            .owner_document()
            .ok_or_else(|| JsValue::from_str("canvas has no owner document"))?;
        Ok(Self {
            canvas,
            ctx,
            document,
            uploads: BTreeMap::new(),
            display_filter: None,
        })
    }

    /// Returns the visible canvas.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Sizes the backing store to `surface` device pixels and stretches the
    /// element over the viewport.
    pub fn resize(&mut self, surface: &SurfaceSize) {
        self.canvas.set_width(surface.width);
        self.canvas.set_height(surface.height);
        let style = self.canvas.style();
        let _ = style.set_property("width", "100vw");
        let _ = style.set_property("height", "100vh");
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    }

    /// Mirrors `key` into its offscreen canvas if its generation moved.
    ///
    /// Returns a handle to the mirror, or `None` when the raster is missing
    /// or empty.
    fn sync(&mut self, resources: &dyn Resources, key: ResourceKey) -> Option<HtmlCanvasElement> {
        let view = resources.resource(key)?;
        let (w, h) = view.raster.dimensions();
        if w == 0 || h == 0 {
            return None;
        }
        let fresh = self
            .uploads
            .get(&key)
            .is_some_and(|u| u.generation == view.generation);
        if !fresh {
            if !self.uploads.contains_key(&key) {
                let canvas = create_canvas(&self.document).ok()?;
                let ctx = context_2d(&canvas).ok()?;
                self.uploads.insert(
                    key,
                    Upload {
                        canvas,
                        ctx,
                        generation: u64::MAX,
                    },
                );
            }
            let upload = self.uploads.get_mut(&key)?;
            if upload.canvas.width() != w || upload.canvas.height() != h {
                upload.canvas.set_width(w);
                upload.canvas.set_height(h);
            }
            let data = ImageData::new_with_u8_clamped_array_and_sh(
                Clamped(view.raster.as_bytes()),
                w,
                h,
            )
            .ok()?;
            let _ = upload.ctx.put_image_data(&data, 0.0, 0.0);
            upload.generation = view.generation;
        }
        self.uploads.get(&key).map(|u| u.canvas.clone())
    }

    fn set_display_filter(&mut self, filter: Option<DisplayFilter>) {
        if self.display_filter == filter {
            return;
        }
        self.display_filter = filter;
        let style = self.canvas.style();
        let _ = match filter {
            Some(f) => style.set_property("filter", &display_filter_css(f)),
            None => style.remove_property("filter").map(drop),
        };
    }

    fn apply_shadow(&self, shadow: Option<Shadow>) {
        match shadow {
            Some(s) => {
                self.ctx.set_shadow_color(&color_css(s.color));
                self.ctx.set_shadow_blur(s.blur);
                self.ctx.set_shadow_offset_x(s.offset.x);
                self.ctx.set_shadow_offset_y(s.offset.y);
            }
            None => {
                self.ctx.set_shadow_color("rgba(0,0,0,0)");
                self.ctx.set_shadow_blur(0.0);
                self.ctx.set_shadow_offset_x(0.0);
                self.ctx.set_shadow_offset_y(0.0);
            }
        }
    }

    fn draw_image(&mut self, resources: &dyn Resources, item: &ImageItem) {
        let Some(source) = self.sync(resources, item.key) else {
            return;
        };
        let ctx = &self.ctx;
        ctx.save();
        ctx.set_global_alpha(item.alpha.clamp(0.0, 1.0));
        ctx.set_image_smoothing_enabled(item.smoothing);
        self.apply_shadow(item.shadow);
        ctx.set_filter(&filter_css(item.filter));
        let Rect { x0, y0, .. } = item.dest;
        let _ = ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
            &source,
            x0,
            y0,
            item.dest.width(),
            item.dest.height(),
        );
        ctx.restore();
    }

    fn fill(&self, rect: Rect, color: Color) {
        self.ctx.save();
        self.ctx.set_fill_style_str(&color_css(color));
        self.ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
        self.ctx.restore();
    }

    fn vignette(&self, item: &VignetteItem) {
        let c = item.center;
        let Ok(gradient) = self.ctx.create_radial_gradient(
            c.x,
            c.y,
            item.inner_radius,
            c.x,
            c.y,
            item.outer_radius,
        ) else {
            return;
        };
        let _ = gradient.add_color_stop(0.0, "rgba(0,0,0,0)");
        let _ = gradient.add_color_stop(1.0, &color_css(Color::BLACK.with_alpha(item.edge_alpha)));
        self.ctx.save();
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
        self.ctx.restore();
    }

    fn text(&self, item: &TextItem) {
        let ctx = &self.ctx;
        ctx.save();
        ctx.set_font(&font_css(item.font_px));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_global_alpha(item.alpha.clamp(0.0, 1.0));
        ctx.set_fill_style_str(&color_css(item.fill));
        self.apply_shadow(item.shadow);
        let _ = ctx.fill_text(&item.text, item.center.x, item.center.y);
        ctx.restore();
    }
}

impl Presenter for CanvasPresenter {
    fn apply(&mut self, resources: &dyn Resources, plan: &RenderPlan) {
        self.set_display_filter(plan.display_filter);
        for item in &plan.items {
            match item {
                RenderItem::Image(img) => self.draw_image(resources, img),
                RenderItem::Fill { rect, color } => self.fill(*rect, *color),
                RenderItem::Vignette(v) => self.vignette(v),
                RenderItem::Text(t) => self.text(t),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_strings() {
        assert_eq!(color_css(Color::rgba(0, 0, 0, 0.22)), "rgba(0,0,0,0.22)");
        assert_eq!(color_css(Color::rgb(233, 233, 234)), "rgba(233,233,234,1)");
        assert_eq!(color_css(Color::rgba(1, 2, 3, 4.0)), "rgba(1,2,3,1)", "alpha clamps");
    }

    #[test]
    fn filter_strings() {
        assert_eq!(filter_css(None), "none");
        assert_eq!(filter_css(Some(Filter::Brightness(1.5))), "brightness(1.5)");
        assert_eq!(
            filter_css(Some(Filter::HueRotate {
                degrees: 40.0,
                brightness: 2.0,
            })),
            "hue-rotate(40deg) brightness(2)"
        );
        assert_eq!(
            display_filter_css(DisplayFilter::CLIMAX),
            "invert(1) brightness(1.2) contrast(1.4)"
        );
    }

    #[test]
    fn font_string() {
        assert_eq!(font_css(46.0), "bold 46px \"Courier New\", Courier, monospace");
    }
}
