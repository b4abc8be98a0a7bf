// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image asset loading.
//!
//! Images are fetched with a cache-busting query so a redeployed asset is
//! never served stale, decoded through a scratch canvas, and handed to the
//! caller as a [`Raster`]. A load that fails or decodes to nothing never
//! calls back; the asset simply stays pending.

use alloc::format;
use alloc::string::String;

use portal_core::raster::Raster;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, HtmlImageElement};

use crate::presenter::{context_2d, create_canvas};

/// Appends a `v=<stamp>` query parameter to `url`.
///
/// The stamp is truncated to whole milliseconds.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "Date.now() is a positive integral f64 well inside u64"
)]
pub fn cache_busted(url: &str, stamp_ms: f64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}v={}", stamp_ms.max(0.0) as u64)
}

/// Starts loading `url` and calls `on_ready` with the decoded pixels.
///
/// Returns the image element; the load continues even if it is dropped.
pub fn load_image(
    document: &Document,
    url: &str,
    on_ready: impl FnOnce(Raster) + 'static,
) -> Result<HtmlImageElement, JsValue> {
    let img = HtmlImageElement::new()?;
    let target = img.clone();
    let doc = document.clone();
    let onload = Closure::once_into_js(move || {
        if let Some(raster) = decode(&doc, &target) {
            on_ready(raster);
        }
    });
    img.set_onload(Some(onload.unchecked_ref()));
    img.set_src(url);
    Ok(img)
}

/// Reads back the RGBA8 pixels of a loaded image.
fn decode(document: &Document, img: &HtmlImageElement) -> Option<Raster> {
    let (w, h) = (img.natural_width(), img.natural_height());
    if w == 0 || h == 0 {
        return None;
    }
    let canvas = create_canvas(document).ok()?;
    canvas.set_width(w);
    canvas.set_height(h);
    let ctx = context_2d(&canvas).ok()?;
    ctx.draw_image_with_html_image_element(img, 0.0, 0.0).ok()?;
    let data = ctx
        .get_image_data(0.0, 0.0, f64::from(w), f64::from(h))
        .ok()?;
    Raster::from_rgba(w, h, data.data().0)
}
