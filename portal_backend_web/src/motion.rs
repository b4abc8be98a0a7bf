// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `prefers-reduced-motion` listener.

use alloc::boxed::Box;

use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{MediaQueryListEvent, Window};

/// Media query matched when the visitor asked for less motion.
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Reports the current preference and calls `on_change` whenever it flips.
///
/// Browsers without `matchMedia` report `false` and never call back.
pub fn watch_reduced_motion(
    window: &Window,
    on_change: impl FnMut(bool) + 'static,
) -> Result<bool, JsValue> {
    let Some(query) = window.match_media(REDUCED_MOTION_QUERY)? else {
        return Ok(false);
    };
    let mut on_change = on_change;
    let cb = Closure::wrap(Box::new(move |event: MediaQueryListEvent| {
        on_change(event.matches());
    }) as Box<dyn FnMut(_)>);
    query.add_event_listener_with_callback("change", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(query.matches())
}
