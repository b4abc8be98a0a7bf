// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Call-to-action element binding and the click hand-off.
//!
//! The session only reports a [`CtaSignal`]; this module mirrors it onto a
//! DOM element as CSS classes and owns everything that happens after a click:
//! the final label, a short black flash, and a delayed message to the
//! embedding page.

use js_sys::{Object, Reflect};
use portal_core::state::CtaSignal;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, HtmlElement, Window};

/// Class present while the CTA is shown.
pub const SHOW_CLASS: &str = "show";
/// Class present during the boosted glow.
pub const BOOST_CLASS: &str = "climax-boost";
/// Label set when the visitor clicks.
pub const FINAL_LABEL: &str = "I AM HUMAN";
/// Length of the post-click flash.
pub const FLASH_MS: u32 = 180;
/// Delay between the click and the parent notification.
pub const HANDOFF_DELAY_MS: i32 = 350;
/// `type` field of the message posted to the parent window.
pub const HANDOFF_MESSAGE: &str = "iah-open";

const FLASH_KEYFRAMES: &str = "@keyframes flash{0%{opacity:0}20%{opacity:1}100%{opacity:0}}";

/// Mirrors [`CtaSignal`] onto a DOM element.
#[derive(Debug)]
pub struct CtaBinding {
    element: HtmlElement,
}

impl CtaBinding {
    /// Binds to `element`.
    #[must_use]
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }

    /// Returns the bound element.
    #[must_use]
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    /// Applies a non-terminal signal.
    ///
    /// Any placeholder text is cleared while shown; the final label is never
    /// touched.
    pub fn sync(&self, signal: CtaSignal) {
        let classes = self.element.class_list();
        if signal.is_shown() {
            if self.element.text_content().as_deref() != Some(FINAL_LABEL) {
                self.element.set_text_content(Some(""));
            }
            let _ = classes.add_1(SHOW_CLASS);
            let _ = classes.toggle_with_force(BOOST_CLASS, signal.is_boosted());
        } else {
            let _ = classes.remove_1(SHOW_CLASS);
        }
    }

    /// Sets the terminal look: final label, shown and boosted.
    pub fn finalize(&self) {
        self.element.set_text_content(Some(FINAL_LABEL));
        let classes = self.element.class_list();
        let _ = classes.add_1(SHOW_CLASS);
        let _ = classes.add_1(BOOST_CLASS);
    }
}

/// Overlays a full-screen black flash that fades out on its own.
pub fn flash(document: &Document) -> Result<(), JsValue> {
    let overlay: HtmlElement = document.create_element("div")?.unchecked_into();
    overlay.style().set_css_text(&alloc::format!(
        "position:fixed;inset:0;background:#000;animation:flash {FLASH_MS}ms ease-out forwards;\
         pointer-events:none;z-index:9999;"
    ));
    let keyframes = document.create_element("style")?;
    keyframes.set_text_content(Some(FLASH_KEYFRAMES));
    if let Some(head) = document.head() {
        head.append_child(&keyframes)?;
    }
    if let Some(body) = document.body() {
        body.append_child(&overlay)?;
    }
    Ok(())
}

/// Posts `{type: "iah-open"}` to the parent window after
/// [`HANDOFF_DELAY_MS`].
///
/// Any failure, now or when the timer fires, is ignored.
pub fn schedule_handoff(window: &Window) {
    let win = window.clone();
    let cb = Closure::once_into_js(move || {
        let _ = post_handoff(&win);
    });
    let _ = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), HANDOFF_DELAY_MS);
}

fn post_handoff(window: &Window) -> Result<(), JsValue> {
    let Some(parent) = window.parent()? else {
        return Ok(());
    };
    let message = Object::new();
    Reflect::set(&message, &JsValue::from_str("type"), &JsValue::from_str(HANDOFF_MESSAGE))?;
    parent.post_message(&message, "*")
}
