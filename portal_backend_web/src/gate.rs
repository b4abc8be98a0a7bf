// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page wiring: one [`GateSession`] driven by the browser.
//!
//! [`mount`] finds the canvas and CTA elements, sizes the surface from the
//! viewport, starts both asset loads, listens for resize, reduced-motion and
//! click events, and runs the session from a [`RafLoop`]. The loop parks
//! itself when the session stops asking for frames (click or reduced motion)
//! and is restarted if reduced motion is turned off again.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use portal_core::asset::AssetKind;
use portal_core::config::GateConfig;
use portal_core::output::OutputId;
use portal_core::surface::SurfaceSize;
use portal_core::timing::FrameTick;
use portal_core::trace::Tracer;
use portal_render::{GateSession, Presenter as _};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlCanvasElement, HtmlElement, Window};

use crate::assets::{cache_busted, load_image};
use crate::cta::{CtaBinding, flash, schedule_handoff};
use crate::motion::watch_reduced_motion;
use crate::presenter::CanvasPresenter;
use crate::raf::RafLoop;

/// Element ids and asset URLs.
#[derive(Clone, Copy, Debug)]
pub struct MountOptions {
    /// Id of the `<canvas>` to draw on.
    pub canvas_id: &'static str,
    /// Id of the CTA element.
    pub cta_id: &'static str,
    /// URL of the mask overlay image.
    pub mask_url: &'static str,
    /// URL of the reveal image.
    pub reveal_url: &'static str,
}

impl MountOptions {
    /// The shipped page.
    #[must_use]
    pub const fn portal() -> Self {
        Self {
            canvas_id: "portal",
            cta_id: "cta",
            mask_url: "new_mask.png",
            reveal_url: "usb_source.png",
        }
    }
}

impl Default for MountOptions {
    fn default() -> Self {
        Self::portal()
    }
}

struct GateState {
    session: GateSession,
    presenter: CanvasPresenter,
    cta: CtaBinding,
}

/// A mounted gate. Dropping it stops the loop; event listeners stay bound.
pub struct Gate {
    state: Rc<RefCell<GateState>>,
    raf: Rc<RafLoop>,
}

impl core::fmt::Debug for Gate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Gate")
            .field("session_state", &state.session.state())
            .field("cta", &state.session.cta())
            .field("raf", &self.raf)
            .finish_non_exhaustive()
    }
}

impl Gate {
    /// Whether a frame is pending.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.raf.is_running()
    }
}

/// Reads the viewport and derives the device-pixel surface.
fn viewport_surface(window: &Window) -> SurfaceSize {
    let css = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    SurfaceSize::from_viewport(
        css(window.inner_width()),
        css(window.inner_height()),
        window.device_pixel_ratio(),
    )
}

/// Seed for the session's generator from `Math.random()` and the clock.
#[expect(
    clippy::cast_possible_truncation,
    reason = "both terms are finite, non-negative and below 2^53"
)]
fn seed() -> u64 {
    let entropy = (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64;
    entropy ^ crate::now().ticks().rotate_left(32)
}

fn on_tick(state: &RefCell<GateState>, tick: &FrameTick) -> bool {
    let mut guard = state.borrow_mut();
    let s = &mut *guard;
    let outcome = s.session.tick(tick, &mut Tracer::none());
    if outcome.rendered {
        s.presenter.apply(&s.session, s.session.plan());
    }
    if !s.session.cta().is_completed() {
        s.cta.sync(outcome.cta);
    }
    outcome.reschedule
}

/// Mounts the gate on the current page.
pub fn mount(options: MountOptions) -> Result<Gate, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(options.canvas_id)
        .ok_or_else(|| JsValue::from_str("canvas element not found"))?
        .dyn_into()?;
    let cta: HtmlElement = document
        .get_element_by_id(options.cta_id)
        .ok_or_else(|| JsValue::from_str("cta element not found"))?
        .dyn_into()?;

    let mut presenter = CanvasPresenter::new(canvas)?;
    let mut session = GateSession::new(GateConfig::portal(), crate::timebase(), seed());
    let surface = viewport_surface(&window);
    presenter.resize(&surface);
    session.resize(surface);

    let state = Rc::new(RefCell::new(GateState {
        session,
        presenter,
        cta: CtaBinding::new(cta),
    }));

    let tick_state = Rc::clone(&state);
    let raf = Rc::new(RafLoop::new(
        move |tick| on_tick(&tick_state, &tick),
        OutputId(0),
        document.clone(),
    ));

    // Resize.
    let resize_state = Rc::clone(&state);
    let resize_window = window.clone();
    let resize_cb = Closure::wrap(Box::new(move |_event: Event| {
        let surface = viewport_surface(&resize_window);
        let mut s = resize_state.borrow_mut();
        if s.session.resize(surface) {
            s.presenter.resize(&surface);
        }
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())?;
    resize_cb.forget();

    // Assets.
    let stamp = js_sys::Date::now();
    for (kind, url) in [
        (AssetKind::Mask, options.mask_url),
        (AssetKind::Reveal, options.reveal_url),
    ] {
        let asset_state = Rc::clone(&state);
        let _ = load_image(&document, &cache_busted(url, stamp), move |raster| {
            asset_state.borrow_mut().session.set_asset(kind, raster);
        })?;
    }

    // Click.
    let click_state = Rc::clone(&state);
    let click_window = window.clone();
    let click_document = document.clone();
    let click_cb = Closure::wrap(Box::new(move |_event: Event| {
        {
            let mut s = click_state.borrow_mut();
            s.session.complete(&mut Tracer::none());
            s.cta.finalize();
        }
        let _ = flash(&click_document);
        schedule_handoff(&click_window);
    }) as Box<dyn FnMut(_)>);
    state
        .borrow()
        .cta
        .element()
        .add_event_listener_with_callback("click", click_cb.as_ref().unchecked_ref())?;
    click_cb.forget();

    // Reduced motion.
    let motion_state = Rc::clone(&state);
    let motion_raf = Rc::clone(&raf);
    let reduced = watch_reduced_motion(&window, move |on| {
        let resume = {
            let mut s = motion_state.borrow_mut();
            s.session.set_reduced_motion(on, &mut Tracer::none());
            let cta = s.session.cta();
            if !cta.is_completed() {
                s.cta.sync(cta.signal());
            }
            !on && !cta.is_completed()
        };
        if resume {
            motion_raf.start();
        }
    })?;

    if reduced {
        let mut s = state.borrow_mut();
        s.session.set_reduced_motion(true, &mut Tracer::none());
        let signal = s.session.cta().signal();
        s.cta.sync(signal);
    } else {
        raf.start();
    }

    Ok(Gate { state, raf })
}

/// Page entry point: mounts with [`MountOptions::portal`] and keeps the gate
/// alive for the lifetime of the page.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let gate = mount(MountOptions::portal())?;
    core::mem::forget(gate);
    Ok(())
}
