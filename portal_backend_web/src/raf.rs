// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` tick source.
//!
//! [`RafLoop`] drives a [`FrameTick`]-based loop using the browser's
//! `requestAnimationFrame` API. Each callback receives a
//! [`DOMHighResTimeStamp`][mdn] (milliseconds from `performance.now()`),
//! which is converted to microsecond [`HostTime`] ticks. Page visibility is
//! read from `document.hidden` on every frame.
//!
//! The user callback returns whether it wants another frame; returning
//! `false` parks the loop until [`RafLoop::start`] is called again.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp
//! [`FrameTick`]: portal_core::timing::FrameTick
//! [`HostTime`]: portal_core::time::HostTime

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::Document;

use portal_core::output::OutputId;
use portal_core::time::HostTime;
use portal_core::timing::FrameTick;

// Direct global bindings instead of `web_sys::Window` methods; avoids
// fetching the Window/Performance objects on every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

/// Converts a `DOMHighResTimeStamp` to microsecond ticks.
#[expect(
    clippy::cast_possible_truncation,
    reason = "timestamps are small positive f64; µs fits in u64"
)]
pub(crate) fn ms_to_host_time(ms: f64) -> HostTime {
    HostTime((ms.max(0.0) * 1000.0) as u64)
}

/// A `requestAnimationFrame` loop that emits [`FrameTick`] events.
///
/// Create with [`RafLoop::new`], then call [`start`](Self::start). The loop
/// re-registers itself each frame while the callback returns `true`, until
/// [`stop`](Self::stop) is called or the `RafLoop` is dropped.
///
/// [`FrameTick`]: portal_core::timing::FrameTick
pub struct RafLoop {
    inner: Rc<RafInner>,
}

type RafClosure = Closure<dyn FnMut(f64)>;

struct RafInner {
    /// The JS closure registered with `requestAnimationFrame`.
    ///
    /// Stored in its own `RefCell` so we can set it once in `start()` and
    /// reference it from inside itself without conflicting with `callback`.
    closure: RefCell<Option<RafClosure>>,

    /// Receives ticks; returns whether to keep going.
    callback: RefCell<Box<dyn FnMut(FrameTick) -> bool>>,

    /// Source of `document.hidden`.
    document: Document,

    /// Monotonically increasing frame counter (becomes `FrameTick::frame_index`).
    /// Survives stop/start so indices never repeat.
    frame_counter: Cell<u64>,

    output: OutputId,

    running: Cell<bool>,

    /// The ID returned by the most recent `requestAnimationFrame` call.
    raf_id: Cell<i32>,
}

impl RafLoop {
    /// Creates a new `RafLoop` that is **not yet running**.
    ///
    /// `callback` receives a [`FrameTick`] on each animation frame once
    /// [`start`](Self::start) is called, and returns whether it wants
    /// another.
    ///
    /// [`FrameTick`]: portal_core::timing::FrameTick
    pub fn new(
        callback: impl FnMut(FrameTick) -> bool + 'static,
        output: OutputId,
        document: Document,
    ) -> Self {
        Self {
            inner: Rc::new(RafInner {
                closure: RefCell::new(None),
                callback: RefCell::new(Box::new(callback)),
                document,
                frame_counter: Cell::new(0),
                output,
                running: Cell::new(false),
                raf_id: Cell::new(0),
            }),
        }
    }

    /// Starts the loop.
    ///
    /// If already running, this is a no-op.
    pub fn start(&self) {
        if self.inner.running.get() {
            return;
        }
        self.inner.running.set(true);

        let inner = Rc::clone(&self.inner);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            if !inner.running.get() {
                return;
            }

            let frame_index = inner.frame_counter.get();
            inner.frame_counter.set(frame_index + 1);

            let tick = FrameTick {
                now: ms_to_host_time(timestamp_ms),
                frame_index,
                output: inner.output,
                visible: !inner.document.hidden(),
            };

            // The borrow is scoped so it doesn't overlap with the `closure`
            // RefCell.
            let again = inner.callback.borrow_mut()(tick);
            if !again {
                inner.running.set(false);
                return;
            }

            if inner.running.get()
                && let Some(ref closure) = *inner.closure.borrow()
            {
                let id = request_animation_frame(closure.as_ref().unchecked_ref());
                inner.raf_id.set(id);
            }
        }) as Box<dyn FnMut(f64)>);

        let id = request_animation_frame(closure.as_ref().unchecked_ref());
        self.inner.raf_id.set(id);
        *self.inner.closure.borrow_mut() = Some(closure);
    }

    /// Stops the loop.
    ///
    /// The pending `requestAnimationFrame` callback is cancelled. Can be
    /// restarted by calling [`start`](Self::start) again.
    pub fn stop(&self) {
        if !self.inner.running.get() {
            return;
        }
        self.inner.running.set(false);
        cancel_animation_frame(self.inner.raf_id.get());
    }

    /// Returns `true` if a frame is pending.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.stop();
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for RafLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafLoop")
            .field("running", &self.inner.running.get())
            .field("frame_counter", &self.inner.frame_counter.get())
            .field("output", &self.inner.output)
            .finish_non_exhaustive()
    }
}
