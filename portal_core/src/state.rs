// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session lifecycle and the call-to-action signal.
//!
//! ```text
//!   Idle ──first active tick──► Running ──complete()──► Completed
//!                                 │  ▲
//!                                 └──┘ loops on the timeline period
//! ```
//!
//! `Completed` is terminal. The CTA signal follows the timeline on every
//! running tick until completion freezes it.

/// Lifecycle state of a gate session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No active tick seen yet; the loop origin is unset.
    #[default]
    Idle,
    /// The timeline is looping.
    Running,
    /// The visitor activated the CTA. Terminal.
    Completed,
}

/// Observable CTA state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CtaSignal {
    /// Not shown.
    #[default]
    Hidden,
    /// Shown.
    Shown,
    /// Shown with the boosted glow.
    ShownBoosted,
}

impl CtaSignal {
    /// Whether the CTA is visible in either form.
    #[must_use]
    pub const fn is_shown(self) -> bool {
        !matches!(self, Self::Hidden)
    }

    /// Whether the boost is on.
    #[must_use]
    pub const fn is_boosted(self) -> bool {
        matches!(self, Self::ShownBoosted)
    }
}

/// A change of the CTA signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CtaTransition {
    /// Signal before the change.
    pub from: CtaSignal,
    /// Signal after the change.
    pub to: CtaSignal,
}

/// CTA signal plus the terminal completion flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CtaState {
    signal: CtaSignal,
    completed: bool,
}

impl CtaState {
    /// Hidden and not completed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            signal: CtaSignal::Hidden,
            completed: false,
        }
    }

    /// The current signal.
    #[must_use]
    pub const fn signal(&self) -> CtaSignal {
        self.signal
    }

    /// Whether the terminal flag is set.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Moves to `next` unless completed.
    ///
    /// Returns the transition when the signal actually changed. Applying the
    /// current signal again is a no-op.
    pub fn apply(&mut self, next: CtaSignal) -> Option<CtaTransition> {
        if self.completed || self.signal == next {
            return None;
        }
        let from = self.signal;
        self.signal = next;
        Some(CtaTransition { from, to: next })
    }

    /// Shows the CTA without the boost, keeping any boost already on.
    ///
    /// Used by the reduced-motion path, which bypasses the timeline.
    pub fn force_shown(&mut self) -> Option<CtaTransition> {
        if self.signal.is_shown() {
            return None;
        }
        self.apply(CtaSignal::Shown)
    }

    /// Sets the final shown-with-boost state and the terminal flag.
    ///
    /// Idempotent: a second call reports no transition.
    pub fn complete(&mut self) -> Option<CtaTransition> {
        if self.completed {
            return None;
        }
        let t = self.apply(CtaSignal::ShownBoosted);
        self.completed = true;
        t
    }
}
