// Copyright 2026 the Portal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic host time and timebase conversion.
//!
//! [`HostTime`] is a point in time expressed as backend-native monotonic
//! ticks (microseconds from `performance.now()` on the web, nanoseconds in
//! headless runs). [`Timebase`] carries the rational ticks→nanoseconds factor
//! so the timeline can work in milliseconds regardless of the tick source.
//!
//! All conversions go through `u128` intermediates to avoid overflow.

use core::fmt;
use core::ops::{Add, Sub};

const NANOS_PER_MILLI: u64 = 1_000_000;

/// A point in time expressed as backend-native monotonic ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Converts this host time to nanoseconds using the given timebase.
    #[inline]
    #[must_use]
    pub const fn to_nanos(self, timebase: Timebase) -> u64 {
        timebase.ticks_to_nanos(self.0)
    }

    /// Converts this host time to (fractional) milliseconds.
    ///
    /// Used for the free-running effects (cursor blink, flicker phases) that
    /// key off absolute time rather than loop-relative time.
    #[inline]
    #[must_use]
    pub fn to_millis_f64(self, timebase: Timebase) -> f64 {
        timebase.ticks_to_nanos(self.0) as f64 / NANOS_PER_MILLI as f64
    }

    /// Creates a [`HostTime`] from whole milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64, timebase: Timebase) -> Self {
        Self(timebase.nanos_to_ticks(millis.saturating_mul(NANOS_PER_MILLI)))
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }

    /// Checked addition of a duration.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, duration: Duration) -> Option<Self> {
        match self.0.checked_add(duration.0) {
            Some(t) => Some(Self(t)),
            None => None,
        }
    }
}

impl Add<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for HostTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({})", self.0)
    }
}

/// Rational conversion factor from ticks to nanoseconds.
///
/// `nanoseconds = ticks * numer / denom`
///
/// The instance for a given tick source comes from the backend crate
/// (e.g. `portal_backend_web::timebase()` reports microsecond ticks).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timebase {
    /// Numerator of the ticks-to-nanoseconds ratio.
    pub numer: u32,
    /// Denominator of the ticks-to-nanoseconds ratio.
    pub denom: u32,
}

impl Timebase {
    /// A timebase where ticks are already nanoseconds (1:1).
    pub const NANOS: Self = Self { numer: 1, denom: 1 };

    /// A timebase where one tick is one microsecond.
    pub const MICROS: Self = Self {
        numer: 1000,
        denom: 1,
    };

    /// Creates a new timebase with the given numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    #[inline]
    #[must_use]
    pub const fn new(numer: u32, denom: u32) -> Self {
        assert!(denom != 0, "timebase denominator must not be zero");
        Self { numer, denom }
    }

    /// Converts a tick count to nanoseconds.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn ticks_to_nanos(self, ticks: u64) -> u64 {
        let wide = ticks as u128 * self.numer as u128 / self.denom as u128;
        wide as u64
    }

    /// Converts nanoseconds to a tick count.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn nanos_to_ticks(self, nanos: u64) -> u64 {
        let wide = nanos as u128 * self.denom as u128 / self.numer as u128;
        wide as u64
    }
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timebase({}/{})", self.numer, self.denom)
    }
}

/// A duration in backend-native ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Converts this duration to nanoseconds using the given timebase.
    #[inline]
    #[must_use]
    pub const fn to_nanos(self, timebase: Timebase) -> u64 {
        timebase.ticks_to_nanos(self.0)
    }

    /// Converts this duration to (fractional) milliseconds.
    #[inline]
    #[must_use]
    pub fn to_millis_f64(self, timebase: Timebase) -> f64 {
        timebase.ticks_to_nanos(self.0) as f64 / NANOS_PER_MILLI as f64
    }

    /// Creates a duration from whole milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64, timebase: Timebase) -> Self {
        Self(timebase.nanos_to_ticks(millis.saturating_mul(NANOS_PER_MILLI)))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({})", self.0)
    }
}
