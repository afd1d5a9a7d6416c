// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed interpolation.
//!
//! A [`Tween`] is a pure function of time: given a start value, an end value, a
//! start time and a duration, [`Tween::sample`] returns the value at any `now`.
//! Nothing here schedules frames; the host calls into the chart from whatever
//! loop it has (timer callbacks, a render loop, cooperative tasks) and passes
//! the current time in milliseconds.
//!
//! Superseding a running tween is done by starting a new one from the value the
//! old one currently yields. The easing curve then restarts from that live value.

/// Default transition duration in milliseconds.
pub const DEFAULT_DURATION: f64 = 750.0;

/// Values that can be linearly interpolated.
pub trait Lerp: Copy {
    /// Interpolates between `self` (at `t = 0`) and `other` (at `t = 1`).
    fn lerp(self, other: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for [f64; 2] {
    fn lerp(self, other: Self, t: f64) -> Self {
        [self[0].lerp(other[0], t), self[1].lerp(other[1], t)]
    }
}

/// Easing curves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Symmetric cubic ease-in/ease-out.
    #[default]
    CubicInOut,
}

impl Easing {
    /// Maps linear progress `t` in `[0, 1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicInOut => {
                let t2 = t * 2.0;
                if t2 <= 1.0 {
                    t2 * t2 * t2 / 2.0
                } else {
                    let u = t2 - 2.0;
                    (u * u * u + 2.0) / 2.0
                }
            }
        }
    }
}

/// Interpolates from `start` to `end` after `elapsed` of `duration` milliseconds.
///
/// A non-positive duration completes immediately.
pub fn interpolate<V: Lerp>(start: V, end: V, duration: f64, elapsed: f64, easing: Easing) -> V {
    if duration <= 0.0 || elapsed >= duration {
        return end;
    }
    if elapsed <= 0.0 {
        return start;
    }
    start.lerp(end, easing.apply(elapsed / duration))
}

/// A value animating from `from` to `to` over a time window.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tween<V> {
    /// Value at (and before) `start`.
    pub from: V,
    /// Value at (and after) `start + duration`.
    pub to: V,
    /// Start time in milliseconds.
    pub start: f64,
    /// Duration in milliseconds.
    pub duration: f64,
    /// Easing curve.
    pub easing: Easing,
}

impl<V: Lerp> Tween<V> {
    /// Creates a tween starting at `start`.
    pub fn new(from: V, to: V, start: f64, duration: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            easing,
        }
    }

    /// A tween that already rests at `value`.
    pub fn settled(value: V) -> Self {
        Self::new(value, value, 0.0, 0.0, Easing::Linear)
    }

    /// Value at time `now`.
    pub fn sample(&self, now: f64) -> V {
        interpolate(self.from, self.to, self.duration, now - self.start, self.easing)
    }

    /// Whether the tween has reached its end value at `now`.
    pub fn is_finished(&self, now: f64) -> bool {
        now - self.start >= self.duration
    }

    /// Starts a new tween toward `to`, continuing from the value at `now`.
    pub fn retarget(&mut self, to: V, now: f64, duration: f64, easing: Easing) {
        *self = Self::new(self.sample(now), to, now, duration, easing);
    }
}
