#![forbid(unsafe_code)]

//! Animation primitives for word reveal overlays.
//!
//! An [`Animation`] is a value in `[0.0, 1.0]` that advances with elapsed
//! time. The reveal engine only needs a fade, but the trait keeps overlays
//! swappable for hosts that want a different curve.
//!
//! # Invariants
//!
//! 1. `value()` is 0.0 before the first tick and 1.0 once complete.
//! 2. `reset()` followed by `tick(t)` yields the same state as ticking in
//!    smaller steps summing to `t`.
//! 3. Zero durations are clamped to 1ns so progress never divides by zero.

use std::time::Duration;

/// Easing curve mapping linear progress `t` in `[0, 1]` to eased progress.
pub type EasingFn = fn(f32) -> f32;

/// Identity easing.
#[must_use]
pub fn linear(t: f32) -> f32 {
    t
}

/// Quadratic ease-in.
#[must_use]
pub fn ease_in(t: f32) -> f32 {
    t * t
}

/// Quadratic ease-out.
#[must_use]
pub fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// A time-driven animation producing a progress value.
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current value in `[0.0, 1.0]`.
    fn value(&self) -> f32;

    /// Rewind to the initial state.
    fn reset(&mut self);

    /// Time ticked past the end of the animation.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

/// Fade from 0.0 to 1.0 over a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Fade {
    /// Create a linear fade lasting `duration`.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing: linear,
        }
    }

    /// Set the easing curve (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Total duration of the fade.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Jump straight to the end.
    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }
}

impl Animation for Fade {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        let t = (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32;
        (self.easing)(t).clamp(0.0, 1.0)
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

/// Linear start offsets for `count` items spaced `stagger` apart.
///
/// The first item starts at zero; offsets are strictly increasing when
/// `stagger` is non-zero.
#[must_use]
pub fn stagger_offsets(count: usize, stagger: Duration) -> Vec<Duration> {
    (0..count)
        .map(|i| stagger.saturating_mul(u32::try_from(i).unwrap_or(u32::MAX)))
        .collect()
}
