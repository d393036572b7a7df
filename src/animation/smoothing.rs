//! Frame-rate aware exponential smoothing.
//!
//! Each frame moves the current value a fraction `speed * dt` of the way to
//! its target. Scaling by the frame delta keeps convergence time roughly the
//! same at 30 Hz and 144 Hz; the fraction is capped at 1 so a long frame lands
//! on the target instead of overshooting it.

use crate::animation::values::Interpolatable;

/// Fraction of the remaining distance covered this frame.
#[inline]
#[must_use]
pub fn damp_factor(speed: f32, dt: f32) -> f32 {
    (speed * dt).clamp(0.0, 1.0)
}

/// One smoothing step from `current` toward `target`.
#[inline]
#[must_use]
pub fn damp<T: Interpolatable>(current: T, target: T, speed: f32, dt: f32) -> T {
    T::interpolate_linear(current, target, damp_factor(speed, dt))
}

/// A value with first-order low-pass behaviour toward a moving target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothed<T: Interpolatable> {
    value: T,
    /// Per-second correction rate.
    pub speed: f32,
}

impl<T: Interpolatable> Smoothed<T> {
    #[must_use]
    pub fn new(value: T, speed: f32) -> Self {
        Self { value, speed }
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> T {
        self.value
    }

    pub fn update(&mut self, target: T, dt: f32) -> T {
        self.value = damp(self.value, target, self.speed, dt);
        self.value
    }

    /// Jumps straight to `value`, e.g. when another animation handed over
    /// ownership of the property.
    pub fn reset(&mut self, value: T) {
        self.value = value;
    }

    #[must_use]
    pub fn is_settled(&self, target: T, epsilon: f32) -> bool {
        T::distance(self.value, target) <= epsilon
    }
}
