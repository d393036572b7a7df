use glam::Vec3;

/// Values that timelines and smoothers can blend between.
pub trait Interpolatable: Copy + Sized {
    /// `start + (end - start) * t`. `t` is not clamped, so eased curves that
    /// overshoot (back, spring) carry through to the value.
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;

    /// Euclidean distance, used for convergence checks.
    fn distance(a: Self, b: Self) -> f32;
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }

    fn distance(a: Self, b: Self) -> f32 {
        (a - b).abs()
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }

    fn distance(a: Self, b: Self) -> f32 {
        a.distance(b)
    }
}
