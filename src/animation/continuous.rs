//! Continuous Animator
//!
//! Steady-state procedural motion of one scene, advanced once per visible
//! frame from the scene's [`ScrollProgress`]:
//!
//! - the managed group's position/rotation/scale chase a target interpolated
//!   between a `start` and an `end` configuration by scroll progress;
//! - a pulsing light breathes near the top of the page, holds its base level
//!   mid-page, and fades out past the midpoint;
//! - a moving light ping-pongs along one axis.
//!
//! The animator is a pure value object. It never touches a renderer; the
//! owning scene copies [`SceneFrame`] into whatever the renderer reads.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::animation::smoothing::damp;
use crate::errors::{Result, VitrineError};
use crate::scroll::ScrollProgress;

/// Position / rotation (Euler XYZ, radians) / scale of the managed group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationTarget {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for AnimationTarget {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl AnimationTarget {
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.lerp(other.rotation, t),
            scale: self.scale.lerp(other.scale, t),
        }
    }

    /// One smoothing step toward `target`.
    #[must_use]
    pub fn damped_toward(&self, target: &Self, speed: f32, dt: f32) -> Self {
        Self {
            position: damp(self.position, target.position, speed, dt),
            rotation: damp(self.rotation, target.rotation, speed, dt),
            scale: damp(self.scale, target.scale, speed, dt),
        }
    }
}

/// Scroll-driven interpolation between two group configurations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformRange {
    pub start: AnimationTarget,
    pub end: AnimationTarget,
}

impl TransformRange {
    /// Unclamped, so overshooting progress carries through.
    #[must_use]
    pub fn target_at(&self, progress: f32) -> AnimationTarget {
        self.start.lerp(&self.end, progress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulsingLightConfig {
    pub base: f32,
    /// Amplitude of the idle sine pulse.
    pub range: f32,
    /// Below this progress the page counts as "at the top".
    pub idle_threshold: f32,
    /// Past this progress the light fades linearly to zero at progress 1.
    pub fade_start: f32,
    /// Low-pass rate applied to the raw intensity target.
    pub smoothing: f32,
}

impl Default for PulsingLightConfig {
    fn default() -> Self {
        Self {
            base: 1.5,
            range: 0.5,
            idle_threshold: 0.01,
            fade_start: 0.5,
            smoothing: 3.0,
        }
    }
}

impl PulsingLightConfig {
    /// Raw (unsmoothed) intensity target.
    #[must_use]
    pub fn target(&self, progress: f32, elapsed: f32) -> f32 {
        if progress < self.idle_threshold {
            self.base + elapsed.sin() * self.range
        } else if progress > self.fade_start {
            let span = (1.0 - self.fade_start).max(f32::EPSILON);
            let fade = ((progress - self.fade_start) / span).clamp(0.0, 1.0);
            self.base * (1.0 - fade)
        } else {
            self.base
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingLightConfig {
    /// Distance travelled per frame tick.
    pub speed: f32,
    /// Travel is confined to `[-bound, +bound]`.
    pub bound: f32,
}

impl Default for MovingLightConfig {
    fn default() -> Self {
        Self {
            speed: 0.0375,
            bound: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    pub transform: TransformRange,
    /// Per-second correction rate of the group transform.
    pub follow_speed: f32,
    pub pulsing_light: Option<PulsingLightConfig>,
    pub moving_light: Option<MovingLightConfig>,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            transform: TransformRange::default(),
            follow_speed: 4.0,
            pulsing_light: Some(PulsingLightConfig::default()),
            moving_light: Some(MovingLightConfig::default()),
        }
    }
}

impl AnimatorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.follow_speed.is_finite() || self.follow_speed < 0.0 {
            return Err(VitrineError::InvalidConfig {
                field: "animator.follow_speed",
                reason: format!("must be finite and non-negative, got {}", self.follow_speed),
            });
        }
        if let Some(pulse) = &self.pulsing_light {
            if pulse.idle_threshold > pulse.fade_start {
                return Err(VitrineError::InvalidConfig {
                    field: "animator.pulsing_light.idle_threshold",
                    reason: "must not exceed fade_start".to_string(),
                });
            }
            if pulse.fade_start.is_nan() || pulse.fade_start >= 1.0 {
                return Err(VitrineError::InvalidConfig {
                    field: "animator.pulsing_light.fade_start",
                    reason: format!("must be below 1, got {}", pulse.fade_start),
                });
            }
            if !pulse.smoothing.is_finite() || pulse.smoothing < 0.0 {
                return Err(VitrineError::InvalidConfig {
                    field: "animator.pulsing_light.smoothing",
                    reason: format!("must be finite and non-negative, got {}", pulse.smoothing),
                });
            }
        }
        if let Some(moving) = &self.moving_light {
            if moving.bound.is_nan() || moving.bound <= 0.0 {
                return Err(VitrineError::InvalidConfig {
                    field: "animator.moving_light.bound",
                    reason: format!("must be positive, got {}", moving.bound),
                });
            }
            if !moving.speed.is_finite() || moving.speed < 0.0 {
                return Err(VitrineError::InvalidConfig {
                    field: "animator.moving_light.speed",
                    reason: format!("must be finite and non-negative, got {}", moving.speed),
                });
            }
        }
        Ok(())
    }
}

/// Mutable light state of one scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightMotionState {
    pub current_intensity: f32,
    pub current_x: f32,
    pub moving_forward: bool,
}

impl Default for LightMotionState {
    fn default() -> Self {
        Self {
            current_intensity: 0.0,
            current_x: 0.0,
            moving_forward: true,
        }
    }
}

impl LightMotionState {
    /// One ping-pong tick. Direction flips on the tick that reaches a bound;
    /// the position is held at the bound on that tick.
    pub fn advance_moving_light(&mut self, config: &MovingLightConfig) {
        if self.moving_forward {
            self.current_x += config.speed;
            if self.current_x >= config.bound {
                self.current_x = config.bound;
                self.moving_forward = false;
            }
        } else {
            self.current_x -= config.speed;
            if self.current_x <= -config.bound {
                self.current_x = -config.bound;
                self.moving_forward = true;
            }
        }
    }
}

/// Output of one animator frame, read by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrame {
    pub transform: AnimationTarget,
    pub pulsing_intensity: Option<f32>,
    pub moving_light_x: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ContinuousAnimator {
    config: AnimatorConfig,
    current: AnimationTarget,
    lights: LightMotionState,
    scroll: ScrollProgress,
}

impl ContinuousAnimator {
    #[must_use]
    pub fn new(config: AnimatorConfig) -> Self {
        let lights = LightMotionState {
            current_intensity: config.pulsing_light.map_or(0.0, |p| p.base),
            ..LightMotionState::default()
        };
        Self {
            current: config.transform.target_at(0.0),
            config,
            lights,
            scroll: ScrollProgress::INITIAL,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    pub fn set_scroll(&mut self, scroll: ScrollProgress) {
        self.scroll = scroll;
    }

    #[must_use]
    pub fn scroll(&self) -> ScrollProgress {
        self.scroll
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.scroll.in_view
    }

    #[must_use]
    pub fn lights(&self) -> &LightMotionState {
        &self.lights
    }

    #[must_use]
    pub fn current(&self) -> AnimationTarget {
        self.current
    }

    /// Takes over the group from wherever another animation left it, so the
    /// hand-off does not snap.
    pub fn sync_transform(&mut self, transform: AnimationTarget) {
        self.current = transform;
    }

    /// Advances one frame of `dt` seconds at clock time `elapsed`.
    ///
    /// Returns `None` and leaves all state untouched while the scene is not
    /// visible; motion resumes from the frozen values on return.
    pub fn tick(&mut self, dt: f32, elapsed: f32) -> Option<SceneFrame> {
        if !self.scroll.in_view {
            return None;
        }

        let progress = self.scroll.progress;
        let target = self.config.transform.target_at(progress);
        self.current = self
            .current
            .damped_toward(&target, self.config.follow_speed, dt);

        if let Some(pulse) = &self.config.pulsing_light {
            let raw = pulse.target(progress, elapsed);
            self.lights.current_intensity =
                damp(self.lights.current_intensity, raw, pulse.smoothing, dt);
        }

        if let Some(moving) = &self.config.moving_light {
            self.lights.advance_moving_light(moving);
        }

        Some(self.frame())
    }

    #[must_use]
    pub fn frame(&self) -> SceneFrame {
        SceneFrame {
            transform: self.current,
            pulsing_intensity: self
                .config
                .pulsing_light
                .map(|_| self.lights.current_intensity),
            moving_light_x: self.config.moving_light.map(|_| self.lights.current_x),
        }
    }
}
