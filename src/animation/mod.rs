//! Animation
//!
//! - [`ContinuousAnimator`]: scroll-driven steady-state motion of one scene
//! - [`EntranceSequencer`]: the one-shot intro timeline of a scene
//! - [`EntranceTimeline`] / [`Ease`]: declarative tween list and its curves

pub mod continuous;
pub mod easing;
pub mod entrance;
pub mod smoothing;
pub mod timeline;
pub mod values;

pub use continuous::{
    AnimationTarget, AnimatorConfig, ContinuousAnimator, LightMotionState, MovingLightConfig,
    PulsingLightConfig, SceneFrame, TransformRange,
};
pub use easing::Ease;
pub use entrance::{EntranceConfig, EntranceEffects, EntrancePhase, EntranceSequencer, OverlayState};
pub use smoothing::{Smoothed, damp, damp_factor};
pub use timeline::{
    EntranceTimeline, TimelineEntry, TimelinePlayback, TimelinePose, Timing, Tween,
};
pub use values::Interpolatable;
