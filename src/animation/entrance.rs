//! Entrance Sequencer
//!
//! Plays a scene's [`EntranceTimeline`] exactly once per mount.
//!
//! ```text
//!  Idle ──(ready && transform registered && !has_run)──► Playing ──(timeline end)──► Finished
//! ```
//!
//! - `Idle` waits for both readiness and a transform handle; starting without
//!   a transform would animate a missing object.
//! - Entering `Playing` locks page scrolling and overrides the scene's render
//!   gate for the duration of the timeline.
//! - Entering `Finished` releases both, starts the overlay hide countdown and
//!   leaves the run latch set for the rest of the mount.
//! - Lock traffic and the finish callback are returned as
//!   [`EntranceEffects`] and applied by the caller once it has released
//!   whatever guards the sequencer.
//!
//! If the transform never arrives the sequencer stays `Idle` indefinitely.

use std::f32::consts::PI;
use std::sync::Arc;

use glam::Vec3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::animation::easing::Ease;
use crate::animation::timeline::{
    EntranceTimeline, TimelineEntry, TimelinePlayback, TimelinePose, Timing, Tween,
};
use crate::errors::{Result, VitrineError};
use crate::render_gate::{RenderGate, RenderOverride};
use crate::scene::transform::SharedTransform;
use crate::scroll::{LockReason, ScrollLock, ScrollLockGuard};
use crate::utils::OneShot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntranceConfig {
    pub timeline: Vec<TimelineEntry>,
    /// Seconds between the end of the timeline and hiding the overlay, long
    /// enough for its fade-out transition.
    pub overlay_hide_delay: f32,
}

impl Default for EntranceConfig {
    /// The hero intro: the model rises and turns into place while the camera
    /// dollies in and the title overlay slides up.
    fn default() -> Self {
        Self {
            timeline: vec![
                TimelineEntry::new(
                    Tween::CameraPosition {
                        from: Vec3::new(0.0, 0.0, 12.0),
                        to: Vec3::new(0.0, 0.0, 6.0),
                    },
                    Timing::new(2.0, Ease::QuadInOut, 0.0),
                ),
                TimelineEntry::new(
                    Tween::GroupPosition {
                        from: Vec3::new(0.0, -2.0, 0.0),
                        to: Vec3::ZERO,
                    },
                    Timing::new(1.6, Ease::spring(1.0, 120.0, 14.0), 0.0),
                ),
                TimelineEntry::new(
                    Tween::GroupRotation {
                        from: Vec3::new(0.0, PI, 0.0),
                        to: Vec3::ZERO,
                    },
                    Timing::new(1.8, Ease::CubicOut, 0.2),
                ),
                TimelineEntry::new(
                    Tween::OverlayOffsetY {
                        from: 0.0,
                        to: -120.0,
                    },
                    Timing::new(1.2, Ease::CubicInOut, 0.3),
                ),
            ],
            overlay_hide_delay: 1.0,
        }
    }
}

impl EntranceConfig {
    pub fn build_timeline(&self) -> Result<EntranceTimeline> {
        EntranceTimeline::new(self.timeline.clone())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.overlay_hide_delay.is_finite() || self.overlay_hide_delay < 0.0 {
            return Err(VitrineError::InvalidConfig {
                field: "entrance.overlay_hide_delay",
                reason: format!("must be finite and non-negative, got {}", self.overlay_hide_delay),
            });
        }
        self.build_timeline().map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrancePhase {
    Idle,
    Playing,
    Finished,
}

/// Text overlay driven by the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayState {
    pub visible: bool,
    pub offset_y: f32,
    hide_in: Option<f32>,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            visible: true,
            offset_y: 0.0,
            hide_in: None,
        }
    }
}

type FinishCallback = Box<dyn FnOnce() + Send>;

/// What a playing sequencer keeps hold of. `released` is set once the
/// holds have been given back; a late acquisition is then dropped at once.
#[derive(Debug, Default)]
struct HoldSlot {
    scroll: Option<ScrollLockGuard>,
    render: Option<RenderOverride>,
    released: bool,
}

/// Side effects of a sequencer transition that reach other components.
///
/// Taking or giving back the scroll lock notifies its subscribers and the
/// finish callback runs foreign code, so whoever guards the sequencer with a
/// lock applies these only after letting go of it.
#[must_use = "lock changes and the finish callback only happen in `apply`"]
pub struct EntranceEffects {
    holds: Arc<Mutex<HoldSlot>>,
    acquire: Option<(Arc<ScrollLock>, Option<Arc<RenderGate>>)>,
    release: bool,
    finished: bool,
    on_finished: Option<FinishCallback>,
}

impl EntranceEffects {
    fn none(holds: &Arc<Mutex<HoldSlot>>) -> Self {
        Self {
            holds: Arc::clone(holds),
            acquire: None,
            release: false,
            finished: false,
            on_finished: None,
        }
    }

    /// Whether the transition started playback.
    #[must_use]
    pub fn started(&self) -> bool {
        self.acquire.is_some()
    }

    /// Whether the transition reached `Finished`.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.acquire.is_none() && !self.release && self.on_finished.is_none()
    }

    /// Performs the lock changes in transition order, then runs the finish
    /// callback if there is one.
    pub fn apply(self) {
        let Self {
            holds,
            acquire,
            release,
            on_finished,
            ..
        } = self;

        if let Some((scroll_lock, gate)) = acquire {
            let render = gate.as_ref().map(RenderGate::hold_override);
            let scroll = scroll_lock.acquire(LockReason::Entrance);
            let mut slot = holds.lock();
            if slot.released {
                drop(slot);
                drop(render);
                drop(scroll);
            } else {
                slot.scroll = Some(scroll);
                slot.render = render;
            }
        }

        if release {
            let (scroll, render) = {
                let mut slot = holds.lock();
                slot.released = true;
                (slot.scroll.take(), slot.render.take())
            };
            drop(render);
            drop(scroll);
        }

        if let Some(callback) = on_finished {
            callback();
        }
    }
}

impl std::fmt::Debug for EntranceEffects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntranceEffects")
            .field("started", &self.started())
            .field("release", &self.release)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

/// Every transition returns [`EntranceEffects`]; nothing outside the
/// sequencer changes until they are applied.
pub struct EntranceSequencer {
    timeline: Arc<EntranceTimeline>,
    hide_delay: f32,

    phase: EntrancePhase,
    latch: OneShot,
    ready: bool,
    mounted: bool,

    transform: Option<SharedTransform>,
    playback: Option<TimelinePlayback>,
    overlay: OverlayState,
    camera_position: Option<Vec3>,

    scroll_lock: Arc<ScrollLock>,
    render_gate: Option<Arc<RenderGate>>,
    holds: Arc<Mutex<HoldSlot>>,

    on_finished: Option<FinishCallback>,
}

impl EntranceSequencer {
    #[must_use]
    pub fn new(timeline: Arc<EntranceTimeline>, hide_delay: f32, scroll_lock: Arc<ScrollLock>) -> Self {
        // Initial pose is whatever the timeline holds at t = 0.
        let pose = timeline.sample(0.0);
        Self {
            timeline,
            hide_delay,
            phase: EntrancePhase::Idle,
            latch: OneShot::new(),
            ready: false,
            mounted: true,
            transform: None,
            playback: None,
            overlay: OverlayState {
                offset_y: pose.overlay_offset_y.unwrap_or(0.0),
                ..OverlayState::default()
            },
            camera_position: pose.camera_position,
            scroll_lock,
            render_gate: None,
            holds: Arc::new(Mutex::new(HoldSlot::default())),
            on_finished: None,
        }
    }

    pub fn from_config(config: &EntranceConfig, scroll_lock: Arc<ScrollLock>) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            Arc::new(config.build_timeline()?),
            config.overlay_hide_delay,
            scroll_lock,
        ))
    }

    /// Gate to override while playing.
    #[must_use]
    pub fn with_render_gate(mut self, gate: Arc<RenderGate>) -> Self {
        self.render_gate = Some(gate);
        self
    }

    /// Called once, when the effects of the transition into `Finished` are
    /// applied.
    pub fn on_finished(&mut self, callback: impl FnOnce() + Send + 'static) {
        self.on_finished = Some(Box::new(callback));
    }

    /// Feeds the current readiness.
    pub fn set_ready(&mut self, ready: bool) -> EntranceEffects {
        self.ready = ready;
        self.try_start()
    }

    /// Registers the transform to animate.
    pub fn register_transform(&mut self, transform: SharedTransform) -> EntranceEffects {
        self.transform = Some(transform);
        self.try_start()
    }

    fn try_start(&mut self) -> EntranceEffects {
        let mut effects = EntranceEffects::none(&self.holds);
        if !self.mounted || self.phase != EntrancePhase::Idle || !self.ready {
            return effects;
        }
        if self.transform.is_none() {
            log::debug!("Entrance ready but no transform registered yet; staying idle");
            return effects;
        }
        if !self.latch.try_start() {
            return effects;
        }

        self.phase = EntrancePhase::Playing;
        effects.acquire = Some((Arc::clone(&self.scroll_lock), self.render_gate.clone()));

        let playback = TimelinePlayback::new(Arc::clone(&self.timeline));
        self.apply_pose(&playback.sample());
        self.playback = Some(playback);

        log::info!(
            "Entrance sequence started ({:.2}s, {} entries)",
            self.timeline.duration(),
            self.timeline.entries().len()
        );
        effects
    }

    /// Advances playback or the overlay hide countdown by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> EntranceEffects {
        if !self.mounted {
            return EntranceEffects::none(&self.holds);
        }
        match self.phase {
            EntrancePhase::Idle => {}
            EntrancePhase::Playing => {
                if let Some(playback) = self.playback.as_mut() {
                    let reached_end = playback.update(dt);
                    let pose = playback.sample();
                    self.apply_pose(&pose);
                    if reached_end {
                        return self.finish();
                    }
                }
            }
            EntrancePhase::Finished => {
                if let Some(remaining) = self.overlay.hide_in.as_mut() {
                    *remaining -= dt;
                    if *remaining <= 0.0 {
                        self.overlay.hide_in = None;
                        self.overlay.visible = false;
                        log::debug!("Entrance overlay hidden");
                    }
                }
            }
        }
        EntranceEffects::none(&self.holds)
    }

    fn finish(&mut self) -> EntranceEffects {
        self.phase = EntrancePhase::Finished;
        self.latch.finish();
        self.playback = None;

        if self.hide_delay > 0.0 {
            self.overlay.hide_in = Some(self.hide_delay);
        } else {
            self.overlay.visible = false;
        }

        log::info!("Entrance sequence finished");
        EntranceEffects {
            release: true,
            finished: true,
            on_finished: self.on_finished.take(),
            ..EntranceEffects::none(&self.holds)
        }
    }

    fn apply_pose(&mut self, pose: &TimelinePose) {
        if let Some(offset) = pose.overlay_offset_y {
            self.overlay.offset_y = offset;
        }
        if pose.camera_position.is_some() {
            self.camera_position = pose.camera_position;
        }

        let Some(transform) = self.transform.as_ref() else {
            return;
        };
        let mut transform = transform.write();
        if let Some(position) = pose.group_position {
            transform.position = position;
        }
        if let Some(rotation) = pose.group_rotation {
            transform.rotation = rotation;
        }
        if let Some(scale) = pose.group_scale {
            transform.scale = scale;
        }
        transform.commit();
    }

    /// Stops playback; the returned effects give back any held lock or
    /// override. The run latch is kept; a fresh mount builds a fresh
    /// sequencer.
    pub fn unmount(&mut self) -> EntranceEffects {
        let mut effects = EntranceEffects::none(&self.holds);
        if !self.mounted {
            return effects;
        }
        self.mounted = false;
        self.playback = None;
        self.on_finished = None;
        effects.release = true;
        effects
    }

    #[must_use]
    pub fn phase(&self) -> EntrancePhase {
        self.phase
    }

    /// Whether the timeline has been started during this mount.
    #[must_use]
    pub fn has_run(&self) -> bool {
        self.latch.has_started()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.phase == EntrancePhase::Playing
    }

    /// Whether the scroll lock is currently held on this sequencer's behalf.
    #[must_use]
    pub fn is_holding_lock(&self) -> bool {
        self.holds.lock().scroll.is_some()
    }

    #[must_use]
    pub fn overlay(&self) -> OverlayState {
        self.overlay
    }

    #[must_use]
    pub fn camera_position(&self) -> Option<Vec3> {
        self.camera_position
    }

    #[must_use]
    pub fn playback_time(&self) -> Option<f32> {
        self.playback.as_ref().map(|p| p.time)
    }

    #[must_use]
    pub fn timeline(&self) -> &Arc<EntranceTimeline> {
        &self.timeline
    }
}

impl std::fmt::Debug for EntranceSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntranceSequencer")
            .field("phase", &self.phase)
            .field("ready", &self.ready)
            .field("has_transform", &self.transform.is_some())
            .field("overlay", &self.overlay)
            .finish_non_exhaustive()
    }
}
