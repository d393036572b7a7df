//! Entrance Timeline
//!
//! A declarative, one-shot list of tweens placed at absolute offsets on a
//! shared time axis. Offsets are measured from the start of the timeline, not
//! chained from the previous entry, so entries on different properties run in
//! parallel whenever their windows overlap.

use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::animation::easing::Ease;
use crate::animation::values::Interpolatable;
use crate::errors::{Result, VitrineError};

/// Animated property together with its start and end keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum Tween {
    /// Vertical offset of the text overlay, in pixels.
    OverlayOffsetY { from: f32, to: f32 },
    GroupPosition { from: Vec3, to: Vec3 },
    /// Euler XYZ, radians.
    GroupRotation { from: Vec3, to: Vec3 },
    GroupScale { from: Vec3, to: Vec3 },
    CameraPosition { from: Vec3, to: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    /// Seconds.
    pub duration: f32,
    #[serde(default)]
    pub ease: Ease,
    /// Seconds from the start of the timeline.
    #[serde(default)]
    pub offset: f32,
}

impl Timing {
    #[must_use]
    pub fn new(duration: f32, ease: Ease, offset: f32) -> Self {
        Self {
            duration,
            ease,
            offset,
        }
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> f32 {
        self.offset + self.duration
    }

    /// Eased blend progress at timeline time `time`, or `None` before the
    /// entry starts.
    #[must_use]
    pub fn progress_at(&self, time: f32) -> Option<f32> {
        if time < self.offset {
            return None;
        }
        let local = if self.duration > 0.0 {
            (time - self.offset) / self.duration
        } else {
            1.0
        };
        Some(self.ease.apply(local, self.duration))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub tween: Tween,
    pub timing: Timing,
}

impl TimelineEntry {
    #[must_use]
    pub fn new(tween: Tween, timing: Timing) -> Self {
        Self { tween, timing }
    }
}

/// Values a timeline produces at one instant. `None` means no entry animates
/// that property.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimelinePose {
    pub overlay_offset_y: Option<f32>,
    pub group_position: Option<Vec3>,
    pub group_rotation: Option<Vec3>,
    pub group_scale: Option<Vec3>,
    pub camera_position: Option<Vec3>,
}

/// Validated, immutable entry list.
#[derive(Debug, Clone, PartialEq)]
pub struct EntranceTimeline {
    // Sorted by offset; ties keep declaration order.
    entries: Vec<TimelineEntry>,
    duration: f32,
}

impl EntranceTimeline {
    pub fn new(entries: Vec<TimelineEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(VitrineError::EmptyTimeline);
        }
        for (index, entry) in entries.iter().enumerate() {
            let Timing {
                duration, offset, ..
            } = entry.timing;
            if !duration.is_finite() || duration < 0.0 {
                return Err(VitrineError::InvalidTiming {
                    index,
                    reason: format!("duration {duration} must be finite and non-negative"),
                });
            }
            if !offset.is_finite() || offset < 0.0 {
                return Err(VitrineError::InvalidTiming {
                    index,
                    reason: format!("offset {offset} must be finite and non-negative"),
                });
            }
            entry.timing.ease.validate()?;
        }

        let mut entries = entries;
        entries.sort_by(|a, b| a.timing.offset.total_cmp(&b.timing.offset));
        let duration = entries
            .iter()
            .map(|e| e.timing.end())
            .fold(0.0_f32, f32::max);

        Ok(Self { entries, duration })
    }

    /// Time at which the last entry completes.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[must_use]
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Samples every property at `time`.
    ///
    /// An entry that has not started yet holds its `from` value unless an
    /// earlier entry already drives the same property; once started, the
    /// latest-starting entry of a property wins.
    #[must_use]
    pub fn sample(&self, time: f32) -> TimelinePose {
        let mut pose = TimelinePose::default();
        for entry in &self.entries {
            let progress = entry.timing.progress_at(time);
            match entry.tween {
                Tween::OverlayOffsetY { from, to } => {
                    write_slot(&mut pose.overlay_offset_y, from, to, progress);
                }
                Tween::GroupPosition { from, to } => {
                    write_slot(&mut pose.group_position, from, to, progress);
                }
                Tween::GroupRotation { from, to } => {
                    write_slot(&mut pose.group_rotation, from, to, progress);
                }
                Tween::GroupScale { from, to } => {
                    write_slot(&mut pose.group_scale, from, to, progress);
                }
                Tween::CameraPosition { from, to } => {
                    write_slot(&mut pose.camera_position, from, to, progress);
                }
            }
        }
        pose
    }
}

fn write_slot<T: Interpolatable>(slot: &mut Option<T>, from: T, to: T, progress: Option<f32>) {
    match progress {
        Some(p) => *slot = Some(T::interpolate_linear(from, to, p)),
        None => {
            if slot.is_none() {
                *slot = Some(from);
            }
        }
    }
}

/// Playback head over a shared [`EntranceTimeline`]; plays once and stops at
/// the end.
#[derive(Debug, Clone)]
pub struct TimelinePlayback {
    timeline: Arc<EntranceTimeline>,

    pub time: f32,
    pub time_scale: f32,
    pub paused: bool,
    finished: bool,
}

impl TimelinePlayback {
    #[must_use]
    pub fn new(timeline: Arc<EntranceTimeline>) -> Self {
        Self {
            timeline,
            time: 0.0,
            time_scale: 1.0,
            paused: false,
            finished: false,
        }
    }

    #[must_use]
    pub fn timeline(&self) -> &Arc<EntranceTimeline> {
        &self.timeline
    }

    /// Advances time. Returns `true` on the update that reaches the end.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.paused || self.finished {
            return false;
        }

        self.time += dt * self.time_scale;

        let duration = self.timeline.duration();
        if self.time >= duration {
            self.time = duration;
            self.finished = true;
            return true;
        }
        if self.time < 0.0 {
            self.time = 0.0;
        }
        false
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn sample(&self) -> TimelinePose {
        self.timeline.sample(self.time)
    }
}
