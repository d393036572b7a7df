//! Render Gate
//!
//! Throttles the render loop of a scene that is outside the viewport. An
//! off-screen scene keeps drawing at a low but nonzero rate (one frame per
//! `idle_interval`) instead of being torn down, so its GPU context stays warm.
//! Entering the viewport restores every-frame rendering immediately.
//!
//! An entrance sequence holds a [`RenderOverride`] while it plays so the
//! timeline cannot stall if the scene briefly scrolls out of view.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VitrineError};
use crate::scroll::{Region, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderGateConfig {
    /// Seconds between frames while throttled.
    pub idle_interval: f32,
    /// Visible fraction required to count as in view; `0` means any overlap.
    pub visibility_threshold: f32,
}

impl Default for RenderGateConfig {
    fn default() -> Self {
        Self {
            idle_interval: 1.0,
            visibility_threshold: 0.0,
        }
    }
}

impl RenderGateConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.idle_interval.is_finite() || self.idle_interval <= 0.0 {
            return Err(VitrineError::InvalidConfig {
                field: "render_gate.idle_interval",
                reason: format!("must be positive, got {}", self.idle_interval),
            });
        }
        let t = self.visibility_threshold;
        if t.is_nan() || !(0.0..=1.0).contains(&t) {
            return Err(VitrineError::InvalidConfig {
                field: "render_gate.visibility_threshold",
                reason: format!("must lie in [0, 1], got {t}"),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Draw every frame.
    Continuous,
    /// Draw once per idle interval.
    Throttled,
}

#[derive(Debug, Default)]
struct GateState {
    in_view: bool,
    overrides: usize,
    since_last_frame: f32,
}

impl GateState {
    fn mode(&self) -> RenderMode {
        if self.in_view || self.overrides > 0 {
            RenderMode::Continuous
        } else {
            RenderMode::Throttled
        }
    }
}

#[derive(Debug)]
pub struct RenderGate {
    config: RenderGateConfig,
    state: Mutex<GateState>,
}

impl RenderGate {
    /// Starts out of view (throttled) until the first visibility update.
    #[must_use]
    pub fn new(config: RenderGateConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            state: Mutex::new(GateState::default()),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RenderGateConfig {
        &self.config
    }

    pub fn set_in_view(&self, in_view: bool) {
        let mut state = self.state.lock();
        if state.in_view == in_view {
            return;
        }
        let before = state.mode();
        state.in_view = in_view;
        state.since_last_frame = 0.0;
        let after = state.mode();
        if before != after {
            log::trace!("Render gate switched to {after:?}");
        }
    }

    /// Runs the gate's own visibility test for `region` against `viewport`.
    pub fn observe(&self, region: &Region, viewport: &Viewport) {
        self.set_in_view(region.is_visible(viewport, self.config.visibility_threshold));
    }

    #[must_use]
    pub fn is_in_view(&self) -> bool {
        self.state.lock().in_view
    }

    #[must_use]
    pub fn mode(&self) -> RenderMode {
        self.state.lock().mode()
    }

    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.state.lock().overrides > 0
    }

    /// Consulted once per frame callback. Returns `None` for a skipped frame,
    /// otherwise the seconds since the last drawn frame, so a throttled draw
    /// covers the whole interval it stood in for.
    pub fn should_render(&self, dt: f32) -> Option<f32> {
        let mut state = self.state.lock();
        state.since_last_frame += dt;
        let due = match state.mode() {
            RenderMode::Continuous => true,
            RenderMode::Throttled => state.since_last_frame >= self.config.idle_interval,
        };
        if due {
            Some(std::mem::take(&mut state.since_last_frame))
        } else {
            None
        }
    }

    /// Forces continuous rendering until the returned guard is dropped.
    #[must_use = "the override ends when the guard is dropped"]
    pub fn hold_override(self: &Arc<Self>) -> RenderOverride {
        {
            let mut state = self.state.lock();
            if state.overrides == 0 && !state.in_view {
                state.since_last_frame = 0.0;
            }
            state.overrides += 1;
        }
        RenderOverride {
            gate: Arc::clone(self),
            released: false,
        }
    }
}

/// Keeps a [`RenderGate`] in continuous mode while alive.
#[derive(Debug)]
pub struct RenderOverride {
    gate: Arc<RenderGate>,
    released: bool,
}

impl RenderOverride {
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if !self.released {
            self.released = true;
            let mut state = self.gate.state.lock();
            state.overrides = state.overrides.saturating_sub(1);
            state.since_last_frame = 0.0;
        }
    }
}

impl Drop for RenderOverride {
    fn drop(&mut self) {
        self.release_inner();
    }
}
