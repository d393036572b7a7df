//! Scroll Signal
//!
//! Maps the viewport's scroll offset to a normalized progress value for one
//! region, plus an `in_view` flag from the intersection test. Progress is the
//! single driving input of every scroll-synchronized animation.
//!
//! # Breakpoints
//!
//! A [`ScrollRange`] names two scroll offsets by pairing a point in the region
//! with a point in the viewport, in the manner of "region top meets viewport
//! bottom". The default range starts when the region enters from below and
//! ends when 80% of the region has scrolled past the viewport top.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VitrineError};
use crate::scroll::viewport::{Region, Viewport};
use crate::signal::{Broadcaster, Subscription};

/// Linearly maps `value` from `input` onto `output`.
///
/// With `clamp` the result stays within `output`; without it the mapping
/// extrapolates, which elastic effects use for overshoot. A degenerate input
/// range acts as a step at `input.0`.
#[must_use]
pub fn map_range(value: f32, input: (f32, f32), output: (f32, f32), clamp: bool) -> f32 {
    let (in0, in1) = input;
    let (out0, out1) = output;

    let span = in1 - in0;
    if span.abs() <= f32::EPSILON {
        return if value < in0 { out0 } else { out1 };
    }

    let mut t = (value - in0) / span;
    if clamp {
        t = t.clamp(0.0, 1.0);
    }
    out0 + (out1 - out0) * t
}

/// One breakpoint: the scroll offset at which the point `region` (fraction of
/// the region's height from its top) lines up with the point `viewport`
/// (fraction of the viewport's height from its top).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub region: f32,
    pub viewport: f32,
}

impl Anchor {
    /// Region top meets viewport bottom.
    pub const ENTER: Self = Self {
        region: 0.0,
        viewport: 1.0,
    };

    #[must_use]
    pub fn new(region: f32, viewport: f32) -> Self {
        Self { region, viewport }
    }

    #[must_use]
    pub fn scroll_offset(&self, region: &Region, viewport_height: f32) -> f32 {
        region.top + self.region * region.height - self.viewport * viewport_height
    }

    fn is_finite(&self) -> bool {
        self.region.is_finite() && self.viewport.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollRange {
    pub start: Anchor,
    pub end: Anchor,
}

impl Default for ScrollRange {
    fn default() -> Self {
        Self {
            start: Anchor::ENTER,
            end: Anchor::new(0.8, 0.0),
        }
    }
}

impl ScrollRange {
    /// Scroll offsets of the two breakpoints.
    #[must_use]
    pub fn offsets(&self, region: &Region, viewport_height: f32) -> (f32, f32) {
        (
            self.start.scroll_offset(region, viewport_height),
            self.end.scroll_offset(region, viewport_height),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSignalConfig {
    pub range: ScrollRange,
    /// Keep progress within `[0, 1]`. Disable for overshoot.
    pub clamp: bool,
    /// Minimum visible fraction of the region for `in_view`.
    pub visibility_threshold: f32,
}

impl Default for ScrollSignalConfig {
    fn default() -> Self {
        Self {
            range: ScrollRange::default(),
            clamp: true,
            visibility_threshold: 0.1,
        }
    }
}

impl ScrollSignalConfig {
    pub fn validate(&self) -> Result<()> {
        let t = self.visibility_threshold;
        if t.is_nan() || t <= 0.0 || t > 1.0 {
            return Err(VitrineError::InvalidVisibilityThreshold(t));
        }
        if !self.range.start.is_finite() || !self.range.end.is_finite() {
            return Err(VitrineError::InvalidConfig {
                field: "scroll.range",
                reason: "anchors must be finite".to_string(),
            });
        }
        Ok(())
    }
}

/// Current output of a [`ScrollSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollProgress {
    pub progress: f32,
    pub in_view: bool,
}

impl ScrollProgress {
    /// Defined starting value, delivered before the first scroll event.
    pub const INITIAL: Self = Self {
        progress: 0.0,
        in_view: false,
    };

    /// Pure computation behind [`ScrollSignal::update`].
    #[must_use]
    pub fn compute(region: &Region, viewport: &Viewport, config: &ScrollSignalConfig) -> Self {
        let (start, end) = config.range.offsets(region, viewport.height);
        Self {
            progress: map_range(viewport.scroll_y, (start, end), (0.0, 1.0), config.clamp),
            in_view: region.is_visible(viewport, config.visibility_threshold),
        }
    }
}

struct SignalState {
    region: Region,
    current: ScrollProgress,
}

/// Push-based scroll progress for one region.
pub struct ScrollSignal {
    config: ScrollSignalConfig,
    state: RwLock<SignalState>,
    changes: Broadcaster<ScrollProgress>,
}

impl ScrollSignal {
    pub fn new(region: Region, config: ScrollSignalConfig) -> Result<Self> {
        if region.height.is_nan() || region.height <= 0.0 {
            return Err(VitrineError::InvalidRegion(region.height));
        }
        config.validate()?;

        Ok(Self {
            config,
            state: RwLock::new(SignalState {
                region,
                current: ScrollProgress::INITIAL,
            }),
            changes: Broadcaster::new(),
        })
    }

    /// Recomputes progress for a new viewport and pushes it to subscribers.
    /// Every scroll tick is delivered, changed or not.
    pub fn update(&self, viewport: Viewport) -> ScrollProgress {
        let next = {
            let mut state = self.state.write();
            let next = ScrollProgress::compute(&state.region, &viewport, &self.config);
            if next.in_view != state.current.in_view {
                log::trace!(
                    "Region at {} {} view",
                    state.region.top,
                    if next.in_view { "entered" } else { "left" }
                );
            }
            state.current = next;
            next
        };

        self.changes.emit(next);
        next
    }

    /// Moves the tracked region after a layout change. Takes effect on the
    /// next [`Self::update`].
    pub fn set_region(&self, region: Region) -> Result<()> {
        if region.height.is_nan() || region.height <= 0.0 {
            return Err(VitrineError::InvalidRegion(region.height));
        }
        self.state.write().region = region;
        Ok(())
    }

    #[must_use]
    pub fn region(&self) -> Region {
        self.state.read().region
    }

    #[must_use]
    pub fn current(&self) -> ScrollProgress {
        self.state.read().current
    }

    #[must_use]
    pub fn config(&self) -> &ScrollSignalConfig {
        &self.config
    }

    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(
        &self,
        callback: impl Fn(&ScrollProgress) + Send + Sync + 'static,
    ) -> Subscription {
        self.changes.subscribe(callback)
    }
}
