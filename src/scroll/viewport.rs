//! Viewport / region geometry and the intersection test shared by
//! [`ScrollSignal`](crate::scroll::ScrollSignal) and
//! [`RenderGate`](crate::render_gate::RenderGate).
//!
//! All lengths are document-space pixels along the scroll axis.

use serde::{Deserialize, Serialize};

/// The visible window onto the document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// Document offset of the viewport's top edge.
    pub scroll_y: f32,
    pub height: f32,
}

impl Viewport {
    #[must_use]
    pub fn new(scroll_y: f32, height: f32) -> Self {
        Self { scroll_y, height }
    }

    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.scroll_y + self.height
    }

    #[must_use]
    pub fn scrolled_to(self, scroll_y: f32) -> Self {
        Self { scroll_y, ..self }
    }
}

/// A page section tracked for scroll progress or visibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Document offset of the region's top edge.
    pub top: f32,
    pub height: f32,
}

impl Region {
    #[must_use]
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Fraction of the region currently inside `viewport`, in `[0, 1]`.
    #[must_use]
    pub fn intersection_ratio(&self, viewport: &Viewport) -> f32 {
        if self.height <= 0.0 {
            return 0.0;
        }
        let overlap = self.bottom().min(viewport.bottom()) - self.top.max(viewport.scroll_y);
        (overlap / self.height).clamp(0.0, 1.0)
    }

    /// Intersection-observer style test: any overlap when `threshold` is zero,
    /// otherwise at least `threshold` of the region must be visible.
    #[must_use]
    pub fn is_visible(&self, viewport: &Viewport, threshold: f32) -> bool {
        let ratio = self.intersection_ratio(viewport);
        ratio > 0.0 && ratio >= threshold
    }
}
