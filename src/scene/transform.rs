use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec3};
use parking_lot::RwLock;

use crate::animation::continuous::AnimationTarget;

/// Handle to a transform shared between the animation side (writer) and the
/// renderer (reader).
pub type SharedTransform = Arc<RwLock<Transform>>;

/// Transform of one animated group.
///
/// Keeps a shadow copy of the last committed TRS so the renderer can skip
/// matrix rebuilds for groups that did not move this frame.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    /// Euler XYZ, radians.
    pub rotation: Vec3,
    pub scale: Vec3,

    last_position: Vec3,
    last_rotation: Vec3,
    last_scale: Vec3,
    version: u64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self::from_target(&AnimationTarget::default())
    }

    #[must_use]
    pub fn from_target(target: &AnimationTarget) -> Self {
        Self {
            position: target.position,
            rotation: target.rotation,
            scale: target.scale,
            last_position: target.position,
            last_rotation: target.rotation,
            last_scale: target.scale,
            version: 0,
        }
    }

    #[must_use]
    pub fn shared(self) -> SharedTransform {
        Arc::new(RwLock::new(self))
    }

    #[must_use]
    pub fn target(&self) -> AnimationTarget {
        AnimationTarget {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    /// Copies `target` in and commits. Returns whether anything changed.
    pub fn apply_target(&mut self, target: &AnimationTarget) -> bool {
        self.position = target.position;
        self.rotation = target.rotation;
        self.scale = target.scale;
        self.commit()
    }

    /// Compares against the shadow state and bumps the version on change.
    pub fn commit(&mut self) -> bool {
        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale;

        if changed {
            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.version = self.version.wrapping_add(1);
        }
        changed
    }

    /// Incremented by every committed change.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Local matrix for upload by the renderer.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }
}
