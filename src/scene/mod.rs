//! Scene Mounting
//!
//! - [`SceneNode`]: one mounted 3D scene and its per-frame wiring
//! - [`Transform`]: the group transform shared with the renderer

pub mod node;
pub mod transform;

pub use node::{SceneDescriptor, SceneNode};
pub use transform::{SharedTransform, Transform};
