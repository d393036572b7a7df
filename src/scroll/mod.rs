//! Scroll Input
//!
//! - [`ScrollSignal`]: normalized progress + `in_view` for one region
//! - [`ScrollLock`]: the global `scroll_locked` effect
//! - [`Viewport`] / [`Region`]: geometry and intersection

pub mod lock;
pub mod signal;
pub mod viewport;

pub use lock::{LockReason, ScrollLock, ScrollLockGuard};
pub use signal::{Anchor, ScrollProgress, ScrollRange, ScrollSignal, ScrollSignalConfig, map_range};
pub use viewport::{Region, Viewport};
