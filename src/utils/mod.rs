//! Utility Module
//!
//! - [`Timer`]: frame delta / elapsed time bookkeeping
//! - [`OneShot`]: forward-only run-once latch

pub mod one_shot;
pub mod time;

pub use one_shot::OneShot;
pub use time::Timer;
