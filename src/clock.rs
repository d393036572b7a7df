//! Frame Clock
//!
//! The host's per-frame callback, modeled as a [`Broadcaster`] of
//! [`FrameTime`]. Every mounted scene registers one callback; dropping its
//! [`Subscription`] stops it immediately.
//!
//! The clock is driven either from the wall clock ([`FrameClock::tick`]) or
//! with explicit deltas ([`FrameClock::advance`]) when the host supplies its
//! own timestamps.

use std::time::Duration;

use parking_lot::Mutex;

use crate::signal::{Broadcaster, Subscription};
use crate::utils::Timer;

/// Timing of one frame, as seen by frame callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Seconds since the clock started.
    pub elapsed: f32,
    pub frame: u64,
}

pub struct FrameClock {
    timer: Mutex<Timer>,
    frames: Broadcaster<FrameTime>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            timer: Mutex::new(Timer::new()),
            frames: Broadcaster::new(),
        }
    }

    /// Samples the wall clock and runs one frame.
    pub fn tick(&self) -> FrameTime {
        let frame = {
            let mut timer = self.timer.lock();
            timer.tick();
            Self::frame_time(&timer)
        };
        self.frames.emit(frame);
        frame
    }

    /// Runs one frame of exactly `delta`.
    pub fn advance(&self, delta: Duration) -> FrameTime {
        let frame = {
            let mut timer = self.timer.lock();
            timer.advance(delta);
            Self::frame_time(&timer)
        };
        self.frames.emit(frame);
        frame
    }

    fn frame_time(timer: &Timer) -> FrameTime {
        FrameTime {
            delta: timer.dt_seconds(),
            elapsed: timer.elapsed_seconds(),
            frame: timer.frame_count,
        }
    }

    /// Registers a per-frame callback.
    #[must_use = "dropping the Subscription stops the callback"]
    pub fn on_frame(&self, callback: impl Fn(&FrameTime) + Send + Sync + 'static) -> Subscription {
        self.frames.subscribe(callback)
    }

    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.frames.subscriber_count()
    }

    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.timer.lock().elapsed_seconds()
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.timer.lock().frame_count
    }
}

impl std::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let timer = self.timer.lock();
        f.debug_struct("FrameClock")
            .field("elapsed", &timer.elapsed)
            .field("frame_count", &timer.frame_count)
            .field("callbacks", &self.frames.subscriber_count())
            .finish()
    }
}
