#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Timer for tracking frame timing and elapsed time.
///
/// Driven either by the wall clock ([`Timer::tick`]) or by explicit deltas
/// ([`Timer::advance`]) when the host supplies its own frame timestamps.
#[derive(Debug, Clone)]
pub struct Timer {
    last_update: Instant,
    /// Time since last tick
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Creates a new timer starting from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Samples the wall clock and records one frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.record(now - self.last_update);
        self.last_update = now;
    }

    /// Records one frame of exactly `delta`.
    pub fn advance(&mut self, delta: Duration) {
        self.last_update += delta;
        self.record(delta);
    }

    fn record(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}
