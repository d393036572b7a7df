//! One-shot latch shared by asset reporting and entrance sequencing.

/// Tagged run-once state stored per owning instance.
///
/// Transitions only move forward (`NotStarted -> Started -> Done`) and every
/// transition is guarded by an equality check on the current state, so a
/// repeated trigger is a no-op rather than a second run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OneShot {
    #[default]
    NotStarted,
    Started,
    Done,
}

impl OneShot {
    #[must_use]
    pub fn new() -> Self {
        Self::NotStarted
    }

    /// `NotStarted -> Started`. Returns `true` only for the call that performed
    /// the transition.
    pub fn try_start(&mut self) -> bool {
        if *self == Self::NotStarted {
            *self = Self::Started;
            true
        } else {
            false
        }
    }

    /// `Started -> Done`. Returns `true` only for the call that performed the
    /// transition.
    pub fn finish(&mut self) -> bool {
        if *self == Self::Started {
            *self = Self::Done;
            true
        } else {
            false
        }
    }

    /// Runs `f` the first time this is called, then latches `Done`.
    pub fn run_once(&mut self, f: impl FnOnce()) -> bool {
        if self.try_start() {
            f();
            self.finish();
            true
        } else {
            false
        }
    }

    #[inline]
    #[must_use]
    pub fn has_started(&self) -> bool {
        *self != Self::NotStarted
    }

    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        *self == Self::Done
    }
}
