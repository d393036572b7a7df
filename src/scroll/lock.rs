//! Global scroll lock.
//!
//! Page scrolling is suppressed while any holder is registered. The preloader
//! holds the lock until readiness settles and an entrance sequence holds it for
//! the duration of its timeline; the shell only sees the single
//! `scroll_locked` flag.

use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::signal::{Broadcaster, Subscription};

/// Why the page is currently locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockReason {
    Preloader,
    Entrance,
    Custom(&'static str),
}

/// Multiset of holders behind one boolean.
pub struct ScrollLock {
    holders: Mutex<SmallVec<[LockReason; 4]>>,
    changes: Broadcaster<bool>,
}

impl Default for ScrollLock {
    fn default() -> Self {
        Self {
            holders: Mutex::new(SmallVec::new()),
            changes: Broadcaster::new(),
        }
    }
}

impl ScrollLock {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a holder. Scrolling stays locked until every guard is
    /// released or dropped.
    #[must_use = "the lock is released when the guard is dropped"]
    pub fn acquire(self: &Arc<Self>, reason: LockReason) -> ScrollLockGuard {
        let became_locked = {
            let mut holders = self.holders.lock();
            holders.push(reason);
            holders.len() == 1
        };
        log::debug!("Scroll lock acquired by {reason:?}");
        if became_locked {
            self.changes.emit(true);
        }

        ScrollLockGuard {
            lock: Arc::clone(self),
            reason,
            released: false,
        }
    }

    fn release(&self, reason: LockReason) {
        let became_unlocked = {
            let mut holders = self.holders.lock();
            let Some(pos) = holders.iter().position(|r| *r == reason) else {
                return;
            };
            holders.remove(pos);
            holders.is_empty()
        };
        log::debug!("Scroll lock released by {reason:?}");
        if became_unlocked {
            self.changes.emit(false);
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        !self.holders.lock().is_empty()
    }

    #[must_use]
    pub fn holders(&self) -> Vec<LockReason> {
        self.holders.lock().to_vec()
    }

    /// Pushes the new `scroll_locked` value whenever it flips.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&bool) + Send + Sync + 'static) -> Subscription {
        self.changes.subscribe(callback)
    }
}

impl std::fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollLock")
            .field("holders", &*self.holders.lock())
            .finish_non_exhaustive()
    }
}

/// One registered holder of a [`ScrollLock`].
#[derive(Debug)]
pub struct ScrollLockGuard {
    lock: Arc<ScrollLock>,
    reason: LockReason,
    released: bool,
}

impl ScrollLockGuard {
    #[must_use]
    pub fn reason(&self) -> LockReason {
        self.reason
    }

    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if !self.released {
            self.released = true;
            self.lock.release(self.reason);
        }
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}
