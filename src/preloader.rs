//! Readiness-Gated Preloader
//!
//! UI-facing consumer of the readiness store. While the page is not ready it
//! holds the scroll lock and exposes a `{loaded, total}` progress indicator.
//! Once readiness holds it waits `settle_delay`, then releases the lock and
//! reveals the content; the indicator fades out from there.
//!
//! ```text
//!  Loading ──(all_loaded)──► Settling ──(settle_delay elapsed)──► Revealed
//!     ▲                         │                                   │
//!     └──────(readiness lost)───┴───────────(readiness lost)────────┘
//! ```
//!
//! Readiness is lost when the store is re-initialized for a new asset set.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::animation::smoothing::Smoothed;
use crate::assets::{AssetReadinessStore, LoadProgress, ReadinessSnapshot};
use crate::errors::{Result, VitrineError};
use crate::scroll::{LockReason, ScrollLock, ScrollLockGuard};
use crate::signal::Subscription;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloaderConfig {
    /// Seconds between readiness and reveal.
    pub settle_delay: f32,
    pub label: String,
    /// Per-second rate of the indicator fade.
    pub fade_speed: f32,
}

impl Default for PreloaderConfig {
    fn default() -> Self {
        Self {
            settle_delay: 0.5,
            label: "Loading".to_string(),
            fade_speed: 6.0,
        }
    }
}

impl PreloaderConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.settle_delay.is_finite() || self.settle_delay < 0.0 {
            return Err(VitrineError::InvalidConfig {
                field: "preloader.settle_delay",
                reason: format!("must be finite and non-negative, got {}", self.settle_delay),
            });
        }
        if !self.fade_speed.is_finite() || self.fade_speed <= 0.0 {
            return Err(VitrineError::InvalidConfig {
                field: "preloader.fade_speed",
                reason: format!("must be positive, got {}", self.fade_speed),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreloaderPhase {
    Loading,
    /// Ready; waiting `remaining` more seconds before the reveal.
    Settling { remaining: f32 },
    Revealed,
}

#[derive(Debug)]
struct PreloaderState {
    phase: PreloaderPhase,
    progress: LoadProgress,
    opacity: Smoothed<f32>,
}

/// What the caller must do with the scroll lock after a state change. Lock
/// traffic happens outside the state mutex since it notifies subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockAction {
    None,
    Acquire,
    Release,
}

pub struct ReadinessGatedPreloader {
    config: PreloaderConfig,
    store: Arc<AssetReadinessStore>,
    scroll_lock: Arc<ScrollLock>,
    state: Mutex<PreloaderState>,
    guard: Mutex<Option<ScrollLockGuard>>,
    subscription: Mutex<Option<Subscription>>,
}

impl ReadinessGatedPreloader {
    /// Creates the preloader in `Loading`, locks scrolling and starts
    /// following `store`.
    #[must_use]
    pub fn attach(
        config: PreloaderConfig,
        store: Arc<AssetReadinessStore>,
        scroll_lock: Arc<ScrollLock>,
    ) -> Arc<Self> {
        let opacity = Smoothed::new(1.0, config.fade_speed);
        let preloader = Arc::new(Self {
            config,
            store,
            scroll_lock,
            state: Mutex::new(PreloaderState {
                phase: PreloaderPhase::Loading,
                progress: LoadProgress::default(),
                opacity,
            }),
            guard: Mutex::new(None),
            subscription: Mutex::new(None),
        });

        preloader.apply_lock(LockAction::Acquire);

        let weak: Weak<Self> = Arc::downgrade(&preloader);
        let subscription = preloader.store.subscribe(move |snapshot| {
            if let Some(preloader) = weak.upgrade() {
                preloader.on_readiness(snapshot);
            }
        });
        *preloader.subscription.lock() = Some(subscription);

        preloader.on_readiness(&preloader.store.snapshot());
        preloader
    }

    fn on_readiness(&self, snapshot: &ReadinessSnapshot) {
        let action = {
            let mut state = self.state.lock();
            state.progress = snapshot.progress;

            match (state.phase, snapshot.all_loaded) {
                (PreloaderPhase::Loading, true) => {
                    log::debug!(
                        "Preloader settling for {:.2}s ({} assets)",
                        self.config.settle_delay,
                        snapshot.progress.total
                    );
                    state.phase = PreloaderPhase::Settling {
                        remaining: self.config.settle_delay,
                    };
                    if self.config.settle_delay <= 0.0 {
                        Self::reveal(&mut state)
                    } else {
                        LockAction::None
                    }
                }
                (PreloaderPhase::Settling { .. }, false) => {
                    log::debug!("Readiness lost while settling; preloader back to loading");
                    state.phase = PreloaderPhase::Loading;
                    LockAction::None
                }
                (PreloaderPhase::Revealed, false) => {
                    log::info!("Readiness lost after reveal; preloader back to loading");
                    state.phase = PreloaderPhase::Loading;
                    LockAction::Acquire
                }
                _ => LockAction::None,
            }
        };
        self.apply_lock(action);
    }

    fn reveal(state: &mut PreloaderState) -> LockAction {
        state.phase = PreloaderPhase::Revealed;
        log::info!(
            "Content revealed ({}/{} assets)",
            state.progress.loaded,
            state.progress.total
        );
        LockAction::Release
    }

    fn apply_lock(&self, action: LockAction) {
        match action {
            LockAction::None => {}
            LockAction::Acquire => {
                let guard = self.scroll_lock.acquire(LockReason::Preloader);
                let previous = self.guard.lock().replace(guard);
                drop(previous);
            }
            LockAction::Release => {
                let guard = self.guard.lock().take();
                drop(guard);
            }
        }
    }

    /// Advances the settle countdown and the indicator fade by `dt` seconds.
    pub fn tick(&self, dt: f32) {
        let action = {
            let mut state = self.state.lock();
            let action = match state.phase {
                PreloaderPhase::Settling { remaining } => {
                    let remaining = remaining - dt;
                    if remaining <= 0.0 {
                        Self::reveal(&mut state)
                    } else {
                        state.phase = PreloaderPhase::Settling { remaining };
                        LockAction::None
                    }
                }
                PreloaderPhase::Loading | PreloaderPhase::Revealed => LockAction::None,
            };

            let target = if state.phase == PreloaderPhase::Revealed {
                0.0
            } else {
                1.0
            };
            state.opacity.update(target, dt);
            action
        };
        self.apply_lock(action);
    }

    #[must_use]
    pub fn phase(&self) -> PreloaderPhase {
        self.state.lock().phase
    }

    #[must_use]
    pub fn progress(&self) -> LoadProgress {
        self.state.lock().progress
    }

    #[must_use]
    pub fn fraction(&self) -> f32 {
        self.progress().fraction()
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.config.label
    }

    #[must_use]
    pub fn is_content_visible(&self) -> bool {
        self.phase() == PreloaderPhase::Revealed
    }

    /// Whether this preloader currently holds the scroll lock.
    #[must_use]
    pub fn is_holding_lock(&self) -> bool {
        self.guard.lock().is_some()
    }

    /// Indicator opacity in `[0, 1]`; fades toward zero once revealed.
    #[must_use]
    pub fn indicator_opacity(&self) -> f32 {
        self.state.lock().opacity.value()
    }

    #[must_use]
    pub fn store(&self) -> &Arc<AssetReadinessStore> {
        &self.store
    }

    /// Stops following the store and releases the scroll lock.
    pub fn detach(&self) {
        let subscription = self.subscription.lock().take();
        drop(subscription);
        self.apply_lock(LockAction::Release);
    }
}

impl std::fmt::Debug for ReadinessGatedPreloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ReadinessGatedPreloader")
            .field("phase", &state.phase)
            .field("progress", &state.progress)
            .field("label", &self.config.label)
            .finish_non_exhaustive()
    }
}
