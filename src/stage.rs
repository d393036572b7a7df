//! Stage
//!
//! The page-scoped composition root. A [`Stage`] lives for one page visit and
//! owns the services every scene on that page shares:
//!
//! - the [`AssetReadinessStore`], initialized from the page's [`AssetManifest`]
//! - the global [`ScrollLock`] and the current [`Viewport`]
//! - the [`FrameClock`] driving every per-frame callback
//! - the [`ReadinessGatedPreloader`]
//!
//! Scenes are mounted through [`Stage::mount_scene`] and receive these
//! services by handle; nothing here is global.
//!
//! # Example
//!
//! ```rust,ignore
//! let stage = Stage::mount(StageConfig::default(), AssetManifest::for_catalog(["sofa"]))?;
//! let hero = stage.mount_scene(stage.describe_hero(Region::new(0.0, 900.0)))?;
//!
//! // host loop
//! hero.on_resource(Some(&model));
//! stage.advance(Duration::from_millis(16));
//! stage.scroll_to(420.0);
//! ```

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use crate::assets::{AssetId, AssetManifest, AssetReadinessStore};
use crate::clock::{FrameClock, FrameTime};
use crate::config::StageConfig;
use crate::errors::Result;
use crate::preloader::ReadinessGatedPreloader;
use crate::scene::node::SceneContext;
use crate::scene::{SceneDescriptor, SceneNode};
use crate::scroll::{Region, ScrollLock, Viewport};
use crate::signal::{Broadcaster, Subscription};

pub struct Stage {
    config: StageConfig,
    store: Arc<AssetReadinessStore>,
    scroll_lock: Arc<ScrollLock>,
    clock: FrameClock,
    viewport: Mutex<Viewport>,
    viewport_changes: Broadcaster<Viewport>,
    preloader: Arc<ReadinessGatedPreloader>,
    _preloader_frames: Subscription,
}

impl Stage {
    /// Validates `config`, declares `manifest` and starts the preloader.
    pub fn mount(config: StageConfig, manifest: AssetManifest) -> Result<Self> {
        config.validate()?;

        log::info!("Mounting stage with {} declared assets", manifest.len());

        let store = Arc::new(AssetReadinessStore::with_assets(manifest));
        let scroll_lock = ScrollLock::new();
        let clock = FrameClock::new();

        let preloader = ReadinessGatedPreloader::attach(
            config.preloader.clone(),
            Arc::clone(&store),
            Arc::clone(&scroll_lock),
        );
        let weak: Weak<ReadinessGatedPreloader> = Arc::downgrade(&preloader);
        let preloader_frames = clock.on_frame(move |frame| {
            if let Some(preloader) = weak.upgrade() {
                preloader.tick(frame.delta);
            }
        });

        Ok(Self {
            viewport: Mutex::new(config.viewport),
            config,
            store,
            scroll_lock,
            clock,
            viewport_changes: Broadcaster::new(),
            preloader,
            _preloader_frames: preloader_frames,
        })
    }

    /// Re-declares the asset set for a new page within the same host.
    /// Readiness resets and the preloader returns to loading.
    pub fn navigate(&self, manifest: AssetManifest) {
        log::info!("Navigating: {} declared assets", manifest.len());
        self.store.initialize(manifest);
    }

    /// Scene descriptor pre-filled with this stage's defaults.
    #[must_use]
    pub fn describe_scene(&self, asset: impl Into<AssetId>, region: Region) -> SceneDescriptor {
        SceneDescriptor::new(asset, region)
            .with_scroll(self.config.scroll)
            .with_animator(self.config.animator)
            .with_render_gate(self.config.render_gate)
    }

    /// The hero scene: the default descriptor plus the configured entrance.
    #[must_use]
    pub fn describe_hero(&self, region: Region) -> SceneDescriptor {
        self.describe_scene(AssetId::HERO, region)
            .with_entrance(self.config.entrance.clone())
    }

    pub fn mount_scene(&self, descriptor: SceneDescriptor) -> Result<SceneNode> {
        let ctx = SceneContext {
            store: &self.store,
            scroll_lock: &self.scroll_lock,
            clock: &self.clock,
            viewport: &self.viewport_changes,
            current_viewport: self.viewport(),
        };
        SceneNode::mount(descriptor, &ctx)
    }

    /// User scroll input. Ignored while the scroll lock is held; returns
    /// whether the viewport moved.
    pub fn scroll_to(&self, scroll_y: f32) -> bool {
        if !scroll_y.is_finite() {
            log::warn!("Ignoring non-finite scroll offset {scroll_y}");
            return false;
        }
        if self.scroll_lock.is_locked() {
            log::trace!(
                "Scroll to {scroll_y} ignored; locked by {:?}",
                self.scroll_lock.holders()
            );
            return false;
        }
        let viewport = {
            let mut viewport = self.viewport.lock();
            *viewport = viewport.scrolled_to(scroll_y);
            *viewport
        };
        self.viewport_changes.emit(viewport);
        true
    }

    /// Viewport size change; applied even while scrolling is locked. Heights
    /// that are not finite and positive are ignored. Returns whether the
    /// viewport changed.
    pub fn resize(&self, height: f32) -> bool {
        if !height.is_finite() || height <= 0.0 {
            log::warn!("Ignoring viewport resize to invalid height {height}");
            return false;
        }
        let viewport = {
            let mut viewport = self.viewport.lock();
            viewport.height = height;
            *viewport
        };
        self.viewport_changes.emit(viewport);
        true
    }

    /// Runs one frame of exactly `delta`.
    pub fn advance(&self, delta: Duration) -> FrameTime {
        self.clock.advance(delta)
    }

    /// Runs one frame timed by the wall clock.
    pub fn tick(&self) -> FrameTime {
        self.clock.tick()
    }

    #[must_use]
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<AssetReadinessStore> {
        &self.store
    }

    #[must_use]
    pub fn scroll_lock(&self) -> &Arc<ScrollLock> {
        &self.scroll_lock
    }

    #[must_use]
    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_lock.is_locked()
    }

    #[must_use]
    pub fn preloader(&self) -> &Arc<ReadinessGatedPreloader> {
        &self.preloader
    }

    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        *self.viewport.lock()
    }

    /// Pushes every viewport change.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn on_viewport(&self, callback: impl Fn(&Viewport) + Send + Sync + 'static) -> Subscription {
        self.viewport_changes.subscribe(callback)
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        self.preloader.detach();
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("store", &self.store)
            .field("scroll_lock", &self.scroll_lock)
            .field("viewport", &self.viewport())
            .field("preloader", &self.preloader)
            .finish_non_exhaustive()
    }
}
