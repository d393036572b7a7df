//! Scene Node
//!
//! One mounted 3D scene on the page: the glue that wires a single asset to
//! the page-scoped services.
//!
//! - the asset's [`AssetReportingAdapter`] reports to the readiness store;
//! - a [`ScrollSignal`] over the scene's region feeds the [`ContinuousAnimator`];
//! - a [`RenderGate`] decides per frame whether the scene draws;
//! - an optional [`EntranceSequencer`] owns the group transform until its
//!   timeline finishes, then hands it to the animator.
//!
//! Each component sits behind its own lock, and no lock is held while a
//! notification goes out: load reports and entrance lock changes are taken
//! under the lock and delivered after it is released, so subscribers may
//! query the scene freely.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use glam::Vec3;
use parking_lot::Mutex;

use crate::animation::{
    AnimatorConfig, ContinuousAnimator, EntranceConfig, EntrancePhase, EntranceSequencer,
    OverlayState, SceneFrame,
};
use crate::assets::{
    AssetId, AssetReadinessStore, AssetReportingAdapter, PendingReport, ReadinessSnapshot,
};
use crate::clock::{FrameClock, FrameTime};
use crate::errors::Result;
use crate::render_gate::{RenderGate, RenderGateConfig, RenderMode};
use crate::scene::transform::{SharedTransform, Transform};
use crate::scroll::{Region, ScrollLock, ScrollProgress, ScrollSignal, ScrollSignalConfig, Viewport};
use crate::signal::{Broadcaster, Subscription};

/// Everything needed to mount one scene.
#[derive(Debug, Clone)]
pub struct SceneDescriptor {
    pub asset: AssetId,
    pub region: Region,
    pub scroll: ScrollSignalConfig,
    pub animator: AnimatorConfig,
    pub render_gate: RenderGateConfig,
    /// Staged intro; most scenes have none.
    pub entrance: Option<EntranceConfig>,
}

impl SceneDescriptor {
    #[must_use]
    pub fn new(asset: impl Into<AssetId>, region: Region) -> Self {
        Self {
            asset: asset.into(),
            region,
            scroll: ScrollSignalConfig::default(),
            animator: AnimatorConfig::default(),
            render_gate: RenderGateConfig::default(),
            entrance: None,
        }
    }

    #[must_use]
    pub fn with_scroll(mut self, scroll: ScrollSignalConfig) -> Self {
        self.scroll = scroll;
        self
    }

    #[must_use]
    pub fn with_animator(mut self, animator: AnimatorConfig) -> Self {
        self.animator = animator;
        self
    }

    #[must_use]
    pub fn with_render_gate(mut self, render_gate: RenderGateConfig) -> Self {
        self.render_gate = render_gate;
        self
    }

    #[must_use]
    pub fn with_entrance(mut self, entrance: EntranceConfig) -> Self {
        self.entrance = Some(entrance);
        self
    }
}

/// Page-scoped services a scene attaches to.
pub(crate) struct SceneContext<'a> {
    pub store: &'a Arc<AssetReadinessStore>,
    pub scroll_lock: &'a Arc<ScrollLock>,
    pub clock: &'a FrameClock,
    pub viewport: &'a Broadcaster<Viewport>,
    pub current_viewport: Viewport,
}

struct SceneInner {
    asset: AssetId,
    mounted: AtomicBool,

    reporter: Mutex<AssetReportingAdapter>,
    scroll: ScrollSignal,
    gate: Arc<RenderGate>,
    animator: Mutex<ContinuousAnimator>,
    entrance: Option<Mutex<EntranceSequencer>>,
    transform: SharedTransform,

    last_frame: Mutex<Option<SceneFrame>>,
    frames_rendered: AtomicU64,
}

impl SceneInner {
    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    fn on_viewport(&self, viewport: Viewport) {
        if !self.is_mounted() {
            return;
        }
        self.gate.observe(&self.scroll.region(), &viewport);
        // Pushes to the animator through the scroll subscription.
        self.scroll.update(viewport);
    }

    fn on_readiness(&self, snapshot: &ReadinessSnapshot) {
        if !self.is_mounted() {
            return;
        }
        if let Some(entrance) = &self.entrance {
            let effects = entrance.lock().set_ready(snapshot.all_loaded);
            effects.apply();
        }
    }

    fn on_frame(&self, frame: &FrameTime) {
        if !self.is_mounted() {
            return;
        }

        let mut entrance_owns_transform = false;
        if let Some(entrance) = &self.entrance {
            let effects = {
                let mut entrance = entrance.lock();
                let effects = entrance.tick(frame.delta);
                entrance_owns_transform = entrance.phase() != EntrancePhase::Finished;
                effects
            };
            effects.apply();
        }

        let Some(dt) = self.gate.should_render(frame.delta) else {
            return;
        };

        if !entrance_owns_transform {
            let produced = self.animator.lock().tick(dt, frame.elapsed);
            if let Some(scene_frame) = produced {
                self.transform.write().apply_target(&scene_frame.transform);
                *self.last_frame.lock() = Some(scene_frame);
            }
        }
        self.frames_rendered.fetch_add(1, Ordering::Relaxed);
    }

    fn hand_off_to_animator(&self) {
        let target = self.transform.read().target();
        self.animator.lock().sync_transform(target);
        log::debug!("Scene `{}` handed over to continuous animation", self.asset);
    }
}

/// A mounted scene. Dropping it unmounts.
pub struct SceneNode {
    inner: Arc<SceneInner>,
    subscriptions: Vec<Subscription>,
}

impl SceneNode {
    pub(crate) fn mount(descriptor: SceneDescriptor, ctx: &SceneContext<'_>) -> Result<Self> {
        descriptor.animator.validate()?;
        descriptor.render_gate.validate()?;

        let scroll = ScrollSignal::new(descriptor.region, descriptor.scroll)?;
        let gate = RenderGate::new(descriptor.render_gate);

        let entrance = descriptor
            .entrance
            .as_ref()
            .map(|config| {
                EntranceSequencer::from_config(config, Arc::clone(ctx.scroll_lock))
                    .map(|seq| seq.with_render_gate(Arc::clone(&gate)))
            })
            .transpose()?;

        let animator = ContinuousAnimator::new(descriptor.animator);
        let transform = Transform::from_target(&animator.current()).shared();

        let inner = Arc::new(SceneInner {
            asset: descriptor.asset.clone(),
            mounted: AtomicBool::new(true),
            reporter: Mutex::new(AssetReportingAdapter::new(
                Arc::clone(ctx.store),
                descriptor.asset,
            )),
            scroll,
            gate,
            animator: Mutex::new(animator),
            entrance: entrance.map(Mutex::new),
            transform,
            last_frame: Mutex::new(None),
            frames_rendered: AtomicU64::new(0),
        });

        if let Some(entrance) = &inner.entrance {
            let weak = Arc::downgrade(&inner);
            entrance.lock().on_finished(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.hand_off_to_animator();
                }
            });
        }

        let weak: Weak<SceneInner> = Arc::downgrade(&inner);
        let mut subscriptions = Vec::with_capacity(4);

        subscriptions.push(inner.scroll.subscribe({
            let weak = weak.clone();
            move |progress| {
                if let Some(inner) = weak.upgrade() {
                    inner.animator.lock().set_scroll(*progress);
                }
            }
        }));
        subscriptions.push(ctx.viewport.subscribe({
            let weak = weak.clone();
            move |viewport| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_viewport(*viewport);
                }
            }
        }));
        subscriptions.push(ctx.store.subscribe({
            let weak = weak.clone();
            move |snapshot| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_readiness(snapshot);
                }
            }
        }));
        subscriptions.push(ctx.clock.on_frame(move |frame| {
            if let Some(inner) = weak.upgrade() {
                inner.on_frame(frame);
            }
        }));

        inner.on_viewport(ctx.current_viewport);
        inner.on_readiness(&ctx.store.snapshot());

        log::debug!(
            "Mounted scene `{}` (entrance: {})",
            inner.asset,
            inner.entrance.is_some()
        );

        Ok(Self {
            inner,
            subscriptions,
        })
    }

    /// Called by the loader whenever the asset resource changes; `None` while
    /// placeholder geometry is shown. Reports to the store at most once per
    /// mount.
    pub fn on_resource<R: ?Sized>(&self, resource: Option<&R>) -> bool {
        if !self.inner.is_mounted() {
            return false;
        }
        if resource.is_some() {
            if let Some(entrance) = &self.inner.entrance {
                let effects = entrance
                    .lock()
                    .register_transform(Arc::clone(&self.inner.transform));
                effects.apply();
            }
        }
        let report = self.inner.reporter.lock().claim(resource);
        report.map(PendingReport::send).is_some()
    }

    /// Stops every callback of this scene. Idempotent.
    pub fn unmount(&mut self) {
        if !self.inner.mounted.swap(false, Ordering::AcqRel) {
            return;
        }
        self.subscriptions.clear();
        self.inner.reporter.lock().unmount();
        if let Some(entrance) = &self.inner.entrance {
            let effects = entrance.lock().unmount();
            effects.apply();
        }
        log::debug!("Unmounted scene `{}`", self.inner.asset);
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.is_mounted()
    }

    #[must_use]
    pub fn asset(&self) -> &AssetId {
        &self.inner.asset
    }

    #[must_use]
    pub fn has_reported(&self) -> bool {
        self.inner.reporter.lock().has_reported()
    }

    #[must_use]
    pub fn transform(&self) -> SharedTransform {
        Arc::clone(&self.inner.transform)
    }

    #[must_use]
    pub fn scroll_progress(&self) -> ScrollProgress {
        self.inner.scroll.current()
    }

    #[must_use]
    pub fn region(&self) -> Region {
        self.inner.scroll.region()
    }

    /// Moves the scene's region, e.g. after a layout change.
    pub fn set_region(&self, region: Region) -> Result<()> {
        self.inner.scroll.set_region(region)
    }

    #[must_use]
    pub fn render_gate(&self) -> &Arc<RenderGate> {
        &self.inner.gate
    }

    #[must_use]
    pub fn render_mode(&self) -> RenderMode {
        self.inner.gate.mode()
    }

    /// Last animator output, or `None` before the first visible frame.
    #[must_use]
    pub fn frame(&self) -> Option<SceneFrame> {
        *self.inner.last_frame.lock()
    }

    /// Frames the render gate let through.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.inner.frames_rendered.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn entrance_phase(&self) -> Option<EntrancePhase> {
        self.inner.entrance.as_ref().map(|e| e.lock().phase())
    }

    #[must_use]
    pub fn overlay(&self) -> Option<OverlayState> {
        self.inner.entrance.as_ref().map(|e| e.lock().overlay())
    }

    #[must_use]
    pub fn camera_position(&self) -> Option<Vec3> {
        self.inner
            .entrance
            .as_ref()
            .and_then(|e| e.lock().camera_position())
    }
}

impl Drop for SceneNode {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("asset", &self.inner.asset)
            .field("mounted", &self.is_mounted())
            .field("frames_rendered", &self.frames_rendered())
            .finish_non_exhaustive()
    }
}
