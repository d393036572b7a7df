use std::sync::Arc;

use crate::assets::id::AssetId;
use crate::assets::readiness::{AssetReadinessStore, MarkOutcome};
use crate::utils::OneShot;

/// Per-mount bridge from "my resource is renderable" to exactly one
/// [`AssetReadinessStore::mark_loaded`] call.
///
/// The guard belongs to the mount, not to the resource: a resource that
/// changes identity across re-renders (hot reload, re-decode) does not report
/// again, and placeholder geometry (`None`) never reports at all.
#[derive(Debug)]
pub struct AssetReportingAdapter {
    id: AssetId,
    store: Option<Arc<AssetReadinessStore>>,
    guard: OneShot,
}

impl AssetReportingAdapter {
    #[must_use]
    pub fn new(store: Arc<AssetReadinessStore>, id: impl Into<AssetId>) -> Self {
        Self {
            id: id.into(),
            store: Some(store),
            guard: OneShot::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &AssetId {
        &self.id
    }

    /// Called on every render/update of the owning scene node.
    ///
    /// Returns `true` only for the call that reported to the store.
    pub fn on_resource<R: ?Sized>(&mut self, resource: Option<&R>) -> bool {
        self.claim(resource).map(PendingReport::send).is_some()
    }

    /// Claims this mount's single report without sending it yet, for callers
    /// that must release their own locks before the store notifies.
    pub fn claim<R: ?Sized>(&mut self, resource: Option<&R>) -> Option<PendingReport> {
        if resource.is_none() {
            return None;
        }
        let store = self.store.as_ref()?;
        if !self.guard.try_start() {
            return None;
        }
        self.guard.finish();
        Some(PendingReport {
            store: Arc::clone(store),
            id: self.id.clone(),
        })
    }

    #[inline]
    #[must_use]
    pub fn has_reported(&self) -> bool {
        self.guard.is_done()
    }

    #[inline]
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.store.is_some()
    }

    /// Detaches from the store. Every later call is a no-op.
    pub fn unmount(&mut self) {
        self.store = None;
    }
}

/// A claimed report; the store hears about it on [`PendingReport::send`].
#[derive(Debug)]
#[must_use = "the store is only told when the report is sent"]
pub struct PendingReport {
    store: Arc<AssetReadinessStore>,
    id: AssetId,
}

impl PendingReport {
    pub fn send(self) -> MarkOutcome {
        let outcome = self.store.mark_loaded(self.id.as_str());
        if outcome == MarkOutcome::Unknown {
            log::debug!(
                "Scene asset `{}` is not part of the current declaration",
                self.id
            );
        }
        outcome
    }
}
