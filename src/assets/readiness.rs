//! Asset Readiness Store
//!
//! Tracks, for the declared asset set of one page visit, which assets have
//! finished loading, and pushes every change to its subscribers.
//!
//! # Invariants
//!
//! - `all_loaded` is true iff the declared set is non-empty and every declared
//!   id has reported.
//! - `initialize` replaces the declaration wholesale; nothing loaded under a
//!   previous declaration carries over.
//! - `mark_loaded` is idempotent and order-independent. Unknown ids are
//!   ignored.
//!
//! The store has no timeout. An asset that never reports keeps `all_loaded`
//! false for the rest of the visit.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::assets::id::AssetId;
use crate::signal::{Broadcaster, Subscription};

/// `{loaded, total}` counts for a progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadProgress {
    pub loaded: usize,
    pub total: usize,
}

impl LoadProgress {
    /// Fraction in `[0, 1]`; an empty declaration reports `0.0`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.loaded as f32 / self.total as f32
        }
    }
}

/// Immutable view of the store, delivered to subscribers on every change.
#[derive(Debug, Clone)]
pub struct ReadinessSnapshot {
    /// Incremented by every `initialize`.
    pub generation: u64,
    pub progress: LoadProgress,
    pub all_loaded: bool,
    flags: Arc<FxHashMap<AssetId, bool>>,
}

impl ReadinessSnapshot {
    /// Loaded flag of `id`, or `None` when `id` is not declared.
    #[must_use]
    pub fn is_loaded(&self, id: &str) -> Option<bool> {
        self.flags.get(id).copied()
    }

    /// Per-id loaded flags of the current declaration.
    pub fn flags(&self) -> impl Iterator<Item = (&AssetId, bool)> {
        self.flags.iter().map(|(id, loaded)| (id, *loaded))
    }

    /// Declared ids that have not reported yet.
    #[must_use]
    pub fn pending(&self) -> Vec<AssetId> {
        let mut pending: Vec<AssetId> = self
            .flags
            .iter()
            .filter(|(_, loaded)| !**loaded)
            .map(|(id, _)| id.clone())
            .collect();
        pending.sort();
        pending
    }
}

/// Result of a single [`AssetReadinessStore::mark_loaded`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The id flipped from not loaded to loaded.
    Loaded,
    /// The id had already reported; nothing changed.
    AlreadyLoaded,
    /// The id is not part of the current declaration; ignored.
    Unknown,
}

#[derive(Default)]
struct ReadinessState {
    generation: u64,
    // Keys are exactly the declared ids.
    flags: Arc<FxHashMap<AssetId, bool>>,
    loaded_count: usize,
}

impl ReadinessState {
    fn all_loaded(&self) -> bool {
        !self.flags.is_empty() && self.loaded_count == self.flags.len()
    }

    fn snapshot(&self) -> ReadinessSnapshot {
        ReadinessSnapshot {
            generation: self.generation,
            progress: LoadProgress {
                loaded: self.loaded_count,
                total: self.flags.len(),
            },
            all_loaded: self.all_loaded(),
            flags: Arc::clone(&self.flags),
        }
    }
}

/// Page-scoped readiness state, shared by `Arc` with every consumer.
pub struct AssetReadinessStore {
    state: RwLock<ReadinessState>,
    changes: Broadcaster<ReadinessSnapshot>,
}

impl Default for AssetReadinessStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetReadinessStore {
    /// Creates a store with an empty declaration (never ready).
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::default(),
            changes: Broadcaster::new(),
        }
    }

    /// Creates a store already initialized with `ids`.
    #[must_use]
    pub fn with_assets<I>(ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<AssetId>,
    {
        let store = Self::new();
        store.initialize(ids);
        store
    }

    /// Replaces the declared set and resets every flag to not loaded.
    pub fn initialize<I>(&self, ids: I)
    where
        I: IntoIterator,
        I::Item: Into<AssetId>,
    {
        let snapshot = {
            let mut state = self.state.write();
            let flags: FxHashMap<AssetId, bool> =
                ids.into_iter().map(|id| (id.into(), false)).collect();

            state.generation += 1;
            state.flags = Arc::new(flags);
            state.loaded_count = 0;

            if state.flags.is_empty() {
                log::warn!(
                    "Readiness store initialized with an empty asset set; readiness will never be reached"
                );
            } else {
                log::debug!(
                    "Readiness store generation {} declares {} assets",
                    state.generation,
                    state.flags.len()
                );
            }
            state.snapshot()
        };

        self.changes.emit(snapshot);
    }

    /// Records that `id` finished loading.
    pub fn mark_loaded(&self, id: &str) -> MarkOutcome {
        let snapshot = {
            let mut state = self.state.write();
            match state.flags.get(id).copied() {
                None => {
                    log::debug!("Ignoring load report for undeclared asset `{id}`");
                    return MarkOutcome::Unknown;
                }
                Some(true) => return MarkOutcome::AlreadyLoaded,
                Some(false) => {}
            }

            if let Some(flag) = Arc::make_mut(&mut state.flags).get_mut(id) {
                *flag = true;
            }
            state.loaded_count += 1;

            let snapshot = state.snapshot();
            if snapshot.all_loaded {
                log::info!(
                    "All {} declared assets loaded (generation {})",
                    snapshot.progress.total,
                    snapshot.generation
                );
            } else {
                log::trace!(
                    "Asset `{id}` loaded ({}/{})",
                    snapshot.progress.loaded,
                    snapshot.progress.total
                );
            }
            snapshot
        };

        self.changes.emit(snapshot);
        MarkOutcome::Loaded
    }

    #[must_use]
    pub fn snapshot(&self) -> ReadinessSnapshot {
        self.state.read().snapshot()
    }

    #[must_use]
    pub fn is_all_loaded(&self) -> bool {
        self.state.read().all_loaded()
    }

    #[must_use]
    pub fn progress(&self) -> LoadProgress {
        let state = self.state.read();
        LoadProgress {
            loaded: state.loaded_count,
            total: state.flags.len(),
        }
    }

    #[must_use]
    pub fn is_declared(&self, id: &str) -> bool {
        self.state.read().flags.contains_key(id)
    }

    /// Pushes a snapshot to `callback` on every change. The current state is
    /// not replayed; read [`Self::snapshot`] for that.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(
        &self,
        callback: impl Fn(&ReadinessSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        self.changes.subscribe(callback)
    }

    /// Channel flavour of [`Self::subscribe`].
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe_channel(&self) -> (flume::Receiver<ReadinessSnapshot>, Subscription) {
        self.changes.subscribe_channel()
    }
}

impl std::fmt::Debug for AssetReadinessStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("AssetReadinessStore")
            .field("generation", &state.generation)
            .field("loaded", &state.loaded_count)
            .field("total", &state.flags.len())
            .finish_non_exhaustive()
    }
}
