//! Asset Readiness Tests
//!
//! Tests for:
//! - AssetReadinessStore initialize / mark_loaded semantics
//! - Idempotence, order independence, re-initialization reset
//! - Empty declarations
//! - Subscriber notification and re-entrancy
//! - AssetReportingAdapter single-report guard
//! - AssetManifest construction from catalog ids

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use vitrine::assets::{
    AssetId, AssetManifest, AssetReadinessStore, AssetReportingAdapter, LoadProgress, MarkOutcome,
};

/// Stand-in for a decoded model resource.
struct Model {
    _name: &'static str,
}

fn counting_subscriber(store: &AssetReadinessStore) -> (Arc<AtomicUsize>, vitrine::Subscription) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let sub = store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (hits, sub)
}

// ============================================================================
// Store: Basic Semantics
// ============================================================================

#[test]
fn store_starts_not_ready() {
    let store = AssetReadinessStore::with_assets(["a", "b"]);
    assert!(!store.is_all_loaded());
    assert_eq!(store.progress(), LoadProgress { loaded: 0, total: 2 });

    let snapshot = store.snapshot();
    assert_eq!(snapshot.is_loaded("a"), Some(false));
    assert_eq!(snapshot.is_loaded("zzz"), None);
}

#[test]
fn store_ready_after_every_id_reports() {
    let store = AssetReadinessStore::with_assets(["a", "b"]);
    assert_eq!(store.mark_loaded("a"), MarkOutcome::Loaded);
    assert!(!store.is_all_loaded());
    assert_eq!(store.mark_loaded("b"), MarkOutcome::Loaded);
    assert!(store.is_all_loaded());
    assert_eq!(store.progress(), LoadProgress { loaded: 2, total: 2 });
}

#[test]
fn store_unknown_id_is_ignored() {
    let store = AssetReadinessStore::with_assets(["a"]);
    let (hits, _sub) = counting_subscriber(&store);

    assert_eq!(store.mark_loaded("ghost"), MarkOutcome::Unknown);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(!store.is_all_loaded());
    assert!(!store.is_declared("ghost"));
}

// ============================================================================
// Store: Idempotence
// ============================================================================

#[test]
fn store_mark_loaded_twice_equals_once() {
    let once = AssetReadinessStore::with_assets(["a", "b"]);
    once.mark_loaded("a");

    let twice = AssetReadinessStore::with_assets(["a", "b"]);
    twice.mark_loaded("a");
    assert_eq!(twice.mark_loaded("a"), MarkOutcome::AlreadyLoaded);

    assert_eq!(once.progress(), twice.progress());
    assert_eq!(once.is_all_loaded(), twice.is_all_loaded());
    assert_eq!(once.snapshot().pending(), twice.snapshot().pending());
}

#[test]
fn store_duplicate_report_does_not_notify() {
    let store = AssetReadinessStore::with_assets(["a", "b"]);
    let (hits, _sub) = counting_subscriber(&store);

    store.mark_loaded("a");
    store.mark_loaded("a");
    store.mark_loaded("a");

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Store: Order Independence
// ============================================================================

#[test]
fn store_every_permutation_reaches_same_state() {
    let orders: [[&str; 3]; 6] = [
        ["a", "b", "c"],
        ["a", "c", "b"],
        ["b", "a", "c"],
        ["b", "c", "a"],
        ["c", "a", "b"],
        ["c", "b", "a"],
    ];

    for order in orders {
        let store = AssetReadinessStore::with_assets(["a", "b", "c"]);
        for id in order {
            store.mark_loaded(id);
        }
        assert!(store.is_all_loaded(), "order {order:?} did not reach readiness");
        assert_eq!(store.progress(), LoadProgress { loaded: 3, total: 3 });
    }
}

#[test]
fn store_three_assets_out_of_order() {
    let store = AssetReadinessStore::with_assets(["A", "B", "C"]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let _sub = store.subscribe(move |snapshot| log.lock().push(snapshot.all_loaded));

    store.mark_loaded("C");
    assert!(!store.is_all_loaded());
    store.mark_loaded("A");
    assert!(!store.is_all_loaded());
    store.mark_loaded("B");
    assert!(store.is_all_loaded());

    // Only the final notification carries readiness.
    assert_eq!(*seen.lock(), vec![false, false, true]);
}

// ============================================================================
// Store: Re-initialization
// ============================================================================

#[test]
fn store_reinitialize_resets_everything() {
    let store = AssetReadinessStore::with_assets(["a", "b"]);
    store.mark_loaded("a");
    store.mark_loaded("b");
    assert!(store.is_all_loaded());
    let first_generation = store.snapshot().generation;

    store.initialize(["b", "c"]);

    assert!(!store.is_all_loaded());
    assert_eq!(store.progress(), LoadProgress { loaded: 0, total: 2 });
    assert_eq!(store.snapshot().is_loaded("b"), Some(false));
    assert!(store.snapshot().generation > first_generation);
}

#[test]
fn store_stale_report_after_reinitialize_is_ignored() {
    let store = AssetReadinessStore::with_assets(["old"]);
    store.initialize(["new"]);

    assert_eq!(store.mark_loaded("old"), MarkOutcome::Unknown);
    assert!(!store.is_all_loaded());
}

#[test]
fn store_initialize_notifies_subscribers() {
    let store = AssetReadinessStore::with_assets(["a"]);
    let (hits, _sub) = counting_subscriber(&store);
    store.initialize(["a"]);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Store: Empty Set
// ============================================================================

#[test]
fn store_empty_set_never_ready() {
    let store = AssetReadinessStore::with_assets(Vec::<AssetId>::new());
    assert!(!store.is_all_loaded());
    assert_eq!(store.progress(), LoadProgress { loaded: 0, total: 0 });
    assert!((store.progress().fraction() - 0.0).abs() < f32::EPSILON);

    store.mark_loaded("anything");
    assert!(!store.is_all_loaded());
}

// ============================================================================
// Store: Subscribers
// ============================================================================

#[test]
fn store_callback_may_reenter_mark_loaded() {
    let store = Arc::new(AssetReadinessStore::with_assets(["a", "b"]));
    let seen = Arc::new(Mutex::new(Vec::new()));

    // Loading "a" pulls in "b" from inside the notification.
    let inner = Arc::clone(&store);
    let _chain = store.subscribe(move |snapshot| {
        if snapshot.is_loaded("a") == Some(true) && snapshot.is_loaded("b") == Some(false) {
            inner.mark_loaded("b");
        }
    });
    let log = Arc::clone(&seen);
    let _observer = store.subscribe(move |snapshot| log.lock().push(snapshot.progress.loaded));

    store.mark_loaded("a");

    assert!(store.is_all_loaded());
    assert_eq!(*seen.lock(), vec![1, 2]);
}

#[test]
fn store_channel_subscription_receives_snapshots() {
    let store = AssetReadinessStore::with_assets(["a", "b"]);
    let (rx, _sub) = store.subscribe_channel();

    store.mark_loaded("b");
    store.mark_loaded("a");

    let loaded: Vec<usize> = rx.try_iter().map(|s| s.progress.loaded).collect();
    assert_eq!(loaded, vec![1, 2]);
}

#[test]
fn store_pending_lists_unreported_ids_sorted() {
    let store = AssetReadinessStore::with_assets(["c", "a", "b"]);
    store.mark_loaded("b");
    let pending: Vec<String> = store
        .snapshot()
        .pending()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(pending, vec!["a".to_string(), "c".to_string()]);
}

// ============================================================================
// Reporting Adapter
// ============================================================================

#[test]
fn adapter_reports_exactly_once_across_identity_changes() {
    let store = Arc::new(AssetReadinessStore::with_assets(["hero", "other"]));
    let (hits, _sub) = counting_subscriber(&store);
    let mut adapter = AssetReportingAdapter::new(Arc::clone(&store), "hero");

    let first = Model { _name: "v1" };
    let second = Model { _name: "v2" };
    let third = Model { _name: "v3" };

    assert!(adapter.on_resource(Some(&first)));
    assert!(!adapter.on_resource(Some(&second)));
    assert!(!adapter.on_resource(Some(&third)));

    assert!(adapter.has_reported());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(store.progress().loaded, 1);
}

#[test]
fn adapter_placeholder_never_reports() {
    let store = Arc::new(AssetReadinessStore::with_assets(["hero"]));
    let mut adapter = AssetReportingAdapter::new(Arc::clone(&store), "hero");

    assert!(!adapter.on_resource::<Model>(None));
    assert!(!adapter.has_reported());
    assert!(!store.is_all_loaded());

    assert!(adapter.on_resource(Some(&Model { _name: "real" })));
    assert!(store.is_all_loaded());
}

#[test]
fn adapter_unmounted_does_not_report() {
    let store = Arc::new(AssetReadinessStore::with_assets(["hero"]));
    let mut adapter = AssetReportingAdapter::new(Arc::clone(&store), "hero");
    adapter.unmount();

    assert!(!adapter.is_mounted());
    assert!(!adapter.on_resource(Some(&Model { _name: "late" })));
    assert!(!store.is_all_loaded());
}

#[test]
fn adapter_fresh_mount_gets_fresh_guard() {
    let store = Arc::new(AssetReadinessStore::with_assets(["hero"]));
    let mut first = AssetReportingAdapter::new(Arc::clone(&store), "hero");
    assert!(first.on_resource(Some(&Model { _name: "v1" })));

    store.initialize(["hero"]);
    let mut second = AssetReportingAdapter::new(Arc::clone(&store), "hero");
    assert!(second.on_resource(Some(&Model { _name: "v1" })));
    assert!(store.is_all_loaded());
}

// ============================================================================
// Manifest
// ============================================================================

#[test]
fn manifest_for_catalog_adds_hero_and_products() {
    let manifest = AssetManifest::for_catalog(["sofa", "lamp", "sofa"]);

    assert_eq!(manifest.len(), 3);
    assert!(manifest.contains(AssetId::HERO));
    assert!(manifest.contains("product-sofa"));
    assert!(manifest.contains("product-lamp"));
}

#[test]
fn manifest_with_menu_model() {
    let manifest = AssetManifest::for_catalog(Vec::<String>::new()).with_menu_model();
    assert_eq!(manifest.len(), 2);
    assert!(manifest.contains(AssetId::MENU));
}

#[test]
fn manifest_initializes_store() {
    let manifest = AssetManifest::for_catalog(["sofa"]);
    let store = AssetReadinessStore::with_assets(&manifest);

    assert_eq!(store.progress().total, 2);
    store.mark_loaded(AssetId::HERO);
    store.mark_loaded(AssetId::for_product("sofa").as_str());
    assert!(store.is_all_loaded());
}
