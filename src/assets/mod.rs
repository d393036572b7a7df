//! Asset Readiness
//!
//! - [`AssetId`]: opaque key of one loadable 3D asset
//! - [`AssetManifest`]: the declared asset set of a page, built from the catalog
//! - [`AssetReadinessStore`]: which declared assets have finished loading
//! - [`AssetReportingAdapter`]: per-mount, report-exactly-once glue

pub mod id;
pub mod manifest;
pub mod readiness;
pub mod reporter;

pub use id::AssetId;
pub use manifest::AssetManifest;
pub use readiness::{AssetReadinessStore, LoadProgress, MarkOutcome, ReadinessSnapshot};
pub use reporter::{AssetReportingAdapter, PendingReport};
