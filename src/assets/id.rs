use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Opaque key identifying one loadable 3D asset within a page's asset set.
///
/// Backed by `Arc<str>` so clones handed to adapters, snapshots and log lines
/// share one allocation. Hashes and compares exactly like the underlying
/// string, which lets maps keyed by `AssetId` be queried with a plain `&str`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(Arc<str>);

impl AssetId {
    /// Id of the hero model that every storefront page declares.
    pub const HERO: &'static str = "hero";
    /// Id of the navigation-menu model.
    pub const MENU: &'static str = "menu";

    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Asset id of the model that presents catalog product `product_id`.
    #[must_use]
    pub fn for_product(product_id: &str) -> Self {
        Self(Arc::from(format!("product-{product_id}")))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AssetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&AssetId> for AssetId {
    fn from(id: &AssetId) -> Self {
        id.clone()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({:?})", &*self.0)
    }
}
