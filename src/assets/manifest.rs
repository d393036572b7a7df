use rustc_hash::FxHashSet;

use crate::assets::id::AssetId;

/// The flat set of asset ids a page declares at mount time.
///
/// Built from the catalog's product identifiers: one model per product plus
/// the fixed hero model, and optionally the navigation-menu model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    ids: Vec<AssetId>,
}

impl AssetManifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hero model plus one model per product. Duplicate product ids collapse.
    #[must_use]
    pub fn for_catalog<I, S>(product_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut manifest = Self::new().with_asset(AssetId::HERO);
        for product in product_ids {
            manifest.push(AssetId::for_product(product.as_ref()));
        }
        manifest
    }

    #[must_use]
    pub fn with_menu_model(self) -> Self {
        self.with_asset(AssetId::MENU)
    }

    #[must_use]
    pub fn with_asset(mut self, id: impl Into<AssetId>) -> Self {
        self.push(id.into());
        self
    }

    fn push(&mut self, id: AssetId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|declared| declared.as_str() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetId> {
        self.ids.iter()
    }

    #[must_use]
    pub fn to_set(&self) -> FxHashSet<AssetId> {
        self.ids.iter().cloned().collect()
    }
}

impl IntoIterator for AssetManifest {
    type Item = AssetId;
    type IntoIter = std::vec::IntoIter<AssetId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter()
    }
}

impl<'a> IntoIterator for &'a AssetManifest {
    type Item = &'a AssetId;
    type IntoIter = std::slice::Iter<'a, AssetId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}
