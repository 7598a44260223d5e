//! Ordered containers of assets

use std::collections::HashSet;
use std::fmt;
use tracing::warn;

use crate::SharedAsset;

/// Container the collector appends created assets to.
///
/// Iteration follows insertion order; downstream aggregation relies on it.
pub trait AssetCollection: Send + Sync + fmt::Debug {
    /// Append an asset. Returns `false` if an asset with the same id is
    /// already present.
    fn add(&mut self, asset: SharedAsset) -> bool;

    fn contains(&self, id: &str) -> bool;

    fn get(&self, id: &str) -> Option<SharedAsset>;

    /// All assets in insertion order
    fn assets(&self) -> Vec<SharedAsset>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Insertion-ordered collection, de-duplicated by asset id
#[derive(Debug, Default)]
pub struct AssetBag {
    assets: Vec<SharedAsset>,
    ids: HashSet<String>,
}

impl AssetBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedAsset> {
        self.assets.iter()
    }
}

impl AssetCollection for AssetBag {
    fn add(&mut self, asset: SharedAsset) -> bool {
        if !self.ids.insert(asset.id().to_string()) {
            warn!(asset = %asset.id(), "Asset already present in collection");
            return false;
        }
        self.assets.push(asset);
        true
    }

    fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    fn get(&self, id: &str) -> Option<SharedAsset> {
        self.assets.iter().find(|a| a.id() == id).cloned()
    }

    fn assets(&self) -> Vec<SharedAsset> {
        self.assets.clone()
    }

    fn len(&self) -> usize {
        self.assets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Asset, AssetType, MetadataBag};
    use std::sync::Arc;

    fn js(content: &str) -> SharedAsset {
        Arc::new(Asset::string(MetadataBag::new(AssetType::Js), content, vec![]))
    }

    #[test]
    fn test_insertion_order() {
        let mut bag = AssetBag::new();
        let (a, b, c) = (js("a();"), js("b();"), js("c();"));

        assert!(bag.add(a.clone()));
        assert!(bag.add(b.clone()));
        assert!(bag.add(c.clone()));

        let ids: Vec<_> = bag.iter().map(|asset| asset.id().to_string()).collect();
        assert_eq!(ids, vec![a.id(), b.id(), c.id()]);
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn test_duplicate_ids_are_skipped() {
        let mut bag = AssetBag::new();
        assert!(bag.add(js("same();")));
        assert!(!bag.add(js("same();")));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn test_lookup_by_id() {
        let mut bag = AssetBag::new();
        assert!(bag.is_empty());

        let asset = js("lookup();");
        bag.add(asset.clone());

        assert!(bag.contains(asset.id()));
        assert!(Arc::ptr_eq(&bag.get(asset.id()).unwrap(), &asset));
        assert!(bag.get("missing").is_none());
    }
}
