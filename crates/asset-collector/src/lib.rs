//! Asset factory and collector
//!
//! `AssetCollector` is configured once with metadata defaults and a target
//! collection, then handed to asset-producing code. Every asset created
//! through it picks up the defaults, lands in the collection, and (for CSS)
//! is ordered after the CSS asset created before it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use asset_core::{
    Asset, AssetCollection, AssetType, Error, Filter, MetadataBag, Result, SharedAsset,
    SourceType,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Optional arguments for `AssetCollector::create`
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Metadata applied on top of the collector defaults
    pub overrides: Map<String, Value>,
    pub filters: Vec<Arc<dyn Filter>>,
    /// Remember a created CSS asset so the next one is ordered after it
    pub keep_last: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            overrides: Map::new(),
            filters: Vec::new(),
            keep_last: true,
        }
    }
}

impl CreateOptions {
    pub fn with_overrides(mut self, overrides: Map<String, Value>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn keep_last(mut self, keep_last: bool) -> Self {
        self.keep_last = keep_last;
        self
    }
}

/// Configuration guard. This is not a mutex: it only stops code without the
/// key from reconfiguring the collector, and `create` keeps working while
/// locked.
enum LockState {
    Unlocked,
    Locked(Box<dyn Any + Send + Sync>),
}

pub struct AssetCollector {
    collection: Option<Box<dyn AssetCollection>>,
    default_css: MetadataBag,
    default_js: MetadataBag,
    /// Id of the most recent CSS asset; only used to wire the next edge
    last_css: Option<String>,
    lock: LockState,
}

impl AssetCollector {
    pub fn new() -> Self {
        Self {
            collection: None,
            default_css: MetadataBag::new(AssetType::Css),
            default_js: MetadataBag::new(AssetType::Js),
            last_css: None,
            lock: LockState::Unlocked,
        }
    }

    pub fn with_collection(collection: Box<dyn AssetCollection>) -> Self {
        let mut collector = Self::new();
        collector.collection = Some(collection);
        collector
    }

    /// Create an asset from raw type names.
    ///
    /// `asset_type` is `css` or `js` (`style`/`script` are accepted too) and
    /// `source_type` is `file`, `string`, `inline` or `external`. Anything
    /// else fails with `InvalidArgument`.
    pub fn create(
        &mut self,
        asset_type: &str,
        source_type: &str,
        data: &str,
        options: CreateOptions,
    ) -> Result<SharedAsset> {
        let asset_type = asset_type
            .parse::<AssetType>()
            .map_err(|_| {
                Error::InvalidArgument(format!(
                    "Only assets of type \"js\" or \"css\" are allowed, \"{}\" requested",
                    asset_type
                ))
            })?;
        let source_type = source_type.parse::<SourceType>()?;

        self.create_typed(asset_type, source_type, data, options)
    }

    /// Create an asset, add it to the attached collection and wire CSS ordering.
    ///
    /// Nothing on the collector changes unless the asset is fully built.
    pub fn create_typed(
        &mut self,
        asset_type: AssetType,
        source_type: SourceType,
        data: &str,
        options: CreateOptions,
    ) -> Result<SharedAsset> {
        let mut metadata = self.metadata_defaults(asset_type);
        metadata.replace(options.overrides)?;

        let mut asset: SharedAsset = Arc::new(Asset::from_source(
            metadata,
            source_type,
            data,
            options.filters,
        ));
        debug!(
            asset = %asset.id(),
            asset_type = %asset_type,
            source_type = %source_type,
            "Created asset"
        );

        // An asset already collected under this id is the one that gets
        // ordered and returned.
        if let Some(collection) = self.collection.as_mut() {
            match collection.get(asset.id()) {
                Some(existing) => {
                    debug!(asset = %existing.id(), "Reusing collected asset");
                    asset = existing;
                }
                None => {
                    collection.add(asset.clone());
                }
            }
        }

        if asset_type == AssetType::Css {
            if let Some(last) = &self.last_css {
                asset.after_id(last);
            }
            if options.keep_last {
                self.last_css = Some(asset.id().to_string());
            }
        }

        Ok(asset)
    }

    /// Add an asset that was built elsewhere to the attached collection
    pub fn add(&mut self, asset: SharedAsset) -> Result<&mut Self> {
        let collection = self
            .collection
            .as_mut()
            .ok_or(Error::NoCollectionAttached)?;
        collection.add(asset);
        Ok(self)
    }

    /// Forget the last CSS asset, so the next one starts a new ordering chain.
    ///
    /// Call this at the end of a contiguous series of CSS declarations, or
    /// before creating a CSS asset that should not be ordered after the
    /// previous one.
    pub fn clear_last_css(&mut self) -> &mut Self {
        self.last_css = None;
        self
    }

    pub fn last_css(&self) -> Option<&str> {
        self.last_css.as_deref()
    }

    pub fn collection(&self) -> Option<&dyn AssetCollection> {
        self.collection.as_deref()
    }

    pub fn set_collection(&mut self, collection: Box<dyn AssetCollection>) -> Result<()> {
        self.ensure_unlocked("a new collection cannot be attached to a locked collector")?;
        info!("Attached collection to collector");
        self.collection = Some(collection);
        Ok(())
    }

    /// Detach the current collection and hand it back
    pub fn clear_collection(&mut self) -> Result<Option<Box<dyn AssetCollection>>> {
        self.ensure_unlocked("collections cannot be cleared on a locked collector")?;
        info!("Detached collection from collector");
        Ok(self.collection.take())
    }

    /// Lock the configuration. The same key (same type, equal value) is
    /// required to unlock it.
    pub fn lock<K>(&mut self, key: K) -> Result<()>
    where
        K: Any + PartialEq + Send + Sync,
    {
        if self.is_locked() {
            return Err(Error::AlreadyLocked);
        }
        info!("Collector locked");
        self.lock = LockState::Locked(Box::new(key));
        Ok(())
    }

    pub fn unlock<K>(&mut self, key: K) -> Result<()>
    where
        K: Any + PartialEq + Send + Sync,
    {
        let LockState::Locked(stored) = &self.lock else {
            return Err(Error::NotLocked);
        };

        if stored.downcast_ref::<K>() != Some(&key) {
            warn!("Rejected unlock attempt with incorrect key");
            return Err(Error::WrongKey);
        }

        info!("Collector unlocked");
        self.lock = LockState::Unlocked;
        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.lock, LockState::Locked(_))
    }

    /// Replace the default template for the bag's asset type
    pub fn set_default_metadata(&mut self, metadata: MetadataBag) -> Result<()> {
        self.ensure_unlocked("asset defaults cannot be modified on a locked collector")?;
        match metadata.asset_type() {
            AssetType::Css => self.default_css = metadata,
            AssetType::Js => self.default_js = metadata,
        }
        Ok(())
    }

    /// Reset both default templates to the hardcoded per-type defaults
    pub fn restore_defaults(&mut self) -> Result<()> {
        self.ensure_unlocked("asset defaults cannot be modified on a locked collector")?;
        self.default_css = MetadataBag::new(AssetType::Css);
        self.default_js = MetadataBag::new(AssetType::Js);
        Ok(())
    }

    /// A copy of the default template for `asset_type`.
    ///
    /// Every asset gets its own copy, and changes to the returned bag never
    /// reach the collector.
    pub fn metadata_defaults(&self, asset_type: AssetType) -> MetadataBag {
        match asset_type {
            AssetType::Css => self.default_css.clone(),
            AssetType::Js => self.default_js.clone(),
        }
    }

    fn ensure_unlocked(&self, message: &str) -> Result<()> {
        if self.is_locked() {
            return Err(Error::Locked(message.to_string()));
        }
        Ok(())
    }
}

impl Default for AssetCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AssetCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetCollector")
            .field("collection", &self.collection)
            .field("default_css", &self.default_css)
            .field("default_js", &self.default_js)
            .field("last_css", &self.last_css)
            .field("locked", &self.is_locked())
            .finish()
    }
}
