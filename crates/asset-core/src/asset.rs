use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use time::OffsetDateTime;
use tracing::debug;

use crate::{AssetType, Error, Filter, MetadataBag, Result};

/// Assets are shared between the collection that holds them and the caller
/// that created them.
pub type SharedAsset = Arc<Asset>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    File,
    String,
    External,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::File => "file",
            SourceType::String => "string",
            SourceType::External => "external",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(SourceType::File),
            "string" | "inline" => Ok(SourceType::String),
            "external" => Ok(SourceType::External),
            other => Err(Error::InvalidArgument(format!(
                "Only sources of type \"file\", \"string\", or \"external\" are allowed, \"{}\" requested",
                other
            ))),
        }
    }
}

/// Where an asset's content comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssetSource {
    File { path: String },
    String { content: String },
    External { url: String },
}

impl AssetSource {
    pub fn source_type(&self) -> SourceType {
        match self {
            AssetSource::File { .. } => SourceType::File,
            AssetSource::String { .. } => SourceType::String,
            AssetSource::External { .. } => SourceType::External,
        }
    }
}

#[derive(Debug, Default)]
struct AssetState {
    content: Option<String>,
    predecessors: Vec<String>,
    last_modified: Option<OffsetDateTime>,
}

/// A single CSS or JS source unit.
///
/// The id is fixed at construction. Content, ordering predecessors and the
/// last-modified stamp are the only things that change afterwards, and they
/// sit behind a lock so a `SharedAsset` can be updated through `&self`.
#[derive(Debug)]
pub struct Asset {
    id: String,
    source: AssetSource,
    metadata: MetadataBag,
    filters: Vec<Arc<dyn Filter>>,
    state: RwLock<AssetState>,
}

impl Asset {
    /// File-backed asset, identified by its normalized absolute path
    pub fn file(metadata: MetadataBag, path: &str, filters: Vec<Arc<dyn Filter>>) -> Self {
        let path = normalize_path(path);
        Self {
            id: path.clone(),
            source: AssetSource::File { path },
            metadata,
            filters,
            state: RwLock::new(AssetState::default()),
        }
    }

    /// Inline asset, identified by a hash of its content.
    ///
    /// Empty content has no useful fingerprint, so it gets a random id and two
    /// empty assets never share one.
    pub fn string(
        metadata: MetadataBag,
        content: impl Into<String>,
        filters: Vec<Arc<dyn Filter>>,
    ) -> Self {
        let content = content.into();
        let id = if content.is_empty() {
            uuid::Uuid::new_v4().simple().to_string()
        } else {
            blake3::hash(content.as_bytes()).to_hex().to_string()
        };

        let state = AssetState {
            content: Some(content.clone()),
            predecessors: Vec::new(),
            last_modified: Some(OffsetDateTime::now_utc()),
        };

        Self {
            id,
            source: AssetSource::String { content },
            metadata,
            filters,
            state: RwLock::new(state),
        }
    }

    pub fn string_from_bytes(
        metadata: MetadataBag,
        bytes: Vec<u8>,
        filters: Vec<Arc<dyn Filter>>,
    ) -> Result<Self> {
        let content = String::from_utf8(bytes).map_err(|e| {
            Error::InvalidArgument(format!("String assets require textual content: {}", e))
        })?;
        Ok(Self::string(metadata, content, filters))
    }

    /// Asset living at an external location; never loaded locally
    pub fn external(
        metadata: MetadataBag,
        url: impl Into<String>,
        filters: Vec<Arc<dyn Filter>>,
    ) -> Self {
        let url = url.into();
        Self {
            id: url.clone(),
            source: AssetSource::External { url },
            metadata,
            filters,
            state: RwLock::new(AssetState::default()),
        }
    }

    /// Build the variant matching `source_type` from its raw data
    pub fn from_source(
        metadata: MetadataBag,
        source_type: SourceType,
        data: &str,
        filters: Vec<Arc<dyn Filter>>,
    ) -> Self {
        match source_type {
            SourceType::File => Self::file(metadata, data, filters),
            SourceType::String => Self::string(metadata, data, filters),
            SourceType::External => Self::external(metadata, data, filters),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn asset_type(&self) -> AssetType {
        self.metadata.asset_type()
    }

    pub fn source_type(&self) -> SourceType {
        self.source.source_type()
    }

    pub fn source(&self) -> &AssetSource {
        &self.source
    }

    pub fn metadata(&self) -> &MetadataBag {
        &self.metadata
    }

    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }

    /// Whether the asset may be aggregated and minified.
    ///
    /// External assets are never preprocessable, whatever the metadata says.
    pub fn is_preprocessable(&self) -> bool {
        match self.source {
            AssetSource::External { .. } => false,
            _ => self.metadata.preprocess(),
        }
    }

    pub fn content(&self) -> Option<String> {
        self.read_state().content.clone()
    }

    /// Replace the current content. The id is not recomputed.
    pub fn set_content(&self, content: impl Into<String>) {
        self.write_state().content = Some(content.into());
    }

    pub fn last_modified(&self) -> Option<OffsetDateTime> {
        self.read_state().last_modified
    }

    pub fn set_last_modified(&self, last_modified: OffsetDateTime) {
        self.write_state().last_modified = Some(last_modified);
    }

    /// Require this asset to render after `other`
    pub fn after(&self, other: &Asset) {
        self.after_id(other.id());
    }

    pub fn after_id(&self, id: &str) {
        if id == self.id {
            return;
        }

        let mut state = self.write_state();
        if !state.predecessors.iter().any(|p| p == id) {
            debug!(asset = %self.id, after = %id, "Added ordering edge");
            state.predecessors.push(id.to_string());
        }
    }

    /// Ids this asset must render after, in the order they were declared
    pub fn predecessors(&self) -> Vec<String> {
        self.read_state().predecessors.clone()
    }

    pub fn has_predecessor(&self, id: &str) -> bool {
        self.read_state().predecessors.iter().any(|p| p == id)
    }

    /// Re-derive content from the source and run the filter chain over it.
    ///
    /// `additional_filter` runs after the asset's own filters. External assets
    /// are left untouched.
    pub async fn load(&self, additional_filter: Option<&dyn Filter>) -> Result<()> {
        let (mut content, modified) = match &self.source {
            AssetSource::File { path } => {
                let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                    Error::Other(anyhow::anyhow!("Failed to read file {}: {}", path, e))
                })?;
                let modified = tokio::fs::metadata(path)
                    .await
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .map(OffsetDateTime::from);
                (content, modified)
            }
            AssetSource::String { content } => (content.clone(), None),
            AssetSource::External { url } => {
                debug!(asset = %self.id, url = %url, "Skipping load of external asset");
                return Ok(());
            }
        };

        for filter in &self.filters {
            content = filter.filter_load(content)?;
        }
        if let Some(filter) = additional_filter {
            content = filter.filter_load(content)?;
        }

        debug!(asset = %self.id, bytes = content.len(), "Loaded asset");

        let mut state = self.write_state();
        state.content = Some(content);
        if modified.is_some() {
            state.last_modified = modified;
        }
        Ok(())
    }

    fn read_state(&self) -> RwLockReadGuard<'_, AssetState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, AssetState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Absolute, lexically cleaned form of a file path.
///
/// Stream-wrapper style URIs (`public://css/a.css`) are kept as they are.
fn normalize_path(path: &str) -> String {
    if path.contains("://") {
        return path.to_string();
    }

    let path = Path::new(path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let normalized = std::fs::canonicalize(&absolute).unwrap_or_else(|_| clean_path(&absolute));
    normalized.to_string_lossy().to_string()
}

fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
