//! Asset manifest format read by `assets collect`

use anyhow::{Context, Result};
use asset_core::SourceType;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "asset")]
    pub entries: Vec<ManifestEntry>,
}

/// One `[[asset]]` table: either a chain break or an asset declaration
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ManifestEntry {
    Break(ChainBreak),
    Asset(AssetEntry),
}

/// `break_chain = true` starts a new CSS ordering chain
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainBreak {
    pub break_chain: bool,
}

/// One asset declaration, passed to `AssetCollector::create` as-is
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetEntry {
    #[serde(rename = "type")]
    pub asset_type: String,

    pub source: String,

    pub data: String,

    #[serde(default)]
    pub options: Map<String, Value>,

    #[serde(default = "default_keep_last")]
    pub keep_last: bool,
}

fn default_keep_last() -> bool {
    true
}

impl Manifest {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))
    }
}

impl AssetEntry {
    /// Relative file paths are taken relative to the manifest directory
    pub fn resolved_data(&self, base: &Path) -> String {
        let is_file = matches!(self.source.parse::<SourceType>(), Ok(SourceType::File));
        if !is_file || self.data.contains("://") || Path::new(&self.data).is_absolute() {
            return self.data.clone();
        }
        base.join(&self.data).to_string_lossy().to_string()
    }
}
