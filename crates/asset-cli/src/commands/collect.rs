use anyhow::{Context, Result};
use asset_collector::{AssetCollector, CreateOptions};
use asset_config::Config;
use asset_core::{AssetBag, AssetCollection, AssetSource, AssetType, SharedAsset, SourceType};
use serde::Serialize;
use std::path::Path;
use time::OffsetDateTime;
use tracing::info;

use crate::manifest::{Manifest, ManifestEntry};

/// Lock key held for the duration of a collect run
#[derive(PartialEq)]
struct CollectRun;

/// Collected asset as printed by `assets collect`
#[derive(Debug, Serialize)]
pub struct AssetSummary {
    pub id: String,
    pub asset_type: AssetType,
    pub source_type: SourceType,
    pub source: AssetSource,
    pub preprocessable: bool,
    pub predecessors: Vec<String>,
    pub content_length: Option<usize>,
    #[serde(with = "time::serde::timestamp::option")]
    pub last_modified: Option<OffsetDateTime>,
}

impl From<&SharedAsset> for AssetSummary {
    fn from(asset: &SharedAsset) -> Self {
        Self {
            id: asset.id().to_string(),
            asset_type: asset.asset_type(),
            source_type: asset.source_type(),
            source: asset.source().clone(),
            preprocessable: asset.is_preprocessable(),
            predecessors: asset.predecessors(),
            content_length: asset.content().map(|c| c.len()),
            last_modified: asset.last_modified(),
        }
    }
}

pub async fn handle(manifest_path: &Path, config: &Config, load: bool) -> Result<()> {
    let summaries = collect(manifest_path, config, load).await?;
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

/// Run every manifest entry through a configured collector, in order
pub async fn collect(
    manifest_path: &Path,
    config: &Config,
    load: bool,
) -> Result<Vec<AssetSummary>> {
    let manifest = Manifest::from_path(manifest_path)?;
    let base = manifest_path.parent().unwrap_or(Path::new("."));

    let mut collector = AssetCollector::new();
    collector.set_collection(Box::new(AssetBag::new()))?;
    config.apply(&mut collector)?;
    if config.lock_after_configure {
        collector.lock(CollectRun)?;
    }

    for (index, entry) in manifest.entries.iter().enumerate() {
        let entry = match entry {
            ManifestEntry::Break(chain_break) => {
                if chain_break.break_chain {
                    collector.clear_last_css();
                }
                continue;
            }
            ManifestEntry::Asset(entry) => entry,
        };

        let options = CreateOptions::default()
            .with_overrides(entry.options.clone())
            .keep_last(entry.keep_last);
        collector
            .create(
                &entry.asset_type,
                &entry.source,
                &entry.resolved_data(base),
                options,
            )
            .with_context(|| format!("Invalid asset #{} in manifest", index + 1))?;
    }

    if collector.is_locked() {
        collector.unlock(CollectRun)?;
    }
    let collection = collector
        .clear_collection()?
        .context("Collector has no collection attached")?;

    let assets = collection.assets();
    if load {
        for asset in &assets {
            asset
                .load(None)
                .await
                .with_context(|| format!("Failed to load asset {}", asset.id()))?;
        }
    }

    info!(count = assets.len(), "Collected assets");

    Ok(assets.iter().map(AssetSummary::from).collect())
}
