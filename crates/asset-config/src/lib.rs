use anyhow::Context;
use asset_collector::AssetCollector;
use asset_core::{AssetType, MetadataBag};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Configuration for the asset collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Lock the collector once it has been configured
    #[serde(default = "default_lock")]
    pub lock_after_configure: bool,
}

/// Overrides applied on top of the hardcoded metadata defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub css: Map<String, Value>,

    #[serde(default)]
    pub js: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            lock_after_configure: default_lock(),
        }
    }
}

fn default_lock() -> bool {
    true
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::from_path(&path)
        } else {
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(&path, content)?;
            Ok(config)
        }
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "assets", "assets") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.assets/config.toml")
        }
    }

    /// Install the configured default templates on `collector`
    pub fn apply(&self, collector: &mut AssetCollector) -> anyhow::Result<()> {
        let css = MetadataBag::with_values(AssetType::Css, self.defaults.css.clone())
            .context("Invalid [defaults.css] table")?;
        let js = MetadataBag::with_values(AssetType::Js, self.defaults.js.clone())
            .context("Invalid [defaults.js] table")?;

        collector.set_default_metadata(css)?;
        collector.set_default_metadata(js)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset_core::Scope;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.lock_after_configure);
        assert!(config.defaults.css.is_empty());
        assert!(config.defaults.js.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.lock_after_configure, config.lock_after_configure);
    }

    #[test]
    fn test_apply_defaults() {
        let config: Config = toml::from_str(
            r#"
            lock_after_configure = false

            [defaults.css]
            media = "screen"

            [defaults.js]
            scope = "header"
            defer = true
            "#,
        )
        .unwrap();

        let mut collector = AssetCollector::new();
        config.apply(&mut collector).unwrap();

        let css = collector.metadata_defaults(AssetType::Css);
        assert_eq!(css.media(), Some("screen"));
        let js = collector.metadata_defaults(AssetType::Js);
        assert_eq!(js.scope(), Some(Scope::Header));
        assert_eq!(js.get("defer").unwrap(), Some(Value::Bool(true)));
    }

    #[test]
    fn test_apply_rejects_mistyped_defaults() {
        let config: Config = toml::from_str(
            r#"
            [defaults.css]
            preprocess = "often"
            "#,
        )
        .unwrap();

        let mut collector = AssetCollector::new();
        assert!(config.apply(&mut collector).is_err());
        assert_eq!(
            collector.metadata_defaults(AssetType::Css).media(),
            Some("all")
        );
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults.css]\nweight = 10\n").unwrap();

        let config = Config::from_path(&path).unwrap();
        assert_eq!(config.defaults.css.get("weight"), Some(&Value::from(10)));
        assert!(config.lock_after_configure);
    }
}
