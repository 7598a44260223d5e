//! Per-asset metadata with type-specific defaults

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Kind of asset a metadata bag (and its asset) describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Css,
    Js,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Css => "css",
            AssetType::Js => "js",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "css" | "style" => Ok(AssetType::Css),
            "js" | "script" => Ok(AssetType::Js),
            other => Err(Error::InvalidType(format!(
                "Only assets of type \"js\" or \"css\" are supported, \"{}\" requested",
                other
            ))),
        }
    }
}

/// Placement of a script in the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Header,
    #[default]
    Footer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CssMetadata {
    #[serde(default)]
    pub every_page: bool,

    #[serde(default = "default_media")]
    pub media: String,

    #[serde(default = "default_true")]
    pub preprocess: bool,

    #[serde(default = "default_css_browsers")]
    pub browsers: BTreeMap<String, bool>,

    #[serde(default)]
    pub weight: f64,

    /// Keys with no dedicated field
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsMetadata {
    #[serde(default)]
    pub every_page: bool,

    #[serde(default)]
    pub scope: Scope,

    #[serde(default = "default_true")]
    pub cache: bool,

    #[serde(default = "default_true")]
    pub preprocess: bool,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub browsers: BTreeMap<String, bool>,

    #[serde(default)]
    pub weight: f64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for CssMetadata {
    fn default() -> Self {
        Self {
            every_page: false,
            media: default_media(),
            preprocess: true,
            browsers: default_css_browsers(),
            weight: 0.0,
            extra: Map::new(),
        }
    }
}

impl Default for JsMetadata {
    fn default() -> Self {
        Self {
            every_page: false,
            scope: Scope::Footer,
            cache: true,
            preprocess: true,
            attributes: BTreeMap::new(),
            version: None,
            browsers: BTreeMap::new(),
            weight: 0.0,
            extra: Map::new(),
        }
    }
}

fn default_media() -> String {
    "all".to_string()
}

fn default_true() -> bool {
    true
}

fn default_css_browsers() -> BTreeMap<String, bool> {
    BTreeMap::from([("IE".to_string(), true), ("!IE".to_string(), true)])
}

/// Typed metadata record attached to every asset.
///
/// The variant fixes the asset type for the lifetime of the bag. Known keys are
/// stored in typed fields; any other key is kept verbatim in `extra`, so
/// callers can attach data this crate knows nothing about.
///
/// `Clone` yields a fully independent copy, which is how the collector hands
/// out its default templates.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataBag {
    Css(CssMetadata),
    Js(JsMetadata),
}

impl MetadataBag {
    /// Create a bag holding the hardcoded defaults for `asset_type`
    pub fn new(asset_type: AssetType) -> Self {
        match asset_type {
            AssetType::Css => MetadataBag::Css(CssMetadata::default()),
            AssetType::Js => MetadataBag::Js(JsMetadata::default()),
        }
    }

    /// Create a bag from the type defaults overlaid with `values`
    pub fn with_values(asset_type: AssetType, values: Map<String, Value>) -> Result<Self> {
        let mut bag = Self::new(asset_type);
        bag.replace(values)?;
        Ok(bag)
    }

    pub fn asset_type(&self) -> AssetType {
        match self {
            MetadataBag::Css(_) => AssetType::Css,
            MetadataBag::Js(_) => AssetType::Js,
        }
    }

    /// Merge `overrides` into the current values.
    ///
    /// Unknown keys are accepted. A known key holding a value of the wrong
    /// shape fails with `InvalidArgument` and leaves the bag untouched.
    pub fn replace(&mut self, overrides: Map<String, Value>) -> Result<()> {
        if overrides.is_empty() {
            return Ok(());
        }

        let mut merged = self.all()?;
        merged.extend(overrides);
        *self = Self::from_map(self.asset_type(), merged)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.all()?.remove(key))
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        let mut single = Map::new();
        single.insert(key.into(), value);
        self.replace(single)
    }

    /// All values, known and extra, as a flat map.
    ///
    /// Fails with `InvalidArgument` when the weight is not a finite number,
    /// since JSON has no representation for it.
    pub fn all(&self) -> Result<Map<String, Value>> {
        check_weight(self.weight())?;

        let value = match self {
            MetadataBag::Css(record) => serde_json::to_value(record),
            MetadataBag::Js(record) => serde_json::to_value(record),
        }
        .map_err(|e| anyhow::anyhow!("Failed to serialize {} metadata: {}", self.asset_type(), e))?;

        match value {
            Value::Object(map) => Ok(map),
            other => Err(anyhow::anyhow!(
                "{} metadata serialized to a non-object: {}",
                self.asset_type(),
                other
            )
            .into()),
        }
    }

    pub fn preprocess(&self) -> bool {
        match self {
            MetadataBag::Css(record) => record.preprocess,
            MetadataBag::Js(record) => record.preprocess,
        }
    }

    pub fn every_page(&self) -> bool {
        match self {
            MetadataBag::Css(record) => record.every_page,
            MetadataBag::Js(record) => record.every_page,
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            MetadataBag::Css(record) => record.weight,
            MetadataBag::Js(record) => record.weight,
        }
    }

    /// Media target, CSS only
    pub fn media(&self) -> Option<&str> {
        match self {
            MetadataBag::Css(record) => Some(&record.media),
            MetadataBag::Js(_) => None,
        }
    }

    /// Page placement, JS only
    pub fn scope(&self) -> Option<Scope> {
        match self {
            MetadataBag::Css(_) => None,
            MetadataBag::Js(record) => Some(record.scope),
        }
    }

    fn from_map(asset_type: AssetType, map: Map<String, Value>) -> Result<Self> {
        if matches!(map.get("weight"), Some(Value::Null)) {
            return Err(Error::InvalidArgument(
                "weight must be a finite number, got null".to_string(),
            ));
        }

        let value = Value::Object(map);
        let bag = match asset_type {
            AssetType::Css => serde_json::from_value(value).map(MetadataBag::Css),
            AssetType::Js => serde_json::from_value(value).map(MetadataBag::Js),
        };

        bag.map_err(|e| {
            Error::InvalidArgument(format!("Invalid {} metadata: {}", asset_type, e))
        })
    }
}

fn check_weight(weight: f64) -> Result<()> {
    if weight.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "weight must be a finite number, got {}",
            weight
        )))
    }
}

impl From<CssMetadata> for MetadataBag {
    fn from(record: CssMetadata) -> Self {
        MetadataBag::Css(record)
    }
}

impl From<JsMetadata> for MetadataBag {
    fn from(record: JsMetadata) -> Self {
        MetadataBag::Js(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn overrides(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_asset_type() {
        assert_eq!("css".parse::<AssetType>().unwrap(), AssetType::Css);
        assert_eq!("style".parse::<AssetType>().unwrap(), AssetType::Css);
        assert_eq!("js".parse::<AssetType>().unwrap(), AssetType::Js);
        assert_eq!("script".parse::<AssetType>().unwrap(), AssetType::Js);

        let err = "img".parse::<AssetType>().unwrap_err();
        assert!(matches!(err, Error::InvalidType(_)));
    }

    #[test]
    fn test_type_defaults() {
        let css = MetadataBag::new(AssetType::Css);
        assert_eq!(css.asset_type(), AssetType::Css);
        assert_eq!(css.media(), Some("all"));
        assert_eq!(css.scope(), None);
        assert!(css.preprocess());
        assert!(!css.every_page());

        let js = MetadataBag::new(AssetType::Js);
        assert_eq!(js.asset_type(), AssetType::Js);
        assert_eq!(js.scope(), Some(Scope::Footer));
        assert_eq!(js.media(), None);
        assert_eq!(js.get("cache").unwrap(), Some(json!(true)));
        assert_eq!(js.get("version").unwrap(), Some(Value::Null));
    }

    #[test]
    fn test_with_values_overlays_defaults() {
        let bag = MetadataBag::with_values(
            AssetType::Css,
            overrides(json!({"media": "print", "weight": 5})),
        )
        .unwrap();

        assert_eq!(bag.media(), Some("print"));
        assert_eq!(bag.weight(), 5.0);
        assert!(bag.preprocess());
    }

    #[test]
    fn test_replace_accepts_unknown_keys() {
        let mut bag = MetadataBag::new(AssetType::Js);
        bag.replace(overrides(json!({"scope": "header", "defer": true})))
            .unwrap();

        assert_eq!(bag.scope(), Some(Scope::Header));
        assert_eq!(bag.get("defer").unwrap(), Some(json!(true)));
        match &bag {
            MetadataBag::Js(record) => assert_eq!(record.extra.get("defer"), Some(&json!(true))),
            MetadataBag::Css(_) => panic!("bag changed type"),
        }
    }

    #[test]
    fn test_replace_rejects_mistyped_known_key() {
        let mut bag = MetadataBag::new(AssetType::Css);
        let before = bag.clone();

        let err = bag
            .replace(overrides(json!({"preprocess": "yes", "media": "print"})))
            .unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(bag, before);
    }

    #[test]
    fn test_set_single_key() {
        let mut bag = MetadataBag::new(AssetType::Css);
        bag.set("preprocess", json!(false)).unwrap();
        assert!(!bag.preprocess());
    }

    #[test]
    fn test_clone_is_independent() {
        let template = MetadataBag::new(AssetType::Css);
        let mut copy = template.clone();
        copy.set("media", json!("screen")).unwrap();

        assert_eq!(template.media(), Some("all"));
        assert_eq!(copy.media(), Some("screen"));
    }

    #[test]
    fn test_non_finite_weight_is_rejected() {
        let mut bag = MetadataBag::from(CssMetadata {
            weight: f64::NAN,
            ..Default::default()
        });

        let err = bag.all().unwrap_err();
        assert!(matches!(&err, Error::InvalidArgument(msg) if msg.contains("weight")));

        let err = bag
            .replace(overrides(json!({"media": "print"})))
            .unwrap_err();
        assert!(matches!(&err, Error::InvalidArgument(msg) if msg.contains("weight")));
        assert_eq!(bag.media(), Some("all"));

        let mut js = MetadataBag::from(JsMetadata {
            weight: f64::INFINITY,
            ..Default::default()
        });
        assert!(js.get("scope").is_err());
        assert!(js.set("defer", json!(true)).is_err());
    }

    #[test]
    fn test_null_weight_override_is_rejected() {
        let err = MetadataBag::with_values(AssetType::Js, overrides(json!({"weight": null})))
            .unwrap_err();
        assert!(matches!(&err, Error::InvalidArgument(msg) if msg.contains("finite")));
    }
}
