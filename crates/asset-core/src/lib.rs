//! Core domain models for asset collection
//!
//! This crate contains:
//! - Asset metadata with per-type defaults (MetadataBag)
//! - The Asset value object and its file/string/external sources
//! - Collections that hold created assets in insertion order
//! - The Library descriptor and its freeze protocol

pub mod asset;
pub mod collection;
pub mod error;
pub mod filter;
pub mod library;
pub mod metadata;

pub use asset::{Asset, AssetSource, SharedAsset, SourceType};
pub use collection::{AssetBag, AssetCollection};
pub use error::{Error, Result};
pub use filter::{Filter, FnFilter};
pub use library::{Library, LibraryValues};
pub use metadata::{AssetType, CssMetadata, JsMetadata, MetadataBag, Scope};
