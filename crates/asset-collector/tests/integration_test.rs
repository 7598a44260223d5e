use std::sync::Arc;

use asset_collector::{AssetCollector, CreateOptions};
use asset_core::{AssetBag, AssetCollection, AssetType, Filter, FnFilter, SourceType};

#[tokio::test]
async fn test_collect_and_load_mixed_assets() {
    let temp_dir = tempfile::tempdir().unwrap();
    let base = temp_dir.path().join("base.css");
    std::fs::write(&base, "body { margin: 0; }").unwrap();

    let mut collector = AssetCollector::with_collection(Box::new(AssetBag::new()));
    collector.lock("page-build").unwrap();

    let strip: Arc<dyn Filter> = Arc::new(FnFilter::new("strip", |content: String| {
        Ok(content.replace(' ', ""))
    }));

    let file = collector
        .create(
            "css",
            "file",
            base.to_str().unwrap(),
            CreateOptions::default().with_filter(strip),
        )
        .unwrap();
    let inline = collector
        .create("css", "inline", "h1 { color: red; }", CreateOptions::default())
        .unwrap();
    let cdn = collector
        .create(
            "js",
            "external",
            "https://cdn.example.com/lib.js",
            CreateOptions::default(),
        )
        .unwrap();

    for asset in collector.collection().unwrap().assets() {
        asset.load(None).await.unwrap();
    }

    assert_eq!(file.content(), Some("body{margin:0;}".to_string()));
    assert_eq!(inline.content(), Some("h1 { color: red; }".to_string()));
    assert_eq!(cdn.content(), None);

    assert_eq!(inline.source_type(), SourceType::String);
    assert!(inline.has_predecessor(file.id()));
    assert!(cdn.predecessors().is_empty());
    assert!(!cdn.is_preprocessable());

    collector.unlock("page-build").unwrap();
    let collection = collector.clear_collection().unwrap().unwrap();

    let ids: Vec<String> = collection
        .assets()
        .iter()
        .map(|asset| asset.id().to_string())
        .collect();
    assert_eq!(ids, vec![file.id(), inline.id(), cdn.id()]);
}

#[test]
fn test_same_file_is_collected_once() {
    let mut collector = AssetCollector::with_collection(Box::new(AssetBag::new()));

    let first = collector
        .create("css", "file", "themes/site/style.css", CreateOptions::default())
        .unwrap();
    let second = collector
        .create(
            "css",
            "file",
            "themes/site/../site/style.css",
            CreateOptions::default(),
        )
        .unwrap();

    assert_eq!(first.id(), second.id());
    assert_eq!(collector.collection().unwrap().len(), 1);
    // An asset is never ordered after itself
    assert!(second.predecessors().is_empty());
}

#[test]
fn test_recreated_file_returns_collected_instance() {
    let mut collector = AssetCollector::with_collection(Box::new(AssetBag::new()));

    let a = collector
        .create("css", "file", "themes/site/a.css", CreateOptions::default())
        .unwrap();
    let b = collector
        .create("css", "file", "themes/site/b.css", CreateOptions::default())
        .unwrap();
    let again = collector
        .create("css", "file", "themes/site/a.css", CreateOptions::default())
        .unwrap();

    let stored = collector.collection().unwrap().get(a.id()).unwrap();
    assert!(Arc::ptr_eq(&again, &stored));
    assert!(Arc::ptr_eq(&again, &a));
    assert_eq!(collector.collection().unwrap().len(), 2);

    // The ordering edge lands on the collected asset
    assert!(stored.has_predecessor(b.id()));
    assert!(b.has_predecessor(a.id()));
    assert_eq!(collector.last_css(), Some(a.id()));
}

#[test]
fn test_empty_inline_assets_stay_distinct() {
    let mut collector = AssetCollector::with_collection(Box::new(AssetBag::new()));

    let a = collector
        .create("js", "string", "", CreateOptions::default())
        .unwrap();
    let b = collector
        .create("js", "string", "", CreateOptions::default())
        .unwrap();

    assert_ne!(a.id(), b.id());
    assert_eq!(collector.collection().unwrap().len(), 2);
    assert_eq!(a.asset_type(), AssetType::Js);
}
