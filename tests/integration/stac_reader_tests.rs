//! Integration tests for the STAC item reader against documents on disk.
//!
//! Tests verify:
//! - Asset filtering by media type and name
//! - Per asset info derived from the item extensions
//! - Band statistics from `raster:bands` summaries
//! - Error mapping for missing and malformed documents
//! - Item caching

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use tempfile::TempDir;

use stac_tiler::reader::ReaderOptions;
use stac_tiler::{create_router, ItemCache, ItemFetcher, RouterConfig, StacReaderType, StacTiler};

use super::test_utils::{encode, get_json};

const ITEM: &str = r#"{
    "type": "Feature",
    "stac_version": "1.0.0",
    "id": "S2A_T33UUP_20240101",
    "bbox": [12.0, 48.0, 13.5, 49.0],
    "geometry": null,
    "properties": {
        "datetime": "2024-01-01T10:00:00Z",
        "proj:shape": [1098, 1098]
    },
    "assets": {
        "B04": {
            "href": "https://example.com/B04.tif",
            "type": "image/tiff; application=geotiff; profile=cloud-optimized",
            "title": "Red",
            "eo:bands": [{"name": "B04", "common_name": "red", "center_wavelength": 0.665}],
            "raster:bands": [{
                "data_type": "uint16",
                "nodata": 0,
                "scale": 0.0001,
                "statistics": {"minimum": 1, "maximum": 10000, "mean": 1200.5, "stddev": 300.2},
                "histogram": {"count": 4, "min": 0, "max": 100, "buckets": [10, 20, 30, 40]}
            }]
        },
        "B08": {
            "href": "https://example.com/B08.tif",
            "type": "image/tiff; application=geotiff",
            "proj:shape": [2196, 2000],
            "eo:bands": [{"name": "B08", "common_name": "nir"}],
            "raster:bands": [{"data_type": "uint16"}]
        },
        "thumbnail": {
            "href": "https://example.com/thumb.png",
            "type": "image/png"
        }
    }
}"#;

fn write_item(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn endpoint(name: &str, path: &Path, query: &str) -> String {
    let mut uri = format!(
        "/stac/{}?url={}",
        name,
        encode(&path.display().to_string())
    );
    if !query.is_empty() {
        uri.push('&');
        uri.push_str(query);
    }
    uri
}

fn stac_router(cache: Option<Arc<ItemCache>>) -> axum::Router {
    let mut reader = StacReaderType::new(ItemFetcher::new());
    if let Some(cache) = cache {
        reader = reader.with_cache(cache);
    }
    create_router(StacTiler::new(reader), RouterConfig::new())
}

// =============================================================================
// Info
// =============================================================================

#[tokio::test]
async fn test_lists_raster_assets_only() {
    let dir = TempDir::new().unwrap();
    let path = write_item(&dir, "item.json", ITEM);
    let router = stac_router(None);

    let body = get_json(&router, &endpoint("info", &path, ""), StatusCode::OK).await;
    assert_eq!(body, json!(["B04", "B08"]));
}

#[tokio::test]
async fn test_reader_options_exclude_assets() {
    let dir = TempDir::new().unwrap();
    let path = write_item(&dir, "item.json", ITEM);

    let tiler = StacTiler::new(StacReaderType::new(ItemFetcher::new())).with_reader_options(
        ReaderOptions::any_asset_type().with_exclude_assets(vec!["B08".to_string()]),
    );
    let router = create_router(tiler, RouterConfig::new());

    let body = get_json(&router, &endpoint("info", &path, ""), StatusCode::OK).await;
    assert_eq!(body, json!(["B04", "thumbnail"]));
}

#[tokio::test]
async fn test_info_records_from_extensions() {
    let dir = TempDir::new().unwrap();
    let path = write_item(&dir, "item.json", ITEM);
    let router = stac_router(None);

    let body = get_json(
        &router,
        &endpoint("info", &path, "assets=B04,B08"),
        StatusCode::OK,
    )
    .await;

    let red = &body["B04"];
    assert_eq!(red["bounds"], json!([12.0, 48.0, 13.5, 49.0]));
    assert_eq!(red["dtype"], "uint16");
    assert_eq!(red["nodata_type"], "Nodata");
    assert_eq!(red["scale"], 0.0001);
    assert_eq!(red["width"], 1098);
    assert_eq!(red["height"], 1098);
    assert_eq!(red["count"], 1);
    assert_eq!(red["band_metadata"][0][1]["common_name"], "red");
    assert_eq!(red["band_descriptions"], json!([["1", "B04"]]));
    assert!(red.get("minzoom").is_none());
    assert!(red.get("center").is_none());
    assert!(red.get("offset").is_none());

    let nir = &body["B08"];
    assert_eq!(nir["nodata_type"], "None");
    assert_eq!(nir["width"], 2000);
    assert_eq!(nir["height"], 2196);
}

#[tokio::test]
async fn test_info_filtered_asset_is_invalid() {
    let dir = TempDir::new().unwrap();
    let path = write_item(&dir, "item.json", ITEM);
    let router = stac_router(None);

    let body = get_json(
        &router,
        &endpoint("info", &path, "assets=thumbnail"),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(body["error"], "invalid_asset");
    assert!(body["message"].as_str().unwrap().contains("B04"));
}

#[tokio::test]
async fn test_info_band_index_out_of_range() {
    let dir = TempDir::new().unwrap();
    let path = write_item(&dir, "item.json", ITEM);
    let router = stac_router(None);

    let body = get_json(
        &router,
        &endpoint("info", &path, "assets=B04&bidx=2"),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(body["error"], "invalid_band_index");
}

// =============================================================================
// Metadata
// =============================================================================

#[tokio::test]
async fn test_metadata_statistics() {
    let dir = TempDir::new().unwrap();
    let path = write_item(&dir, "item.json", ITEM);
    let router = stac_router(None);

    let body = get_json(&router, &endpoint("metadata", &path, ""), StatusCode::OK).await;

    let red = &body["B04"]["statistics"]["1"];
    assert_eq!(red["min"], 1.0);
    assert_eq!(red["max"], 10000.0);
    assert_eq!(red["mean"], 1200.5);
    assert_eq!(red["std"], 300.2);
    assert_eq!(red["percentiles"].as_array().unwrap().len(), 2);
    assert_eq!(red["histogram"].as_array().unwrap().len(), 2);

    // No summary in the document: no statistics for that band
    assert_eq!(body["B08"]["statistics"], json!({}));
    assert!(body.get("thumbnail").is_none());
}

#[tokio::test]
async fn test_metadata_histogram_bins() {
    let dir = TempDir::new().unwrap();
    let path = write_item(&dir, "item.json", ITEM);
    let router = stac_router(None);

    let body = get_json(
        &router,
        &endpoint("metadata", &path, "assets=B04&histogram_bins=2"),
        StatusCode::OK,
    )
    .await;

    let histogram = body["B04"]["statistics"]["1"]["histogram"]
        .as_array()
        .unwrap();
    let counts = histogram[0].as_array().unwrap();
    assert_eq!(counts.len(), 2);
    let total: f64 = counts.iter().map(|c| c.as_f64().unwrap()).sum();
    assert_eq!(total, 100.0);
}

#[tokio::test]
async fn test_metadata_oversized_histogram_bins() {
    let dir = TempDir::new().unwrap();
    let path = write_item(&dir, "item.json", ITEM);
    let router = stac_router(None);

    for bins in ["1025", "2305843009213693952"] {
        let query = format!("assets=B04&histogram_bins={}", bins);
        let body = get_json(
            &router,
            &endpoint("metadata", &path, &query),
            StatusCode::BAD_REQUEST,
        )
        .await;
        assert_eq!(body["error"], "invalid_parameter", "bins: {}", bins);
    }

    // The largest accepted bin count still rebins
    let body = get_json(
        &router,
        &endpoint("metadata", &path, "assets=B04&histogram_bins=1024"),
        StatusCode::OK,
    )
    .await;
    let counts = body["B04"]["statistics"]["1"]["histogram"][0]
        .as_array()
        .unwrap();
    assert_eq!(counts.len(), 1024);
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_missing_document() {
    let dir = TempDir::new().unwrap();
    let router = stac_router(None);

    let body = get_json(
        &router,
        &endpoint("info", &dir.path().join("missing.json"), ""),
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_malformed_documents() {
    let dir = TempDir::new().unwrap();
    let router = stac_router(None);

    for (name, contents) in [
        ("garbage.json", "not json"),
        ("collection.json", r#"{"type": "Collection", "bbox": [0, 0, 1, 1]}"#),
        ("bbox.json", r#"{"type": "Feature", "bbox": [0, 0, 1]}"#),
    ] {
        let path = write_item(&dir, name, contents);
        let body = get_json(
            &router,
            &endpoint("info", &path, ""),
            StatusCode::UNPROCESSABLE_ENTITY,
        )
        .await;
        assert_eq!(body["error"], "invalid_item", "document: {}", name);
    }
}

#[tokio::test]
async fn test_tiles_are_not_implemented() {
    let dir = TempDir::new().unwrap();
    let path = write_item(&dir, "item.json", ITEM);
    let router = stac_router(None);

    let uri = format!(
        "/stac/tiles/10/550/355?url={}&assets=B04",
        encode(&path.display().to_string())
    );
    let body = get_json(&router, &uri, StatusCode::NOT_IMPLEMENTED).await;
    assert_eq!(body["error"], "not_implemented");
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn test_item_cache_serves_repeat_requests() {
    let dir = TempDir::new().unwrap();
    let path = write_item(&dir, "item.json", ITEM);
    let cache = Arc::new(ItemCache::new(4));
    let router = stac_router(Some(Arc::clone(&cache)));

    get_json(&router, &endpoint("info", &path, ""), StatusCode::OK).await;
    assert!(cache.get(&path.display().to_string()).await.is_some());
    assert_eq!(cache.len().await, 1);

    // Served from the cache once the document is gone
    std::fs::remove_file(&path).unwrap();
    let body = get_json(&router, &endpoint("info", &path, ""), StatusCode::OK).await;
    assert_eq!(body, json!(["B04", "B08"]));
}
