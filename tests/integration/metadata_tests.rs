//! Integration tests for the STAC `/metadata` endpoint.
//!
//! Tests verify:
//! - Default percentiles and statistics options
//! - Argument precedence between selectors, statistics options and extras
//! - Response shaping of the metadata records
//! - Parameter validation

use axum::http::StatusCode;
use serde_json::json;

use stac_tiler::params::{DEFAULT_MAX_SIZE, DEFAULT_PMAX, DEFAULT_PMIN};
use stac_tiler::reader::{ArgValue, ASSETS, INDEXES};
use stac_tiler::{create_router, PassthroughParams, RouterConfig, StacTiler};

use super::test_utils::{encode, get_json, FakeReaderType, ITEM_URL};

fn metadata_uri(query: &str) -> String {
    let mut uri = format!("/stac/metadata?url={}", encode(ITEM_URL));
    if !query.is_empty() {
        uri.push('&');
        uri.push_str(query);
    }
    uri
}

#[tokio::test]
async fn test_metadata_defaults() {
    let reader = FakeReaderType::new(&["B1", "B2"]);
    let log = reader.log();
    let router = create_router(StacTiler::new(reader), RouterConfig::new());

    let body = get_json(&router, &metadata_uri(""), StatusCode::OK).await;

    let records = body.as_object().unwrap();
    assert_eq!(records.keys().collect::<Vec<_>>(), vec!["B1", "B2"]);

    let record = records["B1"].as_object().unwrap();
    assert!(!record.contains_key("minzoom"));
    assert!(!record.contains_key("maxzoom"));
    assert!(!record.contains_key("center"));
    assert_eq!(
        record["statistics"]["1"],
        json!({"percentiles": [2.0, 98.0], "min": 0.0, "max": 100.0, "mean": 50.0})
    );

    assert_eq!(log.last_percentiles(), Some((DEFAULT_PMIN, DEFAULT_PMAX)));
    let args = log.last_args().unwrap();
    assert_eq!(args.get("max_size"), Some(&ArgValue::Integer(DEFAULT_MAX_SIZE)));
    assert!(!args.contains_key(ASSETS));
    assert_eq!(log.closes(), 1);
}

#[tokio::test]
async fn test_metadata_with_selection_and_options() {
    let reader = FakeReaderType::new(&["B1", "B2"]);
    let log = reader.log();
    let router = create_router(StacTiler::new(reader), RouterConfig::new());

    let query = format!(
        "assets=B2&bidx=1&pmin=5&pmax=95&max_size=512&histogram_bins=8&histogram_range={}",
        encode("0,1000")
    );
    let body = get_json(&router, &metadata_uri(&query), StatusCode::OK).await;
    assert_eq!(body.as_object().unwrap().keys().collect::<Vec<_>>(), vec!["B2"]);

    assert_eq!(log.last_percentiles(), Some((5.0, 95.0)));
    let args = log.last_args().unwrap();
    assert_eq!(
        args.get(ASSETS),
        Some(&ArgValue::Strings(vec!["B2".to_string()]))
    );
    assert_eq!(args.get(INDEXES), Some(&ArgValue::Indexes(vec![1])));
    assert_eq!(args.get("max_size"), Some(&ArgValue::Integer(512)));
    assert_eq!(args.get("histogram_bins"), Some(&ArgValue::Integer(8)));
    assert_eq!(
        args.get("histogram_range"),
        Some(&ArgValue::Numbers(vec![0.0, 1000.0]))
    );
}

#[tokio::test]
async fn test_metadata_extra_params_win() {
    let reader = FakeReaderType::new(&["B1"]);
    let log = reader.log();
    let tiler = StacTiler::new(reader)
        .configure(|factory| factory.with_extra_params(PassthroughParams::new(["max_size"])));
    let router = create_router(tiler, RouterConfig::new());

    get_json(&router, &metadata_uri("max_size=64"), StatusCode::OK).await;

    let args = log.last_args().unwrap();
    assert_eq!(args.get("max_size"), Some(&ArgValue::Text("64".to_string())));
}

#[tokio::test]
async fn test_metadata_extra_params_override_assets() {
    let reader = FakeReaderType::new(&["B1", "B2"]);
    let log = reader.log();
    let tiler = StacTiler::new(reader)
        .configure(|factory| factory.with_extra_params(PassthroughParams::new(["assets"])));
    let router = create_router(tiler, RouterConfig::new());

    get_json(&router, &metadata_uri("assets=B2"), StatusCode::OK).await;

    // The extra text value replaces the parsed asset list
    let args = log.last_args().unwrap();
    assert_eq!(args.get(ASSETS), Some(&ArgValue::Text("B2".to_string())));
}

#[tokio::test]
async fn test_metadata_repeated_selectors_keep_last() {
    let reader = FakeReaderType::new(&["B1", "B2"]);
    let log = reader.log();
    let router = create_router(StacTiler::new(reader), RouterConfig::new());

    let body = get_json(
        &router,
        &metadata_uri("assets=B1&bidx=1&assets=B2&bidx=3"),
        StatusCode::OK,
    )
    .await;
    assert_eq!(body.as_object().unwrap().keys().collect::<Vec<_>>(), vec!["B2"]);

    let args = log.last_args().unwrap();
    assert_eq!(args.get(INDEXES), Some(&ArgValue::Indexes(vec![3])));
}

#[tokio::test]
async fn test_metadata_unknown_asset() {
    let reader = FakeReaderType::new(&["B1"]);
    let log = reader.log();
    let router = create_router(StacTiler::new(reader), RouterConfig::new());

    let body = get_json(&router, &metadata_uri("assets=B1,B5"), StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"], "invalid_asset");
    assert_eq!(log.closes(), log.opens());
}

#[tokio::test]
async fn test_metadata_invalid_parameters() {
    let reader = FakeReaderType::new(&["B1"]);
    let log = reader.log();
    let router = create_router(StacTiler::new(reader), RouterConfig::new());

    for query in [
        "pmin=abc",
        "pmax=101",
        "pmin=60&pmax=40",
        "max_size=0",
        "histogram_bins=-2",
        "histogram_bins=1025",
        "histogram_bins=2305843009213693952",
        "histogram_range=5",
    ] {
        let body = get_json(&router, &metadata_uri(query), StatusCode::BAD_REQUEST).await;
        assert_eq!(body["error"], "invalid_parameter", "query: {}", query);
    }

    // Parameters are validated before the dataset is opened
    assert_eq!(log.opens(), 0);
}
