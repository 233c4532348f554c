//! Integration tests for the base tiler factory and endpoint overrides.
//!
//! Tests verify:
//! - Tile, tilejson, bounds and preview endpoints
//! - Layer parameter bundles reaching the reader
//! - Overriding individual endpoints of the default table
//! - Per locator reader selection through the path resolver

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get as get_route;
use axum::Json;
use serde_json::{json, Value};

use stac_tiler::factory::{EndpointName, ResponseModel, TilerFactory, TilerState};
use stac_tiler::params::LayerParamsKind;
use stac_tiler::reader::{ArgValue, ImageFormat, ASSETS, EXPRESSION};
use stac_tiler::{create_router, RouterConfig, StacTiler, UrlPathResolver};

use super::test_utils::{
    body_bytes, body_json, encode, get, get_json, get_with_host, FakeReaderType, BOUNDS, ITEM_URL,
};

fn item_query() -> String {
    format!("url={}", encode(ITEM_URL))
}

// =============================================================================
// Tiles
// =============================================================================

#[tokio::test]
async fn test_tile_with_scale_and_format() {
    let reader = FakeReaderType::new(&["B1", "B2"]);
    let log = reader.log();
    let router = TilerFactory::new(reader).router();

    let uri = format!(
        "/tiles/3/2/1@2x.jpg?{}&assets=B1&expression={}",
        item_query(),
        encode("B1*2")
    );
    let response = get(&router, &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/jpeg");
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=3600"
    );
    assert_eq!(&body_bytes(response).await[..], b"tile");

    let tile = log.last_tile().unwrap();
    assert_eq!((tile.z, tile.x, tile.y, tile.scale), (3, 2, 1, 2));
    assert_eq!(tile.format, ImageFormat::Jpeg);
    assert_eq!(tile.tile_size(), 512);

    let args = log.last_args().unwrap();
    assert_eq!(
        args.get(ASSETS),
        Some(&ArgValue::Strings(vec!["B1".to_string()]))
    );
    assert_eq!(args.get(EXPRESSION), Some(&ArgValue::Text("B1*2".to_string())));
    assert_eq!(log.closes(), 1);
}

#[tokio::test]
async fn test_tile_defaults_to_png() {
    let reader = FakeReaderType::new(&["B1"]);
    let log = reader.log();
    let router = TilerFactory::new(reader).with_cache_max_age(60).router();

    let response = get(&router, &format!("/tiles/0/0/0?{}", item_query())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=60"
    );

    let tile = log.last_tile().unwrap();
    assert_eq!(tile.scale, 1);
    assert_eq!(tile.format, ImageFormat::Png);
}

#[tokio::test]
async fn test_tile_keeps_empty_expression() {
    let reader = FakeReaderType::new(&["B1"]);
    let log = reader.log();
    let router = TilerFactory::new(reader).router();

    let uri = format!("/tiles/1/0/0?{}&assets=B1&expression=", item_query());
    assert_eq!(get(&router, &uri).await.status(), StatusCode::OK);

    let args = log.last_args().unwrap();
    assert_eq!(args.get(EXPRESSION), Some(&ArgValue::Text(String::new())));
}

#[tokio::test]
async fn test_tile_without_expression_bundle() {
    let reader = FakeReaderType::new(&["B1"]);
    let log = reader.log();
    let router = TilerFactory::new(reader)
        .with_layer_params(LayerParamsKind::AssetsBidx)
        .router();

    let uri = format!("/tiles/1/0/0?{}&assets=B1&expression=B1", item_query());
    assert_eq!(get(&router, &uri).await.status(), StatusCode::OK);

    let args = log.last_args().unwrap();
    assert!(args.contains_key(ASSETS));
    assert!(!args.contains_key(EXPRESSION));
}

#[tokio::test]
async fn test_tile_invalid_name() {
    let reader = FakeReaderType::new(&["B1"]);
    let log = reader.log();
    let router = TilerFactory::new(reader).router();

    for name in ["abc", "1@9x", "1@2x.gif", "1@x"] {
        let response = get(&router, &format!("/tiles/1/0/{}?{}", name, item_query())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "tile name: {}", name);
        assert_eq!(body_json(response).await["error"], "invalid_parameter");
    }
    assert_eq!(log.opens(), 0);
}

#[tokio::test]
async fn test_stac_tiler_inherits_tiles() {
    let reader = FakeReaderType::new(&["B1"]);
    let log = reader.log();
    let router = create_router(StacTiler::new(reader), RouterConfig::new());

    let uri = format!("/stac/tiles/4/3/2.webp?{}&assets=B1", item_query());
    let response = get(&router, &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/webp");
    assert_eq!(log.last_tile().unwrap().format, ImageFormat::Webp);
}

// =============================================================================
// TileJSON and Bounds
// =============================================================================

#[tokio::test]
async fn test_tilejson_document() {
    let reader = FakeReaderType::new(&["B1"]);
    let router = create_router(StacTiler::new(reader), RouterConfig::new());

    let uri = format!("/stac/tilejson.json?{}&assets=B1", item_query());
    let response = get_with_host(&router, &uri, "tiles.example.com").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["tilejson"], "2.2.0");
    assert_eq!(body["scheme"], "xyz");
    assert_eq!(body["name"], ITEM_URL);
    assert_eq!(body["minzoom"], 0);
    assert_eq!(body["maxzoom"], 24);
    assert_eq!(body["bounds"], json!(BOUNDS));
    assert_eq!(
        body["tiles"],
        json!([format!(
            "http://tiles.example.com/stac/tiles/{{z}}/{{x}}/{{y}}@1x?url={}&assets=B1",
            encode(ITEM_URL)
        )])
    );
}

#[tokio::test]
async fn test_tilejson_tile_options_are_consumed() {
    let reader = FakeReaderType::new(&["B1"]);
    let router = TilerFactory::new(reader).router();

    let uri = format!(
        "/tilejson.json?{}&tile_format=png&tile_scale=2&minzoom=3&maxzoom=9",
        item_query()
    );
    let response = get_with_host(&router, &uri, "localhost:9000").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["minzoom"], 3);
    assert_eq!(body["maxzoom"], 9);
    assert_eq!(body["center"][2], 3);
    assert_eq!(
        body["tiles"][0],
        format!(
            "http://localhost:9000/tiles/{{z}}/{{x}}/{{y}}@2x.png?url={}",
            encode(ITEM_URL)
        )
    );
}

#[tokio::test]
async fn test_tilejson_invalid_options() {
    let reader = FakeReaderType::new(&["B1"]);
    let router = TilerFactory::new(reader).router();

    for query in ["tile_format=gif", "tile_scale=0", "tile_scale=5", "minzoom=x"] {
        let uri = format!("/tilejson.json?{}&{}", item_query(), query);
        let response = get(&router, &uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "query: {}", query);
    }
}

#[tokio::test]
async fn test_bounds() {
    let reader = FakeReaderType::new(&["B1"]);
    let router = TilerFactory::new(reader).router();

    let body = get_json(&router, &format!("/bounds?{}", item_query()), StatusCode::OK).await;
    assert_eq!(body, json!({ "bounds": BOUNDS }));
}

// =============================================================================
// Base Info, Metadata and Preview
// =============================================================================

#[tokio::test]
async fn test_base_info_keeps_all_fields() {
    let reader = FakeReaderType::new(&["B1"]);
    let router = TilerFactory::new(reader).router();

    let uri = format!("/info?{}&assets=B1", item_query());
    let body = get_json(&router, &uri, StatusCode::OK).await;
    let record = body["B1"].as_object().unwrap();
    assert_eq!(record["minzoom"], 0);
    assert_eq!(record["maxzoom"], 24);
    assert!(record.contains_key("center"));
    assert!(record["colorinterp"].is_null());
}

#[tokio::test]
async fn test_base_info_requires_assets() {
    let reader = FakeReaderType::new(&["B1"]);
    let router = TilerFactory::new(reader).router();

    let body = get_json(
        &router,
        &format!("/info?{}", item_query()),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(body["error"], "missing_assets");
}

#[tokio::test]
async fn test_base_metadata_reads_layer_bundle() {
    let reader = FakeReaderType::new(&["B1"]);
    let log = reader.log();
    let router = TilerFactory::new(reader).router();

    let uri = format!("/metadata?{}&assets=B1&expression=B1", item_query());
    get_json(&router, &uri, StatusCode::OK).await;

    let args = log.last_args().unwrap();
    assert_eq!(args.get(EXPRESSION), Some(&ArgValue::Text("B1".to_string())));
    assert!(args.contains_key("max_size"));
}

#[tokio::test]
async fn test_preview() {
    let reader = FakeReaderType::new(&["B1"]);
    let log = reader.log();
    let router = TilerFactory::new(reader).router();

    let uri = format!("/preview?{}&assets=B1&format=jpg&max_size=256", item_query());
    let response = get(&router, &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/jpeg");
    assert_eq!(&body_bytes(response).await[..], b"preview");

    let preview = log.last_preview().unwrap();
    assert_eq!(preview.format, ImageFormat::Jpeg);
    assert_eq!(preview.max_size, 256);

    let response = get(&router, &format!("/preview?{}&max_size=0", item_query())).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Endpoint Overrides
// =============================================================================

async fn fixed_bounds(State(state): State<TilerState>) -> Json<Value> {
    Json(json!({ "bounds": [0, 0, 1, 1], "prefix": state.prefix() }))
}

#[tokio::test]
async fn test_override_single_endpoint() {
    let reader = FakeReaderType::new(&["B1"]);
    let log = reader.log();
    let factory = TilerFactory::new(reader);

    let table = factory.default_endpoints().override_with(
        EndpointName::Bounds,
        ResponseModel::PASSTHROUGH,
        get_route(fixed_bounds),
    );
    assert_eq!(table.overridden(), &[EndpointName::Bounds]);
    assert_eq!(table.path(EndpointName::Bounds), Some("/bounds"));

    let router = factory.router_with(table);

    let body = get_json(&router, "/bounds", StatusCode::OK).await;
    assert_eq!(body, json!({ "bounds": [0, 0, 1, 1], "prefix": "" }));
    assert_eq!(log.opens(), 0);

    // Other endpoints keep the default behaviour
    let response = get(&router, &format!("/tiles/0/0/0?{}", item_query())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(log.opens(), 1);
}

#[tokio::test]
async fn test_path_resolver_reader_override() {
    let default_reader = FakeReaderType::new(&["B1"]);
    let special_reader = FakeReaderType::new(&["red", "green"]).named("special");
    let default_log = default_reader.log();
    let special_log = special_reader.log();

    let resolver = UrlPathResolver::new()
        .with_override("https://special.example.com/", Arc::new(special_reader));
    let tiler = StacTiler::new(default_reader)
        .configure(|factory| factory.with_path_resolver(resolver));
    let router = create_router(tiler, RouterConfig::new());

    let uri = format!(
        "/stac/info?url={}",
        encode("https://SPECIAL.example.com/item.json")
    );
    let body = get_json(&router, &uri, StatusCode::OK).await;
    assert_eq!(body, json!(["red", "green"]));
    assert_eq!(special_log.opens(), 1);
    assert_eq!(default_log.opens(), 0);

    let body = get_json(&router, &format!("/stac/info?{}", item_query()), StatusCode::OK).await;
    assert_eq!(body, json!(["B1"]));
    assert_eq!(default_log.opens(), 1);
}

#[tokio::test]
async fn test_health_endpoint() {
    let reader = FakeReaderType::new(&["B1"]);
    let router = create_router(StacTiler::new(reader), RouterConfig::new());

    let body = get_json(&router, "/health", StatusCode::OK).await;
    assert_eq!(body["status"], "healthy");
}
