//! Default endpoint implementations of the base tiler factory.
//!
//! # Endpoints
//!
//! - `GET /tiles/{z}/{x}/{y}[@{scale}x][.{format}]` - Render a map tile
//! - `GET /tilejson.json` - TileJSON document for the dataset
//! - `GET /bounds` - Dataset bounds
//! - `GET /info` - Per asset dataset information
//! - `GET /metadata` - Per asset information with band statistics
//! - `GET /preview` - Render a preview image
//!
//! Every endpoint takes the dataset locator from the path resolver (the
//! `url` query parameter by default).

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use http::Uri;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{ReaderError, TilerError};
use crate::params::{MetadataParams, DEFAULT_MAX_SIZE};
use crate::reader::{ImageFormat, PreviewRequest, ReaderArgs, TileRequest};

use super::endpoints::EndpointName;
use super::state::TilerState;

/// Largest supported tile scale factor (`@4x`).
pub const MAX_TILE_SCALE: u8 = 4;

/// TileJSON specification version produced by the tilejson endpoint.
pub const TILEJSON_VERSION: &str = "2.2.0";

// =============================================================================
// Request Parameters
// =============================================================================

/// Path parameters for tile requests.
///
/// Extracted from: `/tiles/{z}/{x}/{y}` where the last segment is
/// `{y}[@{scale}x][.{format}]`, e.g. `12`, `12@2x` or `12@2x.webp`.
#[derive(Debug, Deserialize)]
pub struct TilePathParams {
    pub z: u8,

    pub x: u32,

    /// Tile row with optional scale and format suffixes
    pub y: String,
}

/// Parsed last segment of a tile path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileName {
    pub y: u32,
    pub scale: u8,
    pub format: Option<ImageFormat>,
}

impl TilePathParams {
    /// Parse the tile row, scale and format from the last path segment.
    pub fn tile_name(&self) -> Result<TileName, TilerError> {
        parse_tile_name(&self.y)
    }
}

/// Parse `{y}[@{scale}x][.{format}]`.
pub fn parse_tile_name(segment: &str) -> Result<TileName, TilerError> {
    let invalid = || TilerError::InvalidParameter {
        name: "y",
        value: segment.to_string(),
    };

    let (stem, format) = match segment.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ImageFormat::from_extension(ext).ok_or_else(invalid)?)),
        None => (segment, None),
    };

    let (y, scale) = match stem.split_once('@') {
        Some((y, scale)) => {
            let scale = scale
                .strip_suffix('x')
                .and_then(|s| s.parse::<u8>().ok())
                .filter(|s| (1..=MAX_TILE_SCALE).contains(s))
                .ok_or_else(invalid)?;
            (y, scale)
        }
        None => (stem, 1),
    };

    let y = y.parse::<u32>().map_err(|_| invalid())?;
    Ok(TileName { y, scale, format })
}

/// Query parameters for tilejson requests.
#[derive(Debug, Default, Deserialize)]
pub struct TileJsonQuery {
    #[serde(default)]
    pub tile_format: Option<String>,

    #[serde(default)]
    pub tile_scale: Option<String>,

    #[serde(default)]
    pub minzoom: Option<String>,

    #[serde(default)]
    pub maxzoom: Option<String>,
}

impl TileJsonQuery {
    /// Names consumed by the tilejson endpoint itself; every other query
    /// parameter is forwarded to the tile URL template.
    pub const OWN_PARAMS: [&'static str; 4] = ["tile_format", "tile_scale", "minzoom", "maxzoom"];
}

/// Query parameters for preview requests.
#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    /// Output format extension (png, jpg, webp, tif, npy)
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub max_size: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// TileJSON document.
#[derive(Debug, Serialize)]
pub struct TileJson {
    pub tilejson: &'static str,
    pub name: String,
    pub version: &'static str,
    pub scheme: &'static str,
    pub tiles: Vec<String>,
    pub minzoom: u8,
    pub maxzoom: u8,
    pub bounds: [f64; 4],
    pub center: (f64, f64, u8),
}

/// Response from the bounds endpoint.
#[derive(Debug, Serialize)]
pub struct BoundsResponse {
    pub bounds: [f64; 4],
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle tile requests.
///
/// # Headers
///
/// - `Content-Type` matching the requested format (PNG by default)
/// - `Cache-Control: public, max-age={cache_max_age}`
pub async fn tile_handler(
    State(state): State<TilerState>,
    Path(params): Path<TilePathParams>,
    uri: Uri,
) -> Result<Response, TilerError> {
    let name = params.tile_name()?;
    let request = TileRequest {
        z: params.z,
        x: params.x,
        y: name.y,
        scale: name.scale,
        format: name.format.unwrap_or_default(),
    };

    let dataset = state.resolve(&uri)?;
    let args = ReaderArgs::merged([state.layer_args(&uri), state.extra_args(&uri)]);

    let reader = state.open(&dataset).await?;
    let data = reader.tile(&request, &args).await?;

    debug!(
        url = %dataset.url,
        z = request.z,
        x = request.x,
        y = request.y,
        bytes = data.len(),
        "Rendered tile"
    );

    image_response(data, request.format, state.cache_max_age())
}

/// Handle tilejson requests.
///
/// The `tiles` template points back at the tile endpoint and carries every
/// query parameter except the ones consumed here.
pub async fn tilejson_handler(
    State(state): State<TilerState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<TileJson>, TilerError> {
    let Query(query) = Query::<TileJsonQuery>::try_from_uri(&uri).map_err(|rejection| {
        TilerError::InvalidParameter {
            name: "query",
            value: rejection.body_text(),
        }
    })?;

    let format = match query.tile_format.as_deref() {
        Some(ext) => Some(ImageFormat::from_extension(ext).ok_or_else(|| {
            TilerError::InvalidParameter {
                name: "tile_format",
                value: ext.to_string(),
            }
        })?),
        None => None,
    };
    let scale = match query.tile_scale.as_deref() {
        Some(raw) => raw
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|s| (1..=MAX_TILE_SCALE).contains(s))
            .ok_or_else(|| TilerError::InvalidParameter {
                name: "tile_scale",
                value: raw.to_string(),
            })?,
        None => 1,
    };
    let minzoom = parse_zoom("minzoom", query.minzoom.as_deref())?;
    let maxzoom = parse_zoom("maxzoom", query.maxzoom.as_deref())?;

    let dataset = state.resolve(&uri)?;
    let reader = state.open(&dataset).await?;

    let minzoom = minzoom.unwrap_or_else(|| reader.minzoom());
    let maxzoom = maxzoom.unwrap_or_else(|| reader.maxzoom());
    let bounds = reader.bounds();
    let (lon, lat, _) = reader.center();

    let mut tile_name = format!("{{y}}@{}x", scale);
    if let Some(format) = format {
        tile_name.push('.');
        tile_name.push_str(format.extension());
    }

    let mut tile_url = state
        .url_for(&headers, EndpointName::Tile)
        .ok_or_else(|| ReaderError::Backend("tile endpoint is not registered".to_string()))?
        .replace("{y}", &tile_name);

    let forwarded = forwarded_query(&uri, &TileJsonQuery::OWN_PARAMS);
    if !forwarded.is_empty() {
        tile_url.push('?');
        tile_url.push_str(&forwarded);
    }

    Ok(Json(TileJson {
        tilejson: TILEJSON_VERSION,
        name: dataset.url,
        version: "1.0.0",
        scheme: "xyz",
        tiles: vec![tile_url],
        minzoom,
        maxzoom,
        bounds,
        center: (lon, lat, minzoom),
    }))
}

/// Handle bounds requests.
pub async fn bounds_handler(
    State(state): State<TilerState>,
    uri: Uri,
) -> Result<Json<BoundsResponse>, TilerError> {
    let dataset = state.resolve(&uri)?;
    let reader = state.open(&dataset).await?;

    Ok(Json(BoundsResponse {
        bounds: reader.bounds(),
    }))
}

/// Handle info requests: forwards the layer selection to the reader.
pub async fn info_handler(State(state): State<TilerState>, uri: Uri) -> Result<Json<Value>, TilerError> {
    let dataset = state.resolve(&uri)?;
    let args = ReaderArgs::merged([state.layer_args(&uri), state.extra_args(&uri)]);

    let reader = state.open(&dataset).await?;
    let info = reader.info(&args).await?;

    state.shape(EndpointName::Info, &info)
}

/// Handle metadata requests.
///
/// Arguments are merged layer selection first, then statistics options,
/// then extra arguments; later sources win on conflicting names.
pub async fn metadata_handler(
    State(state): State<TilerState>,
    uri: Uri,
) -> Result<Json<Value>, TilerError> {
    let metadata_params = MetadataParams::from_uri(&uri)?;
    let dataset = state.resolve(&uri)?;
    let args = ReaderArgs::merged([
        state.layer_args(&uri),
        metadata_params.reader_args(),
        state.extra_args(&uri),
    ]);

    let reader = state.open(&dataset).await?;
    let metadata = reader
        .metadata(metadata_params.pmin, metadata_params.pmax, &args)
        .await?;

    state.shape(EndpointName::Metadata, &metadata)
}

/// Handle preview requests.
pub async fn preview_handler(
    State(state): State<TilerState>,
    uri: Uri,
) -> Result<Response, TilerError> {
    let Query(query) = Query::<PreviewQuery>::try_from_uri(&uri).map_err(|rejection| {
        TilerError::InvalidParameter {
            name: "query",
            value: rejection.body_text(),
        }
    })?;

    let format = match query.format.as_deref() {
        Some(ext) => ImageFormat::from_extension(ext).ok_or_else(|| TilerError::InvalidParameter {
            name: "format",
            value: ext.to_string(),
        })?,
        None => ImageFormat::default(),
    };
    let max_size = match query.max_size.as_deref() {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| TilerError::InvalidParameter {
                name: "max_size",
                value: raw.to_string(),
            })?,
        None => DEFAULT_MAX_SIZE as u32,
    };

    let dataset = state.resolve(&uri)?;
    let args = ReaderArgs::merged([state.layer_args(&uri), state.extra_args(&uri)]);

    let reader = state.open(&dataset).await?;
    let data = reader
        .preview(&PreviewRequest { format, max_size }, &args)
        .await?;

    image_response(data, format, state.cache_max_age())
}

// =============================================================================
// Helpers
// =============================================================================

fn image_response(
    data: bytes::Bytes,
    format: ImageFormat,
    cache_max_age: u32,
) -> Result<Response, TilerError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format.media_type())
        .header(
            header::CACHE_CONTROL,
            format!("public, max-age={}", cache_max_age),
        )
        .body(Body::from(data))
        .map_err(|e| ReaderError::Backend(e.to_string()).into())
}

fn parse_zoom(name: &'static str, raw: Option<&str>) -> Result<Option<u8>, TilerError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<u8>()
            .map(Some)
            .map_err(|_| TilerError::InvalidParameter {
                name,
                value: raw.to_string(),
            }),
        None => Ok(None),
    }
}

/// Re-encode the request query without the given parameter names.
pub fn forwarded_query(uri: &Uri, consumed: &[&str]) -> String {
    let Some(query) = uri.query() else {
        return String::new();
    };

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if !consumed.contains(&name.as_ref()) {
            serializer.append_pair(&name, &value);
        }
    }
    serializer.finish()
}
