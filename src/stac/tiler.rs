//! The STAC tiler: the base factory with multi-asset `info` and `metadata`.
//!
//! A STAC item is a catalog of independently addressable assets, so the two
//! descriptive endpoints differ from the base factory:
//!
//! - `info` without an asset selection lists the item's assets instead of
//!   failing, so clients can discover them first
//! - both endpoints select assets with the `assets` + `bidx` bundle and drop
//!   `minzoom`, `maxzoom`, `center` and null fields from every record
//!
//! Tile, tilejson, bounds and preview are inherited unchanged. The tiler also
//! serves a `/viewer` page.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use http::Uri;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::TilerError;
use crate::factory::{EndpointName, EndpointTable, ResponseModel, TilerFactory, TilerState};
use crate::params::{AssetsBidxParams, LayerParamsKind, MetadataParams, ReaderParams};
use crate::reader::{Info, OrderedMap, ReaderArgs, ReaderOptions, ReaderType};
use crate::server::viewer::{viewer_handler, ViewerPage, ViewerState};

/// Default router prefix of the STAC tiler.
pub const DEFAULT_PREFIX: &str = "stac";

/// Fields dropped from each `info`/`metadata` record.
pub const EXCLUDED_FIELDS: &[&str] = &["minzoom", "maxzoom", "center"];

/// Response model of the `info` and `metadata` overrides.
pub const ASSET_RECORDS: ResponseModel = ResponseModel {
    exclude: EXCLUDED_FIELDS,
    exclude_none: true,
    per_record: true,
};

/// Endpoints the STAC tiler replaces; everything else is inherited.
pub const OVERRIDDEN_ENDPOINTS: [EndpointName; 2] = [EndpointName::Info, EndpointName::Metadata];

/// Body of the `info` endpoint: the asset list, or per asset information in
/// selection order.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum InfoResponse {
    Assets(Vec<String>),
    Records(OrderedMap<Info>),
}

/// Tiler for STAC items.
#[derive(Clone)]
pub struct StacTiler {
    factory: TilerFactory,
    viewer: Arc<ViewerPage>,
}

impl StacTiler {
    /// A tiler opening datasets with `reader` and reading the full
    /// `assets` + `expression` + `bidx` bundle on the layer endpoints.
    pub fn new(reader: impl ReaderType + 'static) -> Self {
        Self::with_factory(
            TilerFactory::new(reader)
                .with_layer_params(LayerParamsKind::AssetsBidxExpr)
                .with_prefix(DEFAULT_PREFIX),
        )
    }

    pub fn with_factory(factory: TilerFactory) -> Self {
        Self {
            factory,
            viewer: Arc::new(ViewerPage::default()),
        }
    }

    /// Adjust the underlying factory (prefix, resolver, extra parameters...).
    pub fn configure(mut self, f: impl FnOnce(TilerFactory) -> TilerFactory) -> Self {
        self.factory = f(self.factory);
        self
    }

    pub fn with_reader_options(self, options: ReaderOptions) -> Self {
        self.configure(|factory| factory.with_reader_options(options))
    }

    pub fn with_viewer(mut self, page: ViewerPage) -> Self {
        self.viewer = Arc::new(page);
        self
    }

    pub fn factory(&self) -> &TilerFactory {
        &self.factory
    }

    /// Default reader implementation.
    pub fn reader_type(&self) -> &Arc<dyn ReaderType> {
        self.factory.reader()
    }

    /// Bundle read by the layer endpoints (tile, preview).
    pub fn layer_params(&self) -> LayerParamsKind {
        self.factory.layer_params()
    }

    pub fn prefix(&self) -> &str {
        self.factory.prefix()
    }

    /// The base table with `info` and `metadata` replaced.
    pub fn endpoints(&self) -> EndpointTable {
        self.factory
            .default_endpoints()
            .override_with(EndpointName::Info, ASSET_RECORDS, get(info_handler))
            .override_with(EndpointName::Metadata, ASSET_RECORDS, get(metadata_handler))
    }

    /// All routes of the tiler, relative to its prefix.
    pub fn router(&self) -> Router {
        let table = self.endpoints();
        let state = self.factory.state(&table);

        let viewer = Router::new()
            .route("/viewer", get(viewer_handler))
            .with_state(ViewerState {
                tiler: state.clone(),
                page: Arc::clone(&self.viewer),
            });

        table.into_router(state).merge(viewer)
    }
}

/// Handle STAC info requests.
///
/// # Query Parameters
///
/// - `url`: STAC item locator
/// - `assets`: comma-delimited asset names (optional)
/// - `bidx`: band indexes (optional)
///
/// # Response
///
/// - without `assets` (or with an empty selection): `["B1", "B2", ...]`
/// - otherwise: `{"B1": {...}, ...}`
pub async fn info_handler(
    State(state): State<TilerState>,
    uri: Uri,
) -> Result<Json<Value>, TilerError> {
    let dataset = state.resolve(&uri)?;
    let asset_args = AssetsBidxParams::from_uri(&uri).reader_args();

    let reader = state.open(&dataset).await?;

    let response = match asset_args.assets() {
        Some(assets) if !assets.is_empty() => {
            let args = ReaderArgs::merged([asset_args, state.extra_args(&uri)]);
            InfoResponse::Records(reader.info(&args).await?)
        }
        _ => {
            debug!(url = %dataset.url, "No asset selected, listing assets");
            InfoResponse::Assets(reader.assets())
        }
    };

    state.shape(EndpointName::Info, &response)
}

/// Handle STAC metadata requests.
///
/// Reader arguments are merged asset selection, then statistics options,
/// then extra arguments; the last write of a name wins.
pub async fn metadata_handler(
    State(state): State<TilerState>,
    uri: Uri,
) -> Result<Json<Value>, TilerError> {
    let metadata_params = MetadataParams::from_uri(&uri)?;
    let dataset = state.resolve(&uri)?;
    let args = ReaderArgs::merged([
        AssetsBidxParams::from_uri(&uri).reader_args(),
        metadata_params.reader_args(),
        state.extra_args(&uri),
    ]);

    let reader = state.open(&dataset).await?;
    let metadata = reader
        .metadata(metadata_params.pmin, metadata_params.pmax, &args)
        .await?;

    state.shape(EndpointName::Metadata, &metadata)
}
