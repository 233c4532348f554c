//! The base tiler factory.
//!
//! A [`TilerFactory`] holds the configuration shared by all endpoints of a
//! tiler (default reader, reader options, path resolver, extra parameters,
//! layer parameter bundle, router prefix) and produces the default
//! [`EndpointTable`]. Specialised tilers start from that table, override the
//! entries they need and build the router from the result:
//!
//! ```ignore
//! let factory = TilerFactory::new(reader_type).with_prefix("stac");
//! let table = factory
//!     .default_endpoints()
//!     .override_with(EndpointName::Info, INFO_MODEL, get(my_info_handler));
//! let router = factory.router_with(table);
//! ```

mod endpoints;
mod handlers;
mod path;
mod state;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::params::{ExtraParams, LayerParamsKind, NoExtraParams};
use crate::reader::{ReaderOptions, ReaderType};

pub use endpoints::{default_path, EndpointName, EndpointTable, Registration, ResponseModel};
pub use handlers::{
    bounds_handler, forwarded_query, info_handler, metadata_handler, parse_tile_name,
    preview_handler, tile_handler, tilejson_handler, BoundsResponse, PreviewQuery, TileJson,
    TileJsonQuery, TileName, TilePathParams, MAX_TILE_SCALE, TILEJSON_VERSION,
};
pub use path::{DatasetRef, PathResolver, UrlPathResolver};
pub use state::{base_url, TilerState};

/// Default `Cache-Control` max-age for rendered images, in seconds.
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

/// Configuration and endpoint table builder for a tiler.
#[derive(Clone)]
pub struct TilerFactory {
    reader: Arc<dyn ReaderType>,
    reader_options: ReaderOptions,
    path_resolver: Arc<dyn PathResolver>,
    extra_params: Arc<dyn ExtraParams>,
    layer_params: LayerParamsKind,
    router_prefix: String,
    cache_max_age: u32,
}

impl TilerFactory {
    /// A factory using `reader` by default, the `url` query parameter for
    /// dataset references and no extra parameters.
    pub fn new(reader: impl ReaderType + 'static) -> Self {
        Self::from_arc(Arc::new(reader))
    }

    pub fn from_arc(reader: Arc<dyn ReaderType>) -> Self {
        Self {
            reader,
            reader_options: ReaderOptions::default(),
            path_resolver: Arc::new(UrlPathResolver::new()),
            extra_params: Arc::new(NoExtraParams),
            layer_params: LayerParamsKind::default(),
            router_prefix: String::new(),
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
        }
    }

    pub fn with_reader_options(mut self, options: ReaderOptions) -> Self {
        self.reader_options = options;
        self
    }

    pub fn with_path_resolver(mut self, resolver: impl PathResolver + 'static) -> Self {
        self.path_resolver = Arc::new(resolver);
        self
    }

    pub fn with_extra_params(mut self, extra: impl ExtraParams + 'static) -> Self {
        self.extra_params = Arc::new(extra);
        self
    }

    pub fn with_layer_params(mut self, kind: LayerParamsKind) -> Self {
        self.layer_params = kind;
        self
    }

    /// Prefix the router is mounted under, used when building endpoint URLs.
    ///
    /// Leading and trailing slashes are ignored.
    pub fn with_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.router_prefix = prefix.as_ref().trim_matches('/').to_string();
        self
    }

    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    pub fn reader(&self) -> &Arc<dyn ReaderType> {
        &self.reader
    }

    pub fn reader_options(&self) -> &ReaderOptions {
        &self.reader_options
    }

    pub fn layer_params(&self) -> LayerParamsKind {
        self.layer_params
    }

    pub fn prefix(&self) -> &str {
        &self.router_prefix
    }

    /// The default table: one registration per [`EndpointName`].
    pub fn default_endpoints(&self) -> EndpointTable {
        let mut table = EndpointTable::new();
        for name in EndpointName::ALL {
            let handler = match name {
                EndpointName::Tile => get(tile_handler),
                EndpointName::TileJson => get(tilejson_handler),
                EndpointName::Bounds => get(bounds_handler),
                EndpointName::Info => get(info_handler),
                EndpointName::Metadata => get(metadata_handler),
                EndpointName::Preview => get(preview_handler),
            };
            table.register(Registration::new(
                name,
                default_path(name),
                ResponseModel::PASSTHROUGH,
                handler,
            ));
        }
        table
    }

    /// Handler state for the given endpoint table.
    pub fn state(&self, table: &EndpointTable) -> TilerState {
        let mut paths = BTreeMap::new();
        let mut models = BTreeMap::new();
        for name in table.names() {
            if let Some(path) = table.path(name) {
                paths.insert(name, path);
            }
            models.insert(name, table.response_model(name));
        }

        TilerState::new(
            Arc::clone(&self.reader),
            self.reader_options.clone(),
            Arc::clone(&self.path_resolver),
            Arc::clone(&self.extra_params),
            self.layer_params,
            self.router_prefix.clone(),
            self.cache_max_age,
            paths,
            models,
        )
    }

    /// Build the routes of `table`, relative to the router prefix.
    pub fn router_with(&self, table: EndpointTable) -> Router {
        let state = self.state(&table);
        table.into_router(state)
    }

    /// Build the routes of the default table.
    pub fn router(&self) -> Router {
        self.router_with(self.default_endpoints())
    }
}
