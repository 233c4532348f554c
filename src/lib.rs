//! # STAC Tiler
//!
//! A dynamic tile and metadata server for SpatioTemporal Asset Catalog (STAC)
//! items that reference several raster assets.
//!
//! A STAC item is a catalog entry pointing at N independently addressable
//! assets (for example one file per satellite band). Clients select assets,
//! band indexes and band-math expressions through query parameters; this
//! crate turns those selectors into reader arguments and serves them through
//! a tiler whose endpoints can be individually replaced.
//!
//! ## Features
//!
//! - **Permissive selectors**: `assets=B1,B2`, `bidx=1,2`, `expression=B1/B2`
//! - **Asset discovery**: `/info` without a selection lists the item's assets
//! - **Overridable endpoints**: tilers start from the base endpoint table and
//!   replace individual entries
//! - **Item sources**: S3, HTTP(S) and local files, with an LRU item cache
//! - **Built-in web viewer**
//!
//! ## Architecture
//!
//! - [`params`] - Selector parsers and parameter bundles
//! - [`reader`] - Reader traits, models and request-scoped readers
//! - [`factory`] - Base tiler factory and endpoint table
//! - [`stac`] - STAC item reader and the STAC tiler
//! - [`io`] - Item fetching from S3, HTTP(S) and the filesystem
//! - [`server`] - Router assembly, error mapping and viewer page
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use stac_tiler::{create_router, ItemFetcher, RouterConfig, StacReaderType, StacTiler};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tiler = StacTiler::new(StacReaderType::new(ItemFetcher::new()));
//!     let router = create_router(tiler, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod io;
pub mod params;
pub mod reader;
pub mod server;
pub mod stac;

// Re-export commonly used types
pub use config::Config;
pub use error::{IoError, ReaderError, ResolveError, TilerError};
pub use factory::{
    DatasetRef, EndpointName, EndpointTable, PathResolver, Registration, ResponseModel,
    TilerFactory, TilerState, UrlPathResolver,
};
pub use io::{create_s3_client, ItemFetcher, ItemSource, Location};
pub use params::{
    build_args, parse_asset_list, parse_band_index_list, AssetsBidxExprParams, AssetsBidxParams,
    ExtraParams, LayerParamsKind, MetadataParams, NoExtraParams, PassthroughParams, ReaderParams,
};
pub use reader::{
    ArgValue, DatasetReader, ImageFormat, ImageStatistics, Info, Metadata, NodataType, ReaderArgs,
    ReaderOptions, ReaderScope, ReaderType,
};
pub use server::{
    create_router, health_handler, CorsPolicy, ErrorResponse, RouterConfig, ViewerPage,
};
pub use stac::{ItemCache, StacItem, StacItemReader, StacReaderType, StacTiler};
