//! Reader abstraction layer.
//!
//! A reader opens one dataset reference (a STAC item for the default reader)
//! and answers asset listing, info, metadata and rendering queries over its
//! assets. Handlers never hold a reader directly: they open a
//! [`ReaderScope`], which releases the reader when it goes out of scope.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Endpoint handlers            │
//! └────────────────────┬────────────────────┘
//!                      │ ReaderScope::open(reader_type, url, options)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            ReaderType trait             │
//! │   (constructs readers from a locator)   │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           DatasetReader trait           │
//! │  assets / info / metadata / tile / ...  │
//! └─────────────────────────────────────────┘
//! ```

mod args;
mod models;
mod ordered;
mod scope;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ReaderError;

pub use args::{ArgValue, ReaderArgs, ASSETS, EXPRESSION, INDEXES};
pub use models::{
    center_of, ImageFormat, ImageStatistics, Info, Metadata, NodataType, PreviewRequest,
    TileRequest,
};
pub use ordered::OrderedMap;
pub use scope::ReaderScope;

/// Media types accepted by default when listing assets: GeoTIFF and COG.
pub const DEFAULT_ASSET_TYPES: &[&str] = &[
    "image/tiff; application=geotiff",
    "image/tiff; application=geotiff; profile=cloud-optimized",
    "image/tiff; profile=cloud-optimized; application=geotiff",
    "image/vnd.stac.geotiff; cloud-optimized=true",
    "image/tiff",
    "image/x.geotiff",
    "image/jp2",
];

/// Default minimum zoom advertised by readers.
pub const DEFAULT_MINZOOM: u8 = 0;

/// Default maximum zoom advertised by readers.
pub const DEFAULT_MAXZOOM: u8 = 24;

// =============================================================================
// Reader Options
// =============================================================================

/// Options applied when constructing a reader, fixed per tiler.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderOptions {
    /// Only expose these assets (None = no restriction)
    pub include_assets: Option<Vec<String>>,

    /// Never expose these assets
    pub exclude_assets: Option<Vec<String>>,

    /// Only expose assets whose media type is listed (None = any type)
    pub include_asset_types: Option<Vec<String>>,

    pub minzoom: u8,

    pub maxzoom: u8,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            include_assets: None,
            exclude_assets: None,
            include_asset_types: Some(DEFAULT_ASSET_TYPES.iter().map(|t| t.to_string()).collect()),
            minzoom: DEFAULT_MINZOOM,
            maxzoom: DEFAULT_MAXZOOM,
        }
    }
}

impl ReaderOptions {
    /// Options that expose every asset regardless of media type.
    pub fn any_asset_type() -> Self {
        Self {
            include_asset_types: None,
            ..Self::default()
        }
    }

    pub fn with_include_assets(mut self, assets: Vec<String>) -> Self {
        self.include_assets = Some(assets);
        self
    }

    pub fn with_exclude_assets(mut self, assets: Vec<String>) -> Self {
        self.exclude_assets = Some(assets);
        self
    }

    pub fn with_include_asset_types(mut self, types: Vec<String>) -> Self {
        self.include_asset_types = Some(types);
        self
    }

    pub fn with_zoom_range(mut self, minzoom: u8, maxzoom: u8) -> Self {
        self.minzoom = minzoom;
        self.maxzoom = maxzoom;
        self
    }

    /// Whether an asset with this name and media type is exposed.
    pub fn accepts(&self, name: &str, media_type: Option<&str>) -> bool {
        if let Some(ref include) = self.include_assets {
            if !include.iter().any(|a| a == name) {
                return false;
            }
        }
        if let Some(ref exclude) = self.exclude_assets {
            if exclude.iter().any(|a| a == name) {
                return false;
            }
        }
        match (&self.include_asset_types, media_type) {
            (None, _) => true,
            (Some(types), Some(media_type)) => types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(media_type.trim())),
            (Some(_), None) => false,
        }
    }
}

// =============================================================================
// Reader traits
// =============================================================================

/// An opened dataset with independently addressable assets.
///
/// Operations take their optional arguments as a [`ReaderArgs`] bundle and
/// look up the keys they understand (`assets`, `indexes`, `expression`,
/// `max_size`, ...). Unknown keys are ignored.
#[async_trait]
pub trait DatasetReader: Send + Sync {
    /// Names of the assets this dataset exposes, in catalog order.
    fn assets(&self) -> Vec<String>;

    /// Geographic bounds `[west, south, east, north]`.
    fn bounds(&self) -> [f64; 4];

    fn minzoom(&self) -> u8;

    fn maxzoom(&self) -> u8;

    /// Default view `(longitude, latitude, zoom)`.
    fn center(&self) -> (f64, f64, u8) {
        center_of(&self.bounds(), self.minzoom())
    }

    /// Per asset dataset information, in selection order.
    async fn info(&self, args: &ReaderArgs) -> Result<OrderedMap<Info>, ReaderError>;

    /// Per asset dataset information with band statistics.
    ///
    /// `pmin` and `pmax` are the percentiles reported for each band.
    async fn metadata(
        &self,
        pmin: f64,
        pmax: f64,
        args: &ReaderArgs,
    ) -> Result<OrderedMap<Metadata>, ReaderError>;

    /// Render one map tile.
    async fn tile(&self, request: &TileRequest, args: &ReaderArgs) -> Result<Bytes, ReaderError>;

    /// Render a preview of the whole dataset.
    async fn preview(
        &self,
        request: &PreviewRequest,
        args: &ReaderArgs,
    ) -> Result<Bytes, ReaderError>;

    /// Release resources held by the reader.
    ///
    /// Called exactly once by [`ReaderScope`] when the scope ends.
    fn close(&mut self) {}
}

/// A reader implementation: knows how to open a locator.
#[async_trait]
pub trait ReaderType: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Open the dataset at `url`.
    async fn open(
        &self,
        url: &str,
        options: &ReaderOptions,
    ) -> Result<Box<dyn DatasetReader>, ReaderError>;
}
