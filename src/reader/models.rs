//! Response records produced by readers.
//!
//! Optional fields serialize as `null`; endpoints decide whether nulls are
//! dropped through their response model (see [`crate::factory::ResponseModel`]).

use std::collections::BTreeMap;

use serde::Serialize;

use super::ordered::OrderedMap;

// =============================================================================
// Info
// =============================================================================

/// How no-data pixels are represented in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodataType {
    Alpha,
    Mask,
    Internal,
    Nodata,
    None,
}

/// Basic dataset information for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    /// Geographic bounds `[west, south, east, north]`
    pub bounds: [f64; 4],

    /// Default view `(longitude, latitude, zoom)`
    pub center: (f64, f64, u8),

    pub minzoom: u8,

    pub maxzoom: u8,

    /// Per band `(index, metadata)` pairs, 1-based index as a string
    pub band_metadata: Vec<(String, BTreeMap<String, String>)>,

    /// Per band `(index, description)` pairs
    pub band_descriptions: Vec<(String, String)>,

    /// Pixel data type (e.g. "uint16")
    pub dtype: String,

    pub nodata_type: NodataType,

    pub colorinterp: Option<Vec<String>>,

    pub scale: Option<f64>,

    pub offset: Option<f64>,

    pub width: Option<u32>,

    pub height: Option<u32>,

    pub count: Option<usize>,
}

// =============================================================================
// Metadata
// =============================================================================

/// Statistics for a single band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageStatistics {
    /// Values at the requested `[pmin, pmax]` percentiles
    pub percentiles: Vec<f64>,

    pub min: f64,

    pub max: f64,

    pub std: Option<f64>,

    pub mean: Option<f64>,

    /// `[counts, bin_edges]`
    pub histogram: Option<Vec<Vec<f64>>>,
}

/// Dataset information plus per band statistics for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    #[serde(flatten)]
    pub info: Info,

    /// Band index (1-based, as a string) to statistics, in band order
    pub statistics: OrderedMap<ImageStatistics>,
}

// =============================================================================
// Image formats
// =============================================================================

/// Output encodings understood by the tile and preview endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
    Tif,
    Npy,
}

impl ImageFormat {
    /// Parse a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::Webp),
            "tif" | "tiff" => Some(ImageFormat::Tif),
            "npy" => Some(ImageFormat::Npy),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Webp => "webp",
            ImageFormat::Tif => "tif",
            ImageFormat::Npy => "npy",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Tif => "image/tiff; application=geotiff",
            ImageFormat::Npy => "application/x-binary",
        }
    }
}

/// A map tile in the WebMercatorQuad grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRequest {
    pub z: u8,
    pub x: u32,
    pub y: u32,

    /// Tile size multiplier (1 = 256px, 2 = 512px)
    pub scale: u8,

    pub format: ImageFormat,
}

impl TileRequest {
    /// Edge length of the rendered tile in pixels.
    pub fn tile_size(&self) -> u32 {
        256 * u32::from(self.scale)
    }
}

/// A low resolution rendering of the whole dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewRequest {
    pub format: ImageFormat,
    pub max_size: u32,
}

/// Center point of `bounds` at `zoom`.
pub fn center_of(bounds: &[f64; 4], zoom: u8) -> (f64, f64, u8) {
    (
        (bounds[0] + bounds[2]) / 2.0,
        (bounds[1] + bounds[3]) / 2.0,
        zoom,
    )
}
