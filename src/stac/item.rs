//! STAC item documents.
//!
//! Only the parts of an item the tiler needs are modelled: the bounding box
//! and the assets with their `eo`, `raster` and `proj` extension fields.
//! Asset order follows the document.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ReaderError;

/// A parsed STAC item.
#[derive(Debug, Clone, PartialEq)]
pub struct StacItem {
    pub id: String,

    /// `[west, south, east, north]`
    pub bbox: [f64; 4],

    /// Assets in document order
    pub assets: Vec<StacAsset>,
}

/// One asset of a STAC item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StacAsset {
    /// Key of the asset in the item's `assets` object
    #[serde(skip)]
    pub name: String,

    pub href: String,

    #[serde(rename = "type", default)]
    pub media_type: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(rename = "eo:bands", default)]
    pub eo_bands: Vec<EoBand>,

    #[serde(rename = "raster:bands", default)]
    pub raster_bands: Vec<RasterBand>,

    /// `[rows, columns]`
    #[serde(rename = "proj:shape", default)]
    pub proj_shape: Option<Vec<u32>>,
}

/// Band description from the `eo` extension.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EoBand {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub common_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub center_wavelength: Option<f64>,
}

/// Band description from the `raster` extension.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RasterBand {
    /// Number, or one of the strings "nan", "inf", "-inf"
    #[serde(default)]
    pub nodata: Option<Value>,

    #[serde(default)]
    pub data_type: Option<String>,

    #[serde(default)]
    pub scale: Option<f64>,

    #[serde(default)]
    pub offset: Option<f64>,

    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default)]
    pub statistics: Option<BandStatistics>,

    #[serde(default)]
    pub histogram: Option<BandHistogram>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BandStatistics {
    #[serde(default)]
    pub minimum: Option<f64>,

    #[serde(default)]
    pub maximum: Option<f64>,

    #[serde(default)]
    pub mean: Option<f64>,

    #[serde(default)]
    pub stddev: Option<f64>,

    #[serde(default)]
    pub valid_percent: Option<f64>,
}

/// Equal-width histogram over `[min, max]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BandHistogram {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub buckets: Vec<u64>,
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(rename = "type", default)]
    kind: Option<String>,

    #[serde(default)]
    id: Option<String>,

    #[serde(default)]
    bbox: Option<Vec<f64>>,

    #[serde(default)]
    properties: Map<String, Value>,

    #[serde(default)]
    assets: Map<String, Value>,
}

impl StacItem {
    /// Parse an item document.
    pub fn from_slice(data: &[u8]) -> Result<Self, ReaderError> {
        let raw: RawItem = serde_json::from_slice(data)
            .map_err(|e| ReaderError::InvalidItem(format!("not a JSON document: {}", e)))?;

        if let Some(kind) = raw.kind.as_deref() {
            if kind != "Feature" {
                return Err(ReaderError::InvalidItem(format!(
                    "expected a Feature, found {}",
                    kind
                )));
            }
        }

        let id = raw.id.unwrap_or_default();
        let bbox = match raw.bbox.as_deref() {
            Some([w, s, e, n]) => [*w, *s, *e, *n],
            // 3D bbox: [w, s, zmin, e, n, zmax]
            Some([w, s, _, e, n, _]) => [*w, *s, *e, *n],
            Some(other) => {
                return Err(ReaderError::InvalidItem(format!(
                    "bbox must have 4 or 6 values, found {}",
                    other.len()
                )))
            }
            None => return Err(ReaderError::InvalidItem("item has no bbox".to_string())),
        };

        // Item level extension fields apply to assets that do not set their own
        let item_shape = raw
            .properties
            .get("proj:shape")
            .and_then(|v| serde_json::from_value::<Vec<u32>>(v.clone()).ok());

        let mut assets = Vec::with_capacity(raw.assets.len());
        for (name, value) in raw.assets {
            let mut asset: StacAsset = serde_json::from_value(value).map_err(|e| {
                ReaderError::InvalidItem(format!("asset {}: {}", name, e))
            })?;
            asset.name = name;
            if asset.proj_shape.is_none() {
                asset.proj_shape = item_shape.clone();
            }
            assets.push(asset);
        }

        Ok(Self { id, bbox, assets })
    }

    pub fn asset(&self, name: &str) -> Option<&StacAsset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

impl StacAsset {
    /// Number of bands described by the extensions, at least one.
    pub fn band_count(&self) -> usize {
        self.eo_bands.len().max(self.raster_bands.len()).max(1)
    }

    /// `(width, height)` from `proj:shape`.
    pub fn size(&self) -> Option<(u32, u32)> {
        match self.proj_shape.as_deref() {
            Some([rows, cols]) => Some((*cols, *rows)),
            _ => None,
        }
    }

    pub fn eo_band(&self, index: usize) -> Option<&EoBand> {
        self.eo_bands.get(index)
    }

    pub fn raster_band(&self, index: usize) -> Option<&RasterBand> {
        self.raster_bands.get(index)
    }
}

impl RasterBand {
    /// Whether a nodata value is declared.
    pub fn has_nodata(&self) -> bool {
        matches!(self.nodata, Some(ref v) if !v.is_null())
    }
}
