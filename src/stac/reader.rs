//! The default reader: a STAC item and its raster assets.
//!
//! Everything this reader reports comes from the item document itself
//! (bbox, `proj:shape`, `eo:bands`, `raster:bands`). Pixel access is not
//! available, so `tile` and `preview` are unsupported.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info};

use crate::error::ReaderError;
use crate::io::{ItemSource, Location};
use crate::reader::{
    center_of, DatasetReader, Info, Metadata, NodataType, OrderedMap, PreviewRequest,
    ReaderArgs, ReaderOptions, ReaderType, TileRequest,
};

use super::cache::ItemCache;
use super::item::{StacAsset, StacItem};
use super::stats::{band_statistics, HistogramOptions};

// =============================================================================
// Reader type
// =============================================================================

/// Opens STAC items through an [`ItemSource`], caching parsed documents.
#[derive(Clone)]
pub struct StacReaderType {
    source: Arc<dyn ItemSource>,
    cache: Option<Arc<ItemCache>>,
}

impl StacReaderType {
    /// A reader type without item caching.
    pub fn new(source: impl ItemSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<ItemCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<ItemCache>> {
        self.cache.as_ref()
    }

    async fn load(&self, url: &str) -> Result<Arc<StacItem>, ReaderError> {
        if let Some(ref cache) = self.cache {
            if let Some(item) = cache.get(url).await {
                debug!(url = url, "Item cache hit");
                return Ok(item);
            }
        }

        let location = Location::parse(url).map_err(|e| ReaderError::Backend(e.to_string()))?;
        let data = self.source.fetch(&location).await?;
        let item = Arc::new(StacItem::from_slice(&data)?);
        info!(
            url = url,
            id = %item.id,
            assets = item.assets.len(),
            "Loaded STAC item"
        );

        if let Some(ref cache) = self.cache {
            cache.put(url, Arc::clone(&item)).await;
        }
        Ok(item)
    }
}

#[async_trait]
impl ReaderType for StacReaderType {
    fn name(&self) -> &str {
        "stac"
    }

    async fn open(
        &self,
        url: &str,
        options: &ReaderOptions,
    ) -> Result<Box<dyn DatasetReader>, ReaderError> {
        let item = self.load(url).await?;
        Ok(Box::new(StacItemReader::new(item, options.clone())))
    }
}

// =============================================================================
// Reader
// =============================================================================

/// An opened STAC item.
#[derive(Debug)]
pub struct StacItemReader {
    item: Arc<StacItem>,
    options: ReaderOptions,

    /// Names of the exposed assets, in document order
    assets: Vec<String>,
}

impl StacItemReader {
    pub fn new(item: Arc<StacItem>, options: ReaderOptions) -> Self {
        let assets = item
            .assets
            .iter()
            .filter(|a| options.accepts(&a.name, a.media_type.as_deref()))
            .map(|a| a.name.clone())
            .collect();
        Self {
            item,
            options,
            assets,
        }
    }

    pub fn item(&self) -> &StacItem {
        &self.item
    }

    fn asset(&self, name: &str) -> Result<&StacAsset, ReaderError> {
        if self.assets.iter().any(|a| a == name) {
            if let Some(asset) = self.item.asset(name) {
                return Ok(asset);
            }
        }
        Err(ReaderError::InvalidAsset {
            asset: name.to_string(),
            available: self.assets.join(", "),
        })
    }

    /// Zero-based band positions selected by 1-based `indexes`.
    fn band_positions(asset: &StacAsset, indexes: Option<&[u32]>) -> Result<Vec<usize>, ReaderError> {
        let count = asset.band_count();
        match indexes {
            Some(indexes) if !indexes.is_empty() => indexes
                .iter()
                .map(|&index| {
                    if index == 0 || index as usize > count {
                        Err(ReaderError::InvalidBandIndex {
                            asset: asset.name.clone(),
                            index,
                            count,
                        })
                    } else {
                        Ok(index as usize - 1)
                    }
                })
                .collect(),
            _ => Ok((0..count).collect()),
        }
    }

    fn asset_info(&self, asset: &StacAsset, bands: &[usize]) -> Info {
        let bounds = self.item.bbox;
        let minzoom = self.options.minzoom;

        let mut band_metadata = Vec::with_capacity(bands.len());
        let mut band_descriptions = Vec::with_capacity(bands.len());
        for &band in bands {
            let index = (band + 1).to_string();
            let eo = asset.eo_band(band);
            let raster = asset.raster_band(band);

            let mut metadata = BTreeMap::new();
            if let Some(eo) = eo {
                if let Some(ref common_name) = eo.common_name {
                    metadata.insert("common_name".to_string(), common_name.clone());
                }
                if let Some(wavelength) = eo.center_wavelength {
                    metadata.insert("center_wavelength".to_string(), wavelength.to_string());
                }
            }
            if let Some(unit) = raster.and_then(|r| r.unit.as_ref()) {
                metadata.insert("unit".to_string(), unit.clone());
            }

            let description = eo
                .and_then(|e| e.description.clone().or_else(|| e.name.clone()))
                .unwrap_or_default();

            band_metadata.push((index.clone(), metadata));
            band_descriptions.push((index, description));
        }

        let first_raster = bands.first().and_then(|&b| asset.raster_band(b));
        let nodata_type = if bands
            .iter()
            .filter_map(|&b| asset.raster_band(b))
            .any(|r| r.has_nodata())
        {
            NodataType::Nodata
        } else {
            NodataType::None
        };
        let size = asset.size();

        Info {
            bounds,
            center: center_of(&bounds, minzoom),
            minzoom,
            maxzoom: self.options.maxzoom,
            band_metadata,
            band_descriptions,
            dtype: first_raster
                .and_then(|r| r.data_type.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            nodata_type,
            colorinterp: None,
            scale: first_raster.and_then(|r| r.scale),
            offset: first_raster.and_then(|r| r.offset),
            width: size.map(|(w, _)| w),
            height: size.map(|(_, h)| h),
            count: Some(bands.len()),
        }
    }
}

#[async_trait]
impl DatasetReader for StacItemReader {
    fn assets(&self) -> Vec<String> {
        self.assets.clone()
    }

    fn bounds(&self) -> [f64; 4] {
        self.item.bbox
    }

    fn minzoom(&self) -> u8 {
        self.options.minzoom
    }

    fn maxzoom(&self) -> u8 {
        self.options.maxzoom
    }

    async fn info(&self, args: &ReaderArgs) -> Result<OrderedMap<Info>, ReaderError> {
        let selected = match args.assets() {
            Some(assets) if !assets.is_empty() => assets,
            _ => return Err(ReaderError::MissingAssets),
        };

        let mut out = OrderedMap::new();
        for name in selected {
            let asset = self.asset(name)?;
            let bands = Self::band_positions(asset, args.indexes())?;
            out.insert(name.clone(), self.asset_info(asset, &bands));
        }
        Ok(out)
    }

    async fn metadata(
        &self,
        pmin: f64,
        pmax: f64,
        args: &ReaderArgs,
    ) -> Result<OrderedMap<Metadata>, ReaderError> {
        let selected: Vec<String> = match args.assets() {
            Some(assets) if !assets.is_empty() => assets.to_vec(),
            _ => self.assets.clone(),
        };
        let histogram = HistogramOptions::from_args(args);

        let mut out = OrderedMap::new();
        for name in selected {
            let asset = self.asset(&name)?;
            let bands = Self::band_positions(asset, args.indexes())?;

            let mut statistics = OrderedMap::new();
            for &band in &bands {
                let stats = asset
                    .raster_band(band)
                    .and_then(|r| band_statistics(r, pmin, pmax, &histogram));
                if let Some(stats) = stats {
                    statistics.insert((band + 1).to_string(), stats);
                }
            }

            let info = self.asset_info(asset, &bands);
            out.insert(name, Metadata { info, statistics });
        }
        Ok(out)
    }

    async fn tile(&self, _request: &TileRequest, _args: &ReaderArgs) -> Result<Bytes, ReaderError> {
        Err(ReaderError::Unsupported {
            operation: "tile",
            reader: "stac".to_string(),
        })
    }

    async fn preview(
        &self,
        _request: &PreviewRequest,
        _args: &ReaderArgs,
    ) -> Result<Bytes, ReaderError> {
        Err(ReaderError::Unsupported {
            operation: "preview",
            reader: "stac".to_string(),
        })
    }

    fn close(&mut self) {
        debug!(id = %self.item.id, "Released STAC item");
    }
}
