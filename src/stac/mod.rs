//! STAC items: document model, default reader and the STAC tiler.

mod cache;
mod item;
mod reader;
mod stats;
mod tiler;

pub use cache::{ItemCache, DEFAULT_ITEM_CACHE_CAPACITY};
pub use item::{BandHistogram, BandStatistics, EoBand, RasterBand, StacAsset, StacItem};
pub use reader::{StacItemReader, StacReaderType};
pub use stats::{band_statistics, percentile, rebin, HistogramOptions};
pub use tiler::{
    info_handler, metadata_handler, InfoResponse, StacTiler, ASSET_RECORDS, DEFAULT_PREFIX,
    EXCLUDED_FIELDS, OVERRIDDEN_ENDPOINTS,
};
