//! Request parameter bundles.
//!
//! Query parameters are parsed into [`ReaderArgs`](crate::reader::ReaderArgs)
//! bundles that handlers merge and hand to the reader:
//!
//! - [`AssetsBidxParams`] - `assets` + `bidx`
//! - [`AssetsBidxExprParams`] - `assets` + `bidx` + `expression`
//! - [`MetadataParams`] - `pmin`/`pmax` plus statistics options
//! - [`ExtraParams`] - integrator-supplied extra arguments

mod bundles;
mod extra;
mod metadata;
mod query;
mod selectors;

pub use bundles::{
    build_args, AssetsBidxExprParams, AssetsBidxParams, LayerParamsKind, ReaderParams,
};
pub use extra::{ExtraParams, NoExtraParams, PassthroughParams};
pub use metadata::{
    MetadataParams, MetadataQuery, DEFAULT_MAX_SIZE, DEFAULT_PMAX, DEFAULT_PMIN,
    MAX_HISTOGRAM_BINS,
};
pub use query::QueryValues;
pub use selectors::{parse_asset_list, parse_band_index_list, Selector};
