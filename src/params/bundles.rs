//! Asset, band and expression parameter bundles.
//!
//! A bundle holds its raw selectors as they appear in the query string and
//! builds the reader arguments for the selectors the client actually
//! supplied. Reading a bundle never fails: a repeated selector keeps its last
//! value and malformed band indexes contribute nothing.

use http::Uri;

use crate::reader::{ArgValue, ReaderArgs, ASSETS, EXPRESSION, INDEXES};

use super::query::QueryValues;
use super::selectors::{parse_asset_list, parse_band_index_list};

/// Something that turns request parameters into reader arguments.
pub trait ReaderParams {
    fn reader_args(&self) -> ReaderArgs;
}

/// Asset and band index selectors.
///
/// Query: `assets` (comma-delimited asset names), `bidx` (band indexes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetsBidxParams {
    pub assets: Option<String>,
    pub bidx: Option<String>,
}

impl AssetsBidxParams {
    pub fn from_query(query: &QueryValues) -> Self {
        Self {
            assets: query.owned("assets"),
            bidx: query.owned("bidx"),
        }
    }

    pub fn from_uri(uri: &Uri) -> Self {
        Self::from_query(&QueryValues::from_uri(uri))
    }
}

impl ReaderParams for AssetsBidxParams {
    fn reader_args(&self) -> ReaderArgs {
        build_args(self.assets.as_deref(), None, self.bidx.as_deref())
    }
}

/// Asset, band index and band-math expression selectors.
///
/// Query: `assets`, `expression` (e.g. `B1/B2`), `bidx`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetsBidxExprParams {
    pub assets: Option<String>,
    pub expression: Option<String>,
    pub bidx: Option<String>,
}

impl AssetsBidxExprParams {
    pub fn from_query(query: &QueryValues) -> Self {
        Self {
            assets: query.owned("assets"),
            expression: query.owned("expression"),
            bidx: query.owned("bidx"),
        }
    }
}

impl ReaderParams for AssetsBidxExprParams {
    fn reader_args(&self) -> ReaderArgs {
        build_args(
            self.assets.as_deref(),
            self.expression.as_deref(),
            self.bidx.as_deref(),
        )
    }
}

/// Build reader arguments from raw selector values.
///
/// Each selector sets its key only when present, even with an empty value;
/// no selector implies another.
pub fn build_args(assets: Option<&str>, expression: Option<&str>, bidx: Option<&str>) -> ReaderArgs {
    let mut args = ReaderArgs::new();

    if let Some(assets) = parse_asset_list(assets) {
        args.insert(ASSETS, ArgValue::Strings(assets));
    }
    if let Some(expression) = expression {
        args.insert(EXPRESSION, ArgValue::Text(expression.to_string()));
    }
    if let Some(indexes) = parse_band_index_list(bidx) {
        args.insert(INDEXES, ArgValue::Indexes(indexes));
    }

    args
}

/// Which bundle the layer endpoints (tile, preview, base info) read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerParamsKind {
    /// `assets` and `bidx` only; an `expression` parameter is ignored
    AssetsBidx,

    /// `assets`, `bidx` and `expression`
    #[default]
    AssetsBidxExpr,
}

impl LayerParamsKind {
    /// Read the layer bundle from a request URI.
    pub fn extract(&self, uri: &Uri) -> ReaderArgs {
        let query = QueryValues::from_uri(uri);
        match self {
            LayerParamsKind::AssetsBidx => AssetsBidxParams::from_query(&query).reader_args(),
            LayerParamsKind::AssetsBidxExpr => AssetsBidxExprParams::from_query(&query).reader_args(),
        }
    }
}
