//! Statistics parameters for the metadata endpoints.

use http::Uri;

use crate::error::TilerError;
use crate::reader::{ArgValue, ReaderArgs};

use super::query::QueryValues;

/// Default lower percentile.
pub const DEFAULT_PMIN: f64 = 2.0;

/// Default upper percentile.
pub const DEFAULT_PMAX: f64 = 98.0;

/// Default maximum edge length of the overview used for statistics.
pub const DEFAULT_MAX_SIZE: i64 = 1024;

/// Largest accepted `histogram_bins`.
pub const MAX_HISTOGRAM_BINS: usize = 1024;

/// Raw metadata query parameters, all as received.
#[derive(Debug, Clone, Default)]
pub struct MetadataQuery {
    pub pmin: Option<String>,
    pub pmax: Option<String>,
    pub max_size: Option<String>,
    pub histogram_bins: Option<String>,

    /// "min,max"
    pub histogram_range: Option<String>,

    /// Numeric nodata value, or "nan"
    pub nodata: Option<String>,

    pub resampling_method: Option<String>,
}

impl MetadataQuery {
    pub fn from_query(query: &QueryValues) -> Self {
        Self {
            pmin: query.owned("pmin"),
            pmax: query.owned("pmax"),
            max_size: query.owned("max_size"),
            histogram_bins: query.owned("histogram_bins"),
            histogram_range: query.owned("histogram_range"),
            nodata: query.owned("nodata"),
            resampling_method: query.owned("resampling_method"),
        }
    }
}

/// Parsed metadata parameters.
///
/// `pmin`/`pmax` are passed to the reader positionally; everything else is a
/// keyword argument. `max_size` is always set, the other keywords only when
/// supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataParams {
    pub pmin: f64,
    pub pmax: f64,
    kwargs: ReaderArgs,
}

impl Default for MetadataParams {
    fn default() -> Self {
        Self {
            pmin: DEFAULT_PMIN,
            pmax: DEFAULT_PMAX,
            kwargs: ReaderArgs::new().with("max_size", ArgValue::Integer(DEFAULT_MAX_SIZE)),
        }
    }
}

impl MetadataParams {
    /// Parse metadata parameters from a request URI.
    pub fn from_uri(uri: &Uri) -> Result<Self, TilerError> {
        Self::from_query(MetadataQuery::from_query(&QueryValues::from_uri(uri)))
    }

    pub fn from_query(query: MetadataQuery) -> Result<Self, TilerError> {
        let pmin = parse_percentile("pmin", query.pmin.as_deref(), DEFAULT_PMIN)?;
        let pmax = parse_percentile("pmax", query.pmax.as_deref(), DEFAULT_PMAX)?;
        if pmin > pmax {
            return Err(TilerError::InvalidParameter {
                name: "pmin",
                value: format!("{} (greater than pmax {})", pmin, pmax),
            });
        }

        let mut kwargs = ReaderArgs::new();

        let max_size = match query.max_size.as_deref() {
            Some(raw) => parse_number::<i64>("max_size", raw)?,
            None => DEFAULT_MAX_SIZE,
        };
        if max_size <= 0 {
            return Err(TilerError::InvalidParameter {
                name: "max_size",
                value: max_size.to_string(),
            });
        }
        kwargs.insert("max_size", ArgValue::Integer(max_size));

        if let Some(ref raw) = query.histogram_bins {
            let bins = parse_number::<i64>("histogram_bins", raw)?;
            if bins <= 0 || bins as u64 > MAX_HISTOGRAM_BINS as u64 {
                return Err(TilerError::InvalidParameter {
                    name: "histogram_bins",
                    value: raw.clone(),
                });
            }
            kwargs.insert("histogram_bins", ArgValue::Integer(bins));
        }

        if let Some(ref raw) = query.histogram_range {
            let range = raw
                .split(',')
                .map(|v| parse_number::<f64>("histogram_range", v.trim()))
                .collect::<Result<Vec<_>, _>>()?;
            if range.len() != 2 || range[0] > range[1] {
                return Err(TilerError::InvalidParameter {
                    name: "histogram_range",
                    value: raw.clone(),
                });
            }
            kwargs.insert("histogram_range", ArgValue::Numbers(range));
        }

        if let Some(ref raw) = query.nodata {
            let nodata = if raw.eq_ignore_ascii_case("nan") {
                f64::NAN
            } else {
                parse_number::<f64>("nodata", raw)?
            };
            kwargs.insert("nodata", ArgValue::Number(nodata));
        }

        if let Some(method) = query.resampling_method {
            kwargs.insert("resampling_method", ArgValue::Text(method));
        }

        Ok(Self { pmin, pmax, kwargs })
    }

    /// Keyword arguments for the reader's metadata operation.
    pub fn reader_args(&self) -> ReaderArgs {
        self.kwargs.clone()
    }
}

fn parse_percentile(name: &'static str, raw: Option<&str>, default: f64) -> Result<f64, TilerError> {
    let value = match raw {
        Some(raw) => parse_number::<f64>(name, raw)?,
        None => default,
    };
    if !(0.0..=100.0).contains(&value) {
        return Err(TilerError::InvalidParameter {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, TilerError> {
    raw.trim().parse::<T>().map_err(|_| TilerError::InvalidParameter {
        name,
        value: raw.to_string(),
    })
}
