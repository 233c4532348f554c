//! Band statistics from `raster:bands` summaries.
//!
//! Items carrying the raster extension may precompute per band statistics
//! and an equal-width histogram. Percentiles are interpolated from the
//! histogram; bands without one report their min/max instead.

use crate::params::MAX_HISTOGRAM_BINS;
use crate::reader::{ImageStatistics, ReaderArgs};

use super::item::{BandHistogram, RasterBand};

/// Histogram shaping requested by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HistogramOptions {
    pub bins: Option<usize>,
    pub range: Option<(f64, f64)>,
}

impl HistogramOptions {
    /// Read `histogram_bins` and `histogram_range` from reader arguments.
    ///
    /// Bins are clamped to [`MAX_HISTOGRAM_BINS`] whatever source set them.
    pub fn from_args(args: &ReaderArgs) -> Self {
        let bins = args
            .integer("histogram_bins")
            .filter(|b| *b > 0)
            .map(|b| usize::try_from(b).unwrap_or(usize::MAX).min(MAX_HISTOGRAM_BINS));
        let range = match args.numbers("histogram_range") {
            Some([lo, hi]) if lo <= hi => Some((*lo, *hi)),
            _ => None,
        };
        Self { bins, range }
    }
}

/// Statistics for one band, or `None` if the item carries no summary.
pub fn band_statistics(
    band: &RasterBand,
    pmin: f64,
    pmax: f64,
    options: &HistogramOptions,
) -> Option<ImageStatistics> {
    let summary = band.statistics.as_ref();
    let histogram = band.histogram.as_ref().filter(|h| !h.buckets.is_empty());

    let min = summary
        .and_then(|s| s.minimum)
        .or_else(|| histogram.map(|h| h.min))?;
    let max = summary
        .and_then(|s| s.maximum)
        .or_else(|| histogram.map(|h| h.max))?;

    let percentiles = match histogram {
        Some(h) => vec![
            percentile(&h.buckets, h.min, h.max, pmin),
            percentile(&h.buckets, h.min, h.max, pmax),
        ],
        None => vec![min, max],
    };

    Some(ImageStatistics {
        percentiles,
        min,
        max,
        std: summary.and_then(|s| s.stddev),
        mean: summary.and_then(|s| s.mean),
        histogram: histogram.map(|h| rebin(h, options)),
    })
}

/// Value below which `p` percent of the histogram's samples fall.
///
/// Interpolates linearly inside the bucket that crosses the target count.
pub fn percentile(buckets: &[u64], min: f64, max: f64, p: f64) -> f64 {
    let total: u64 = buckets.iter().sum();
    if total == 0 {
        return min;
    }

    let width = (max - min) / buckets.len() as f64;
    let target = p.clamp(0.0, 100.0) / 100.0 * total as f64;

    let mut cumulative = 0.0;
    for (i, &count) in buckets.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let next = cumulative + count as f64;
        if next >= target {
            let fraction = ((target - cumulative) / count as f64).clamp(0.0, 1.0);
            return min + width * (i as f64 + fraction);
        }
        cumulative = next;
    }
    max
}

/// Redistribute a histogram as `[counts, edges]`.
///
/// Source buckets are assigned to target bins by their centre; buckets whose
/// centre falls outside the requested range are dropped.
pub fn rebin(histogram: &BandHistogram, options: &HistogramOptions) -> Vec<Vec<f64>> {
    let source_bins = histogram.buckets.len();
    let bins = options.bins.unwrap_or(source_bins).max(1);
    let (lo, hi) = options.range.unwrap_or((histogram.min, histogram.max));

    let source_width = (histogram.max - histogram.min) / source_bins as f64;
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0.0; bins];
    for (i, &count) in histogram.buckets.iter().enumerate() {
        let centre = histogram.min + source_width * (i as f64 + 0.5);
        if centre < lo || centre > hi {
            continue;
        }
        let bin = if width > 0.0 {
            (((centre - lo) / width).floor() as usize).min(bins - 1)
        } else {
            0
        };
        counts[bin] += count as f64;
    }

    let edges = (0..=bins).map(|k| lo + width * k as f64).collect();
    vec![counts, edges]
}
