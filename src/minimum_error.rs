//! Kittler–Illingworth minimum-error thresholding.
//!
//! Models the histogram as a mixture of two Gaussians, one per class, and
//! picks the split minimizing
//!
//! ```text
//! J(i) = 1 + w1 ln v1 + w2 ln v2 - 2 (w1 ln w1 + w2 ln w2)
//! ```
//!
//! where `w` are the class masses and `v` the class variances. Near the ends
//! of the histogram one class holds only a few bins and its variance tends
//! to zero, which drives `J` towards minus infinity. Those edge minima are
//! trimmed away before the search.

use log::debug;

use crate::error::{Result, ThresholdError};
use crate::histogram::Histogram;
use crate::stats::{sum_squared_deviation, Moments};

/// Smallest histogram the edge trimming is defined for.
pub const MIN_BINS: usize = 4;

pub fn minimum_error_threshold(hist: &Histogram) -> Result<f64> {
    hist.ensure_1d()?;
    let n_bins = hist.bin_count();
    if n_bins < MIN_BINS {
        return Err(ThresholdError::TooFewBins {
            required: MIN_BINS,
            actual: n_bins,
        });
    }
    let scale = hist.bin_width();
    let offset = hist.lower_bound() + scale / 2.0;

    let j = error_measure(hist);
    let pos = trimmed_minimum(&j);
    debug!("minimum error at bin position {pos}");
    Ok(offset + pos * scale)
}

/// `J(i)` for every split between bins `i` and `i + 1`.
///
/// A split that leaves one class empty has no defined error and scores
/// `+inf`, so it can neither be the minimum nor stop the edge trimming.
fn error_measure(hist: &Histogram) -> Vec<f64> {
    let n_bins = hist.bin_count();
    let data = hist.counts();
    let bin = |i: usize| hist.bin_center(i);

    let mut class1 = Moments::default();
    let mut class2 = Moments::over(data, 0..n_bins, bin);
    let mut j = Vec::with_capacity(n_bins - 1);
    for ii in 0..n_bins - 1 {
        class1.add(data[ii], bin(ii));
        class2.remove(data[ii], bin(ii));
        let (w1, w2) = (class1.weight, class2.weight);
        if w1 <= 0.0 || w2 <= 0.0 {
            j.push(f64::INFINITY);
            continue;
        }
        // Variances are recomputed per split; a sliding update of the
        // second moment loses too much precision.
        let v1 = sum_squared_deviation(data, 0..ii + 1, bin, class1.mean()) / w1;
        let v2 = sum_squared_deviation(data, ii + 1..n_bins, bin, class2.mean()) / w2;
        j.push(1.0 + w1 * v1.ln() + w2 * v2.ln() - 2.0 * (w1 * w1.ln() + w2 * w2.ln()));
    }
    j
}

/// Fractional split position of the minimum of `j`, ignoring edge runs
/// where `j` keeps decreasing towards the histogram ends.
///
/// Undefined splits (`+inf`) at either end are skipped first, so trimming
/// starts from the populated part of the histogram. Needs `j.len() >= 3`.
fn trimmed_minimum(j: &[f64]) -> f64 {
    let defined = |v: &f64| *v != f64::INFINITY;
    let mut begin = j.iter().position(defined).unwrap_or(0);
    let mut end = j.iter().rposition(defined).unwrap_or(j.len() - 1);
    while begin + 1 < end && j[begin] <= j[begin + 1] {
        begin += 1;
    }
    while begin + 1 < end && j[end] <= j[end - 1] {
        end -= 1;
    }

    let mut min_j = j[begin];
    let mut min_ind = begin;
    for (ii, &v) in j.iter().enumerate().take(end).skip(begin + 1) {
        if v < min_j {
            min_j = v;
            min_ind = ii;
        }
    }
    // Equal minima form a plateau; take its middle.
    let mut max_ind = min_ind + 1;
    while max_ind < end && j[max_ind] == min_j {
        max_ind += 1;
    }
    (min_ind + max_ind) as f64 / 2.0
}
