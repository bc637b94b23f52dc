use log::{debug, trace, warn};

use crate::error::{Result, ThresholdError};
use crate::histogram::Histogram;
use crate::stats::Moments;

/// Upper bound on fixed-point iterations. Convergence is normally reached in
/// a handful of steps; the cap only guards against oscillating centres.
pub const MAX_ITERATIONS: usize = 10_000;

/// Isodata multi-threshold selection.
///
/// Splits the bin range into `n_thresholds + 1` classes by alternating
/// between class centres of gravity and mid-points between them, starting
/// from an equal-mass partition. Returns `n_thresholds` ascending thresholds
/// in sample units.
pub fn isodata_threshold(hist: &Histogram, n_thresholds: usize) -> Result<Vec<f64>> {
    hist.ensure_1d()?;
    if n_thresholds == 0 {
        return Err(ThresholdError::InvalidParameter(
            "isodata needs at least one threshold".into(),
        ));
    }
    let n_bins = hist.bin_count();
    if n_bins < 2 {
        return Err(ThresholdError::TooFewBins {
            required: 2,
            actual: n_bins,
        });
    }

    let mut thresholds = initial_thresholds(hist, n_thresholds)?;
    trace!("isodata seed {thresholds:?}");

    let data = hist.counts();
    let mut iterations = 0;
    loop {
        iterations += 1;
        let centers = class_centers(data, &thresholds);
        let next: Vec<f64> = centers.windows(2).map(|c| (c[0] + c[1]) / 2.0).collect();
        let converged = next == thresholds;
        thresholds = next;
        if converged {
            break;
        }
        if iterations >= MAX_ITERATIONS {
            warn!("isodata did not converge after {MAX_ITERATIONS} iterations");
            break;
        }
    }
    debug!("isodata converged after {iterations} iterations: {thresholds:?}");

    let scale = hist.bin_width();
    let offset = hist.lower_bound() + scale / 2.0;
    Ok(thresholds.into_iter().map(|t| offset + t * scale).collect())
}

/// Bin indices dividing the cumulative count into roughly equal parts.
fn initial_thresholds(hist: &Histogram, n_thresholds: usize) -> Result<Vec<f64>> {
    let cumh = hist.cumulative()?;
    let cum = cumh.counts();
    let last = cum.len() - 1;
    let n = cum[last] / (n_thresholds as u64 + 1);

    let mut index = 1;
    let mut thresholds = Vec::with_capacity(n_thresholds);
    for ii in 0..n_thresholds {
        let target = n * (ii as u64 + 1);
        while index < last && cum[index] < target {
            index += 1;
        }
        thresholds.push(index as f64);
    }
    Ok(thresholds)
}

/// Centre of gravity (in bin indices) of each class delimited by `thresholds`.
/// Empty classes fall back to the middle of their bin range.
fn class_centers(data: &[u64], thresholds: &[f64]) -> Vec<f64> {
    let mut centers = Vec::with_capacity(thresholds.len() + 1);
    let mut origin = 0;
    let ends = thresholds
        .iter()
        .map(|t| t.ceil() as usize)
        .chain(std::iter::once(data.len()));
    for end in ends {
        let m = Moments::over(data, origin..end, |i| i as f64);
        if m.weight > 0.0 {
            centers.push(m.mean());
        } else {
            centers.push((origin + end) as f64 / 2.0);
        }
        origin = end;
    }
    centers
}
