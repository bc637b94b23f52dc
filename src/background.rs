use log::debug;

use crate::error::{Result, ThresholdError};
use crate::histogram::Histogram;
use crate::triangle::SMOOTHING_SIGMA;

/// Background-peak threshold.
///
/// Assumes the histogram is dominated by a background peak. The half width
/// at half maximum of that peak, measured on the side facing away from the
/// bulk of the histogram, times `distance`, is the offset of the threshold
/// from the peak. A peak in the right half yields a threshold below it, a
/// peak in the left half one above it.
pub fn background_threshold(hist: &Histogram, distance: f64) -> Result<f64> {
    if !(distance > 0.0) {
        return Err(ThresholdError::InvalidParameter(format!(
            "distance must be positive, got {distance}"
        )));
    }
    hist.ensure_1d()?;
    let smooth = hist.smooth(SMOOTHING_SIGMA)?;
    let n_bins = smooth.bin_count();
    let data = smooth.counts();

    let peak = smooth.peak_index();
    let half = data[peak] / 2;
    let right_peak = peak > n_bins / 2;

    let sigma = if right_peak {
        (peak..n_bins).rev().find(|&i| data[i] > half).unwrap_or(peak) - peak
    } else {
        (0..=peak).find(|&i| data[i] > half).map_or(0, |i| peak - i)
    }
    .max(1);

    let offset = sigma as f64 * distance * smooth.bin_width();
    debug!("background peak at bin {peak}, half width {sigma} bins, right side {right_peak}");
    let threshold = smooth.bin_center(peak);
    Ok(if right_peak {
        threshold - offset
    } else {
        threshold + offset
    })
}
