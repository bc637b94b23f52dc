use log::debug;

use crate::error::Result;
use crate::geometry::{triangle_height, Vertex};
use crate::histogram::Histogram;

/// Gaussian sigma (in bins) applied before the peak-based methods.
pub const SMOOTHING_SIGMA: f64 = 4.0;

/// Zack's triangle threshold.
///
/// Draws chords from the first and last bin to the histogram peak and
/// returns the centre of the bin furthest away from its chord. Works best
/// on histograms with a single dominant peak and a long tail.
pub fn triangle_threshold(hist: &Histogram) -> Result<f64> {
    hist.ensure_1d()?;
    let smooth = hist.smooth(SMOOTHING_SIGMA)?;
    let n_bins = smooth.bin_count();
    let data = smooth.counts();

    let peak = smooth.peak_index();
    let vertex = |i: usize| Vertex::new(i as f64, data[i] as f64);
    let left_bin = vertex(0);
    let right_bin = vertex(n_bins - 1);
    let top_bin = vertex(peak);

    let mut bin = 0;
    let mut max_distance = 0.0;
    for ii in 1..peak {
        let distance = triangle_height(left_bin, top_bin, vertex(ii));
        if distance > max_distance {
            max_distance = distance;
            bin = ii;
        }
    }
    for ii in peak + 1..n_bins.saturating_sub(1) {
        let distance = triangle_height(right_bin, top_bin, vertex(ii));
        if distance > max_distance {
            max_distance = distance;
            bin = ii;
        }
    }
    debug!("triangle: peak at bin {peak}, furthest bin {bin} at distance {max_distance}");
    Ok(smooth.bin_center(bin))
}
