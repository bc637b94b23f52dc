//! Frequency histogram container.
//!
//! Counts are stored row-major in one contiguous vector. Every threshold
//! estimator in this crate works on 1-D histograms only, but the container
//! keeps the per-dimension layout so that callers get a proper
//! [`ThresholdError::DimensionalityNotSupported`] instead of a silent
//! reinterpretation of their data.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThresholdError};

/// Per-bin frequency.
pub type Count = u64;

/// Bin layout used when building a 1-D histogram from raw samples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub bin_count: usize,
    /// Drop samples outside `[lower_bound, upper_bound)` instead of
    /// clamping them into the edge bins.
    pub exclude_out_of_bounds: bool,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            lower_bound: 0.0,
            upper_bound: 256.0,
            bin_count: 256,
            exclude_out_of_bounds: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    sizes: Vec<usize>,
    counts: Vec<Count>,
    lower_bounds: Vec<f64>,
    bin_widths: Vec<f64>,
}

impl Histogram {
    /// Build a 1-D histogram from its counts and bin layout.
    pub fn new(counts: Vec<Count>, lower_bound: f64, bin_width: f64) -> Result<Self> {
        let size = counts.len();
        Self::from_parts(vec![size], counts, vec![lower_bound], vec![bin_width])
    }

    /// Build an n-D histogram. `counts` is row-major with the first
    /// dimension varying slowest.
    pub fn from_parts(
        sizes: Vec<usize>,
        counts: Vec<Count>,
        lower_bounds: Vec<f64>,
        bin_widths: Vec<f64>,
    ) -> Result<Self> {
        if sizes.is_empty() {
            return Err(ThresholdError::InvalidHistogram(
                "histogram needs at least one dimension".into(),
            ));
        }
        if sizes.iter().any(|&s| s == 0) {
            return Err(ThresholdError::InvalidHistogram(format!(
                "every dimension needs at least one bin, got sizes {sizes:?}"
            )));
        }
        if lower_bounds.len() != sizes.len() || bin_widths.len() != sizes.len() {
            return Err(ThresholdError::InvalidHistogram(format!(
                "{} dimensions but {} lower bounds and {} bin widths",
                sizes.len(),
                lower_bounds.len(),
                bin_widths.len()
            )));
        }
        let expected: usize = sizes.iter().product();
        if counts.len() != expected {
            return Err(ThresholdError::InvalidHistogram(format!(
                "expected {expected} counts, got {}",
                counts.len()
            )));
        }
        if let Some(w) = bin_widths.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
            return Err(ThresholdError::InvalidHistogram(format!(
                "bin width must be positive and finite, got {w}"
            )));
        }
        if let Some(b) = lower_bounds.iter().find(|b| !b.is_finite()) {
            return Err(ThresholdError::InvalidHistogram(format!(
                "lower bound must be finite, got {b}"
            )));
        }
        Ok(Self {
            sizes,
            counts,
            lower_bounds,
            bin_widths,
        })
    }

    /// Bin raw samples. Non-finite samples are skipped.
    pub fn from_samples(samples: &[f64], config: &HistogramConfig) -> Result<Self> {
        let HistogramConfig {
            lower_bound,
            upper_bound,
            bin_count,
            exclude_out_of_bounds,
        } = *config;
        if bin_count == 0 {
            return Err(ThresholdError::InvalidHistogram(
                "bin_count must be at least 1".into(),
            ));
        }
        if !(lower_bound.is_finite() && upper_bound.is_finite() && upper_bound > lower_bound) {
            return Err(ThresholdError::InvalidHistogram(format!(
                "invalid sample range [{lower_bound}, {upper_bound})"
            )));
        }
        let bin_width = (upper_bound - lower_bound) / bin_count as f64;

        let mut counts = vec![0 as Count; bin_count];
        for &s in samples {
            if !s.is_finite() {
                continue;
            }
            if (s < lower_bound || s >= upper_bound) && exclude_out_of_bounds {
                continue;
            }
            let idx = ((s - lower_bound) / bin_width).floor();
            let idx = idx.clamp(0.0, (bin_count - 1) as f64) as usize;
            counts[idx] += 1;
        }
        Self::new(counts, lower_bound, bin_width)
    }

    /// 256-bin histogram of an 8-bit grayscale image, one bin per gray level.
    ///
    /// Bins are centred on the gray levels, so a threshold between two
    /// adjacent bins falls halfway between their levels.
    pub fn from_gray_image(gray_img: &GrayImage, exclude_zero: bool) -> Self {
        let mut counts = vec![0 as Count; 256];
        for pixel in gray_img.pixels() {
            if exclude_zero && pixel[0] == 0 {
                continue;
            }
            counts[pixel[0] as usize] += 1;
        }
        Self {
            sizes: vec![256],
            counts,
            lower_bounds: vec![-0.5],
            bin_widths: vec![1.0],
        }
    }

    pub fn dimensionality(&self) -> usize {
        self.sizes.len()
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Fails with [`ThresholdError::DimensionalityNotSupported`] unless the
    /// histogram is 1-D.
    pub fn ensure_1d(&self) -> Result<()> {
        match self.dimensionality() {
            1 => Ok(()),
            d => Err(ThresholdError::DimensionalityNotSupported { dimensionality: d }),
        }
    }

    /// Total number of bins across all dimensions.
    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> &[Count] {
        &self.counts
    }

    /// Bin width along the first dimension.
    pub fn bin_width(&self) -> f64 {
        self.bin_widths[0]
    }

    /// Lower bound along the first dimension.
    pub fn lower_bound(&self) -> f64 {
        self.lower_bounds[0]
    }

    /// Upper edge of the last bin along the first dimension.
    pub fn upper_bound(&self) -> f64 {
        self.lower_bound() + self.sizes[0] as f64 * self.bin_width()
    }

    /// Center of bin `index` along the first dimension.
    pub fn bin_center(&self, index: usize) -> f64 {
        self.lower_bound() + self.bin_width() / 2.0 + index as f64 * self.bin_width()
    }

    pub fn bin_centers(&self) -> Vec<f64> {
        (0..self.sizes[0]).map(|i| self.bin_center(i)).collect()
    }

    pub fn total(&self) -> Count {
        self.counts.iter().sum()
    }

    /// Prefix-sum histogram with the same layout. 1-D only.
    pub fn cumulative(&self) -> Result<Self> {
        self.ensure_1d()?;
        let mut acc: Count = 0;
        let counts = self
            .counts
            .iter()
            .map(|&c| {
                acc += c;
                acc
            })
            .collect();
        Ok(Self {
            counts,
            ..self.clone()
        })
    }

    /// Gaussian-smoothed copy with the same bin layout. 1-D only.
    ///
    /// The kernel is truncated at `ceil(3 * sigma)` bins and the histogram is
    /// mirrored at both ends. Smoothed counts are rounded to the nearest
    /// integer.
    pub fn smooth(&self, sigma: f64) -> Result<Self> {
        self.ensure_1d()?;
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(ThresholdError::InvalidParameter(format!(
                "smoothing sigma must be positive, got {sigma}"
            )));
        }

        let radius = (3.0 * sigma).ceil() as isize;
        let mut kernel: Vec<f64> = (-radius..=radius)
            .map(|x| (-(x * x) as f64 / (2.0 * sigma * sigma)).exp())
            .collect();
        let norm: f64 = kernel.iter().sum();
        for w in kernel.iter_mut() {
            *w /= norm;
        }

        let n = self.counts.len() as isize;
        let counts = (0..n)
            .map(|i| {
                let acc: f64 = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, &w)| {
                        let j = mirror_index(i + k as isize - radius, n);
                        w * self.counts[j] as f64
                    })
                    .sum();
                acc.round() as Count
            })
            .collect();

        Ok(Self {
            counts,
            ..self.clone()
        })
    }

    /// Index of the first bin holding the maximum count.
    pub fn peak_index(&self) -> usize {
        let mut best = 0;
        for (i, &c) in self.counts.iter().enumerate() {
            if c > self.counts[best] {
                best = i;
            }
        }
        best
    }
}

/// Reflect an out-of-range index back into `0..n` (`..., 1, 0 | 0, 1, ...`).
fn mirror_index(i: isize, n: isize) -> usize {
    let period = 2 * n;
    let mut j = i.rem_euclid(period);
    if j >= n {
        j = period - 1 - j;
    }
    j as usize
}
