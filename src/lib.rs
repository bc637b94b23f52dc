//! Automatic threshold selection on 1-D frequency histograms.
//!
//! Five estimators pick intensity thresholds from a histogram of sample
//! values: [`isodata_threshold`], [`otsu_threshold`],
//! [`minimum_error_threshold`], [`triangle_threshold`] and
//! [`background_threshold`]. All return thresholds in sample units, never
//! bin indices. [`ThresholdMethod`] groups them, together with the
//! clustering-based partitions, behind a single call.
//!
//! ```
//! use histothresh::{otsu_threshold, Histogram};
//!
//! let mut counts = vec![0; 100];
//! for i in (0..10).chain(90..100) {
//!     counts[i] = 100;
//! }
//! let hist = Histogram::new(counts, 0.0, 1.0).unwrap();
//! let t = otsu_threshold(&hist).unwrap();
//! assert!(t > 9.5 && t < 90.5);
//! ```

mod background;
mod clustering;
mod error;
mod geometry;
mod histogram;
mod isodata;
mod minimum_error;
mod otsu;
mod segmentation;
mod selector;
mod stats;
mod triangle;

pub use background::background_threshold;
pub use clustering::{
    kmeans_clustering, minimum_variance_partitioning, KMeansParams, LabeledHistogram,
};
pub use error::{Result, ThresholdError};
pub use geometry::{triangle_height, Vertex};
pub use histogram::{Count, Histogram, HistogramConfig};
pub use isodata::isodata_threshold;
pub use minimum_error::minimum_error_threshold;
pub use otsu::otsu_threshold;
pub use segmentation::{classify, colorize, label_image, PALETTE};
pub use selector::{ThresholdMethod, DEFAULT_BACKGROUND_DISTANCE};
pub use triangle::{triangle_threshold, SMOOTHING_SIGMA};
