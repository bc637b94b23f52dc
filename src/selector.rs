use serde::{Deserialize, Serialize};

use crate::background::background_threshold;
use crate::clustering::{kmeans_clustering, minimum_variance_partitioning, KMeansParams};
use crate::error::Result;
use crate::histogram::Histogram;
use crate::isodata::isodata_threshold;
use crate::minimum_error::minimum_error_threshold;
use crate::otsu::otsu_threshold;
use crate::triangle::triangle_threshold;

/// Default scale for the background method.
pub const DEFAULT_BACKGROUND_DISTANCE: f64 = 2.0;

/// A threshold selection method together with its parameters.
///
/// Serialized with an internal `method` tag, e.g.
/// `{"method": "isodata", "thresholds": 2}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ThresholdMethod {
    Isodata { thresholds: usize },
    #[default]
    Otsu,
    MinimumError,
    Triangle,
    Background { distance: f64 },
    /// Class boundaries of a k-means clustering with `classes` clusters.
    #[serde(rename = "kmeans")]
    KMeans {
        classes: usize,
        #[serde(default)]
        params: KMeansParams,
    },
    /// Class boundaries of a minimum-variance partitioning.
    MinimumVariance { classes: usize },
}

impl ThresholdMethod {
    /// Stable lower-case identifier, used in logs and result files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Isodata { .. } => "isodata",
            Self::Otsu => "otsu",
            Self::MinimumError => "minimum_error",
            Self::Triangle => "triangle",
            Self::Background { .. } => "background",
            Self::KMeans { .. } => "kmeans",
            Self::MinimumVariance { .. } => "minimum_variance",
        }
    }

    /// Run the method on `hist`. Thresholds are ascending, in sample units.
    pub fn select(&self, hist: &Histogram) -> Result<Vec<f64>> {
        match self {
            Self::Isodata { thresholds } => isodata_threshold(hist, *thresholds),
            Self::Otsu => otsu_threshold(hist).map(|t| vec![t]),
            Self::MinimumError => minimum_error_threshold(hist).map(|t| vec![t]),
            Self::Triangle => triangle_threshold(hist).map(|t| vec![t]),
            Self::Background { distance } => background_threshold(hist, *distance).map(|t| vec![t]),
            Self::KMeans { classes, params } => {
                kmeans_clustering(hist, *classes, params).map(|l| l.thresholds())
            }
            Self::MinimumVariance { classes } => {
                minimum_variance_partitioning(hist, *classes).map(|l| l.thresholds())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bimodal() -> Histogram {
        let mut counts = vec![1u64; 64];
        for i in 8..16 {
            counts[i] = 300;
        }
        for i in 44..52 {
            counts[i] = 200;
        }
        Histogram::new(counts, 0.0, 4.0).unwrap()
    }

    #[test]
    fn dispatches_to_each_method() {
        let hist = bimodal();
        let methods = [
            ThresholdMethod::Isodata { thresholds: 1 },
            ThresholdMethod::Otsu,
            ThresholdMethod::MinimumError,
            ThresholdMethod::Triangle,
            ThresholdMethod::Background { distance: 2.0 },
            ThresholdMethod::KMeans {
                classes: 2,
                params: KMeansParams::default(),
            },
            ThresholdMethod::MinimumVariance { classes: 2 },
        ];
        for m in methods {
            let t = m.select(&hist).unwrap();
            assert_eq!(t.len(), 1, "{}", m.name());
            assert_eq!(t, m.select(&hist).unwrap());
        }
    }

    #[test]
    fn otsu_matches_free_function() {
        let hist = bimodal();
        assert_eq!(
            ThresholdMethod::Otsu.select(&hist).unwrap(),
            vec![otsu_threshold(&hist).unwrap()]
        );
    }

    #[test]
    fn json_round_trip_uses_method_tag() {
        let json = r#"{"method": "isodata", "thresholds": 3}"#;
        let m: ThresholdMethod = serde_json::from_str(json).unwrap();
        assert_eq!(m, ThresholdMethod::Isodata { thresholds: 3 });

        let m: ThresholdMethod = serde_json::from_str(r#"{"method": "kmeans", "classes": 4}"#).unwrap();
        assert_eq!(
            m,
            ThresholdMethod::KMeans {
                classes: 4,
                params: KMeansParams::default()
            }
        );
        let s = serde_json::to_string(&ThresholdMethod::MinimumError).unwrap();
        assert_eq!(s, r#"{"method":"minimum_error"}"#);
    }

    #[test]
    fn kmeans_config_with_zero_iterations_still_selects() {
        let json = r#"{"method":"kmeans","classes":2,"params":{"max_iterations":0}}"#;
        let m: ThresholdMethod = serde_json::from_str(json).unwrap();
        let t = m.select(&bimodal()).unwrap();
        assert_eq!(t.len(), 1);
        assert!(t[0] > 0.0 && t[0] < 256.0, "threshold {t:?}");
    }
}
