//! Histogram clustering adapters.
//!
//! Both partition the bins of a 1-D histogram into classes and hand back a
//! copy of the histogram with one label per bin. Labels start at 1 and
//! increase with position, so every class is a contiguous run of bins.

use std::ops::Range;

use log::{debug, trace};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThresholdError};
use crate::histogram::{Count, Histogram};
use crate::stats::{split_gain, Moments};

/// Histogram annotated with a class label per bin.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledHistogram {
    pub histogram: Histogram,
    pub labels: Vec<usize>,
}

impl LabeledHistogram {
    /// Number of distinct classes.
    pub fn class_count(&self) -> usize {
        let mut seen: Vec<usize> = self.labels.clone();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// Bin edges (in sample units) where the label changes, ascending.
    pub fn thresholds(&self) -> Vec<f64> {
        let lower = self.histogram.lower_bound();
        let width = self.histogram.bin_width();
        self.labels
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[0] != w[1])
            .map(|(i, _)| lower + (i + 1) as f64 * width)
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansParams {
    pub max_iterations: usize,
    /// Seed for the initial centre selection.
    pub seed: u64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            seed: 42,
        }
    }
}

/// Count-weighted k-means over bin positions.
///
/// Initial centres are drawn k-means++ style from a seeded generator, so
/// results are reproducible for a given `params.seed`.
pub fn kmeans_clustering(
    hist: &Histogram,
    n_clusters: usize,
    params: &KMeansParams,
) -> Result<LabeledHistogram> {
    hist.ensure_1d()?;
    check_cluster_count(hist, n_clusters)?;
    let data = hist.counts();

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut centers = seed_centers(data, n_clusters, &mut rng)?;
    trace!("kmeans seed centres {centers:?}");

    let mut labels: Vec<usize> = (0..data.len())
        .map(|i| nearest_center(&centers, i as f64))
        .collect();
    let mut iterations = 0;
    while iterations < params.max_iterations {
        iterations += 1;
        let mut sums = vec![Moments::default(); n_clusters];
        for (i, &label) in labels.iter().enumerate() {
            sums[label].add(data[i], i as f64);
        }
        for (center, m) in centers.iter_mut().zip(&sums) {
            if m.weight > 0.0 {
                *center = m.mean();
            }
        }

        let mut changed = false;
        for (i, label) in labels.iter_mut().enumerate() {
            let nearest = nearest_center(&centers, i as f64);
            if *label != nearest {
                *label = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    debug!("kmeans finished after {iterations} iterations, centres {centers:?}");

    // Renumber so that labels follow the centre order.
    let mut order: Vec<usize> = (0..n_clusters).collect();
    order.sort_by(|&a, &b| centers[a].total_cmp(&centers[b]));
    let mut rank = vec![0; n_clusters];
    for (r, &c) in order.iter().enumerate() {
        rank[c] = r + 1;
    }
    let labels = labels.into_iter().map(|l| rank[l]).collect();

    Ok(LabeledHistogram {
        histogram: hist.clone(),
        labels,
    })
}

/// Top-down minimum-variance partitioning.
///
/// Starts from a single class and repeatedly splits the class whose best
/// two-way split removes the most within-class variance, until
/// `n_clusters` classes exist.
pub fn minimum_variance_partitioning(
    hist: &Histogram,
    n_clusters: usize,
) -> Result<LabeledHistogram> {
    hist.ensure_1d()?;
    check_cluster_count(hist, n_clusters)?;
    let data = hist.counts();

    let mut partitions: Vec<Range<usize>> = vec![0..data.len()];
    while partitions.len() < n_clusters {
        let best = partitions
            .iter()
            .enumerate()
            .filter_map(|(p, range)| best_split(data, range.clone()).map(|(s, gain)| (p, s, gain)))
            .max_by(|a, b| a.2.total_cmp(&b.2));
        let Some((p, split, gain)) = best else {
            break;
        };
        trace!("splitting {:?} after bin {split}, gain {gain}", partitions[p]);
        let range = partitions.remove(p);
        partitions.push(range.start..split + 1);
        partitions.push(split + 1..range.end);
    }
    partitions.sort_by_key(|r| r.start);
    debug!("minimum variance partitions {partitions:?}");

    let mut labels = vec![0; data.len()];
    for (label, range) in partitions.iter().enumerate() {
        for l in &mut labels[range.clone()] {
            *l = label + 1;
        }
    }
    Ok(LabeledHistogram {
        histogram: hist.clone(),
        labels,
    })
}

fn check_cluster_count(hist: &Histogram, n_clusters: usize) -> Result<()> {
    let populated = hist.counts().iter().filter(|&&c| c > 0).count();
    if n_clusters == 0 || n_clusters > populated {
        return Err(ThresholdError::InvalidParameter(format!(
            "cannot form {n_clusters} clusters from {populated} populated bins"
        )));
    }
    Ok(())
}

/// k-means++ seeding: the first centre is drawn proportionally to the
/// counts, later ones proportionally to count times squared distance to the
/// nearest centre chosen so far.
fn seed_centers(data: &[Count], k: usize, rng: &mut StdRng) -> Result<Vec<f64>> {
    let mut centers = Vec::with_capacity(k);
    while centers.len() < k {
        let weights = data.iter().enumerate().map(|(i, &c)| {
            let d = centers
                .iter()
                .map(|&m: &f64| (i as f64 - m).abs())
                .fold(f64::INFINITY, f64::min);
            let d2 = if d.is_finite() { d * d } else { 1.0 };
            c as f64 * d2
        });
        let dist = WeightedIndex::new(weights)
            .map_err(|e| ThresholdError::InvalidHistogram(e.to_string()))?;
        centers.push(dist.sample(rng) as f64);
    }
    Ok(centers)
}

fn nearest_center(centers: &[f64], x: f64) -> usize {
    let mut best = 0;
    for (c, &m) in centers.iter().enumerate() {
        if (x - m).abs() < (x - centers[best]).abs() {
            best = c;
        }
    }
    best
}

/// Best split of `data[range]` into `range.start..=s` and `s+1..range.end`,
/// with its gain. None if fewer than two bins in the range are populated.
fn best_split(data: &[Count], range: Range<usize>) -> Option<(usize, f64)> {
    let pos = |i: usize| i as f64;
    let mut left = Moments::default();
    let mut right = Moments::over(data, range.clone(), pos);
    let mut best: Option<(usize, f64)> = None;
    for s in range.start..range.end.saturating_sub(1) {
        left.add(data[s], pos(s));
        right.remove(data[s], pos(s));
        if left.weight <= 0.0 || right.weight <= 0.0 {
            continue;
        }
        let gain = split_gain(&left, &right);
        if best.map_or(true, |(_, g)| gain > g) {
            best = Some((s, gain));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_clusters() -> Histogram {
        let mut counts = vec![0; 110];
        for i in 0..5 {
            counts[i] = 40;
            counts[50 + i] = 20;
            counts[100 + i] = 30;
        }
        Histogram::new(counts, 0.0, 1.0).unwrap()
    }

    fn assert_separates_three_clusters(labeled: &LabeledHistogram) {
        assert_eq!(labeled.class_count(), 3);
        assert!(labeled.labels[..5].iter().all(|&l| l == 1));
        assert!(labeled.labels[50..55].iter().all(|&l| l == 2));
        assert!(labeled.labels[100..105].iter().all(|&l| l == 3));
        let t = labeled.thresholds();
        assert_eq!(t.len(), 2);
        assert!(t[0] >= 5.0 && t[0] <= 50.0);
        assert!(t[1] >= 55.0 && t[1] <= 100.0);
    }

    #[test]
    fn kmeans_finds_separated_clusters() {
        let labeled = kmeans_clustering(&three_clusters(), 3, &KMeansParams::default()).unwrap();
        assert_separates_three_clusters(&labeled);
        assert_eq!(labeled.histogram, three_clusters());
    }

    #[test]
    fn kmeans_is_reproducible_per_seed() {
        let params = KMeansParams {
            seed: 7,
            ..KMeansParams::default()
        };
        let a = kmeans_clustering(&three_clusters(), 2, &params).unwrap();
        let b = kmeans_clustering(&three_clusters(), 2, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn kmeans_without_iterations_keeps_the_seed_assignment() {
        let params = KMeansParams {
            max_iterations: 0,
            ..KMeansParams::default()
        };
        let labeled = kmeans_clustering(&three_clusters(), 2, &params).unwrap();
        assert_eq!(labeled.labels.len(), 110);
        assert!(labeled.labels.iter().all(|&l| l == 1 || l == 2));
        assert_eq!(labeled.class_count(), 2);
        assert!(labeled.labels.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn minimum_variance_finds_separated_clusters() {
        let labeled = minimum_variance_partitioning(&three_clusters(), 3).unwrap();
        assert_separates_three_clusters(&labeled);
    }

    #[test]
    fn minimum_variance_single_class() {
        let labeled = minimum_variance_partitioning(&three_clusters(), 1).unwrap();
        assert!(labeled.labels.iter().all(|&l| l == 1));
        assert!(labeled.thresholds().is_empty());
    }

    #[test]
    fn rejects_impossible_cluster_counts() {
        let mut counts = vec![0; 10];
        counts[2] = 5;
        counts[7] = 5;
        let hist = Histogram::new(counts, 0.0, 1.0).unwrap();
        assert!(minimum_variance_partitioning(&hist, 3).is_err());
        assert!(kmeans_clustering(&hist, 0, &KMeansParams::default()).is_err());
        assert!(minimum_variance_partitioning(&hist, 2).is_ok());
    }

    #[test]
    fn thresholds_sit_on_label_changes() {
        let labeled = LabeledHistogram {
            histogram: Histogram::new(vec![1; 6], 10.0, 2.0).unwrap(),
            labels: vec![1, 1, 2, 2, 2, 3],
        };
        assert_eq!(labeled.thresholds(), vec![14.0, 20.0]);
    }
}
