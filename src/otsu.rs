use log::debug;

use crate::error::{Result, ThresholdError};
use crate::histogram::Histogram;
use crate::stats::Moments;

/// Otsu's threshold: the split maximizing the between-class variance.
///
/// The result lies halfway between the centres of the two bins flanking the
/// best split. When several splits share the maximal score the first one
/// wins.
pub fn otsu_threshold(hist: &Histogram) -> Result<f64> {
    hist.ensure_1d()?;
    let n_bins = hist.bin_count();
    let bins = hist.bin_centers();
    let data = hist.counts();

    // Class 1 grows from the left, class 2 starts with everything.
    let mut class1 = Moments::default();
    let mut class2 = Moments::over(data, 0..n_bins, |i| bins[i]);

    let mut ss_max = f64::NEG_INFINITY;
    let mut max_ind = None;
    for ii in 0..n_bins.saturating_sub(1) {
        class1.add(data[ii], bins[ii]);
        class2.remove(data[ii], bins[ii]);
        let c = class1.mean() - class2.mean();
        let ss = class1.weight * class2.weight * c * c;
        // NaN (an empty class) never compares greater.
        if ss > ss_max {
            ss_max = ss;
            max_ind = Some(ii);
        }
    }

    let max_ind = max_ind.ok_or(ThresholdError::NoMaximum)?;
    debug!("otsu split after bin {max_ind}, score {ss_max}");
    Ok((bins[max_ind] + bins[max_ind + 1]) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_level() -> Histogram {
        let mut counts = vec![0; 100];
        for i in (0..10).chain(90..100) {
            counts[i] = 100;
        }
        Histogram::new(counts, 0.0, 1.0).unwrap()
    }

    #[test]
    fn two_level_histogram_splits_in_the_gap() {
        let t = otsu_threshold(&two_level()).unwrap();
        // Every split inside the empty gap scores the same; the first one
        // (between bins 9 and 10) is kept.
        assert_relative_eq!(t, 10.0);
        assert!(t > 9.5 && t < 90.5);
    }

    #[test]
    fn unequal_modes() {
        let mut counts = vec![0u64; 64];
        counts[10] = 400;
        counts[11] = 300;
        counts[40] = 50;
        counts[41] = 80;
        let hist = Histogram::new(counts, 0.0, 4.0).unwrap();
        let t = otsu_threshold(&hist).unwrap();
        assert!(t > hist.bin_center(11) && t < hist.bin_center(40));
    }

    #[test]
    fn single_populated_bin_has_no_maximum() {
        let mut counts = vec![0; 16];
        counts[7] = 42;
        let hist = Histogram::new(counts, 0.0, 1.0).unwrap();
        assert_eq!(otsu_threshold(&hist), Err(ThresholdError::NoMaximum));

        let single = Histogram::new(vec![5], 0.0, 1.0).unwrap();
        assert_eq!(otsu_threshold(&single), Err(ThresholdError::NoMaximum));
    }

    #[test]
    fn is_deterministic() {
        let hist = two_level();
        let a = otsu_threshold(&hist).unwrap();
        let b = otsu_threshold(&hist).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
