use std::ops::Range;

use crate::histogram::Count;

/// Zeroth and first order moments of a run of bins.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Moments {
    pub weight: f64,
    pub moment: f64,
}

impl Moments {
    /// Moments of `counts[bins]`, with each bin sitting at `position(index)`.
    pub fn over(counts: &[Count], bins: Range<usize>, position: impl Fn(usize) -> f64) -> Self {
        let mut m = Self::default();
        for i in bins {
            m.add(counts[i], position(i));
        }
        m
    }

    pub fn add(&mut self, count: Count, position: f64) {
        let w = count as f64;
        self.weight += w;
        self.moment += w * position;
    }

    pub fn remove(&mut self, count: Count, position: f64) {
        let w = count as f64;
        self.weight -= w;
        self.moment -= w * position;
    }

    /// Center of gravity. NaN for an empty run.
    pub fn mean(&self) -> f64 {
        self.moment / self.weight
    }
}

/// Count-weighted sum of squared deviations from `mean` over `counts[bins]`.
pub(crate) fn sum_squared_deviation(
    counts: &[Count],
    bins: Range<usize>,
    position: impl Fn(usize) -> f64,
    mean: f64,
) -> f64 {
    bins.map(|i| {
        let d = position(i) - mean;
        counts[i] as f64 * d * d
    })
    .sum()
}

/// Decrease of the within-class sum of squares obtained by splitting one
/// class into `left` and `right`.
pub(crate) fn split_gain(left: &Moments, right: &Moments) -> f64 {
    let w = left.weight + right.weight;
    let c = left.mean() - right.mean();
    left.weight * right.weight / w * c * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn moments_of_a_run() {
        let counts = [0, 2, 0, 2];
        let m = Moments::over(&counts, 0..4, |i| i as f64);
        assert_relative_eq!(m.weight, 4.0);
        assert_relative_eq!(m.mean(), 2.0);
        assert!(Moments::over(&counts, 0..1, |i| i as f64).mean().is_nan());
    }

    #[test]
    fn add_and_remove_are_inverse() {
        let mut m = Moments::default();
        m.add(3, 1.5);
        m.add(1, 4.0);
        m.remove(1, 4.0);
        assert_relative_eq!(m.weight, 3.0);
        assert_relative_eq!(m.mean(), 1.5);
    }

    #[test]
    fn squared_deviation_and_gain_agree() {
        let counts = [1, 0, 0, 1];
        let pos = |i: usize| i as f64;
        let total = Moments::over(&counts, 0..4, pos);
        let sse = sum_squared_deviation(&counts, 0..4, pos, total.mean());
        let left = Moments::over(&counts, 0..2, pos);
        let right = Moments::over(&counts, 2..4, pos);
        // Both halves hold a single populated bin, so the split removes all spread.
        assert_relative_eq!(split_gain(&left, &right), sse);
    }
}
