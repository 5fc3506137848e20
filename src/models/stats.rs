//! Descriptive statistics over latency samples
//!
//! Samples are `f64` seconds. The median is the element at index
//! `len / 2` of the sorted samples, so even-length inputs pick the upper
//! middle element instead of averaging the two middle ones. The standard
//! deviation is the population form computed from the sum of squares.

use serde::{Deserialize, Serialize};

/// Summary of one sample sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Smallest sample (seconds)
    pub min: f64,
    /// Largest sample (seconds)
    pub max: f64,
    /// Sorted sample at index `len / 2` (seconds)
    pub median: f64,
    /// Arithmetic mean (seconds)
    pub mean: f64,
    /// Population standard deviation (seconds)
    pub dev: f64,
}

impl Statistics {
    /// Compute statistics over `samples`. Returns `None` for an empty
    /// sequence, which has no meaningful min, max or median.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let sum: f64 = sorted.iter().sum();
        let sq_sum: f64 = sorted.iter().map(|x| x * x).sum();
        let mean = sum / n;
        // Rounding can push the difference slightly below zero for
        // near-constant inputs
        let variance = (sq_sum / n - mean * mean).max(0.0);

        Some(Self {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            median: sorted[sorted.len() / 2],
            mean,
            dev: variance.sqrt(),
        })
    }

    /// The same statistics scaled to milliseconds
    pub fn to_millis(&self) -> Self {
        Self {
            min: self.min * 1000.0,
            max: self.max * 1000.0,
            median: self.median * 1000.0,
            mean: self.mean * 1000.0,
            dev: self.dev * 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};

    const EPS: f64 = 1e-12;

    #[test]
    fn test_even_length_median_is_upper_middle() {
        let stats = Statistics::from_samples(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert!((stats.mean - 2.5).abs() < EPS);
    }

    #[test]
    fn test_odd_length_median() {
        let stats = Statistics::from_samples(&[5.0, 1.0, 3.0]).unwrap();
        assert_eq!(stats.median, 3.0);
    }

    #[test]
    fn test_constant_sequence_has_zero_deviation() {
        let samples = vec![0.000_123; 1000];
        let stats = Statistics::from_samples(&samples).unwrap();
        assert!(stats.dev.abs() < 1e-9);
        assert_eq!(stats.min, stats.max);
        assert!((stats.mean - 0.000_123).abs() < 1e-15);
    }

    #[test]
    fn test_population_deviation() {
        // Population deviation of [2,4,4,4,5,5,7,9] is exactly 2
        let stats =
            Statistics::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((stats.mean - 5.0).abs() < EPS);
        assert!((stats.dev - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample() {
        let stats = Statistics::from_samples(&[0.5]).unwrap();
        assert_eq!(stats.min, 0.5);
        assert_eq!(stats.max, 0.5);
        assert_eq!(stats.median, 0.5);
        assert_eq!(stats.mean, 0.5);
        assert_eq!(stats.dev, 0.0);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Statistics::from_samples(&[]), None);
    }

    #[test]
    fn test_ordering_bounds_hold_for_random_inputs() {
        let mut rng = SmallRng::seed_from_u64(7);
        for len in 1..200 {
            let samples: Vec<f64> = (0..len).map(|_| rng.gen_range(0.0..0.05)).collect();
            let stats = Statistics::from_samples(&samples).unwrap();
            assert!(stats.min <= stats.median && stats.median <= stats.max);
            assert!(stats.min <= stats.mean + EPS && stats.mean <= stats.max + EPS);
            assert!(stats.dev >= 0.0);
        }
    }

    #[test]
    fn test_permutation_invariance() {
        let mut rng = SmallRng::seed_from_u64(42);
        let samples: Vec<f64> = (0..1000).map(|_| rng.gen_range(0.0001..0.02)).collect();
        let baseline = Statistics::from_samples(&samples).unwrap();

        let mut shuffled = samples.clone();
        shuffled.shuffle(&mut rng);
        let permuted = Statistics::from_samples(&shuffled).unwrap();

        // Sums run over the sorted copy, so the result is bit-identical
        assert_eq!(baseline, permuted);
    }

    #[test]
    fn test_to_millis() {
        let stats = Statistics::from_samples(&[0.001, 0.002, 0.003]).unwrap().to_millis();
        assert!((stats.min - 1.0).abs() < 1e-9);
        assert!((stats.median - 2.0).abs() < 1e-9);
        assert!((stats.max - 3.0).abs() < 1e-9);
    }
}
