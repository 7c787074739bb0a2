//! Numeric helpers shared by the scalar and batched scorers
//!
//! Level 4 - Utilities
//!
//! Both scorers reduce through these functions with values in the same
//! order, which keeps their results identical rather than merely close.

use std::collections::BTreeMap;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0.0 for empty and single-value input
pub fn population_stdev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let sq_sum: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (sq_sum / values.len() as f64).sqrt()
}

/// Population standard deviation of integer counts
pub fn count_stdev<I: IntoIterator<Item = u32>>(counts: I) -> f64 {
    let values: Vec<f64> = counts.into_iter().map(f64::from).collect();
    population_stdev(&values)
}

/// Lengths of the maximal runs equal to `target`, in order
pub fn run_lengths(sequence: &[bool], target: bool) -> Vec<u32> {
    let mut runs = Vec::new();
    let mut current = 0u32;
    for &value in sequence {
        if value == target {
            current += 1;
        } else if current > 0 {
            runs.push(current);
            current = 0;
        }
    }
    if current > 0 {
        runs.push(current);
    }
    runs
}

/// Immediate repeats per value: each maximal run of length `n` adds `n - 1`
///
/// Values that never repeat back-to-back are absent from the result.
pub fn successions<T: Ord + Copy>(sequence: &[T]) -> BTreeMap<T, u32> {
    let mut repeats = BTreeMap::new();
    for pair in sequence.windows(2) {
        if pair[0] == pair[1] {
            *repeats.entry(pair[0]).or_insert(0) += 1;
        }
    }
    repeats
}

/// Occurrence count per value
pub fn histogram<T: Ord + Copy>(values: &[T]) -> BTreeMap<T, u32> {
    let mut hist = BTreeMap::new();
    for &v in values {
        *hist.entry(v).or_insert(0) += 1;
    }
    hist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdev_boundaries() {
        assert_eq!(population_stdev(&[]), 0.0);
        assert_eq!(population_stdev(&[7.0]), 0.0);
        assert_eq!(population_stdev(&[2.0, 4.0]), 1.0);
    }

    #[test]
    fn test_count_stdev() {
        assert_eq!(count_stdev([2, 4, 4, 4, 5, 5, 7, 9]), 2.0);
    }

    #[test]
    fn test_run_lengths() {
        let seq = [true, true, false, true, false, false, false, true];
        assert_eq!(run_lengths(&seq, true), vec![2, 1, 1]);
        assert_eq!(run_lengths(&seq, false), vec![1, 3]);
        assert!(run_lengths(&[], true).is_empty());
        assert_eq!(run_lengths(&[false, false], false), vec![2]);
    }

    #[test]
    fn test_successions_count_run_minus_one() {
        let seq = [1, 1, 1, 2, 1, 1, 3, 3];
        let reps = successions(&seq);
        assert_eq!(reps.get(&1), Some(&3));
        assert_eq!(reps.get(&3), Some(&1));
        assert_eq!(reps.get(&2), None);
        assert!(successions::<u32>(&[]).is_empty());
    }

    #[test]
    fn test_histogram() {
        let hist = histogram(&[3, 1, 3, 3]);
        assert_eq!(hist.into_iter().collect::<Vec<_>>(), vec![(1, 1), (3, 3)]);
    }
}
