//! Shared statistics helpers for the scaling transforms.

use std::cmp::Ordering;

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n, not n-1).
/// Returns 0.0 for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mu = mean(values);
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Minimum and maximum of a slice. Returns None for an empty slice.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    let mut min = first;
    let mut max = first;
    for &v in &values[1..] {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    Some((min, max))
}

/// 0-based descending rank of each value (highest value = rank 0).
/// Equal values share the rank of their first occurrence in descending
/// order (standard competition ranking: 100, 100, 60 -> 0, 0, 2).
/// Returns ranks in the same order as the input.
pub fn rank_positions(values: &[f64]) -> Vec<usize> {
    let n = values.len();
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0usize; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        // Find the group of equal values
        while j < n - 1 && indexed[j].1 == indexed[j + 1].1 {
            j += 1;
        }
        for k in i..=j {
            ranks[indexed[k].0] = i;
        }
        i = j + 1;
    }

    ranks
}
