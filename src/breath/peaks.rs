//! Peak search over a sampled signal.
//!
//! A peak must satisfy four constraints at once: minimum height, minimum
//! distance to any other kept peak, minimum prominence and minimum width at
//! half prominence. Candidates are filtered in that order, and each filter
//! only sees the peaks that survived the previous ones.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Peak search thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakCriteria {
    /// Minimum separation between peaks (samples)
    pub min_distance: usize,

    /// Minimum prominence (signal units)
    pub min_prominence: f64,

    /// Minimum absolute height (signal units)
    pub min_height: f64,

    /// Minimum width at half prominence (samples)
    pub min_width: f64,
}

impl Default for PeakCriteria {
    fn default() -> Self {
        Self {
            min_distance: 80,
            min_prominence: 0.1,
            min_height: 0.1,
            min_width: 20.0,
        }
    }
}

/// Prominence of a peak and the bases it was measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prominence {
    /// Height above the higher of the two bases
    pub value: f64,
    /// Index of the lowest sample on the left
    pub left_base: usize,
    /// Index of the lowest sample on the right
    pub right_base: usize,
}

/// Find the indices of all local maxima.
///
/// A maximum is a sample strictly greater than its left neighbour, followed
/// by zero or more equal samples and then a strictly smaller one. For flat
/// tops the midpoint (rounded down) is reported. The first and last samples
/// are never maxima, and NaN never compares greater, so it cannot be part of
/// a maximum.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if x.len() < 3 {
        return maxima;
    }

    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

/// Resolve peaks closer than `min_distance` samples.
///
/// Peaks are visited from highest to lowest; equal heights are visited in
/// index order, so the earlier peak wins. Every visited peak that is still
/// kept removes its lower neighbours within the window.
pub fn select_by_distance(x: &[f64], peaks: &[usize], min_distance: usize) -> Vec<usize> {
    if min_distance <= 1 {
        return peaks.to_vec();
    }

    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| {
        x[peaks[b]]
            .partial_cmp(&x[peaks[a]])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut keep = vec![true; peaks.len()];
    for &j in &order {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < min_distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < min_distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, kept)| kept.then_some(p))
        .collect()
}

/// Prominence of the peak at `peak`.
///
/// The search extends to each side until a strictly higher sample (or the
/// series edge) is reached; the lowest sample on the way is that side's
/// base. A NaN sample also ends the search.
pub fn prominence(x: &[f64], peak: usize) -> Prominence {
    let height = x[peak];

    let mut left_min = height;
    let mut left_base = peak;
    let mut i = peak;
    loop {
        if !(x[i] <= height) {
            break;
        }
        if x[i] < left_min {
            left_min = x[i];
            left_base = i;
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let mut right_min = height;
    let mut right_base = peak;
    let mut i = peak;
    while i < x.len() && x[i] <= height {
        if x[i] < right_min {
            right_min = x[i];
            right_base = i;
        }
        i += 1;
    }

    Prominence {
        value: height - left_min.max(right_min),
        left_base,
        right_base,
    }
}

/// Width of a peak at `rel_height` of its prominence, in samples.
///
/// The crossing points on either side are linearly interpolated between the
/// neighbouring samples and never extend past the prominence bases.
pub fn width(x: &[f64], peak: usize, prom: &Prominence, rel_height: f64) -> f64 {
    let level = x[peak] - prom.value * rel_height;

    let mut i = peak;
    while prom.left_base < i && level < x[i] {
        i -= 1;
    }
    let mut left = i as f64;
    if x[i] < level {
        left += (level - x[i]) / (x[i + 1] - x[i]);
    }

    let mut i = peak;
    while i < prom.right_base && level < x[i] {
        i += 1;
    }
    let mut right = i as f64;
    if x[i] < level {
        right -= (level - x[i]) / (x[i - 1] - x[i]);
    }

    right - left
}

/// Find peaks in `x` that satisfy every threshold in `criteria`.
///
/// Returned indices are in ascending order.
pub fn find_peaks(x: &[f64], criteria: &PeakCriteria) -> Vec<usize> {
    let candidates: Vec<usize> = local_maxima(x)
        .into_iter()
        .filter(|&p| x[p] >= criteria.min_height)
        .collect();

    select_by_distance(x, &candidates, criteria.min_distance)
        .into_iter()
        .filter(|&p| {
            let prom = prominence(x, p);
            prom.value >= criteria.min_prominence && width(x, p, &prom, 0.5) >= criteria.min_width
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_maxima_simple() {
        let x = [0.0, 1.0, 0.0, 2.0, 1.0, 3.0];
        assert_eq!(local_maxima(&x), vec![1, 3]);
    }

    #[test]
    fn test_local_maxima_plateau_midpoint() {
        let x = [0.0, 1.0, 1.0, 1.0, 1.0, 0.0];
        assert_eq!(local_maxima(&x), vec![2]);
    }

    #[test]
    fn test_local_maxima_ignores_shoulders_and_edges() {
        let x = [5.0, 1.0, 2.0, 2.0, 3.0, 4.0];
        assert!(local_maxima(&x).is_empty());
    }

    #[test]
    fn test_local_maxima_nan_is_never_a_peak() {
        let x = [0.0, f64::NAN, 0.0, 1.0, 0.0];
        assert_eq!(local_maxima(&x), vec![3]);
    }

    #[test]
    fn test_distance_keeps_higher_peak() {
        let x = [0.0, 1.0, 0.0, 2.0, 0.0, 0.5, 0.0];
        assert_eq!(select_by_distance(&x, &[1, 3, 5], 3), vec![3]);
    }

    #[test]
    fn test_distance_tie_keeps_earlier_peak() {
        let x = [0.0, 1.0, 0.0, 1.0, 0.0];
        assert_eq!(select_by_distance(&x, &[1, 3], 3), vec![1]);
    }

    #[test]
    fn test_distance_exactly_min_distance_apart() {
        let x = [0.0, 1.0, 0.0, 1.0, 0.0];
        assert_eq!(select_by_distance(&x, &[1, 3], 2), vec![1, 3]);
    }

    #[test]
    fn test_prominence_bases() {
        let x = [0.0, 3.0, 1.0, 2.0, 0.5, 4.0, 0.0];
        let prom = prominence(&x, 3);
        assert_eq!(prom.value, 1.0);
        assert_eq!(prom.left_base, 2);
        assert_eq!(prom.right_base, 4);

        let prom = prominence(&x, 5);
        assert_eq!(prom.value, 4.0);
        assert_eq!(prom.left_base, 0);
        assert_eq!(prom.right_base, 6);
    }

    #[test]
    fn test_width_triangle() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0, 1.0, 0.0];
        let prom = prominence(&x, 4);
        assert_eq!(prom.value, 4.0);
        assert!((width(&x, 4, &prom, 0.5) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_find_peaks_width_filter() {
        // One narrow spike and one broad hump
        let mut x = vec![0.0; 300];
        x[50] = 1.0;
        for (i, v) in x.iter_mut().enumerate().skip(150).take(101) {
            let phase = (i - 150) as f64 / 100.0 * std::f64::consts::PI;
            *v = phase.sin();
        }
        let peaks = find_peaks(&x, &PeakCriteria::default());
        assert_eq!(peaks, vec![200]);
    }

    #[test]
    fn test_find_peaks_prominence_filter() {
        // Two broad humps on a plateau walled in by higher ground
        let mut x = vec![1.0; 400];
        x[..20].fill(2.0);
        x[380..].fill(2.0);
        for i in 91..150 {
            x[i] += 0.05 * ((i - 90) as f64 / 60.0 * std::f64::consts::PI).sin();
        }
        for i in 241..300 {
            x[i] += 0.3 * ((i - 240) as f64 / 60.0 * std::f64::consts::PI).sin();
        }

        // The low hump clears height and width but not prominence
        let low = prominence(&x, 120);
        assert!(low.value < 0.1);
        assert!(x[120] >= 0.1);
        assert!(width(&x, 120, &low, 0.5) >= 20.0);

        let peaks = find_peaks(&x, &PeakCriteria::default());
        assert_eq!(peaks, vec![270]);
    }

    #[test]
    fn test_find_peaks_height_filter() {
        let x: Vec<f64> = (0..200)
            .map(|i| 0.05 * (i as f64 / 200.0 * std::f64::consts::PI).sin())
            .collect();
        assert!(find_peaks(&x, &PeakCriteria::default()).is_empty());
    }
}
