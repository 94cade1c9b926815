//! Peak and valley picking on 1D signals.
//!
//! Candidates are strict local extrema: the first and last samples never
//! qualify, and a flat plateau reports its middle sample. Candidates closer than
//! `distance` samples are thinned, always keeping the more prominent one. The
//! `n` most prominent survivors are returned in index order.

use serde::Serialize;

/// One selected extremum of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremum {
    pub index: usize,
    /// Original signal value at `index` (never negated, even for minima).
    pub value: f64,
}

/// Which kind of extremum to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremumKind {
    Maximum,
    Minimum,
}

impl ExtremumKind {
    fn orient(self, v: f64) -> f64 {
        match self {
            ExtremumKind::Maximum => v,
            ExtremumKind::Minimum => -v,
        }
    }
}

/// Default minimum separation (in samples) between two selected extrema.
pub const DEFAULT_DISTANCE: usize = 20;

/// Find at most `n` extrema of `data`, most prominent first, returned sorted by
/// increasing index.
///
/// An empty result is a normal outcome (flat or monotone signals).
pub fn find_extrema(data: &[f64], n: usize, distance: usize, kind: ExtremumKind) -> Vec<Extremum> {
    let signal: Vec<f64> = data.iter().map(|&v| kind.orient(v)).collect();

    let candidates = local_maxima(&signal);
    let kept = select_by_distance(&candidates, &signal, distance.max(1));

    let mut ranked: Vec<usize> = kept;
    // Stable sort: equal prominence keeps the earlier sample first.
    ranked.sort_by(|&a, &b| signal[b].total_cmp(&signal[a]));
    ranked.truncate(n);
    ranked.sort_unstable();

    ranked
        .into_iter()
        .map(|index| Extremum {
            index,
            value: data[index],
        })
        .collect()
}

/// Indices of a selected extrema set, in the same order.
pub fn extremum_indices(extrema: &[Extremum]) -> Vec<usize> {
    extrema.iter().map(|e| e.index).collect()
}

/// Strict local maxima, plateaus resolved to their (lower) middle sample.
fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
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
                let left = i;
                let right = ahead - 1;
                peaks.push((left + right) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Thin `peaks` (index-ascending) so that no two kept peaks are closer than
/// `distance`, visiting peaks from the most to the least prominent.
fn select_by_distance(peaks: &[usize], signal: &[f64], distance: usize) -> Vec<usize> {
    let mut keep = vec![true; peaks.len()];

    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| signal[peaks[a]].total_cmp(&signal[peaks[b]]));

    for &j in order.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wavy(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let t = i as f64 / len as f64 * std::f64::consts::TAU;
                (5.0 * t).sin() + 0.3 * (13.0 * t).cos() + 0.1 * t
            })
            .collect()
    }

    #[test]
    fn single_spike_yields_one_peak() {
        let mut data = vec![0.0; 200];
        data[87] = 3.0;
        let peaks = find_extrema(&data, 5, DEFAULT_DISTANCE, ExtremumKind::Maximum);
        assert_eq!(peaks, vec![Extremum { index: 87, value: 3.0 }]);
    }

    #[test]
    fn flat_and_monotone_signals_have_no_extrema() {
        let flat = vec![1.5; 50];
        assert!(find_extrema(&flat, 5, 20, ExtremumKind::Maximum).is_empty());
        assert!(find_extrema(&flat, 5, 20, ExtremumKind::Minimum).is_empty());

        let ramp: Vec<f64> = (0..50).map(|i| i as f64).collect();
        assert!(find_extrema(&ramp, 5, 20, ExtremumKind::Maximum).is_empty());
    }

    #[test]
    fn results_are_index_ascending() {
        let data = wavy(200);
        for kind in [ExtremumKind::Maximum, ExtremumKind::Minimum] {
            let found = find_extrema(&data, 6, 10, kind);
            assert!(!found.is_empty());
            assert!(found.windows(2).all(|w| w[0].index < w[1].index));
        }
    }

    #[test]
    fn minimum_on_signal_matches_maximum_on_negated_signal() {
        let data = wavy(200);
        let negated: Vec<f64> = data.iter().map(|v| -v).collect();

        let minima = find_extrema(&data, 4, 20, ExtremumKind::Minimum);
        let maxima = find_extrema(&negated, 4, 20, ExtremumKind::Maximum);

        assert_eq!(extremum_indices(&minima), extremum_indices(&maxima));
        for (a, b) in minima.iter().zip(&maxima) {
            assert_eq!(a.value, -b.value);
        }
    }

    #[test]
    fn close_candidates_keep_the_more_prominent() {
        let mut data = vec![0.0; 60];
        data[20] = 1.0;
        data[25] = 2.0;
        data[50] = 0.5;
        let peaks = find_extrema(&data, 5, 10, ExtremumKind::Maximum);
        assert_eq!(extremum_indices(&peaks), vec![25, 50]);
    }

    #[test]
    fn keeps_the_n_most_prominent_in_index_order() {
        let mut data = vec![0.0; 100];
        for (i, v) in [(10, 1.0), (30, 4.0), (50, 2.0), (70, 3.0), (90, 0.5)] {
            data[i] = v;
        }
        let peaks = find_extrema(&data, 3, 5, ExtremumKind::Maximum);
        assert_eq!(extremum_indices(&peaks), vec![30, 50, 70]);
    }

    #[test]
    fn deepest_minima_are_preferred() {
        let mut data = vec![0.0; 100];
        for (i, v) in [(10, -1.0), (30, -4.0), (50, -2.0)] {
            data[i] = v;
        }
        let valleys = find_extrema(&data, 2, 5, ExtremumKind::Minimum);
        assert_eq!(extremum_indices(&valleys), vec![30, 50]);
        assert_eq!(valleys[0].value, -4.0);
    }

    #[test]
    fn plateau_reports_its_middle() {
        let data = [0.0, 1.0, 2.0, 2.0, 2.0, 2.0, 1.0, 0.0];
        let peaks = find_extrema(&data, 1, 1, ExtremumKind::Maximum);
        assert_eq!(extremum_indices(&peaks), vec![3]);
    }

    #[test]
    fn end_samples_are_never_extrema() {
        let data = [5.0, 1.0, 0.0, 1.0, 5.0];
        assert!(find_extrema(&data, 3, 1, ExtremumKind::Maximum).is_empty());
        let valleys = find_extrema(&data, 3, 1, ExtremumKind::Minimum);
        assert_eq!(extremum_indices(&valleys), vec![2]);
    }
}
