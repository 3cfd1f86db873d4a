/// Peak detection on a sampled 1-D signal
///
/// A sample is a peak when it is strictly higher than its left neighbour
/// and the run of equal values starting at it is followed by a strictly
/// lower sample. Flat tops report the middle sample of the plateau
/// (rounded down). Endpoints are never peaks.
///
/// Peaks closer than `min_distance` samples are thinned by height: the
/// highest peak is kept and every peak within `min_distance - 1` samples of
/// it is dropped, then the next highest surviving peak, and so on. Equal
/// heights keep the later peak.

/// Indices of local maxima at least `min_distance` samples apart
pub fn find_peaks(signal: &[f64], min_distance: usize) -> Vec<usize> {
    let candidates = local_maxima(signal);
    if min_distance <= 1 || candidates.len() < 2 {
        return candidates;
    }
    select_by_distance(signal, &candidates, min_distance)
}

fn local_maxima(signal: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if signal.len() < 3 {
        return peaks;
    }

    let last = signal.len() - 1;
    let mut i = 1;
    while i < last {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                let right_edge = ahead - 1;
                peaks.push((i + right_edge) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    peaks
}

fn select_by_distance(signal: &[f64], peaks: &[usize], min_distance: usize) -> Vec<usize> {
    let mut keep = vec![true; peaks.len()];

    // Stable ascending sort walked from the top: on equal height the later
    // peak is visited first
    let mut priority: Vec<usize> = (0..peaks.len()).collect();
    priority.sort_by(|&a, &b| {
        signal[peaks[a]]
            .partial_cmp(&signal[peaks[b]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for &j in priority.iter().rev() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_signals_have_no_peaks() {
        assert!(find_peaks(&[], 1).is_empty());
        assert!(find_peaks(&[1.0, 2.0], 1).is_empty());
    }

    #[test]
    fn test_simple_maxima() {
        let signal = [0.0, 1.0, 0.0, 2.0, 0.0, 1.5, 0.0];
        assert_eq!(find_peaks(&signal, 1), vec![1, 3, 5]);
    }

    #[test]
    fn test_endpoints_are_not_peaks() {
        let signal = [3.0, 1.0, 2.0, 1.0, 4.0];
        assert_eq!(find_peaks(&signal, 1), vec![2]);
    }

    #[test]
    fn test_plateau_reports_middle() {
        let signal = [0.0, 1.0, 1.0, 1.0, 1.0, 0.0];
        assert_eq!(find_peaks(&signal, 1), vec![2]);

        // A plateau running into the end is not a peak
        let signal = [0.0, 1.0, 1.0, 1.0];
        assert!(find_peaks(&signal, 1).is_empty());
    }

    #[test]
    fn test_distance_keeps_highest() {
        let signal = [0.0, 1.0, 0.0, 3.0, 0.0, 2.0, 0.0];
        // Peaks at 1, 3, 5; with distance 3 only 3 survives
        assert_eq!(find_peaks(&signal, 3), vec![3]);
        // With distance 2 all are at least 2 apart
        assert_eq!(find_peaks(&signal, 2), vec![1, 3, 5]);
    }

    #[test]
    fn test_distance_tie_keeps_later() {
        let signal = [0.0, 1.0, 0.0, 1.0, 0.0];
        assert_eq!(find_peaks(&signal, 3), vec![3]);

        // Three equal peaks two apart: the last survives and removes the
        // middle one, leaving the first out of reach
        let signal = [0.0, 2.0, 0.0, 2.0, 0.0, 2.0, 0.0];
        assert_eq!(find_peaks(&signal, 3), vec![1, 5]);
    }

    #[test]
    fn test_periodic_signal() {
        // Period of 12 samples, peaks at 3, 15, 27, ...
        let signal: Vec<f64> = (0..60)
            .map(|i| ((i as f64) * std::f64::consts::TAU / 12.0).sin())
            .collect();
        let peaks = find_peaks(&signal, 10);
        assert_eq!(peaks, vec![3, 15, 27, 39, 51]);
    }
}
