//! Candidate window matching
//!
//! Slides a window of `expected_count` consecutive peaks over a peak set and
//! keeps every window whose strikes are as closely spaced as a mechanical
//! striking train.

use super::{CandidateWindow, PeakSet};

/// Find every run of `expected_count` consecutive peaks with a small mean gap
///
/// # Arguments
///
/// * `peaks` - Peaks from one detection pass
/// * `expected_count` - Number of strikes the clock should produce
/// * `spacing_tolerance_samples` - Mean gap must be strictly below this
///
/// # Returns
///
/// Qualifying windows ordered by their first peak. Overlapping windows are all
/// reported. A single-strike chime matches every peak (its mean gap is 0).
///
/// # Example
///
/// ```
/// use chime_drift::features::chime::PeakSet;
/// use chime_drift::features::chime::window_matcher::find_windows;
///
/// let peaks = PeakSet::from(vec![100, 1_000, 1_900, 50_000]);
/// let windows = find_windows(&peaks, 3, 1_500.0);
/// assert_eq!(windows.len(), 1);
/// assert_eq!(windows[0].positions, vec![100, 1_000, 1_900]);
/// ```
pub fn find_windows(
    peaks: &PeakSet,
    expected_count: usize,
    spacing_tolerance_samples: f32,
) -> Vec<CandidateWindow> {
    if expected_count == 0 || peaks.len() < expected_count {
        return Vec::new();
    }

    peaks
        .positions()
        .windows(expected_count)
        .enumerate()
        .filter(|(_, run)| mean_gap(run) < spacing_tolerance_samples as f64)
        .map(|(start_index, run)| CandidateWindow {
            start_index,
            positions: run.to_vec(),
        })
        .collect()
}

/// Mean distance between consecutive positions (0 for a single position)
fn mean_gap(run: &[usize]) -> f64 {
    if run.len() < 2 {
        return 0.0;
    }
    // Positions are increasing, so the gaps telescope
    (run[run.len() - 1] - run[0]) as f64 / (run.len() - 1) as f64
}
