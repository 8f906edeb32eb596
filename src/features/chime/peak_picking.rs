//! Strike peak detection
//!
//! Finds candidate chime strikes in a rectified amplitude signal. A peak is a
//! local maximum that is loud enough, far enough from any louder peak, and
//! stands out from its surroundings by a bounded prominence.

use std::cmp::Ordering;
use std::ops::RangeInclusive;

use super::PeakSet;
use crate::error::AnalysisError;

/// Find strike peaks in a rectified signal
///
/// # Arguments
///
/// * `rectified` - Absolute amplitude per sample
/// * `height` - Minimum amplitude of a peak (inclusive)
/// * `min_gap_samples` - Minimum distance between two accepted peaks
/// * `prominence` - Accepted prominence band (inclusive on both ends)
///
/// # Returns
///
/// Peak positions in strictly increasing order
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `rectified` is empty
///
/// # Algorithm
///
/// 1. Find local maxima (flat tops report their midpoint, edges never qualify)
/// 2. Drop maxima below `height`
/// 3. Enforce `min_gap_samples` (louder peaks win, earlier position breaks ties)
/// 4. Drop peaks whose prominence falls outside `prominence`
///
/// # Example
///
/// ```
/// use chime_drift::features::chime::peak_picking::detect_peaks;
///
/// let signal = vec![0.0, 5.0, 0.0, 0.0, 9.0, 0.0, 1.0, 0.0];
/// let peaks = detect_peaks(&signal, 2.0, 2, 1.0..=100.0)?;
/// assert_eq!(peaks.positions(), &[1, 4]);
/// # Ok::<(), chime_drift::AnalysisError>(())
/// ```
pub fn detect_peaks(
    rectified: &[f32],
    height: f32,
    min_gap_samples: usize,
    prominence: RangeInclusive<f32>,
) -> Result<PeakSet, AnalysisError> {
    if rectified.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Empty amplitude for peak detection".to_string(),
        ));
    }

    let mut peaks: Vec<usize> = local_maxima(rectified)
        .into_iter()
        .filter(|&p| rectified[p] >= height)
        .collect();

    if min_gap_samples > 1 && peaks.len() > 1 {
        peaks = select_by_distance(rectified, &peaks, min_gap_samples);
    }

    peaks.retain(|&p| prominence.contains(&peak_prominence(rectified, p)));

    log::trace!(
        "detect_peaks: height={:.2}, gap={}, prominence=[{:.2}, {:.2}] -> {} peaks",
        height,
        min_gap_samples,
        prominence.start(),
        prominence.end(),
        peaks.len()
    );

    Ok(PeakSet::new(peaks))
}

/// Positions of all local maxima, in increasing order
fn local_maxima(x: &[f32]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if x.len() < 3 {
        return maxima;
    }

    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            // Walk across a flat top
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

/// Keep the loudest peaks so that no two survivors are closer than `distance`
fn select_by_distance(x: &[f32], peaks: &[usize], distance: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| {
        x[peaks[b]]
            .partial_cmp(&x[peaks[a]])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut keep = vec![true; peaks.len()];
    for &i in &order {
        if !keep[i] {
            continue;
        }

        let mut j = i;
        while j > 0 && peaks[i] - peaks[j - 1] < distance {
            keep[j - 1] = false;
            j -= 1;
        }

        let mut j = i + 1;
        while j < peaks.len() && peaks[j] - peaks[i] < distance {
            keep[j] = false;
            j += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

/// Height of a peak above the higher of the two lowest points that separate it
/// from a louder sample (or the signal edge) on either side
fn peak_prominence(x: &[f32], peak: usize) -> f32 {
    let value = x[peak];

    let mut left_min = value;
    for &v in x[..peak].iter().rev() {
        if v > value {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = value;
    for &v in &x[peak + 1..] {
        if v > value {
            break;
        }
        right_min = right_min.min(v);
    }

    value - left_min.max(right_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide() -> RangeInclusive<f32> {
        0.0..=f32::MAX
    }

    #[test]
    fn test_detect_peaks_basic() {
        let signal = vec![0.0, 0.5, 1.0, 0.7, 0.3, 0.9, 0.2];
        let peaks = detect_peaks(&signal, 0.5, 1, wide()).unwrap();
        assert_eq!(peaks.positions(), &[2, 5]);
    }

    #[test]
    fn test_detect_peaks_empty() {
        assert!(detect_peaks(&[], 0.5, 2, wide()).is_err());
    }

    #[test]
    fn test_edges_are_not_peaks() {
        let signal = vec![9.0, 1.0, 2.0, 1.0, 9.0];
        let peaks = detect_peaks(&signal, 0.0, 1, wide()).unwrap();
        assert_eq!(peaks.positions(), &[2]);
    }

    #[test]
    fn test_plateau_reports_midpoint() {
        let signal = vec![0.0, 3.0, 3.0, 3.0, 3.0, 0.0];
        let peaks = detect_peaks(&signal, 1.0, 1, wide()).unwrap();
        assert_eq!(peaks.positions(), &[2]);
    }

    #[test]
    fn test_height_is_inclusive() {
        let signal = vec![0.0, 4.0, 0.0];
        assert_eq!(detect_peaks(&signal, 4.0, 1, wide()).unwrap().len(), 1);
        assert!(detect_peaks(&signal, 4.01, 1, wide()).unwrap().is_empty());
    }

    #[test]
    fn test_min_gap_keeps_louder_peak() {
        // Peaks at 2 (1.0) and 4 (0.9) are 2 apart
        let signal = vec![0.0, 0.5, 1.0, 0.8, 0.9, 0.3, 0.1];
        let peaks = detect_peaks(&signal, 0.3, 3, wide()).unwrap();
        assert_eq!(peaks.positions(), &[2]);
    }

    #[test]
    fn test_min_gap_tie_prefers_earlier() {
        let signal = vec![0.0, 1.0, 0.0, 1.0, 0.0];
        let peaks = detect_peaks(&signal, 0.5, 3, wide()).unwrap();
        assert_eq!(peaks.positions(), &[1]);
    }

    #[test]
    fn test_prominence_against_higher_neighbour() {
        // Small bump at 3 sits on the shoulder of the big peak at 1
        let signal = vec![0.0, 10.0, 6.0, 7.0, 0.0];
        assert_eq!(peak_prominence(&signal, 1), 10.0);
        assert_eq!(peak_prominence(&signal, 3), 1.0);
    }

    #[test]
    fn test_prominence_band_rejects_both_ends() {
        let signal = vec![0.0, 10.0, 6.0, 7.0, 0.0, 100.0, 0.0];
        let peaks = detect_peaks(&signal, 0.0, 1, 2.0..=50.0).unwrap();
        // 1.0 prominence bump and the 100.0 click are both rejected
        assert_eq!(peaks.positions(), &[1]);
    }

    #[test]
    fn test_detect_peaks_deterministic() {
        let signal: Vec<f32> = (0..5000)
            .map(|i| ((i * 7919) % 113) as f32 + if i % 700 == 350 { 500.0 } else { 0.0 })
            .collect();
        let a = detect_peaks(&signal, 200.0, 100, 1.0..=1000.0).unwrap();
        let b = detect_peaks(&signal, 200.0, 100, 1.0..=1000.0).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_positions_strictly_increasing() {
        let signal: Vec<f32> = (0..2000).map(|i| ((i * 31) % 17) as f32).collect();
        let peaks = detect_peaks(&signal, 0.0, 5, wide()).unwrap();
        assert!(peaks.positions().windows(2).all(|w| w[0] < w[1]));
    }
}
