//! Drift calculation
//!
//! Converts the first strike of a matched window into wall-clock time and
//! measures how far it landed from the hour mark.
//!
//! Drift is `detected - expected`, truncated to whole seconds. A chime heard
//! in the second half of the previous hour is negative, one heard after the
//! hour mark is positive.

use chrono::{DateTime, Utc};

use super::result::{DriftResult, DriftStatus};
use super::schedule::ExpectedChime;
use crate::features::chime::CandidateWindow;
use crate::io::sample::AudioSample;

/// Turn a search outcome into a drift result
///
/// # Arguments
///
/// * `window` - Matched strike window, or `Err(status)` when the search failed
/// * `sample` - Recording the window was found in
/// * `expected` - Hour mark the recording brackets
///
/// # Returns
///
/// `DriftResult` with the drift on success, or the failure status with no drift
pub fn compute_drift(
    window: Result<&CandidateWindow, DriftStatus>,
    sample: &AudioSample,
    expected: &ExpectedChime,
) -> DriftResult {
    let window = match window {
        Ok(window) => window,
        Err(status) => return DriftResult::failure(expected.chime_time, status),
    };

    let detected = sample.time_at(window.first_peak());
    let drift = drift_seconds(detected, expected.chime_time);

    log::debug!(
        "First strike at {} for {} mark: drift {}s",
        detected.format("%Y-%m-%d %H:%M:%S%.3f"),
        expected.chime_time.format("%H:%M"),
        drift
    );

    DriftResult::success(expected.chime_time, drift)
}

/// Signed whole seconds from `expected` to `detected`, truncated toward zero
pub fn drift_seconds(detected: DateTime<Utc>, expected: DateTime<Utc>) -> i64 {
    (detected - expected).num_seconds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn hour_mark() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 16, 0, 0).unwrap()
    }

    fn window_at(position: usize) -> CandidateWindow {
        CandidateWindow {
            start_index: 0,
            positions: vec![position, position + 44_100],
        }
    }

    #[test]
    fn test_early_chime_is_negative() {
        let detected = Utc.with_ymd_and_hms(2024, 3, 1, 15, 58, 0).unwrap();
        assert_eq!(drift_seconds(detected, hour_mark()), -120);
    }

    #[test]
    fn test_late_chime_is_positive() {
        let detected = Utc.with_ymd_and_hms(2024, 3, 1, 16, 3, 0).unwrap();
        assert_eq!(drift_seconds(detected, hour_mark()), 180);
    }

    #[test]
    fn test_truncates_toward_zero() {
        let early = hour_mark() - TimeDelta::milliseconds(2_700);
        let late = hour_mark() + TimeDelta::milliseconds(2_700);
        assert_eq!(drift_seconds(early, hour_mark()), -2);
        assert_eq!(drift_seconds(late, hour_mark()), 2);
    }

    #[test]
    fn test_compute_from_window() {
        // Recording starts 2 minutes before the hour; first strike 90.5 s in
        let start = hour_mark() - TimeDelta::seconds(120);
        let sample = AudioSample::new(44_100, vec![0.0; 10], start);
        let expected = ExpectedChime::from_start_time(start);
        let window = window_at(44_100 * 90 + 22_050);

        let result = compute_drift(Ok(&window), &sample, &expected);
        assert_eq!(result.status, DriftStatus::Success);
        assert_eq!(result.expected_time, hour_mark());
        assert_eq!(result.drift_seconds, Some(-29));
    }

    #[test]
    fn test_failure_has_no_drift() {
        let start = hour_mark() - TimeDelta::seconds(120);
        let sample = AudioSample::new(44_100, vec![0.0; 10], start);
        let expected = ExpectedChime::from_start_time(start);

        let result = compute_drift(Err(DriftStatus::Ambiguous), &sample, &expected);
        assert_eq!(result.status, DriftStatus::Ambiguous);
        assert_eq!(result.drift_seconds, None);
        assert_eq!(result.expected_time, hour_mark());
    }

    #[test]
    fn test_compute_is_idempotent() {
        let start = hour_mark() - TimeDelta::seconds(300);
        let sample = AudioSample::new(44_100, vec![0.0; 10], start);
        let expected = ExpectedChime::from_start_time(start);
        let window = window_at(44_100 * 400);

        let first = compute_drift(Ok(&window), &sample, &expected);
        let second = compute_drift(Ok(&window), &sample, &expected);
        assert_eq!(first, second);
        assert_eq!(first.drift_seconds, Some(100));
    }
}
