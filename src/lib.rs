//! # Chime Drift
//!
//! Measures how far a mechanical chiming clock has drifted by listening to a
//! short recording around the top of each hour.
//!
//! ## Features
//!
//! - **Strike detection**: Peak picking with height, spacing and prominence limits
//! - **Adaptive search**: Bisection over detection thresholds until exactly one
//!   strike train matches the expected number of strikes
//! - **Drift measurement**: Signed offset in seconds between the first strike
//!   and the hour mark
//! - **Collaborators**: WAV loading, result sinks and recording archive retention
//!
//! ## Quick Start
//!
//! ```no_run
//! use chime_drift::io::decoder::WavSource;
//! use chime_drift::io::sample::AudioSource;
//! use chime_drift::{analyze_recording, AnalysisConfig};
//!
//! let sample = WavSource::new("recordings/4pm.wav").load()?;
//! let result = analyze_recording(&sample, &AnalysisConfig::default());
//!
//! println!("{}: {:?}s ({})", result.expected_time, result.drift_seconds, result.status);
//! # Ok::<(), chime_drift::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! AudioSample → Rectify → Adaptive search (peak picking → window matching)* → Drift → DriftResult
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::batch::analyze_batch;
pub use analysis::result::{DriftResult, DriftRow, DriftStatus};
pub use analysis::schedule::ExpectedChime;
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use io::sample::{AudioSample, AudioSource};
pub use io::sink::ResultSink;

use analysis::drift::compute_drift;
use features::chime::adaptive_search::{AdaptiveSearch, SearchStatus};
use preprocessing::rectify::rectify;

/// Main analysis function
///
/// Derives the expected chime from the recording's start time, searches for
/// the strike train and measures its drift.
///
/// # Arguments
///
/// * `sample` - One complete recording bracketing an hour mark
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `DriftResult` with the drift on success, or a failure status without drift.
/// Malformed recordings and unusable configurations report `MalformedInput`.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use chime_drift::{analyze_recording, AnalysisConfig, AudioSample, DriftStatus};
///
/// // One strike at 01:00:02 in a recording that starts at 00:59:50
/// let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 59, 50).unwrap();
/// let mut amplitude = vec![0.0f32; 20_000];
/// amplitude[12_000] = -800.0;
///
/// let result = analyze_recording(&AudioSample::new(1000, amplitude, start), &AnalysisConfig::default());
/// assert_eq!(result.status, DriftStatus::Success);
/// assert_eq!(result.drift_seconds, Some(2));
/// ```
pub fn analyze_recording(sample: &AudioSample, config: &AnalysisConfig) -> DriftResult {
    let expected = ExpectedChime::from_start_time(sample.start_time());
    analyze_against(sample, &expected, config)
}

/// Analyze a recording against an explicitly given hour mark
///
/// Use when the hour mark is known independently of the recording timestamps.
pub fn analyze_against(
    sample: &AudioSample,
    expected: &ExpectedChime,
    config: &AnalysisConfig,
) -> DriftResult {
    log::debug!(
        "Starting chime analysis: {} samples at {} Hz, expecting {} strikes at {}",
        sample.amplitude().len(),
        sample.sample_rate(),
        expected.expected_count,
        expected.chime_time
    );

    if let Err(err) = sample.validate().and_then(|_| config.validate()) {
        log::warn!("Skipping recording for {}: {}", expected.chime_time, err);
        return compute_drift(Err(DriftStatus::MalformedInput), sample, expected);
    }

    let rectified = rectify(sample.amplitude());
    let outcome = AdaptiveSearch::new(
        &rectified,
        sample.sample_rate(),
        expected.expected_count,
        config,
    )
    .and_then(|search| search.run());

    match outcome {
        Ok(state) => match state.status {
            SearchStatus::Found(window) => compute_drift(Ok(&window), sample, expected),
            SearchStatus::Failed(failure) => compute_drift(Err(failure.into()), sample, expected),
            // `run` loops until the state leaves `Searching`
            SearchStatus::Searching => {
                unreachable!("chime search returned while still searching")
            }
        },
        Err(err) => {
            log::warn!("Chime search for {} failed: {}", expected.chime_time, err);
            compute_drift(Err(DriftStatus::MalformedInput), sample, expected)
        }
    }
}
