//! Adaptive threshold search
//!
//! A fixed detection threshold cannot cope with recordings whose loudness
//! varies from hour to hour, so the search repeatedly runs peak picking and
//! window matching, adjusting the thresholds after every pass until exactly
//! one candidate window remains.
//!
//! Each pass ends in one of three ways:
//!
//! - **One window**: the search is done. The first unique interpretation wins.
//! - **No window** (too strict): the current height becomes the upper bound,
//!   the next height is bisected towards the lower bound (or halved when none
//!   is known yet) and the prominence band is widened. The ceiling never
//!   widens past its starting value.
//! - **Several windows** (too lenient): the current height becomes the lower
//!   bound, the next height is bisected towards the upper bound (or doubled,
//!   up to the loudest sample) and the prominence band is narrowed.
//!
//! The search never guesses: if the pass budget runs out, it fails with
//! `Ambiguous` when the last pass still had several windows and with
//! `RecursionLimit` when it had none.
//!
//! # Example
//!
//! ```
//! use chime_drift::config::AnalysisConfig;
//! use chime_drift::features::chime::adaptive_search::{AdaptiveSearch, SearchStatus};
//!
//! let sample_rate = 1000;
//! let mut signal = vec![0.0f32; 5 * sample_rate as usize];
//! for strike in [1000, 1900, 2800] {
//!     signal[strike] = 400.0;
//! }
//!
//! let config = AnalysisConfig::default();
//! let search = AdaptiveSearch::new(&signal, sample_rate, 3, &config)?;
//! let state = search.run()?;
//! match state.status {
//!     SearchStatus::Found(window) => assert_eq!(window.positions, vec![1000, 1900, 2800]),
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! # Ok::<(), chime_drift::AnalysisError>(())
//! ```

use std::fmt;
use std::ops::RangeInclusive;

use super::peak_picking::detect_peaks;
use super::window_matcher::find_windows;
use super::CandidateWindow;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::preprocessing::rectify::max_amplitude;

/// Detection thresholds for one pass, plus the height bounds learned so far
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    /// Minimum peak amplitude
    pub height: f32,

    /// Highest height known to admit too many windows
    pub height_low: Option<f32>,

    /// Lowest height known to admit no window
    pub height_high: Option<f32>,

    /// Lower prominence bound (inclusive)
    pub prominence_min: f32,

    /// Upper prominence bound (inclusive)
    pub prominence_max: f32,
}

impl ThresholdConfig {
    /// Starting thresholds for a signal whose loudest rectified sample is `max_amplitude`
    ///
    /// Height starts half way up the amplitude range and the prominence band
    /// spans from `initial_prominence_min` to `prominence_ceiling_factor` times
    /// the loudest sample. No peak of a rectified signal is more prominent than
    /// its loudest sample, so the ceiling only starts rejecting peaks once a
    /// too-lenient pass narrows it.
    pub fn seed(max_amplitude: f32, config: &AnalysisConfig) -> Self {
        let prominence_min = config.initial_prominence_min;
        let mut prominence_max = config.prominence_ceiling_factor * max_amplitude;
        if prominence_max <= prominence_min {
            // Quiet or silent recordings
            prominence_max = prominence_min + 1.0;
        }

        Self {
            height: max_amplitude / 2.0,
            height_low: None,
            height_high: None,
            prominence_min,
            prominence_max,
        }
    }

    /// Accepted prominence band
    pub fn prominence_range(&self) -> RangeInclusive<f32> {
        self.prominence_min..=self.prominence_max
    }

    /// Thresholds for the next pass after a pass that found no window
    ///
    /// The prominence ceiling never widens past `prominence_limit`.
    pub fn relax(&self, step: f32, prominence_limit: f32) -> Self {
        let height_high = self.height;
        let height = match self.height_low {
            Some(low) => (low + height_high) / 2.0,
            None => self.height / 2.0,
        };

        Self {
            height,
            height_low: self.height_low,
            height_high: Some(height_high),
            prominence_min: self.prominence_min * (1.0 - step),
            prominence_max: (self.prominence_max * (1.0 + step))
                .min(prominence_limit)
                .max(self.prominence_max),
        }
    }

    /// Thresholds for the next pass after a pass that found several windows
    ///
    /// Height never rises above `max_amplitude`, and the prominence ceiling
    /// never drops below the next height.
    pub fn tighten(&self, step: f32, max_amplitude: f32) -> Self {
        let height_low = self.height;
        let height = match self.height_high {
            Some(high) => (height_low + high) / 2.0,
            None => (self.height * 2.0).min(max_amplitude),
        };

        let mut prominence_max = (self.prominence_max * (1.0 - step)).max(height);
        if prominence_max <= self.prominence_min {
            prominence_max = self.prominence_max;
        }

        let mut prominence_min = self.prominence_min * (1.0 + step);
        if prominence_min >= prominence_max {
            prominence_min = self.prominence_min;
        }

        Self {
            height,
            height_low: Some(height_low),
            height_high: self.height_high,
            prominence_min,
            prominence_max,
        }
    }
}

/// Why a search gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailure {
    /// Pass budget exhausted while several windows still matched
    Ambiguous,

    /// Pass budget exhausted while no window matched
    RecursionLimit,
}

impl fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchFailure::Ambiguous => write!(f, "ambiguous strike pattern"),
            SearchFailure::RecursionLimit => write!(f, "no strike pattern found"),
        }
    }
}

/// Where a search stands
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    /// More passes are needed
    Searching,

    /// Exactly one window matched
    Found(CandidateWindow),

    /// The search gave up
    Failed(SearchFailure),
}

/// State carried from one pass to the next
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    /// Completed passes (never above the configured cap)
    pub iteration: u32,

    /// Thresholds for the next pass, or of the final pass once finished
    pub config: ThresholdConfig,

    /// Windows matched by the most recent pass (0 before the first pass)
    pub candidates: usize,

    /// Current status
    pub status: SearchStatus,
}

impl SearchState {
    /// True while further passes are needed
    pub fn is_searching(&self) -> bool {
        matches!(self.status, SearchStatus::Searching)
    }
}

/// Drives peak picking and window matching over one rectified recording
#[derive(Debug)]
pub struct AdaptiveSearch<'a> {
    rectified: &'a [f32],
    expected_count: usize,
    min_gap_samples: usize,
    spacing_tolerance_samples: f32,
    max_amplitude: f32,
    prominence_limit: f32,
    config: &'a AnalysisConfig,
}

impl<'a> AdaptiveSearch<'a> {
    /// Prepare a search over a rectified signal
    ///
    /// # Arguments
    ///
    /// * `rectified` - Absolute amplitude per sample
    /// * `sample_rate` - Sample rate in Hz
    /// * `expected_count` - Number of strikes to find (1-12)
    /// * `config` - Analysis configuration
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` for an empty signal, a zero sample
    /// rate, a strike count outside 1-12 or an invalid configuration
    pub fn new(
        rectified: &'a [f32],
        sample_rate: u32,
        expected_count: u32,
        config: &'a AnalysisConfig,
    ) -> Result<Self, AnalysisError> {
        if rectified.is_empty() {
            return Err(AnalysisError::InvalidInput("Empty audio samples".to_string()));
        }

        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput("Invalid sample rate".to_string()));
        }

        if !(1..=12).contains(&expected_count) {
            return Err(AnalysisError::InvalidInput(format!(
                "Expected strike count must be in [1, 12], got {}",
                expected_count
            )));
        }

        config.validate()?;

        let max_amplitude = max_amplitude(rectified);
        Ok(Self {
            rectified,
            expected_count: expected_count as usize,
            min_gap_samples: config.min_gap_samples(sample_rate),
            spacing_tolerance_samples: config.spacing_tolerance_samples(sample_rate),
            max_amplitude,
            prominence_limit: ThresholdConfig::seed(max_amplitude, config).prominence_max,
            config,
        })
    }

    /// State before the first pass
    pub fn initial_state(&self) -> SearchState {
        SearchState {
            iteration: 0,
            config: ThresholdConfig::seed(self.max_amplitude, self.config),
            candidates: 0,
            status: SearchStatus::Searching,
        }
    }

    /// Run one detection pass and decide what happens next
    ///
    /// Finished states are returned unchanged.
    pub fn step(&self, state: SearchState) -> Result<SearchState, AnalysisError> {
        if !state.is_searching() {
            return Ok(state);
        }

        if state.iteration >= self.config.max_iterations {
            return Ok(SearchState {
                status: SearchStatus::Failed(SearchFailure::RecursionLimit),
                ..state
            });
        }

        let thresholds = state.config;
        let peaks = detect_peaks(
            self.rectified,
            thresholds.height,
            self.min_gap_samples,
            thresholds.prominence_range(),
        )?;
        let mut windows = find_windows(&peaks, self.expected_count, self.spacing_tolerance_samples);
        let candidates = windows.len();
        let iteration = state.iteration + 1;

        log::debug!(
            "Chime search pass {}: height={:.2}, prominence=[{:.2}, {:.2}], {} peaks, {} windows",
            iteration,
            thresholds.height,
            thresholds.prominence_min,
            thresholds.prominence_max,
            peaks.len(),
            candidates
        );

        if candidates == 1 {
            let window = windows.remove(0);
            return Ok(SearchState {
                iteration,
                config: thresholds,
                candidates,
                status: SearchStatus::Found(window),
            });
        }

        if iteration >= self.config.max_iterations {
            let failure = if candidates > 1 {
                SearchFailure::Ambiguous
            } else {
                SearchFailure::RecursionLimit
            };
            log::warn!(
                "Chime search gave up after {} passes: {} ({} windows in last pass)",
                iteration,
                failure,
                candidates
            );
            return Ok(SearchState {
                iteration,
                config: thresholds,
                candidates,
                status: SearchStatus::Failed(failure),
            });
        }

        let step = self.config.prominence_step;
        let next = if candidates == 0 {
            thresholds.relax(step, self.prominence_limit)
        } else {
            thresholds.tighten(step, self.max_amplitude)
        };

        Ok(SearchState {
            iteration,
            config: next,
            candidates,
            status: SearchStatus::Searching,
        })
    }

    /// Run passes until the search finds a window or gives up
    ///
    /// The returned state is always `Found` or `Failed`.
    pub fn run(&self) -> Result<SearchState, AnalysisError> {
        let mut state = self.initial_state();
        while state.is_searching() {
            state = self.step(state)?;
        }
        Ok(state)
    }
}
