//! Chime strike detection
//!
//! Turns a rectified recording into a single run of evenly spaced strikes:
//! - Peak picking (height, spacing, prominence band)
//! - Window matching (runs of `expected_count` closely spaced peaks)
//! - Adaptive search over detection thresholds

pub mod adaptive_search;
pub mod peak_picking;
pub mod window_matcher;

/// Peak positions (in samples) from one detection pass, strictly increasing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PeakSet {
    positions: Vec<usize>,
}

impl PeakSet {
    pub(crate) fn new(positions: Vec<usize>) -> Self {
        debug_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        Self { positions }
    }

    /// Sample positions in increasing order
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Number of peaks
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when no peak was found
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl From<Vec<usize>> for PeakSet {
    /// Build a peak set from arbitrary positions (sorted and deduplicated)
    fn from(mut positions: Vec<usize>) -> Self {
        positions.sort_unstable();
        positions.dedup();
        Self { positions }
    }
}

/// A run of consecutive peaks whose count and spacing match a chime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateWindow {
    /// Index of the first peak of the run within its `PeakSet`
    pub start_index: usize,

    /// Peak positions in samples, in original order
    pub positions: Vec<usize>,
}

impl CandidateWindow {
    /// Position of the first strike in samples
    pub fn first_peak(&self) -> usize {
        self.positions[0]
    }

    /// Number of strikes in the window
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false for windows produced by the matcher
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
