//! Parallel analysis of independent recordings
//!
//! Every analysis owns its search state, so recordings can be processed on a
//! rayon pool without any shared mutable data.

use rayon::prelude::*;

use super::result::DriftResult;
use crate::config::AnalysisConfig;
use crate::io::sample::AudioSample;

/// Analyze many recordings in parallel
///
/// # Returns
///
/// One result per recording, in input order
pub fn analyze_batch(samples: &[AudioSample], config: &AnalysisConfig) -> Vec<DriftResult> {
    log::info!("Analyzing {} recordings", samples.len());
    samples
        .par_iter()
        .map(|sample| crate::analyze_recording(sample, config))
        .collect()
}
