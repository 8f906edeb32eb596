//! Configuration parameters for chime drift analysis

use crate::error::AnalysisError;

/// Hard upper bound on detection passes per analysis
pub const MAX_SEARCH_ITERATIONS: u32 = 10;

/// Analysis configuration parameters
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    // Peak detection
    /// Minimum time between two accepted strikes in seconds (default: 0.5)
    /// Collapses the ringing of a single strike into one peak
    pub min_strike_gap_seconds: f32,

    // Window matching
    /// Mean strike spacing must stay strictly below this, in seconds (default: 1.5)
    /// Mechanical strikes land roughly 0.7-1.0 s apart
    pub spacing_tolerance_seconds: f32,

    // Adaptive search
    /// Number of detection passes before giving up (default: 10, at most 10)
    pub max_iterations: u32,

    /// Lower prominence bound at the start of a search (default: 1.0)
    pub initial_prominence_min: f32,

    /// Upper prominence bound at the start of a search, as a multiple of the
    /// loudest rectified sample (default: 1.0)
    /// The bound never widens past this starting value
    pub prominence_ceiling_factor: f32,

    /// Fraction by which the prominence band is widened or narrowed per
    /// iteration (default: 0.25)
    pub prominence_step: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_strike_gap_seconds: 0.5,
            spacing_tolerance_seconds: 1.5,
            max_iterations: MAX_SEARCH_ITERATIONS,
            initial_prominence_min: 1.0,
            prominence_ceiling_factor: 1.0,
            prominence_step: 0.25,
        }
    }
}

impl AnalysisConfig {
    /// Check that every parameter is usable
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` naming the first offending field
    pub fn validate(&self) -> Result<(), AnalysisError> {
        require_positive("min_strike_gap_seconds", self.min_strike_gap_seconds)?;
        require_positive("spacing_tolerance_seconds", self.spacing_tolerance_seconds)?;
        require_positive("prominence_ceiling_factor", self.prominence_ceiling_factor)?;

        if self.max_iterations == 0 || self.max_iterations > MAX_SEARCH_ITERATIONS {
            return Err(AnalysisError::InvalidInput(format!(
                "max_iterations must be in [1, {}], got {}",
                MAX_SEARCH_ITERATIONS, self.max_iterations
            )));
        }

        if self.initial_prominence_min.is_nan() || self.initial_prominence_min < 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "initial_prominence_min must be >= 0, got {}",
                self.initial_prominence_min
            )));
        }

        if self.prominence_step.is_nan() || self.prominence_step <= 0.0 || self.prominence_step >= 1.0
        {
            return Err(AnalysisError::InvalidInput(format!(
                "prominence_step must be in (0, 1), got {}",
                self.prominence_step
            )));
        }

        Ok(())
    }

    /// Minimum distance between accepted peaks, in samples
    pub fn min_gap_samples(&self, sample_rate: u32) -> usize {
        (sample_rate as f32 * self.min_strike_gap_seconds) as usize
    }

    /// Spacing tolerance for candidate windows, in samples
    pub fn spacing_tolerance_samples(&self, sample_rate: u32) -> f32 {
        sample_rate as f32 * self.spacing_tolerance_seconds
    }
}

fn require_positive(name: &str, value: f32) -> Result<(), AnalysisError> {
    if value.is_nan() || value <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "{} must be > 0, got {}",
            name, value
        )));
    }
    Ok(())
}
