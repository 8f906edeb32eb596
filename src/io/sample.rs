//! In-memory recordings and the source trait that produces them

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::AnalysisError;

/// One complete recording bracketing the top of an hour
///
/// Immutable once constructed. `start_time` is the wall-clock instant of the
/// first sample.
#[derive(Debug, Clone)]
pub struct AudioSample {
    sample_rate: u32,
    amplitude: Vec<f32>,
    start_time: DateTime<Utc>,
}

impl AudioSample {
    /// Create a sample from already-known start time
    pub fn new(sample_rate: u32, amplitude: Vec<f32>, start_time: DateTime<Utc>) -> Self {
        Self {
            sample_rate,
            amplitude,
            start_time,
        }
    }

    /// Create a sample from raw PCM and the time the recording finished
    ///
    /// The recorder writes the file when it stops, so the first sample was
    /// captured `len / sample_rate` seconds before the modification time.
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz
    /// * `samples` - Signed PCM samples (mono)
    /// * `file_mtime` - Modification time of the recording file
    pub fn from_recording(sample_rate: u32, samples: &[i32], file_mtime: DateTime<Utc>) -> Self {
        let amplitude: Vec<f32> = samples.iter().map(|&s| s as f32).collect();
        let start_time = file_mtime - duration_of(amplitude.len(), sample_rate);
        Self::new(sample_rate, amplitude, start_time)
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Raw (unrectified) amplitudes
    pub fn amplitude(&self) -> &[f32] {
        &self.amplitude
    }

    /// Wall-clock time of the first sample
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Recording length
    pub fn duration(&self) -> TimeDelta {
        duration_of(self.amplitude.len(), self.sample_rate)
    }

    /// Wall-clock time of the sample at `position`
    pub fn time_at(&self, position: usize) -> DateTime<Utc> {
        self.start_time + duration_of(position, self.sample_rate)
    }

    /// Reject recordings that cannot be analyzed
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` for an empty buffer or a zero sample rate
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.amplitude.is_empty() {
            return Err(AnalysisError::InvalidInput("Empty audio samples".to_string()));
        }

        if self.sample_rate == 0 {
            return Err(AnalysisError::InvalidInput("Invalid sample rate".to_string()));
        }

        Ok(())
    }
}

/// Produces recordings for analysis (WAV files, test fixtures, capture devices)
pub trait AudioSource {
    /// Load one complete recording
    fn load(&self) -> Result<AudioSample, AnalysisError>;
}

fn duration_of(samples: usize, sample_rate: u32) -> TimeDelta {
    if sample_rate == 0 {
        return TimeDelta::zero();
    }
    TimeDelta::nanoseconds((samples as i64 * 1_000_000_000) / sample_rate as i64)
}
