//! WAV decoding using hound

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::sample::{AudioSample, AudioSource};
use crate::error::AnalysisError;

/// Recording stored as a WAV file
///
/// The recorder writes the file when it stops, so unless a time is injected
/// the file's modification time marks the end of the recording.
#[derive(Debug, Clone)]
pub struct WavSource {
    path: PathBuf,
    mtime: Option<DateTime<Utc>>,
}

impl WavSource {
    /// Source backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mtime: None,
        }
    }

    /// Use `mtime` instead of the file's modification time
    pub fn with_mtime(mut self, mtime: DateTime<Utc>) -> Self {
        self.mtime = Some(mtime);
        self
    }

    /// Path of the WAV file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modification_time(&self) -> Result<DateTime<Utc>, AnalysisError> {
        if let Some(mtime) = self.mtime {
            return Ok(mtime);
        }
        let modified = std::fs::metadata(&self.path)?.modified()?;
        Ok(DateTime::<Utc>::from(modified))
    }
}

impl AudioSource for WavSource {
    fn load(&self) -> Result<AudioSample, AnalysisError> {
        log::debug!("Decoding audio file: {}", self.path.display());

        let (samples, sample_rate) = decode_first_channel(&self.path)?;
        let mtime = self.modification_time()?;

        log::debug!(
            "Decoded {}: {} samples at {} Hz",
            self.path.display(),
            samples.len(),
            sample_rate
        );

        Ok(AudioSample::from_recording(sample_rate, &samples, mtime))
    }
}

/// Decode the first channel of a WAV file as signed integer samples
///
/// Float files are scaled to the 16-bit integer range.
///
/// # Returns
///
/// Tuple of (samples, sample_rate)
pub fn decode_first_channel(path: &Path) -> Result<(Vec<i32>, u32), AnalysisError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<i32> = match spec.sample_format {
        hound::SampleFormat::Int => reader.samples::<i32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|s| (s * i16::MAX as f32) as i32))
            .collect::<Result<Vec<_>, _>>()?,
    };

    let samples = interleaved.into_iter().step_by(channels).collect();
    Ok((samples, spec.sample_rate))
}
