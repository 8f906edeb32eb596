//! Recording archive retention
//!
//! Recordings whose analysis did not succeed are kept for manual review. The
//! archive holds at most one week of hourly recordings; the oldest files go
//! first. Recordings are named by timestamp, so file name order is age order.

use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::result::DriftResult;
use crate::error::AnalysisError;

/// One week of hourly recordings
pub const DEFAULT_MAX_RECORDINGS: usize = 168;

/// Directory of retained `.wav` recordings
#[derive(Debug, Clone)]
pub struct RecordingArchive {
    dir: PathBuf,
    max_recordings: usize,
}

impl RecordingArchive {
    /// Archive in `dir` holding at most `DEFAULT_MAX_RECORDINGS` files
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_capacity(dir, DEFAULT_MAX_RECORDINGS)
    }

    /// Archive in `dir` holding at most `max_recordings` files
    pub fn with_capacity(dir: impl Into<PathBuf>, max_recordings: usize) -> Self {
        Self {
            dir: dir.into(),
            max_recordings,
        }
    }

    /// Archive directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Archived recordings, oldest first
    pub fn recordings(&self) -> Result<Vec<PathBuf>, AnalysisError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "wav") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Delete the oldest recordings until at most `max_recordings` remain
    ///
    /// # Returns
    ///
    /// Paths that were removed, oldest first
    pub fn prune(&self) -> Result<Vec<PathBuf>, AnalysisError> {
        self.prune_except(None)
    }

    /// Prune, never removing `keep` even when it sorts oldest
    fn prune_except(&self, keep: Option<&Path>) -> Result<Vec<PathBuf>, AnalysisError> {
        let (kept, others): (Vec<PathBuf>, Vec<PathBuf>) = self
            .recordings()?
            .into_iter()
            .partition(|path| Some(path.as_path()) == keep);
        let room = self.max_recordings.saturating_sub(kept.len());
        let excess = others.len().saturating_sub(room);

        let mut removed = Vec::with_capacity(excess);
        for path in others.into_iter().take(excess) {
            fs::remove_file(&path)?;
            removed.push(path);
        }

        if !removed.is_empty() {
            log::info!(
                "Pruned {} recordings from {}",
                removed.len(),
                self.dir.display()
            );
        }
        Ok(removed)
    }

    /// Copy `recording` into the archive if its analysis did not succeed
    ///
    /// # Returns
    ///
    /// The archived path, or `None` when the result was a success
    pub fn retain(
        &self,
        recording: &Path,
        result: &DriftResult,
    ) -> Result<Option<PathBuf>, AnalysisError> {
        if result.status.is_success() {
            return Ok(None);
        }

        let name = recording.file_name().ok_or_else(|| {
            AnalysisError::InvalidInput(format!(
                "Recording path has no file name: {}",
                recording.display()
            ))
        })?;

        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(name);

        // Copying a file onto itself truncates it
        let already_archived = target.exists()
            && fs::canonicalize(recording)? == fs::canonicalize(&target)?;
        if !already_archived {
            fs::copy(recording, &target)?;
        }

        log::info!(
            "Kept {} for review ({} at {})",
            target.display(),
            result.status,
            result.expected_time
        );

        self.prune_except(Some(&target))?;
        Ok(Some(target))
    }
}
