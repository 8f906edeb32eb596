//! Error types for chime drift analysis

use std::fmt;

/// Errors that can occur while loading, analyzing or persisting a recording
#[derive(Debug, Clone)]
pub enum AnalysisError {
    /// Invalid input parameters (empty buffer, zero sample rate, bad chime count, bad config)
    InvalidInput(String),

    /// Audio decoding error
    DecodingError(String),

    /// Filesystem error (archive management, reading file metadata)
    IoError(String),

    /// Result sink rejected the write and retrying will not help
    SinkError(String),

    /// Result sink failed in a way that may succeed on retry (rate limiting, timeouts)
    TransientSinkError(String),
}

impl AnalysisError {
    /// True when the operation may succeed if attempted again
    pub fn is_transient(&self) -> bool {
        matches!(self, AnalysisError::TransientSinkError(_))
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            AnalysisError::IoError(msg) => write!(f, "I/O error: {}", msg),
            AnalysisError::SinkError(msg) => write!(f, "Sink error: {}", msg),
            AnalysisError::TransientSinkError(msg) => {
                write!(f, "Transient sink error: {}", msg)
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::IoError(err.to_string())
    }
}

impl From<hound::Error> for AnalysisError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => AnalysisError::IoError(io.to_string()),
            other => AnalysisError::DecodingError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::SinkError(err.to_string())
    }
}
