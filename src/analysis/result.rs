//! Drift result types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::chime::adaptive_search::SearchFailure;

/// Outcome of one drift analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftStatus {
    /// A unique strike train was found and converted to drift
    Success,

    /// Several plausible strike trains remained when the search gave up
    Ambiguous,

    /// No strike train was found before the search gave up
    RecursionLimit,

    /// Empty recording or unusable sample rate
    MalformedInput,
}

impl DriftStatus {
    /// True only for `Success`
    pub fn is_success(&self) -> bool {
        matches!(self, DriftStatus::Success)
    }
}

impl From<SearchFailure> for DriftStatus {
    fn from(failure: SearchFailure) -> Self {
        match failure {
            SearchFailure::Ambiguous => DriftStatus::Ambiguous,
            SearchFailure::RecursionLimit => DriftStatus::RecursionLimit,
        }
    }
}

impl fmt::Display for DriftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriftStatus::Success => "success",
            DriftStatus::Ambiguous => "ambiguous",
            DriftStatus::RecursionLimit => "recursion_limit",
            DriftStatus::MalformedInput => "malformed_input",
        };
        f.write_str(name)
    }
}

/// Drift of the clock at one hour mark
///
/// `drift_seconds` is present exactly when `status` is `Success`. Negative
/// values mean the chime came before the hour mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftResult {
    /// Hour mark the chime belongs to
    pub expected_time: DateTime<Utc>,

    /// Signed drift in whole seconds
    pub drift_seconds: Option<i64>,

    /// How the analysis ended
    pub status: DriftStatus,
}

impl DriftResult {
    /// Successful measurement
    pub fn success(expected_time: DateTime<Utc>, drift_seconds: i64) -> Self {
        Self {
            expected_time,
            drift_seconds: Some(drift_seconds),
            status: DriftStatus::Success,
        }
    }

    /// Failed measurement (no drift value)
    pub fn failure(expected_time: DateTime<Utc>, status: DriftStatus) -> Self {
        debug_assert!(!status.is_success());
        Self {
            expected_time,
            drift_seconds: None,
            status,
        }
    }

    /// Row as stored by a result sink
    pub fn row(&self) -> DriftRow {
        DriftRow {
            expected_time: self.expected_time,
            drift_seconds: self.drift_seconds,
        }
    }
}

/// One persisted `(hour, drift)` pair; `drift_seconds` is empty for hours
/// without a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftRow {
    /// Hour mark
    pub expected_time: DateTime<Utc>,

    /// Signed drift in whole seconds, if measured
    pub drift_seconds: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_from_search_failure() {
        assert_eq!(DriftStatus::from(SearchFailure::Ambiguous), DriftStatus::Ambiguous);
        assert_eq!(
            DriftStatus::from(SearchFailure::RecursionLimit),
            DriftStatus::RecursionLimit
        );
    }

    #[test]
    fn test_serializes_snake_case_status() {
        let hour = Utc.with_ymd_and_hms(2024, 3, 1, 16, 0, 0).unwrap();
        let json = serde_json::to_string(&DriftResult::failure(hour, DriftStatus::RecursionLimit))
            .unwrap();
        assert!(json.contains("\"status\":\"recursion_limit\""));
        assert!(json.contains("\"drift_seconds\":null"));
    }

    #[test]
    fn test_json_round_trip() {
        let hour = Utc.with_ymd_and_hms(2024, 3, 1, 16, 0, 0).unwrap();
        let result = DriftResult::success(hour, -42);
        let json = serde_json::to_string(&result).unwrap();
        let parsed: DriftResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_row_drops_status() {
        let hour = Utc.with_ymd_and_hms(2024, 3, 1, 16, 0, 0).unwrap();
        let row = DriftResult::success(hour, 7).row();
        assert_eq!(row.expected_time, hour);
        assert_eq!(row.drift_seconds, Some(7));
    }
}
