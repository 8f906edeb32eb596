//! Expected chime for a recording
//!
//! Recordings bracket the top of an hour, so the chime a recording should
//! contain follows from when it started.

use chrono::{DateTime, DurationRound, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// The hour mark a recording should contain and how many strikes mark it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedChime {
    /// Top of the hour
    pub chime_time: DateTime<Utc>,

    /// Number of strikes (1-12)
    pub expected_count: u32,
}

impl ExpectedChime {
    /// Create an expected chime from explicit values
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if `chime_time` is not on an hour
    /// boundary or `expected_count` is outside 1-12
    pub fn new(chime_time: DateTime<Utc>, expected_count: u32) -> Result<Self, AnalysisError> {
        if !(1..=12).contains(&expected_count) {
            return Err(AnalysisError::InvalidInput(format!(
                "Expected strike count must be in [1, 12], got {}",
                expected_count
            )));
        }

        if chime_time.minute() != 0 || chime_time.second() != 0 || chime_time.nanosecond() != 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Chime time must be on the hour, got {}",
                chime_time
            )));
        }

        Ok(Self {
            chime_time,
            expected_count,
        })
    }

    /// Derive the expected chime from the start of a recording
    ///
    /// The start is rounded to the nearest hour (minutes past 30 round up) and
    /// the strike count follows the 12-hour dial.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use chime_drift::analysis::schedule::ExpectedChime;
    ///
    /// let start = Utc.with_ymd_and_hms(2024, 3, 1, 15, 55, 12).unwrap();
    /// let chime = ExpectedChime::from_start_time(start);
    /// assert_eq!(chime.chime_time, Utc.with_ymd_and_hms(2024, 3, 1, 16, 0, 0).unwrap());
    /// assert_eq!(chime.expected_count, 4);
    /// ```
    pub fn from_start_time(start_time: DateTime<Utc>) -> Self {
        let chime_time = round_to_hour(start_time);
        Self {
            chime_time,
            expected_count: strikes_for_hour(chime_time.hour()),
        }
    }
}

/// Number of strikes a 12-hour clock makes at `hour` (0-23)
pub fn strikes_for_hour(hour: u32) -> u32 {
    match hour % 24 {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    }
}

/// Round to the nearest hour, rounding up only when past the half hour
pub fn round_to_hour(time: DateTime<Utc>) -> DateTime<Utc> {
    let hour = TimeDelta::hours(1);
    let floor = time.duration_trunc(hour).unwrap_or(time);
    if time.minute() > 30 {
        floor + hour
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_strike_counts() {
        assert_eq!(strikes_for_hour(0), 12);
        assert_eq!(strikes_for_hour(1), 1);
        assert_eq!(strikes_for_hour(12), 12);
        assert_eq!(strikes_for_hour(13), 1);
        assert_eq!(strikes_for_hour(23), 11);
    }

    #[test]
    fn test_rounds_up_past_half_hour() {
        assert_eq!(round_to_hour(at(15, 31, 0)), at(16, 0, 0));
        assert_eq!(round_to_hour(at(15, 55, 40)), at(16, 0, 0));
    }

    #[test]
    fn test_rounds_down_until_minute_31() {
        assert_eq!(round_to_hour(at(16, 2, 0)), at(16, 0, 0));
        assert_eq!(round_to_hour(at(16, 30, 59)), at(16, 0, 0));
    }

    #[test]
    fn test_midnight_rollover() {
        let chime = ExpectedChime::from_start_time(at(23, 56, 0));
        assert_eq!(chime.chime_time, Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());
        assert_eq!(chime.expected_count, 12);
    }

    #[test]
    fn test_new_validates() {
        assert!(ExpectedChime::new(at(16, 0, 0), 4).is_ok());
        assert!(ExpectedChime::new(at(16, 0, 0), 0).is_err());
        assert!(ExpectedChime::new(at(16, 0, 0), 13).is_err());
        assert!(ExpectedChime::new(at(16, 0, 1), 4).is_err());
    }
}
