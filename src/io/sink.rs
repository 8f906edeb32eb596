//! Result persistence
//!
//! The analysis core hands every `DriftResult` to a `ResultSink`. Sinks own
//! retry policy and gap filling; the core never waits on them.

use std::collections::BTreeMap;
use std::io::Write;
use std::thread;
use std::time::Duration;

use chrono::TimeDelta;

use crate::analysis::result::{DriftResult, DriftRow};
use crate::error::AnalysisError;

/// Destination for drift results
pub trait ResultSink {
    /// Persist one result
    ///
    /// # Errors
    ///
    /// `AnalysisError::TransientSinkError` when a retry may succeed,
    /// `AnalysisError::SinkError` otherwise
    fn record(&mut self, result: &DriftResult) -> Result<(), AnalysisError>;
}

/// Keeps results in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    results: Vec<DriftResult>,
}

impl MemorySink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Results recorded so far, in arrival order
    pub fn results(&self) -> &[DriftResult] {
        &self.results
    }

    /// Recorded results as hourly rows with gaps filled
    pub fn rows(&self) -> Vec<DriftRow> {
        fill_hour_gaps(&self.results)
    }
}

impl ResultSink for MemorySink {
    fn record(&mut self, result: &DriftResult) -> Result<(), AnalysisError> {
        self.results.push(*result);
        Ok(())
    }
}

/// Writes one JSON object per line
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Sink writing to `writer`
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for JsonLinesSink<W> {
    fn record(&mut self, result: &DriftResult) -> Result<(), AnalysisError> {
        serde_json::to_writer(&mut self.writer, result)?;
        self.writer
            .write_all(b"\n")
            .and_then(|_| self.writer.flush())
            .map_err(|e| AnalysisError::SinkError(e.to_string()))
    }
}

/// Retries transient failures of another sink
///
/// Remote stores throttle writes; a throttled write is retried after a fixed
/// backoff, up to `max_attempts` attempts in total.
#[derive(Debug)]
pub struct RetryingSink<S> {
    inner: S,
    max_attempts: u32,
    backoff: Duration,
}

impl<S: ResultSink> RetryingSink<S> {
    /// Wrap `inner`, attempting each write at most `max_attempts` times (at least once)
    pub fn new(inner: S, max_attempts: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// The wrapped sink
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Recover the wrapped sink
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ResultSink> ResultSink for RetryingSink<S> {
    fn record(&mut self, result: &DriftResult) -> Result<(), AnalysisError> {
        let mut attempt = 1;
        loop {
            match self.inner.record(result) {
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    log::warn!(
                        "Write for {} failed (attempt {}/{}): {}; retrying in {:?}",
                        result.expected_time,
                        attempt,
                        self.max_attempts,
                        err,
                        self.backoff
                    );
                    thread::sleep(self.backoff);
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

/// Order results by hour and insert empty rows for hours without a result
///
/// When several results share an hour, the last successful one wins (or the
/// last one if none succeeded).
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use chime_drift::io::sink::fill_hour_gaps;
/// use chime_drift::DriftResult;
///
/// let four = Utc.with_ymd_and_hms(2024, 3, 1, 16, 0, 0).unwrap();
/// let seven = Utc.with_ymd_and_hms(2024, 3, 1, 19, 0, 0).unwrap();
/// let rows = fill_hour_gaps(&[DriftResult::success(seven, 3), DriftResult::success(four, 1)]);
///
/// assert_eq!(rows.len(), 4);
/// assert_eq!(rows[0].drift_seconds, Some(1));
/// assert_eq!(rows[1].drift_seconds, None);
/// assert_eq!(rows[3].drift_seconds, Some(3));
/// ```
pub fn fill_hour_gaps(results: &[DriftResult]) -> Vec<DriftRow> {
    let mut by_hour: BTreeMap<_, &DriftResult> = BTreeMap::new();
    for result in results {
        let keep_existing = by_hour
            .get(&result.expected_time)
            .is_some_and(|existing| existing.status.is_success() && !result.status.is_success());
        if !keep_existing {
            by_hour.insert(result.expected_time, result);
        }
    }

    let (first, last) = match (by_hour.keys().next(), by_hour.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Vec::new(),
    };

    let mut rows = Vec::new();
    let mut hour = first;
    while hour <= last {
        rows.push(match by_hour.get(&hour) {
            Some(result) => result.row(),
            None => DriftRow {
                expected_time: hour,
                drift_seconds: None,
            },
        });
        hour += TimeDelta::hours(1);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::DriftStatus;
    use chrono::{DateTime, TimeZone, Utc};

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, 0, 0).unwrap()
    }

    /// Fails transiently a fixed number of times before accepting writes
    struct FlakySink {
        failures_left: u32,
        calls: u32,
        accepted: Vec<DriftResult>,
    }

    impl ResultSink for FlakySink {
        fn record(&mut self, result: &DriftResult) -> Result<(), AnalysisError> {
            self.calls += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(AnalysisError::TransientSinkError("429".to_string()));
            }
            self.accepted.push(*result);
            Ok(())
        }
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let mut sink = MemorySink::new();
        sink.record(&DriftResult::success(hour(5), 2)).unwrap();
        sink.record(&DriftResult::failure(hour(6), DriftStatus::Ambiguous)).unwrap();
        assert_eq!(sink.results().len(), 2);
        assert_eq!(sink.results()[1].status, DriftStatus::Ambiguous);
    }

    #[test]
    fn test_json_lines_sink() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.record(&DriftResult::success(hour(5), -4)).unwrap();
        sink.record(&DriftResult::failure(hour(6), DriftStatus::RecursionLimit)).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: DriftResult = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.drift_seconds, Some(-4));
    }

    #[test]
    fn test_retry_recovers_from_transient_errors() {
        let flaky = FlakySink {
            failures_left: 2,
            calls: 0,
            accepted: vec![],
        };
        let mut sink = RetryingSink::new(flaky, 3, Duration::ZERO);
        sink.record(&DriftResult::success(hour(5), 1)).unwrap();

        assert_eq!(sink.inner().calls, 3);
        assert_eq!(sink.inner().accepted.len(), 1);
    }

    #[test]
    fn test_retry_gives_up() {
        let flaky = FlakySink {
            failures_left: 5,
            calls: 0,
            accepted: vec![],
        };
        let mut sink = RetryingSink::new(flaky, 3, Duration::ZERO);
        let err = sink.record(&DriftResult::success(hour(5), 1)).unwrap_err();

        assert!(err.is_transient());
        assert_eq!(sink.into_inner().calls, 3);
    }

    #[test]
    fn test_permanent_errors_are_not_retried() {
        struct Broken(u32);
        impl ResultSink for Broken {
            fn record(&mut self, _: &DriftResult) -> Result<(), AnalysisError> {
                self.0 += 1;
                Err(AnalysisError::SinkError("sheet missing".to_string()))
            }
        }

        let mut sink = RetryingSink::new(Broken(0), 5, Duration::ZERO);
        assert!(sink.record(&DriftResult::success(hour(5), 1)).is_err());
        assert_eq!(sink.inner().0, 1);
    }

    #[test]
    fn test_fill_gaps_empty() {
        assert!(fill_hour_gaps(&[]).is_empty());
    }

    #[test]
    fn test_fill_gaps_keeps_failures_as_empty_rows() {
        let rows = fill_hour_gaps(&[
            DriftResult::success(hour(1), 5),
            DriftResult::failure(hour(2), DriftStatus::Ambiguous),
            DriftResult::success(hour(4), 6),
        ]);
        let drifts: Vec<Option<i64>> = rows.iter().map(|r| r.drift_seconds).collect();
        assert_eq!(drifts, vec![Some(5), None, None, Some(6)]);
        assert_eq!(rows[2].expected_time, hour(3));
    }

    #[test]
    fn test_fill_gaps_prefers_success_for_duplicate_hour() {
        let rows = fill_hour_gaps(&[
            DriftResult::success(hour(1), 5),
            DriftResult::failure(hour(1), DriftStatus::RecursionLimit),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].drift_seconds, Some(5));
    }
}
