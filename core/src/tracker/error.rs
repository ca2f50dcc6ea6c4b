use chrono::NaiveDateTime;
use thiserror::Error;

/// Contract violations raised by tracker state transitions.
///
/// Rejected transitions leave the tracker untouched; callers log and move
/// on rather than retrying the same input.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("new areas must be entered in chronological order: {timestamp} <= {span_start}")]
    ChronologyViolation {
        timestamp: NaiveDateTime,
        span_start: NaiveDateTime,
    },

    #[error("{bucket} delta cannot be negative")]
    NegativeDuration { bucket: &'static str },

    #[error("end time {end} cannot be before start time {start}")]
    EndBeforeStart {
        end: NaiveDateTime,
        start: NaiveDateTime,
    },

    #[error("entered-at time {entered_at} cannot be before start time {start}")]
    EnteredBeforeStart {
        entered_at: NaiveDateTime,
        start: NaiveDateTime,
    },

    #[error("area name must be non-empty")]
    EmptyAreaName,
}
