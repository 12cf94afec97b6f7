//! Error types for the fee engine.
//!
//! Every error here is deterministic for a given input; retrying a
//! failed computation with the same arguments changes nothing, so the
//! caller should report the failure rather than retry.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FeeError {
    /// Caller contract violation: durations are never coerced negative.
    #[error("exit time {exit} is before entry time {entry}")]
    ExitBeforeEntry {
        entry: NaiveDateTime,
        exit: NaiveDateTime,
    },

    /// A rule's `from_time`/`to_time` did not parse as a wall-clock
    /// time of day.  Configuration error; the computation fails rather
    /// than silently defaulting the window.
    #[error("unparseable time of day in fee rule: {0:?}")]
    BadTimeOfDay(String),

    /// A holiday calendar entry did not normalize to a date.
    #[error("unparseable holiday date: {0:?}")]
    BadHolidayDate(String),

    /// A rule declared a zero-minute billing unit, which would make the
    /// round-up division meaningless.
    #[error("fee rule has a zero billing unit; `every` must be at least 1 minute")]
    ZeroBillingUnit,

    /// The session exceeds the service's sanity ceiling on the day
    /// loop; rejected before any per-day work happens.
    #[error("session spans {days} days, above the {limit}-day ceiling")]
    SessionTooLong { days: i64, limit: i64 },
}

pub type Result<T> = std::result::Result<T, FeeError>;
