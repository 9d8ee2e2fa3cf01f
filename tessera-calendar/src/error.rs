//! Error types shared by the calendar core.
use thiserror::Error;

use crate::date::{CalendarDate, MonthAnchor};

/// Failure reported by a host collaborator while measuring layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    /// The node being measured is not mounted anymore.
    #[error("measurement target is detached")]
    Detached,
    /// The host gave up waiting for the measurement.
    #[error("measurement timed out")]
    TimedOut,
    /// Any other host-specific failure.
    #[error("measurement failed: {0}")]
    Other(String),
}

/// Errors surfaced by calendar operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalendarError {
    /// The lower bound lies after the upper bound.
    #[error("invalid date range: {min} is after {max}")]
    InvalidRange {
        /// Requested lower bound.
        min: CalendarDate,
        /// Requested upper bound.
        max: CalendarDate,
    },
    /// A viewport or month view query failed.
    #[error(transparent)]
    Measurement(#[from] MeasureError),
    /// No view is attached for the month that was asked for.
    #[error("no month view attached for {0}")]
    MonthNotMounted(MonthAnchor),
}
