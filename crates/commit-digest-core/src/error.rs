//! Core error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Core-related errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The explicit start date falls after the end date.
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
