//! Error types for calendar-interval operations.

use thiserror::Error;

/// Errors raised while parsing or resolving an interval.
///
/// Variants fall into two families: parse failures (the input text is not a
/// duration) and resolution failures (a concrete instant could not be built).
/// Use [`IntervalError::is_parse_error`] and
/// [`IntervalError::is_resolution_error`] to tell them apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    /// The canonical `P...` expression does not match the grammar.
    #[error("Invalid duration expression: {0}")]
    InvalidExpression(String),

    /// The natural-language phrase is not understood.
    #[error("Invalid relative phrase: {0}")]
    InvalidPhrase(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A base datetime string could not be parsed, or a local time fell in a
    /// DST gap under [`DstPolicy::Reject`](crate::dst::DstPolicy::Reject).
    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    /// Calendar arithmetic left the range chrono can represent.
    #[error("Datetime out of range: {0}")]
    OutOfRange(String),
}

impl IntervalError {
    /// True for failures caused by unparseable duration text.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::InvalidExpression(_) | Self::InvalidPhrase(_))
    }

    /// True for failures raised while building a concrete instant.
    pub fn is_resolution_error(&self) -> bool {
        !self.is_parse_error()
    }
}

pub type Result<T> = std::result::Result<T, IntervalError>;
