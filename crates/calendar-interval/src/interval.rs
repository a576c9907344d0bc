//! The [`DurationInterval`] value type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{IntervalError, Result};
use crate::expression;

/// A signed calendar duration.
///
/// Every component is a non-negative magnitude; direction is carried only by
/// `inverted`. Years, months and days are calendar units whose length in
/// seconds depends on the anchor the interval is resolved against (see
/// [`DurationInterval::resolve_at`]). Hours, minutes, seconds and
/// microseconds are elapsed time.
///
/// Intervals are plain values: build one with a struct literal, parse one from
/// a canonical expression, or resolve one from a natural-language phrase.
///
/// ```
/// use calendar_interval::DurationInterval;
///
/// let interval = DurationInterval {
///     days: 3,
///     hours: 4,
///     ..DurationInterval::ZERO
/// };
/// assert_eq!(interval.to_expression(), "P3DT4H");
/// assert_eq!(DurationInterval::from_expression("P3DT4H").unwrap(), interval);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DurationInterval {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    /// Sub-second part in microseconds (`0..1_000_000`). Not carried by the
    /// canonical expression.
    pub microseconds: u32,
    /// `true` when the interval points into the past.
    pub inverted: bool,
    /// Whole days between the two instants this interval was measured from.
    ///
    /// Only set by natural-language resolution; `None` everywhere else.
    pub total_days: Option<u64>,
}

impl DurationInterval {
    /// The identity interval: `anchor + ZERO == anchor`.
    pub const ZERO: Self = Self {
        years: 0,
        months: 0,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        microseconds: 0,
        inverted: false,
        total_days: None,
    };

    /// Parse a canonical ISO 8601 duration expression such as `"P1Y2M3DT4H5M6S"`.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError::InvalidExpression`] if the text does not
    /// follow the grammar (missing `P`, unknown or out-of-order designator,
    /// dangling `T`, no components at all).
    pub fn from_expression(expression: &str) -> Result<Self> {
        expression::parse(expression)
    }

    /// Render the interval as a canonical expression.
    ///
    /// Sub-second precision is dropped. An interval with no whole-second
    /// component renders as `"P0Y"`.
    pub fn to_expression(&self) -> String {
        expression::format(self)
    }

    /// True when every component, including microseconds, is zero.
    pub fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0
            && self.microseconds == 0
    }

    /// The same magnitudes pointing the other way. Zero stays non-inverted.
    pub fn inverse(&self) -> Self {
        Self {
            inverted: !self.inverted && !self.is_zero(),
            ..*self
        }
    }
}

impl fmt::Display for DurationInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_expression())
    }
}

impl FromStr for DurationInterval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_expression(s)
    }
}

impl Serialize for DurationInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_expression())
    }
}

impl<'de> Deserialize<'de> for DurationInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_expression(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_default() {
        assert_eq!(DurationInterval::default(), DurationInterval::ZERO);
        assert!(DurationInterval::ZERO.is_zero());
    }

    #[test]
    fn microseconds_alone_are_not_zero() {
        let interval = DurationInterval {
            microseconds: 500_000,
            ..DurationInterval::ZERO
        };
        assert!(!interval.is_zero());
    }

    #[test]
    fn inverse_flips_direction() {
        let interval = DurationInterval {
            days: 2,
            ..DurationInterval::ZERO
        };
        assert!(interval.inverse().inverted);
        assert_eq!(interval.inverse().inverse(), interval);
        assert!(!DurationInterval::ZERO.inverse().inverted);
    }

    #[test]
    fn display_matches_to_expression() {
        let interval = DurationInterval {
            months: 18,
            minutes: 90,
            ..DurationInterval::ZERO
        };
        assert_eq!(interval.to_string(), "P18MT90M");
        assert_eq!("P18MT90M".parse::<DurationInterval>().unwrap(), interval);
    }
}
