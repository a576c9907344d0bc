//! # calendar-interval
//!
//! Calendar-aware duration intervals for hosts that want to write durations
//! as text ("3 days", "P1M") and consume them as a count of some unit.
//!
//! A [`DurationInterval`] holds calendar components (years, months, days)
//! and elapsed-time components (hours, minutes, seconds, microseconds) plus a
//! direction flag. Because a month or a year has no fixed length, every unit
//! projection resolves the interval against one concrete anchor instant and
//! measures the real elapsed time to the target.
//!
//! ## Quick start
//!
//! ```rust
//! use calendar_interval::{DurationInterval, Precision};
//!
//! let ttl = DurationInterval::from_expression("P3D").unwrap();
//! assert_eq!(ttl.in_seconds().unwrap(), 259_200);
//! assert_eq!(ttl.in_hours(Precision::Truncated).unwrap(), 72.0);
//!
//! let later = DurationInterval::from_natural_language("2 weeks").unwrap();
//! assert_eq!(later.to_expression(), "P14D");
//! ```
//!
//! ## Modules
//!
//! - [`interval`] — the `DurationInterval` value type
//! - [`expression`] — canonical ISO 8601 expression parser and serializer
//! - [`natural`] — natural-language phrase resolution
//! - [`projection`] — anchor/target resolution and unit projections
//! - [`clock`] — injectable source of "now"
//! - [`dst`] — DST gap and fold policies for calendar arithmetic
//! - [`error`] — Error types

pub mod clock;
pub mod dst;
pub mod error;
pub mod expression;
pub mod interval;
pub mod natural;
pub mod projection;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dst::DstPolicy;
pub use error::IntervalError;
pub use interval::DurationInterval;
pub use natural::{resolve_phrase, Resolution, ResolveOptions, WeekStartDay};
pub use projection::{add_interval, calendar_difference, Precision, Span};
