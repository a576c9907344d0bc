//! Canonical duration expressions (ISO 8601 `PnYnMnDTnHnMnS`).
//!
//! ```text
//! expr      := ["-"] "P" date_part ["T" time_part]
//! date_part := (count "Y")? (count "M")? (count "W")? (count "D")?
//! time_part := (count "H")? (count "M")? (count "S")?
//! count     := one or more decimal digits
//! ```
//!
//! Weeks are accepted on input only and folded into days at 7:1. The leading
//! `-` marks an inverted interval. Both parser and serializer walk the same
//! explicit unit tables, so designators are always emitted in grammar order.

use tracing::debug;

use crate::error::{IntervalError, Result};
use crate::interval::DurationInterval;

/// The interval field a designator maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl Field {
    fn get(self, interval: &DurationInterval) -> u32 {
        match self {
            Field::Years => interval.years,
            Field::Months => interval.months,
            Field::Days => interval.days,
            Field::Hours => interval.hours,
            Field::Minutes => interval.minutes,
            Field::Seconds => interval.seconds,
        }
    }

    fn slot(self, interval: &mut DurationInterval) -> &mut u32 {
        match self {
            Field::Years => &mut interval.years,
            Field::Months => &mut interval.months,
            Field::Days => &mut interval.days,
            Field::Hours => &mut interval.hours,
            Field::Minutes => &mut interval.minutes,
            Field::Seconds => &mut interval.seconds,
        }
    }
}

/// One designator letter and the field it feeds.
struct Unit {
    designator: char,
    field: Field,
    factor: u32,
}

const fn unit(designator: char, field: Field, factor: u32) -> Unit {
    Unit {
        designator,
        field,
        factor,
    }
}

/// Date designators accepted on input, in grammar order.
const DATE_INPUT: &[Unit] = &[
    unit('Y', Field::Years, 1),
    unit('M', Field::Months, 1),
    unit('W', Field::Days, 7),
    unit('D', Field::Days, 1),
];

/// Date designators emitted on output. Weeks were folded into days.
const DATE_OUTPUT: &[Unit] = &[
    unit('Y', Field::Years, 1),
    unit('M', Field::Months, 1),
    unit('D', Field::Days, 1),
];

const TIME_UNITS: &[Unit] = &[
    unit('H', Field::Hours, 1),
    unit('M', Field::Minutes, 1),
    unit('S', Field::Seconds, 1),
];

/// Expression emitted for an interval with no whole-second component.
pub const ZERO_EXPRESSION: &str = "P0Y";

/// Parse a canonical expression into an interval.
pub fn parse(expression: &str) -> Result<DurationInterval> {
    let result = parse_inner(expression);
    match &result {
        Ok(interval) => debug!(expression, ?interval, "parsed duration expression"),
        Err(err) => debug!(expression, %err, "rejected duration expression"),
    }
    result
}

fn parse_inner(expression: &str) -> Result<DurationInterval> {
    let invalid = |reason: &str| IntervalError::InvalidExpression(format!("'{expression}': {reason}"));

    if expression.is_empty() {
        return Err(invalid("empty expression"));
    }

    let (inverted, rest) = match expression.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, expression),
    };
    let body = rest
        .strip_prefix('P')
        .ok_or_else(|| invalid("must start with 'P'"))?;

    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (body, None),
    };

    let mut interval = DurationInterval::ZERO;
    let mut components = parse_part(date_part, DATE_INPUT, &mut interval).map_err(|r| invalid(&r))?;

    if let Some(time) = time_part {
        if time.is_empty() {
            return Err(invalid("'T' must be followed by a time component"));
        }
        components += parse_part(time, TIME_UNITS, &mut interval).map_err(|r| invalid(&r))?;
    }

    if components == 0 {
        return Err(invalid("no duration components"));
    }

    interval.inverted = inverted && !interval.is_zero();
    Ok(interval)
}

/// Consume `<count><designator>` pairs from one part of the expression.
///
/// Designators must appear in table order with no repeats. Returns the number
/// of components read, or the reason the part is malformed.
fn parse_part(
    part: &str,
    units: &[Unit],
    interval: &mut DurationInterval,
) -> std::result::Result<usize, String> {
    let mut next_unit = 0;
    let mut components = 0;
    let mut digits = String::new();

    for ch in part.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        let position = units[next_unit..]
            .iter()
            .position(|u| u.designator == ch)
            .map(|offset| next_unit + offset);
        let Some(index) = position else {
            return Err(if units.iter().any(|u| u.designator == ch) {
                format!("designator '{ch}' out of order")
            } else {
                format!("unexpected character '{ch}'")
            });
        };
        if digits.is_empty() {
            return Err(format!("missing count before '{ch}'"));
        }

        let unit = &units[index];
        let count: u32 = digits
            .parse()
            .map_err(|_| format!("count '{digits}' is too large"))?;
        let slot = unit.field.slot(interval);
        let current = *slot;
        *slot = count
            .checked_mul(unit.factor)
            .and_then(|value| current.checked_add(value))
            .ok_or_else(|| format!("count '{digits}{ch}' is too large"))?;

        digits.clear();
        next_unit = index + 1;
        components += 1;
    }

    if !digits.is_empty() {
        return Err(format!("count '{digits}' has no designator"));
    }
    Ok(components)
}

/// Serialize an interval into a canonical expression.
pub fn format(interval: &DurationInterval) -> String {
    let date = render_part(interval, DATE_OUTPUT);
    let time = render_part(interval, TIME_UNITS);

    if date.is_empty() && time.is_empty() {
        return ZERO_EXPRESSION.to_string();
    }

    let mut out = String::with_capacity(date.len() + time.len() + 3);
    if interval.inverted {
        out.push('-');
    }
    out.push('P');
    out.push_str(&date);
    if !time.is_empty() {
        out.push('T');
        out.push_str(&time);
    }
    out
}

fn render_part(interval: &DurationInterval, units: &[Unit]) -> String {
    let mut out = String::new();
    for unit in units {
        let value = unit.field.get(interval);
        if value != 0 {
            out.push_str(&format!("{value}{}", unit.designator));
        }
    }
    out
}
