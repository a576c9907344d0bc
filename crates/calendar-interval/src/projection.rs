//! Unit projection -- resolves an interval against an anchor instant.
//!
//! Calendar units have no fixed length, so every projection first computes a
//! concrete `{anchor, target}` pair and derives all units from the elapsed
//! seconds between those two instants. Larger units are derived from smaller
//! ones with fixed ratios (60, 60, 24, 7, 365), carrying the fractional value
//! through the chain and truncating only once at the requested unit.

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDateTime};
use chrono_tz::Tz;
use tracing::trace;

use crate::clock::{Clock, SystemClock};
use crate::dst::DstPolicy;
use crate::error::{IntervalError, Result};
use crate::interval::DurationInterval;
use crate::natural::{self, parse_timezone, ResolveOptions};

const SECONDS_PER_MINUTE: f64 = 60.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;
const DAYS_PER_WEEK: f64 = 7.0;
const DAYS_PER_YEAR: f64 = 365.0;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Whether a projected value is cut down to a whole number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// Truncate toward zero.
    #[default]
    Truncated,
    /// Keep the fractional part.
    Fractional,
}

impl Precision {
    fn apply(self, value: f64) -> f64 {
        match self {
            Precision::Truncated => value.trunc(),
            Precision::Fractional => value,
        }
    }
}

/// An interval resolved against one anchor: `target = anchor + interval`.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub anchor: DateTime<Tz>,
    pub target: DateTime<Tz>,
}

impl Span {
    /// Elapsed whole seconds, `target - anchor` on the epoch timeline.
    ///
    /// Both instants are floored to their epoch second first, so a sub-second
    /// span into the past counts as `-1` while the same span forward is `0`.
    pub fn in_seconds(&self) -> i64 {
        self.target.timestamp() - self.anchor.timestamp()
    }

    pub fn in_minutes(&self, precision: Precision) -> f64 {
        precision.apply(self.in_seconds() as f64 / SECONDS_PER_MINUTE)
    }

    pub fn in_hours(&self, precision: Precision) -> f64 {
        precision.apply(self.in_minutes(Precision::Fractional) / MINUTES_PER_HOUR)
    }

    pub fn in_days(&self, precision: Precision) -> f64 {
        precision.apply(self.in_hours(Precision::Fractional) / HOURS_PER_DAY)
    }

    pub fn in_weeks(&self, precision: Precision) -> f64 {
        precision.apply(self.in_days(Precision::Fractional) / DAYS_PER_WEEK)
    }

    /// Years of a fixed 365 days.
    pub fn in_years(&self, precision: Precision) -> f64 {
        precision.apply(self.in_days(Precision::Fractional) / DAYS_PER_YEAR)
    }

    /// Months of average length (a 365-day year split in twelve).
    ///
    /// Use [`Span::in_months_from_now`] for a calendar-accurate count.
    pub fn in_average_months(&self, precision: Precision) -> f64 {
        precision.apply(self.in_years(Precision::Fractional) * MONTHS_PER_YEAR)
    }

    /// Whole calendar months from anchor to target, negative when the target
    /// lies in the past.
    pub fn in_months_from_now(&self) -> i64 {
        calendar_months_between(&self.anchor, &self.target)
    }
}

// ---------------------------------------------------------------------------
// Calendar arithmetic
// ---------------------------------------------------------------------------

/// Compute `anchor + interval`, honoring `inverted` as direction.
///
/// Years, months and days move the anchor's wall-clock date (month ends clamp:
/// Jan 31 + 1 month = Feb 28), the wall-clock result is mapped back to an
/// instant through `policy`, then hours, minutes, seconds and microseconds
/// are added as elapsed time.
///
/// # Errors
///
/// Returns [`IntervalError::OutOfRange`] if the result is not representable,
/// or [`IntervalError::InvalidDatetime`] if `policy` rejects a DST gap/fold.
pub fn add_interval(
    anchor: &DateTime<Tz>,
    interval: &DurationInterval,
    policy: DstPolicy,
) -> Result<DateTime<Tz>> {
    let out_of_range = || IntervalError::OutOfRange(format!("{anchor} + {interval}"));

    let total_months = u64::from(interval.years) * 12 + u64::from(interval.months);
    let months = Months::new(u32::try_from(total_months).map_err(|_| out_of_range())?);
    let days = Days::new(u64::from(interval.days));

    let local = anchor.naive_local();
    let shifted = if interval.inverted {
        local
            .checked_sub_months(months)
            .and_then(|dt| dt.checked_sub_days(days))
    } else {
        local
            .checked_add_months(months)
            .and_then(|dt| dt.checked_add_days(days))
    }
    .ok_or_else(out_of_range)?;

    let calendar_moved = if shifted == local {
        *anchor
    } else {
        policy.localize(&anchor.timezone(), &shifted)?
    };

    let elapsed = Duration::hours(i64::from(interval.hours))
        + Duration::minutes(i64::from(interval.minutes))
        + Duration::seconds(i64::from(interval.seconds))
        + Duration::microseconds(i64::from(interval.microseconds));

    let target = if interval.inverted {
        calendar_moved.checked_sub_signed(elapsed)
    } else {
        calendar_moved.checked_add_signed(elapsed)
    }
    .ok_or_else(out_of_range)?;

    trace!(%anchor, %target, %interval, "resolved interval");
    Ok(target)
}

/// Move a wall-clock time by whole months, then whole days, in one direction.
fn step(start: NaiveDateTime, months: u32, days: u64, backward: bool) -> Option<NaiveDateTime> {
    let (months, days) = (Months::new(months), Days::new(days));
    if backward {
        start.checked_sub_months(months)?.checked_sub_days(days)
    } else {
        start.checked_add_months(months)?.checked_add_days(days)
    }
}

/// Largest whole-month step from `start` toward `end` that does not pass it.
///
/// Months are stepped away from `start`, the same way [`add_interval`] applies
/// them, so month-end clamping is read from the anchor side. Returns the month
/// count and the wall-clock time reached by that step.
fn whole_months(start: NaiveDateTime, end: NaiveDateTime, backward: bool) -> (u32, NaiveDateTime) {
    let (early, late) = if backward { (end, start) } else { (start, end) };
    let estimate = (late.year() - early.year()) * 12 + late.month() as i32 - early.month() as i32;
    let mut months = u32::try_from(estimate.max(0)).unwrap_or(0);

    while months > 0 {
        match step(start, months, 0, backward) {
            Some(reached) if (backward && reached >= end) || (!backward && reached <= end) => {
                return (months, reached)
            }
            _ => months -= 1,
        }
    }
    (0, start)
}

/// Signed whole calendar months between two instants, read on the anchor's
/// wall clock.
fn calendar_months_between(anchor: &DateTime<Tz>, target: &DateTime<Tz>) -> i64 {
    let from = anchor.naive_local();
    let to = target.with_timezone(&anchor.timezone()).naive_local();
    let backward = to < from;
    let months = i64::from(whole_months(from, to, backward).0);
    if backward {
        -months
    } else {
        months
    }
}

/// Decompose the distance between two instants into calendar components.
///
/// Whole months and then whole days are stepped from the anchor's wall clock
/// toward the target (split into years, months and days). The point reached
/// is localized through `policy` and the rest is measured as elapsed time, so
/// `add_interval(anchor, result, policy)` lands back on `target`. A target
/// before the anchor yields `inverted = true`. `total_days` is the absolute
/// whole-day distance.
///
/// # Errors
///
/// Returns [`IntervalError::OutOfRange`] if a step leaves chrono's range, or
/// [`IntervalError::InvalidDatetime`] if `policy` rejects an intermediate
/// wall-clock time.
pub fn calendar_difference(
    anchor: &DateTime<Tz>,
    target: &DateTime<Tz>,
    policy: DstPolicy,
) -> Result<DurationInterval> {
    let out_of_range = || IntervalError::OutOfRange(format!("{anchor} to {target}"));
    let tz = anchor.timezone();
    let from = anchor.naive_local();
    let to = target.with_timezone(&tz).naive_local();
    let backward = target < anchor;
    let within = |instant: &DateTime<Tz>| {
        if backward {
            instant >= target
        } else {
            instant <= target
        }
    };

    let (mut months, _) = whole_months(from, to, backward);
    let (months, days, reached) = loop {
        let base = step(from, months, 0, backward).ok_or_else(out_of_range)?;
        let wall = if backward { base - to } else { to - base };
        let mut days = u64::try_from(wall.num_days()).unwrap_or(0);

        // A DST shift can push the localized day step past the target.
        let found = loop {
            let point = step(base, 0, days, backward).ok_or_else(out_of_range)?;
            let instant = if point == from {
                *anchor
            } else {
                policy.localize(&tz, &point)?
            };
            if within(&instant) {
                break Some((days, instant));
            }
            if days == 0 {
                break None;
            }
            days -= 1;
        };

        match found {
            Some((days, instant)) => break (months, days, instant),
            None if months > 0 => months -= 1,
            None => break (0, 0, *anchor),
        }
    };

    let rest = if backward {
        reached - *target
    } else {
        *target - reached
    };
    let hours = rest.num_hours();
    let rest = rest - Duration::hours(hours);
    let minutes = rest.num_minutes();
    let rest = rest - Duration::minutes(minutes);
    let seconds = rest.num_seconds();
    let micros = (rest - Duration::seconds(seconds))
        .num_microseconds()
        .unwrap_or(0);

    let clamp = |value: i64| u32::try_from(value).unwrap_or(u32::MAX);
    let interval = DurationInterval {
        years: months / 12,
        months: months % 12,
        days: u32::try_from(days).unwrap_or(u32::MAX),
        hours: clamp(hours),
        minutes: clamp(minutes),
        seconds: clamp(seconds),
        microseconds: clamp(micros),
        inverted: false,
        total_days: Some((*target - *anchor).num_days().unsigned_abs()),
    };
    Ok(DurationInterval {
        inverted: backward && !interval.is_zero(),
        ..interval
    })
}

// ---------------------------------------------------------------------------
// Projections on DurationInterval
// ---------------------------------------------------------------------------

impl DurationInterval {
    /// Resolve against an explicit anchor instant.
    pub fn resolve_at(&self, anchor: DateTime<Tz>, policy: DstPolicy) -> Result<Span> {
        let target = add_interval(&anchor, self, policy)?;
        Ok(Span { anchor, target })
    }

    /// Resolve against `clock.now()` in `timezone`. The clock is read once.
    pub fn resolve_with<C: Clock>(
        &self,
        clock: &C,
        timezone: &str,
        options: &ResolveOptions,
    ) -> Result<Span> {
        let tz = parse_timezone(timezone)?;
        self.resolve_at(clock.now().with_timezone(&tz), options.dst_policy)
    }

    /// Resolve against the system clock in UTC.
    pub fn resolve(&self) -> Result<Span> {
        self.resolve_with(&SystemClock, "UTC", &ResolveOptions::default())
    }

    /// Elapsed seconds from now to now + self.
    pub fn in_seconds(&self) -> Result<i64> {
        Ok(self.resolve()?.in_seconds())
    }

    pub fn in_minutes(&self, precision: Precision) -> Result<f64> {
        Ok(self.resolve()?.in_minutes(precision))
    }

    pub fn in_hours(&self, precision: Precision) -> Result<f64> {
        Ok(self.resolve()?.in_hours(precision))
    }

    pub fn in_days(&self, precision: Precision) -> Result<f64> {
        Ok(self.resolve()?.in_days(precision))
    }

    pub fn in_weeks(&self, precision: Precision) -> Result<f64> {
        Ok(self.resolve()?.in_weeks(precision))
    }

    pub fn in_years(&self, precision: Precision) -> Result<f64> {
        Ok(self.resolve()?.in_years(precision))
    }

    pub fn in_average_months(&self, precision: Precision) -> Result<f64> {
        Ok(self.resolve()?.in_average_months(precision))
    }

    pub fn in_months_from_now(&self) -> Result<i64> {
        Ok(self.resolve()?.in_months_from_now())
    }

    /// Add this interval to a base instant given as text.
    ///
    /// `base` is anything the phrase resolver understands as a point in time:
    /// `"now"`, an RFC 3339 datetime, a `YYYY-MM-DD` date, `"next monday"`,
    /// `"tomorrow at 9am"`, or an offset such as `"in 2 hours"`. `timezone`
    /// (default UTC) is the zone used to read local dates and times.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError::InvalidTimezone`] for an unknown zone and
    /// [`IntervalError::InvalidDatetime`] if `base` cannot be resolved.
    pub fn project_from(&self, base: &str, timezone: Option<&str>) -> Result<DateTime<Tz>> {
        self.project_from_with(base, timezone, &SystemClock, &ResolveOptions::default())
    }

    /// [`DurationInterval::project_from`] with an explicit clock and options.
    pub fn project_from_with<C: Clock>(
        &self,
        base: &str,
        timezone: Option<&str>,
        clock: &C,
        options: &ResolveOptions,
    ) -> Result<DateTime<Tz>> {
        let tz = parse_timezone(timezone.unwrap_or("UTC"))?;
        let now = clock.now().with_timezone(&tz);
        let base = natural::resolve_instant(base, &now, options).map_err(|err| match err {
            IntervalError::InvalidPhrase(reason) => IntervalError::InvalidDatetime(reason),
            other => other,
        })?;
        add_interval(&base, self, options.dst_policy)
    }

    /// Add this interval to an already-resolved instant.
    pub fn project_from_instant(&self, base: DateTime<Tz>) -> Result<DateTime<Tz>> {
        add_interval(&base, self, DstPolicy::default())
    }
}
