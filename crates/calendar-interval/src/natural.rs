//! Natural-language relative-time phrases.
//!
//! A phrase resolves either to an **offset** with explicit components
//! (`"3 days"`, `"in 2 hours"`, `"2 weeks ago"`, `"+1d2h"`) or to a **point in
//! time** read from an anchor (`"next monday"`, `"tomorrow at 9am"`,
//! `"end of month"`, `"2026-03-01"`). Offsets become intervals directly;
//! points are turned into an interval by calendar difference from the anchor.
//!
//! Resolution is deterministic: the anchor is an explicit input and anything
//! that does not match the grammar is an error, never a guess.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chrono_tz::Tz;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::dst::DstPolicy;
use crate::error::{IntervalError, Result};
use crate::interval::DurationInterval;
use crate::projection::{add_interval, calendar_difference};

/// Which day begins a week for `"next week"`, `"start of week"` and friends.
///
/// Does not affect weekday phrases such as `"next monday"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekStartDay {
    /// ISO 8601.
    #[default]
    Monday,
    Sunday,
}

impl WeekStartDay {
    fn days_since_start(self, weekday: Weekday) -> u64 {
        u64::from(match self {
            WeekStartDay::Monday => weekday.num_days_from_monday(),
            WeekStartDay::Sunday => weekday.num_days_from_sunday(),
        })
    }
}

/// Options for phrase resolution and calendar arithmetic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    pub week_start: WeekStartDay,
    pub dst_policy: DstPolicy,
}

/// What a phrase resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Explicit components, e.g. `"3 days ago"`.
    Offset(DurationInterval),
    /// A concrete instant, e.g. `"next monday"`.
    Instant(DateTime<Tz>),
}

impl DurationInterval {
    /// Build an interval from a phrase such as `"3 days"`, `"2 weeks ago"` or
    /// `"next monday"`, resolved against the system clock in UTC.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError::InvalidPhrase`] if the phrase is not understood.
    pub fn from_natural_language(text: &str) -> Result<Self> {
        Self::from_natural_language_with(text, "UTC", &ResolveOptions::default(), &SystemClock)
    }

    /// [`DurationInterval::from_natural_language`] with an explicit zone,
    /// options and clock.
    ///
    /// `total_days` is filled with the whole days between the anchor and the
    /// resolved target.
    pub fn from_natural_language_with<C: Clock>(
        text: &str,
        timezone: &str,
        options: &ResolveOptions,
        clock: &C,
    ) -> Result<Self> {
        let tz = parse_timezone(timezone)?;
        let anchor = clock.now().with_timezone(&tz);

        match resolve_phrase(text, &anchor, options)? {
            Resolution::Offset(interval) => {
                let target = add_interval(&anchor, &interval, options.dst_policy)?;
                Ok(DurationInterval {
                    total_days: Some((target - anchor).num_days().unsigned_abs()),
                    ..interval
                })
            }
            Resolution::Instant(target) => calendar_difference(&anchor, &target, options.dst_policy),
        }
    }
}

/// Resolve a phrase against `anchor`.
///
/// # Errors
///
/// Returns [`IntervalError::InvalidPhrase`] if no rule matches, or an
/// out-of-range / DST error while building the instant.
pub fn resolve_phrase(
    text: &str,
    anchor: &DateTime<Tz>,
    options: &ResolveOptions,
) -> Result<Resolution> {
    let tz = anchor.timezone();
    let raw = text.trim();

    if let Some(instant) = passthrough(raw, &tz, options.dst_policy)? {
        debug!(phrase = raw, %instant, "resolved absolute datetime");
        return Ok(Resolution::Instant(instant));
    }

    let phrase = normalize(raw);
    if phrase.is_empty() {
        return Err(IntervalError::InvalidPhrase("empty phrase".to_string()));
    }

    if let Some(interval) = parse_offset(&phrase) {
        debug!(%phrase, %interval, "resolved relative offset");
        return Ok(Resolution::Offset(interval));
    }

    if let Some(instant) = parse_point(&phrase, anchor, options)? {
        debug!(%phrase, %instant, "resolved point in time");
        return Ok(Resolution::Instant(instant));
    }

    debug!(%phrase, "unresolvable phrase");
    Err(IntervalError::InvalidPhrase(format!("cannot resolve '{raw}'")))
}

/// Resolve a phrase to an instant, applying offsets to `anchor`.
pub(crate) fn resolve_instant(
    text: &str,
    anchor: &DateTime<Tz>,
    options: &ResolveOptions,
) -> Result<DateTime<Tz>> {
    match resolve_phrase(text, anchor, options)? {
        Resolution::Offset(interval) => add_interval(anchor, &interval, options.dst_policy),
        Resolution::Instant(instant) => Ok(instant),
    }
}

/// Parse an IANA timezone name.
pub(crate) fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| IntervalError::InvalidTimezone(format!("'{name}'")))
}

// ---------------------------------------------------------------------------
// Absolute datetimes
// ---------------------------------------------------------------------------

/// RFC 3339, `YYYY-MM-DDTHH:MM:SS` (local) and `YYYY-MM-DD` (local midnight).
fn passthrough(raw: &str, tz: &Tz, policy: DstPolicy) -> Result<Option<DateTime<Tz>>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(tz)));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        });
    naive.map(|n| policy.localize(tz, &n)).transpose()
}

// ---------------------------------------------------------------------------
// Offsets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Fortnight,
    Month,
    Year,
}

impl Unit {
    fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "s" | "sec" | "secs" | "second" | "seconds" => Unit::Second,
            "min" | "mins" | "minute" | "minutes" => Unit::Minute,
            "h" | "hr" | "hrs" | "hour" | "hours" => Unit::Hour,
            "d" | "day" | "days" => Unit::Day,
            "w" | "wk" | "wks" | "week" | "weeks" => Unit::Week,
            "fortnight" | "fortnights" => Unit::Fortnight,
            "mo" | "mos" | "month" | "months" => Unit::Month,
            "y" | "yr" | "yrs" | "year" | "years" => Unit::Year,
            _ => return None,
        })
    }

    fn from_compact(ch: char) -> Option<Self> {
        Some(match ch {
            's' => Unit::Second,
            'm' => Unit::Minute,
            'h' => Unit::Hour,
            'd' => Unit::Day,
            'w' => Unit::Week,
            _ => return None,
        })
    }

    /// Add `count` of this unit to the interval's components.
    fn accumulate(self, count: u32, interval: &mut DurationInterval) -> Option<()> {
        let (slot, factor) = match self {
            Unit::Second => (&mut interval.seconds, 1),
            Unit::Minute => (&mut interval.minutes, 1),
            Unit::Hour => (&mut interval.hours, 1),
            Unit::Day => (&mut interval.days, 1),
            Unit::Week => (&mut interval.days, 7),
            Unit::Fortnight => (&mut interval.days, 14),
            Unit::Month => (&mut interval.months, 1),
            Unit::Year => (&mut interval.years, 1),
        };
        *slot = slot.checked_add(count.checked_mul(factor)?)?;
        Some(())
    }
}

/// Offset phrases: `"3 days"`, `"in 2 hours"`, `"2 weeks ago"`,
/// `"a month from now"`, `"1 year 2 months and 3 days"`, `"+1d2h"`, `"-3 days"`.
fn parse_offset(phrase: &str) -> Option<DurationInterval> {
    let (sign_inverted, body) = match phrase.as_bytes().first() {
        Some(b'+') => (false, phrase[1..].trim_start()),
        Some(b'-') => (true, phrase[1..].trim_start()),
        _ => (false, phrase),
    };

    let (body, word_inverted) = if let Some(rest) = body.strip_suffix(" ago") {
        (rest, true)
    } else if let Some(rest) = body
        .strip_suffix(" from now")
        .or_else(|| body.strip_suffix(" later"))
        .or_else(|| body.strip_suffix(" hence"))
    {
        (rest, false)
    } else if let Some(rest) = body.strip_prefix("in ") {
        (rest, false)
    } else {
        (body, false)
    };

    let mut interval = parse_compact(body).or_else(|| parse_words(body))?;
    interval.inverted = (sign_inverted != word_inverted) && !interval.is_zero();
    Some(interval)
}

/// `"1d2h30m"`: count/letter pairs with no spaces.
fn parse_compact(body: &str) -> Option<DurationInterval> {
    if body.is_empty() || body.contains(' ') {
        return None;
    }
    let mut interval = DurationInterval::ZERO;
    let mut digits = String::new();
    for ch in body.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let count: u32 = digits.parse().ok()?;
        Unit::from_compact(ch)?.accumulate(count, &mut interval)?;
        digits.clear();
    }
    digits.is_empty().then_some(interval)
}

/// `"1 year 2 months and 3 days"`, `"a week"`, `"an hour"`.
fn parse_words(body: &str) -> Option<DurationInterval> {
    let mut interval = DurationInterval::ZERO;
    let mut tokens = body.split_whitespace().filter(|t| *t != "and");
    let mut found = false;

    while let Some(token) = tokens.next() {
        let count = match token {
            "a" | "an" | "one" => 1,
            _ => token.parse::<u32>().ok()?,
        };
        let unit = Unit::from_word(tokens.next()?)?;
        unit.accumulate(count, &mut interval)?;
        found = true;
    }
    found.then_some(interval)
}

// ---------------------------------------------------------------------------
// Points in time
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Period {
    fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "day" | "today" => Period::Day,
            "week" => Period::Week,
            "month" => Period::Month,
            "quarter" => Period::Quarter,
            "year" => Period::Year,
            _ => return None,
        })
    }

    /// First and last day of the period containing `date`, moved by `shift`
    /// whole periods.
    fn bounds(self, date: NaiveDate, shift: i32, ws: WeekStartDay) -> Option<(NaiveDate, NaiveDate)> {
        let first = match self {
            Period::Day => date,
            Period::Week => date.checked_sub_days(Days::new(ws.days_since_start(date.weekday())))?,
            Period::Month => date.with_day(1)?,
            Period::Quarter => NaiveDate::from_ymd_opt(date.year(), (date.month() - 1) / 3 * 3 + 1, 1)?,
            Period::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)?,
        };
        let (first, length) = match self {
            Period::Day => (shift_days(first, i64::from(shift))?, Length::Days(1)),
            Period::Week => (shift_days(first, 7 * i64::from(shift))?, Length::Days(7)),
            Period::Month => (shift_months(first, shift)?, Length::Months(1)),
            Period::Quarter => (shift_months(first, 3 * shift)?, Length::Months(3)),
            Period::Year => (shift_months(first, 12 * shift)?, Length::Months(12)),
        };
        let after = match length {
            Length::Days(n) => first.checked_add_days(Days::new(n))?,
            Length::Months(n) => first.checked_add_months(Months::new(n))?,
        };
        Some((first, after.pred_opt()?))
    }
}

enum Length {
    Days(u64),
    Months(u32),
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    }
}

fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let magnitude = Months::new(months.unsigned_abs());
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

/// A resolved calendar day plus the time it defaults to.
struct DayPoint {
    date: NaiveDate,
    time: NaiveTime,
}

/// Point phrases, optionally followed by `at <time>` or a named time.
fn parse_point(
    phrase: &str,
    anchor: &DateTime<Tz>,
    options: &ResolveOptions,
) -> Result<Option<DateTime<Tz>>> {
    if phrase == "now" {
        return Ok(Some(*anchor));
    }

    let today = anchor.date_naive();
    let (day_part, explicit_time) = split_time(phrase);

    let point = match day_part {
        Some(day) => match parse_day(day, today, options.week_start) {
            Some(point) => point,
            None => return Ok(None),
        },
        // Bare time ("noon", "2pm") means today.
        None => DayPoint {
            date: today,
            time: NaiveTime::MIN,
        },
    };

    let naive = point.date.and_time(explicit_time.unwrap_or(point.time));
    options
        .dst_policy
        .localize(&anchor.timezone(), &naive)
        .map(Some)
}

/// Split `"<day> at <time>"` / `"<day> <named time>"` / `"<time>"` into the
/// day phrase and an explicit time. A bare time has no day phrase.
fn split_time(phrase: &str) -> (Option<&str>, Option<NaiveTime>) {
    if let Some(time) = parse_time(phrase) {
        return (None, Some(time));
    }
    if let Some((day, time)) = phrase.rsplit_once(" at ") {
        return match parse_time(time) {
            Some(time) => (Some(day), Some(time)),
            None => (Some(phrase), None),
        };
    }
    if let Some((day, word)) = phrase.rsplit_once(' ') {
        if let Some(time) = named_time(word) {
            return (Some(day), Some(time));
        }
    }
    (Some(phrase), None)
}

fn parse_day(day: &str, today: NaiveDate, ws: WeekStartDay) -> Option<DayPoint> {
    let midnight = |date| DayPoint {
        date,
        time: NaiveTime::MIN,
    };

    match day {
        "today" => return Some(midnight(today)),
        "tomorrow" => return today.succ_opt().map(midnight),
        "yesterday" => return today.pred_opt().map(midnight),
        _ => {}
    }

    // "start of [next|last|this] <period>" / "end of ..."
    for (prefix, at_end) in [("start of ", false), ("beginning of ", false), ("end of ", true)] {
        if let Some(rest) = day.strip_prefix(prefix) {
            let (shift, word) = split_modifier(rest);
            let (first, last) = Period::from_word(word)?.bounds(today, shift, ws)?;
            return Some(if at_end {
                DayPoint {
                    date: last,
                    time: NaiveTime::from_hms_opt(23, 59, 59)?,
                }
            } else {
                midnight(first)
            });
        }
    }

    let (modifier, word) = day.split_once(' ')?;
    if let Some(weekday) = parse_weekday(word) {
        return weekday_relative(modifier, weekday, today).map(midnight);
    }

    // "next week" / "last month": start of that period.
    let shift = match modifier {
        "next" => 1,
        "last" | "previous" => -1,
        _ => return None,
    };
    let period = Period::from_word(word)?;
    if period == Period::Day {
        return None;
    }
    period.bounds(today, shift, ws).map(|(first, _)| midnight(first))
}

fn split_modifier(rest: &str) -> (i32, &str) {
    match rest.split_once(' ') {
        Some(("next", word)) => (1, word),
        Some(("last" | "previous", word)) => (-1, word),
        Some(("this" | "current", word)) => (0, word),
        _ => (0, rest),
    }
}

/// `next` is strictly after today, `last` strictly before, `this` is the
/// occurrence in the current Monday-based week.
fn weekday_relative(modifier: &str, weekday: Weekday, today: NaiveDate) -> Option<NaiveDate> {
    let target = i64::from(weekday.num_days_from_monday());
    let current = i64::from(today.weekday().num_days_from_monday());
    let offset = match modifier {
        "next" => match (target - current).rem_euclid(7) {
            0 => 7,
            n => n,
        },
        "last" | "previous" => match (current - target).rem_euclid(7) {
            0 => -7,
            n => -n,
        },
        "this" => target - current,
        _ => return None,
    };
    shift_days(today, offset)
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    Some(match word {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    })
}

fn named_time(word: &str) -> Option<NaiveTime> {
    let hour = match word {
        "midnight" => 0,
        "morning" => 9,
        "noon" | "midday" => 12,
        "afternoon" => 15,
        "evening" => 18,
        "night" => 21,
        _ => return None,
    };
    NaiveTime::from_hms_opt(hour, 0, 0)
}

/// `"noon"`, `"14:30"`, `"14:30:15"`, `"2pm"`, `"2:30 pm"`.
fn parse_time(text: &str) -> Option<NaiveTime> {
    if let Some(time) = named_time(text) {
        return Some(time);
    }
    for format in ["%H:%M:%S", "%H:%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(text, format) {
            return Some(time);
        }
    }

    let compact = text.replace(' ', "");
    let (clock, pm) = if let Some(clock) = compact.strip_suffix("pm") {
        (clock, true)
    } else {
        (compact.strip_suffix("am")?, false)
    };
    let mut fields = clock.split(':');
    let hour: u32 = fields.next()?.parse().ok()?;
    let minute: u32 = fields.next().map_or(Some(0), |m| m.parse().ok())?;
    if fields.next().is_some() || !(1..=12).contains(&hour) {
        return None;
    }
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Lowercase, drop commas and the article "the", collapse whitespace.
///
/// "a"/"an" are kept: they are counts in "a week from now".
fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .replace(',', " ")
        .split_whitespace()
        .filter(|word| *word != "the")
        .collect::<Vec<_>>()
        .join(" ")
}
