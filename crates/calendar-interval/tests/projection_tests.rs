//! Tests for unit projection and calendar arithmetic.
//!
//! Every test resolves against a fixed clock so results do not depend on
//! when the suite runs.

use calendar_interval::{
    add_interval, DstPolicy, DurationInterval, FixedClock, IntervalError, Precision,
    ResolveOptions, Span,
};
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use Precision::{Fractional, Truncated};

/// Wednesday, February 18, 2026, 14:30:00 UTC.
fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap())
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Tz> {
    chrono_tz::UTC.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

fn interval(expression: &str) -> DurationInterval {
    DurationInterval::from_expression(expression).expect("should parse")
}

fn span(expression: &str) -> Span {
    interval(expression)
        .resolve_with(&clock(), "UTC", &ResolveOptions::default())
        .expect("should resolve")
}

fn span_at(expression: &str, anchor: DateTime<Tz>) -> Span {
    interval(expression)
        .resolve_at(anchor, DstPolicy::default())
        .expect("should resolve")
}

// ---------------------------------------------------------------------------
// Fixed-ratio projections
// ---------------------------------------------------------------------------

#[test]
fn zero_is_zero_seconds() {
    assert_eq!(span("P0Y").in_seconds(), 0);
    let zero = span("P0Y");
    assert_eq!(zero.anchor, zero.target);
}

#[test]
fn three_days_in_every_unit() {
    let span = span("P3D");
    assert_eq!(span.in_seconds(), 259_200);
    assert_eq!(span.in_minutes(Truncated), 4320.0);
    assert_eq!(span.in_hours(Truncated), 72.0);
    assert_eq!(span.in_days(Truncated), 3.0);
}

#[test]
fn weeks_from_days() {
    assert_eq!(span("P14D").in_weeks(Truncated), 2.0);
    let ten_days = span_at("P10D", utc(2026, 2, 18, 0, 0, 0));
    assert_eq!(ten_days.in_weeks(Truncated), 1.0);
    assert!((ten_days.in_weeks(Fractional) - 10.0 / 7.0).abs() < 1e-12);
}

#[test]
fn one_year_is_twelve_average_months() {
    // 2026-02-18 -> 2027-02-18 spans 365 days.
    let span = span("P1Y");
    assert_eq!(span.in_years(Fractional), 1.0);
    assert_eq!(span.in_average_months(Fractional), 12.0);
    assert_eq!(span.in_average_months(Truncated), 12.0);
}

#[test]
fn leap_year_is_longer_than_a_fixed_year() {
    // 2027-06-01 -> 2028-06-01 contains Feb 29, 2028.
    let span = span_at("P1Y", utc(2027, 6, 1, 0, 0, 0));
    assert_eq!(span.in_days(Truncated), 366.0);
    assert_eq!(span.in_years(Truncated), 1.0);
    assert!((span.in_years(Fractional) - 366.0 / 365.0).abs() < 1e-12);
}

#[test]
fn truncation_keeps_or_drops_the_remainder() {
    let span = span("PT90S");
    assert_eq!(span.in_seconds(), 90);
    assert_eq!(span.in_minutes(Truncated), 1.0);
    assert_eq!(span.in_minutes(Fractional), 1.5);
}

#[test]
fn truncation_happens_once_at_the_requested_unit() {
    // 1 day 23 hours 59 minutes: truncating minutes first would still give
    // 1 day, but the fractional chain must show almost two days.
    let span = span("P1DT23H59M");
    assert_eq!(span.in_days(Truncated), 1.0);
    let days = span.in_days(Fractional);
    assert!(days > 1.99 && days < 2.0, "got {days}");
}

#[test]
fn inverted_intervals_project_negative() {
    let day_back = span("-P1D");
    assert_eq!(day_back.in_seconds(), -86_400);
    assert_eq!(day_back.in_hours(Truncated), -24.0);

    // Truncation is toward zero.
    let ninety_back = span("-PT90M");
    assert_eq!(ninety_back.in_hours(Truncated), -1.0);
    assert_eq!(ninety_back.in_hours(Fractional), -1.5);
}

#[test]
fn microseconds_do_not_add_whole_seconds() {
    let half_second = DurationInterval {
        microseconds: 500_000,
        ..DurationInterval::ZERO
    };
    let span = half_second
        .resolve_at(utc(2026, 2, 18, 14, 30, 0), DstPolicy::default())
        .unwrap();
    assert_eq!(span.in_seconds(), 0);
    assert_eq!(span.target.nanosecond(), 500_000_000);
}

#[test]
fn inverted_microseconds_floor_to_the_previous_second() {
    let half_second_back = DurationInterval {
        microseconds: 500_000,
        inverted: true,
        ..DurationInterval::ZERO
    };
    let span = half_second_back
        .resolve_at(utc(2026, 2, 18, 14, 30, 0), DstPolicy::default())
        .unwrap();
    // 14:29:59.5 sits in the epoch second before the anchor.
    assert_eq!(span.in_seconds(), -1);
    assert_eq!(span.target.nanosecond(), 500_000_000);
}

#[test]
fn same_clock_same_answer() {
    let first = span("P1M").in_days(Truncated);
    let second = span("P1M").in_days(Truncated);
    assert_eq!(first, second);
    // February 2026 has 28 days.
    assert_eq!(first, 28.0);
}

// ---------------------------------------------------------------------------
// Calendar months
// ---------------------------------------------------------------------------

#[test]
fn months_from_now_counts_calendar_months() {
    assert_eq!(span("P1Y2M").in_months_from_now(), 14);
    assert_eq!(span("-P2M").in_months_from_now(), -2);
    assert_eq!(span("P27D").in_months_from_now(), 0);
    assert_eq!(span("P28D").in_months_from_now(), 1);
}

#[test]
fn months_from_now_survives_month_end_clamping() {
    let span = span_at("P1M", utc(2026, 1, 31, 8, 0, 0));
    assert_eq!(span.target, utc(2026, 2, 28, 8, 0, 0));
    assert_eq!(span.in_months_from_now(), 1);
}

#[test]
fn average_months_differ_from_calendar_months() {
    // 28 days is one calendar month from Feb 18 but less than one average month.
    let span = span("P28D");
    assert_eq!(span.in_months_from_now(), 1);
    assert_eq!(span.in_average_months(Truncated), 0.0);
}

// ---------------------------------------------------------------------------
// Calendar arithmetic
// ---------------------------------------------------------------------------

#[test]
fn month_end_clamps_in_both_directions() {
    let anchor = utc(2026, 3, 31, 0, 0, 0);
    let back = add_interval(&anchor, &interval("-P1M"), DstPolicy::default()).unwrap();
    assert_eq!(back, utc(2026, 2, 28, 0, 0, 0));

    let leap = add_interval(&utc(2028, 1, 31, 0, 0, 0), &interval("P1M"), DstPolicy::default())
        .unwrap();
    assert_eq!(leap, utc(2028, 2, 29, 0, 0, 0));
}

#[test]
fn days_keep_wall_clock_across_dst() {
    // US spring forward: 2026-03-08. Noon to noon is only 23 hours.
    let tz: Tz = "America/New_York".parse().unwrap();
    let anchor = tz.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();

    let span = span_at("P1D", anchor);
    assert_eq!(span.target.hour(), 12);
    assert_eq!(span.in_seconds(), 23 * 3600);
    assert_eq!(span.in_hours(Truncated), 23.0);

    let span = span_at("PT24H", anchor);
    assert_eq!(span.target.hour(), 13);
    assert_eq!(span.in_seconds(), 24 * 3600);
}

#[test]
fn dst_gap_follows_policy() {
    // 2026-03-07 02:30 + 1 day lands in the New York spring-forward gap.
    let tz: Tz = "America/New_York".parse().unwrap();
    let anchor = tz.with_ymd_and_hms(2026, 3, 7, 2, 30, 0).unwrap();

    let shifted = add_interval(&anchor, &interval("P1D"), DstPolicy::ShiftForward).unwrap();
    assert_eq!((shifted.hour(), shifted.minute()), (3, 30));

    let err = add_interval(&anchor, &interval("P1D"), DstPolicy::Reject).unwrap_err();
    assert!(matches!(err, IntervalError::InvalidDatetime(_)), "got {err:?}");
}

#[test]
fn out_of_range_is_a_resolution_error() {
    let huge = DurationInterval {
        years: 1_000_000,
        ..DurationInterval::ZERO
    };
    let err = huge
        .resolve_at(utc(2026, 1, 1, 0, 0, 0), DstPolicy::default())
        .unwrap_err();
    assert!(matches!(err, IntervalError::OutOfRange(_)), "got {err:?}");
    assert!(err.is_resolution_error());
}

// ---------------------------------------------------------------------------
// project_from
// ---------------------------------------------------------------------------

#[test]
fn project_from_date_string() {
    let target = interval("P1M")
        .project_from_with("2026-03-01", None, &clock(), &ResolveOptions::default())
        .unwrap();
    assert_eq!(target, utc(2026, 4, 1, 0, 0, 0));
}

#[test]
fn project_from_rfc3339_keeps_the_instant() {
    let target = interval("PT2H")
        .project_from_with(
            "2026-03-16T10:00:00-04:00",
            Some("America/New_York"),
            &clock(),
            &ResolveOptions::default(),
        )
        .unwrap();
    assert_eq!(target.with_timezone(&Utc).hour(), 16);
    assert_eq!(target.hour(), 12);
}

#[test]
fn project_from_now_and_phrases() {
    let nine_hours = interval("PT9H");
    let options = ResolveOptions::default();

    let from_now = nine_hours
        .project_from_with("now", None, &clock(), &options)
        .unwrap();
    assert_eq!(from_now, utc(2026, 2, 18, 23, 30, 0));

    // Next Monday from Wednesday Feb 18 is Feb 23.
    let from_monday = nine_hours
        .project_from_with("next monday", Some("UTC"), &clock(), &options)
        .unwrap();
    assert_eq!(from_monday, utc(2026, 2, 23, 9, 0, 0));

    let from_offset = nine_hours
        .project_from_with("in 1 hour", None, &clock(), &options)
        .unwrap();
    assert_eq!(from_offset, utc(2026, 2, 19, 0, 30, 0));
}

#[test]
fn project_from_reads_local_dates_in_the_given_zone() {
    let target = interval("P1D")
        .project_from_with(
            "2026-07-01",
            Some("Asia/Tokyo"),
            &clock(),
            &ResolveOptions::default(),
        )
        .unwrap();
    // Tokyo midnight on July 2 is 15:00 UTC on July 1.
    let utc_target = target.with_timezone(&Utc);
    assert_eq!((utc_target.day(), utc_target.hour()), (1, 15));
}

#[test]
fn project_from_rejects_malformed_base() {
    let err = interval("P1D")
        .project_from_with("sometime soonish", None, &clock(), &ResolveOptions::default())
        .unwrap_err();
    assert!(matches!(err, IntervalError::InvalidDatetime(_)), "got {err:?}");
    assert!(err.is_resolution_error());
}

#[test]
fn project_from_rejects_unknown_timezone() {
    let err = interval("P1D")
        .project_from("now", Some("Mars/Olympus_Mons"))
        .unwrap_err();
    assert!(matches!(err, IntervalError::InvalidTimezone(_)), "got {err:?}");
}

#[test]
fn project_from_instant_adds_directly() {
    let target = interval("-PT30M")
        .project_from_instant(utc(2026, 1, 1, 0, 0, 0))
        .unwrap();
    assert_eq!(target, utc(2025, 12, 31, 23, 30, 0));
}

#[test]
fn system_clock_projection_of_fixed_units() {
    // Hours, minutes and seconds never depend on the anchor.
    let interval = interval("PT1H30M");
    assert_eq!(interval.in_seconds().unwrap(), 5400);
    assert_eq!(interval.in_minutes(Truncated).unwrap(), 90.0);
    assert_eq!(interval.in_hours(Fractional).unwrap(), 1.5);
}
