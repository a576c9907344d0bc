//! DST handling for wall-clock times produced by calendar arithmetic.

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

use crate::error::{IntervalError, Result};

/// Policy for local times that do not map to exactly one instant.
///
/// Adding whole days or months happens on the wall clock, so the result can
/// land in a spring-forward gap (no such instant) or a fall-back fold (two
/// instants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstPolicy {
    /// Move a gap time forward by the gap length; take the earlier instant of a fold.
    #[default]
    ShiftForward,
    /// Take the later instant of a fold; gaps shift forward as above.
    Latest,
    /// Fail with [`IntervalError::InvalidDatetime`] on any gap or fold.
    Reject,
}

impl DstPolicy {
    /// Map a wall-clock time in `tz` to an instant according to this policy.
    pub fn localize(self, tz: &Tz, naive: &NaiveDateTime) -> Result<DateTime<Tz>> {
        match tz.from_local_datetime(naive) {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::Ambiguous(earliest, latest) => match self {
                DstPolicy::ShiftForward => Ok(earliest),
                DstPolicy::Latest => Ok(latest),
                DstPolicy::Reject => Err(IntervalError::InvalidDatetime(format!(
                    "'{naive}' is ambiguous in {tz}"
                ))),
            },
            LocalResult::None => {
                if self == DstPolicy::Reject {
                    return Err(IntervalError::InvalidDatetime(format!(
                        "'{naive}' does not exist in {tz}"
                    )));
                }
                shift_past_gap(tz, naive)
            }
        }
    }
}

/// Resolve a time inside a DST gap by reading it with the pre-gap offset.
///
/// 02:30 on a spring-forward night in New York becomes 03:30 EDT.
fn shift_past_gap(tz: &Tz, naive: &NaiveDateTime) -> Result<DateTime<Tz>> {
    let before = *naive - chrono::Duration::hours(3);
    let offset_secs = match tz.from_local_datetime(&before) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(_, dt) => {
            dt.offset().fix().local_minus_utc()
        }
        LocalResult::None => {
            return Err(IntervalError::InvalidDatetime(format!(
                "'{naive}' does not exist in {tz}"
            )))
        }
    };
    let utc = *naive - chrono::Duration::seconds(i64::from(offset_secs));
    Ok(tz.from_utc_datetime(&utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn single_mapping_passes_through() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let dt = DstPolicy::Reject
            .localize(&tz, &naive(2026, 1, 15, 9, 0))
            .unwrap();
        assert_eq!(dt.hour(), 9);
    }

    #[test]
    fn gap_shifts_forward() {
        // 2026-03-08 02:30 does not exist in New York (spring forward).
        let tz: Tz = "America/New_York".parse().unwrap();
        let dt = DstPolicy::ShiftForward
            .localize(&tz, &naive(2026, 3, 8, 2, 30))
            .unwrap();
        assert_eq!((dt.hour(), dt.minute()), (3, 30));
    }

    #[test]
    fn gap_rejected() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let err = DstPolicy::Reject
            .localize(&tz, &naive(2026, 3, 8, 2, 30))
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"), "got: {err}");
    }

    #[test]
    fn fold_picks_earliest_or_latest() {
        // 2026-11-01 01:30 happens twice in New York (fall back).
        let tz: Tz = "America/New_York".parse().unwrap();
        let early = DstPolicy::ShiftForward
            .localize(&tz, &naive(2026, 11, 1, 1, 30))
            .unwrap();
        let late = DstPolicy::Latest
            .localize(&tz, &naive(2026, 11, 1, 1, 30))
            .unwrap();
        assert_eq!((late - early).num_hours(), 1);
    }
}
