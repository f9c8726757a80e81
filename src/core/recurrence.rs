//! Recurrence arithmetic for scheduled transactions.
//!
//! Pure date functions with no I/O. Months and years are calendar-based: when the
//! target month is shorter than the source day-of-month, the result is clamped to
//! the target month's last day (Jan 31 + 1 month = Feb 28/29).

use crate::{
    entities::Frequency,
    errors::{Error, Result},
};
use chrono::{DateTime, Days, Months, Utc};

/// Computes the due date following `current` for the given `frequency`.
///
/// The time of day is preserved.
pub fn next_due_date(current: DateTime<Utc>, frequency: Frequency) -> Result<DateTime<Utc>> {
    let next = match frequency {
        Frequency::Daily => current.checked_add_days(Days::new(1)),
        Frequency::Weekly => current.checked_add_days(Days::new(7)),
        Frequency::Monthly => current.checked_add_months(Months::new(1)),
        Frequency::Yearly => current.checked_add_months(Months::new(12)),
    };

    next.ok_or_else(|| Error::DateOutOfRange {
        message: format!("cannot advance {current} by {frequency:?}"),
    })
}

/// True when a successor due on `next_due` still falls inside the recurrence window.
#[must_use]
pub fn should_continue(next_due: DateTime<Utc>, end_date: Option<DateTime<Utc>>) -> bool {
    end_date.is_none_or(|end| next_due <= end)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_daily_and_weekly() {
        assert_eq!(next_due_date(at(2024, 2, 28), Frequency::Daily).unwrap(), at(2024, 2, 29));
        assert_eq!(next_due_date(at(2023, 12, 31), Frequency::Daily).unwrap(), at(2024, 1, 1));
        assert_eq!(next_due_date(at(2024, 2, 26), Frequency::Weekly).unwrap(), at(2024, 3, 4));
    }

    #[test]
    fn test_monthly_clamps_to_leap_february() {
        assert_eq!(
            next_due_date(at(2024, 1, 31), Frequency::Monthly).unwrap(),
            at(2024, 2, 29)
        );
    }

    #[test]
    fn test_monthly_clamps_to_short_months() {
        assert_eq!(
            next_due_date(at(2023, 1, 31), Frequency::Monthly).unwrap(),
            at(2023, 2, 28)
        );
        assert_eq!(
            next_due_date(at(2024, 3, 31), Frequency::Monthly).unwrap(),
            at(2024, 4, 30)
        );
        assert_eq!(
            next_due_date(at(2024, 12, 15), Frequency::Monthly).unwrap(),
            at(2025, 1, 15)
        );
    }

    #[test]
    fn test_yearly_clamps_leap_day() {
        assert_eq!(
            next_due_date(at(2024, 2, 29), Frequency::Yearly).unwrap(),
            at(2025, 2, 28)
        );
        assert_eq!(
            next_due_date(at(2023, 6, 1), Frequency::Yearly).unwrap(),
            at(2024, 6, 1)
        );
    }

    #[test]
    fn test_clamp_does_not_drift_back() {
        // Each step starts from the clamped date, so the day-of-month stays at 29.
        let feb = next_due_date(at(2024, 1, 31), Frequency::Monthly).unwrap();
        assert_eq!(next_due_date(feb, Frequency::Monthly).unwrap(), at(2024, 3, 29));
    }

    #[test]
    fn test_out_of_range() {
        let result = next_due_date(DateTime::<Utc>::MAX_UTC, Frequency::Daily);
        assert!(matches!(result, Err(Error::DateOutOfRange { .. })));
    }

    #[test]
    fn test_should_continue() {
        assert!(should_continue(at(2030, 1, 1), None));
        assert!(should_continue(at(2024, 3, 1), Some(at(2024, 3, 1))));
        assert!(!should_continue(at(2024, 3, 2), Some(at(2024, 3, 1))));
    }
}
