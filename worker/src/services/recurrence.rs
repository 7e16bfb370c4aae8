//! Recurring visit date generation

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

use crate::types::Frequency;

/// Occurrence dates for a recurring service.
///
/// The first date is the first `preferred_day` on or after `start`; later
/// dates follow the frequency until `horizon_weeks` weeks past `start`.
/// The anchor is always emitted, so the result is never empty even when
/// the horizon is zero.
pub fn recurrence_dates(
    start: NaiveDate,
    preferred_day: Weekday,
    frequency: Frequency,
    horizon_weeks: u32,
) -> Vec<NaiveDate> {
    let anchor = first_on_or_after(start, preferred_day);
    let horizon_end = start + Duration::days(i64::from(horizon_weeks) * 7);

    let mut dates = vec![anchor];
    let mut cursor = advance(anchor, frequency);
    while cursor <= horizon_end {
        dates.push(cursor);
        cursor = advance(cursor, frequency);
    }
    dates
}

/// First occurrence of `weekday` on or after `start`. Scans at most a week.
fn first_on_or_after(start: NaiveDate, weekday: Weekday) -> NaiveDate {
    for offset in 0..7 {
        let candidate = start + Duration::days(offset);
        if candidate.weekday() == weekday {
            return candidate;
        }
    }
    start
}

/// Next occurrence after `date` for the frequency. Monthly steps a calendar
/// month, clamping at month ends (Jan 31 -> Feb 29).
fn advance(date: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Weekly => date + Duration::days(7),
        Frequency::Fortnightly => date + Duration::days(14),
        Frequency::Monthly => date
            .checked_add_months(Months::new(1))
            .unwrap_or_else(|| date + Duration::days(28)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekly_monday_from_monday_start() {
        let dates = recurrence_dates(date(2024, 1, 1), Weekday::Mon, Frequency::Weekly, 2);
        assert_eq!(
            dates,
            vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15)]
        );
    }

    #[test]
    fn test_anchor_scans_forward_to_preferred_day() {
        // 2024-01-01 is a Monday; the first Thursday is the 4th.
        let dates = recurrence_dates(date(2024, 1, 1), Weekday::Thu, Frequency::Weekly, 1);
        assert_eq!(dates[0], date(2024, 1, 4));
        assert_eq!(dates[1], date(2024, 1, 11));
    }

    #[test]
    fn test_fortnightly_spacing() {
        let dates = recurrence_dates(date(2024, 1, 1), Weekday::Mon, Frequency::Fortnightly, 6);
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 1),
                date(2024, 1, 15),
                date(2024, 1, 29),
                date(2024, 2, 12)
            ]
        );
        for pair in dates.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 14);
        }
    }

    #[test]
    fn test_monthly_clamps_at_month_end() {
        // Anchored on Jan 31; February clamps to the 29th in a leap year.
        let dates = recurrence_dates(date(2024, 1, 31), Weekday::Wed, Frequency::Monthly, 9);
        assert_eq!(dates[0], date(2024, 1, 31));
        assert_eq!(dates[1], date(2024, 2, 29));
        assert_eq!(dates[2], date(2024, 3, 29));
    }

    #[test]
    fn test_weekly_and_fortnightly_hold_the_weekday() {
        for frequency in [Frequency::Weekly, Frequency::Fortnightly] {
            let dates = recurrence_dates(date(2024, 3, 1), Weekday::Tue, frequency, 12);
            assert!(!dates.is_empty());
            for d in &dates {
                assert_eq!(d.weekday(), Weekday::Tue);
            }
        }
    }

    #[test]
    fn test_dates_stay_inside_bounds() {
        let start = date(2024, 5, 3);
        let horizon_weeks = 8;
        let dates = recurrence_dates(start, Weekday::Fri, Frequency::Weekly, horizon_weeks);
        let horizon_end = start + Duration::days(i64::from(horizon_weeks) * 7);
        for d in &dates {
            assert!(*d >= start);
            assert!(*d <= horizon_end);
        }
    }

    #[test]
    fn test_zero_horizon_still_yields_the_anchor() {
        // The anchor lands past the horizon yet is still emitted.
        let dates = recurrence_dates(date(2024, 1, 2), Weekday::Mon, Frequency::Weekly, 0);
        assert_eq!(dates, vec![date(2024, 1, 8)]);
    }

    #[test]
    fn test_sorted_and_unique() {
        let dates = recurrence_dates(date(2024, 1, 1), Weekday::Mon, Frequency::Monthly, 26);
        let mut sorted = dates.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(dates, sorted);
    }
}
