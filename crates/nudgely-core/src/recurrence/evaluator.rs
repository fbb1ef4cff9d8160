//! Occurrence decisions for recurrence rules.
//!
//! Dates are local calendar days. Weekday indices count from Sunday = 0.

use chrono::{Datelike, NaiveDate};

use super::rule::{MonthlyAnchor, RecurrenceRule};

/// Returns whether `rule` schedules an activity on `date`.
///
/// - `Daily` matches every date.
/// - `Weekly` matches dates whose weekday is in the set; an empty set never matches.
/// - `Monthly` matches the anchor day. A `DayOfMonth` anchor past the end of a
///   short month matches that month's last day instead.
pub fn is_scheduled(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    match rule {
        RecurrenceRule::Daily => true,
        RecurrenceRule::Weekly { weekdays } => weekdays.contains(date.weekday()),
        RecurrenceRule::Monthly { anchor } => match anchor {
            MonthlyAnchor::FirstOfMonth => date.day() == 1,
            MonthlyAnchor::DayOfMonth(day) => {
                let last = last_day_of_month(date);
                date.day() == (*day).min(last)
            }
        },
    }
}

/// Every date in `start..=end` on which `rule` is scheduled.
pub fn occurrences_between(
    rule: &RecurrenceRule,
    start: NaiveDate,
    end: NaiveDate,
) -> impl Iterator<Item = NaiveDate> + '_ {
    start
        .iter_days()
        .take_while(move |d| *d <= end)
        .filter(move |d| is_scheduled(rule, *d))
}

/// Day number of the last day in `date`'s month (28-31).
pub fn last_day_of_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}
