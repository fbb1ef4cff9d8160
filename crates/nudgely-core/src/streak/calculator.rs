//! Streak calculator.
//!
//! "Consecutive" depends on the rule's frequency:
//! - **Daily**: exactly one day apart
//! - **Weekly**: at most seven days apart
//! - **Monthly**: different months, or at most 31 days apart. This is a loose
//!   heuristic rather than month-boundary arithmetic; it also accepts two
//!   completions in the same month.

use chrono::{Datelike, NaiveDate};

use super::{CompletionRecord, StreakState};
use crate::recurrence::RecurrenceRule;

/// Recompute streaks from a full completion history.
///
/// `history` may be in any order and may contain incomplete records; only
/// completed ones count. Same-day duplicates collapse to one completion.
/// `previous_best` is the caller's persisted best streak; the returned
/// `best_streak` is never lower than it.
///
/// `current_streak` is the run ending at the latest completion, whether or
/// not that completion is recent. Use [`compute_streaks_as_of`] to treat an
/// abandoned streak as broken.
pub fn compute_streaks(
    rule: &RecurrenceRule,
    history: &[CompletionRecord],
    previous_best: u32,
) -> StreakState {
    let dates = completed_dates(history, None);
    scan(rule, &dates, previous_best)
}

/// Like [`compute_streaks`], evaluated on `today`.
///
/// Completions after `today` are ignored. When the latest remaining
/// completion can no longer be followed by a consecutive one today, the
/// current streak is reported as 0. The best streak is unaffected.
pub fn compute_streaks_as_of(
    rule: &RecurrenceRule,
    history: &[CompletionRecord],
    previous_best: u32,
    today: NaiveDate,
) -> StreakState {
    let dates = completed_dates(history, Some(today));
    let mut state = scan(rule, &dates, previous_best);
    if let Some(last) = dates.last() {
        if is_stale(rule, *last, today) {
            state.current_streak = 0;
        }
    }
    state
}

/// Whether a streak whose latest completion is `last_completion` is broken
/// as of `today`.
pub fn is_stale(rule: &RecurrenceRule, last_completion: NaiveDate, today: NaiveDate) -> bool {
    today > last_completion && !is_consecutive(rule, last_completion, today)
}

/// Whether `curr` continues a streak that reached `prev`.
pub fn is_consecutive(rule: &RecurrenceRule, prev: NaiveDate, curr: NaiveDate) -> bool {
    let gap_days = curr.signed_duration_since(prev).num_days().abs();
    match rule {
        RecurrenceRule::Daily => gap_days == 1,
        RecurrenceRule::Weekly { .. } => gap_days <= 7,
        RecurrenceRule::Monthly { .. } => prev.month() != curr.month() || gap_days <= 31,
    }
}

fn completed_dates(history: &[CompletionRecord], until: Option<NaiveDate>) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = history
        .iter()
        .filter(|r| r.completed)
        .map(|r| r.date)
        .filter(|d| until.map_or(true, |limit| *d <= limit))
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

fn scan(rule: &RecurrenceRule, dates: &[NaiveDate], previous_best: u32) -> StreakState {
    if dates.is_empty() {
        return StreakState {
            current_streak: 0,
            best_streak: previous_best,
        };
    }

    let mut current: u32 = 1;
    let mut running_max: u32 = 1;
    for pair in dates.windows(2) {
        if is_consecutive(rule, pair[0], pair[1]) {
            current += 1;
            running_max = running_max.max(current);
        } else {
            current = 1;
        }
    }

    StreakState {
        current_streak: current,
        best_streak: previous_best.max(running_max),
    }
}
