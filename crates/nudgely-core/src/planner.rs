//! Calendar export planning.
//!
//! Expands habits into dated, timed events over a horizon so a host can hand
//! them to a platform calendar or notification scheduler. Occurrence
//! decisions use [`is_scheduled`](crate::recurrence::is_scheduled), so
//! monthly habits land on the same days here as everywhere else.

use chrono::{Days, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::habit::Habit;
use crate::recurrence::occurrences_between;
use crate::storage::PlannerConfig;

/// One planned occurrence of a habit, in local wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedEvent {
    pub habit_id: String,
    pub title: String,
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub reminder_at: NaiveDateTime,
}

/// Events for one habit over `config.horizon_days` days starting at `from`.
///
/// The horizon is capped at [`PlannerConfig::MAX_HORIZON_DAYS`]. Occurrences
/// whose times fall outside the representable range are dropped.
pub fn plan_habit(habit: &Habit, from: NaiveDate, config: &PlannerConfig) -> Vec<PlannedEvent> {
    let horizon = config.horizon_days.min(PlannerConfig::MAX_HORIZON_DAYS);
    if horizon == 0 {
        return Vec::new();
    }
    let last = from
        .checked_add_days(Days::new(u64::from(horizon - 1)))
        .unwrap_or(NaiveDate::MAX);
    let slot_time = config.slot_time(habit.time_of_day.primary_slot());
    let duration = Duration::minutes(i64::from(config.event_duration_min));
    let reminder = Duration::minutes(i64::from(config.reminder_offset_min));

    occurrences_between(&habit.rule, from, last)
        .filter_map(|date| {
            let start = date.and_time(slot_time);
            Some(PlannedEvent {
                habit_id: habit.id.clone(),
                title: habit.title.clone(),
                date,
                start,
                end: start.checked_add_signed(duration)?,
                reminder_at: start.checked_sub_signed(reminder)?,
            })
        })
        .collect()
}

/// Events for every habit, ordered by start time then title.
pub fn plan_all(habits: &[Habit], from: NaiveDate, config: &PlannerConfig) -> Vec<PlannedEvent> {
    let mut events: Vec<PlannedEvent> = habits
        .iter()
        .flat_map(|h| plan_habit(h, from, config))
        .collect();
    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));
    tracing::debug!(
        habits = habits.len(),
        events = events.len(),
        horizon_days = config.horizon_days,
        "planned calendar events"
    );
    events
}
