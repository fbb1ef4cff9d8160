//! Recurrence evaluation.
//!
//! - [`RecurrenceRule`]: daily, weekly (weekday set) or monthly (anchored)
//! - [`is_scheduled`]: whether a rule puts an activity on a calendar date
//! - [`occurrences_between`]: every scheduled date in a range

mod evaluator;
mod rule;

pub use evaluator::{is_scheduled, last_day_of_month, occurrences_between};
pub use rule::{MonthlyAnchor, RecurrenceKind, RecurrenceRule, WeekdaySet};
