//! # Nudgely Core Library
//!
//! Business logic behind the Nudgely habit tracker. The CLI binary is a thin
//! layer over this crate; any other host (mobile shell, batch backfill job)
//! can call the same functions directly.
//!
//! ## Architecture
//!
//! - **Recurrence**: decides whether a rule schedules an activity on a date
//! - **Streak**: derives current/best streak from completion history
//! - **Habit**: habit records and an explicit in-memory store
//! - **Planner**: turns habits into dated, timed events for calendar export
//! - **Storage**: SQLite habit storage and TOML configuration
//!
//! ## Key Components
//!
//! - [`is_scheduled`]: occurrence test for a [`RecurrenceRule`]
//! - [`compute_streaks`]: streak recompute from a full history
//! - [`HabitBook`]: state container for habits and categories
//! - [`HabitDb`]: persistent habit storage
//! - [`Config`]: application configuration management

pub mod error;
pub mod habit;
pub mod planner;
pub mod recurrence;
pub mod storage;
pub mod streak;

pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use habit::{Habit, HabitBook, HabitUpdate, NewHabit, TimeOfDay, TimeSlot};
pub use planner::{plan_all, plan_habit, PlannedEvent};
pub use recurrence::{
    is_scheduled, occurrences_between, MonthlyAnchor, RecurrenceKind, RecurrenceRule, WeekdaySet,
};
pub use storage::{Config, HabitDb};
pub use streak::{compute_streaks, compute_streaks_as_of, is_stale, CompletionRecord, StreakState};
