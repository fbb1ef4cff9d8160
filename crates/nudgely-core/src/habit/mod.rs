//! Habit records and the habit store.
//!
//! A [`Habit`] owns its recurrence rule and completion history. Its streak
//! fields are a cache of [`compute_streaks`] over that history and are
//! refreshed on every mutation.

mod book;

pub use book::{HabitBook, DEFAULT_CATEGORIES};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::recurrence::{is_scheduled, RecurrenceRule};
use crate::streak::{compute_streaks, compute_streaks_as_of, CompletionRecord, StreakState};

pub const DEFAULT_COLOR: &str = "#0a7ea4";
pub const DEFAULT_CATEGORY: &str = "Other";

/// Preferred parts of the day. Affects ordering and planned event times only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeOfDay {
    #[serde(default)]
    pub morning: bool,
    #[serde(default)]
    pub afternoon: bool,
    #[serde(default)]
    pub evening: bool,
}

/// The slot a habit is shown in; earlier slots sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Anytime,
}

impl TimeOfDay {
    /// Earliest flagged slot, or `Anytime` when no flag is set.
    pub fn primary_slot(&self) -> TimeSlot {
        if self.morning {
            TimeSlot::Morning
        } else if self.afternoon {
            TimeSlot::Afternoon
        } else if self.evening {
            TimeSlot::Evening
        } else {
            TimeSlot::Anytime
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    /// Parses a comma-separated list such as `morning,evening`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut times = TimeOfDay::default();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "morning" => times.morning = true,
                "afternoon" => times.afternoon = true,
                "evening" => times.evening = true,
                _ => return Err(ValidationError::UnknownTimeOfDay(part.to_string())),
            }
        }
        Ok(times)
    }
}

/// Fields supplied when creating a habit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewHabit {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub rule: RecurrenceRule,
    pub time_of_day: TimeOfDay,
    pub color: Option<String>,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub rule: Option<RecurrenceRule>,
    pub time_of_day: Option<TimeOfDay>,
    pub color: Option<String>,
}

/// A recurring habit with its completion history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: String,
    pub rule: RecurrenceRule,
    pub time_of_day: TimeOfDay,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub completions: Vec<CompletionRecord>,
    pub current_streak: u32,
    pub best_streak: u32,
}

impl Habit {
    /// Create a habit with a fresh id and empty history.
    pub fn new(new: NewHabit) -> Result<Self, ValidationError> {
        Self::new_at(new, Utc::now())
    }

    pub fn new_at(new: NewHabit, created_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::Empty("title"));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title,
            description: new.description,
            icon: new.icon,
            category: new.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            rule: new.rule,
            time_of_day: new.time_of_day,
            color: new.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            created_at,
            completions: Vec::new(),
            current_streak: 0,
            best_streak: 0,
        })
    }

    pub fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        is_scheduled(&self.rule, date)
    }

    /// Recorded state for `date`, if any.
    pub fn completion_on(&self, date: NaiveDate) -> Option<bool> {
        self.completions
            .iter()
            .find(|c| c.date == date)
            .map(|c| c.completed)
    }

    /// Mark `date` done or not done, replacing any record for that day, and
    /// refresh the streak fields.
    pub fn record_completion(&mut self, date: NaiveDate, completed: bool) -> StreakState {
        match self.completions.iter_mut().find(|c| c.date == date) {
            Some(existing) => existing.completed = completed,
            None => self.completions.push(CompletionRecord { date, completed }),
        }
        self.refresh_streaks()
    }

    /// Apply a partial update. Changing the rule re-derives the streaks.
    pub fn apply(&mut self, update: HabitUpdate) -> Result<(), ValidationError> {
        if let Some(title) = update.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ValidationError::Empty("title"));
            }
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(icon) = update.icon {
            self.icon = Some(icon);
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(time_of_day) = update.time_of_day {
            self.time_of_day = time_of_day;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(rule) = update.rule {
            if rule != self.rule {
                self.rule = rule;
                self.refresh_streaks();
            }
        }
        Ok(())
    }

    /// Streaks as they stand on `today`, treating an abandoned run as broken.
    /// Does not modify the habit.
    pub fn streaks_as_of(&self, today: NaiveDate) -> StreakState {
        compute_streaks_as_of(&self.rule, &self.completions, self.best_streak, today)
    }

    pub fn streaks(&self) -> StreakState {
        StreakState {
            current_streak: self.current_streak,
            best_streak: self.best_streak,
        }
    }

    /// Recompute from the full history, using the stored best as the floor.
    pub fn refresh_streaks(&mut self) -> StreakState {
        let state = compute_streaks(&self.rule, &self.completions, self.best_streak);
        tracing::debug!(
            habit_id = %self.id,
            current = state.current_streak,
            best = state.best_streak,
            "streaks recomputed"
        );
        self.current_streak = state.current_streak;
        self.best_streak = state.best_streak;
        state
    }
}
