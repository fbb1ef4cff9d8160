//! Habit streak computation.
//!
//! Streaks are never stored as ground truth: they are recomputed from the
//! full completion history on every change.

mod calculator;

pub use calculator::{compute_streaks, compute_streaks_as_of, is_consecutive, is_stale};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One dated observation of whether an activity was done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub date: NaiveDate,
    pub completed: bool,
}

impl CompletionRecord {
    pub fn done(date: NaiveDate) -> Self {
        Self {
            date,
            completed: true,
        }
    }

    pub fn missed(date: NaiveDate) -> Self {
        Self {
            date,
            completed: false,
        }
    }
}

/// Derived streak values for one activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive completions ending at the most recent completion.
    pub current_streak: u32,
    /// Longest run ever seen, never lower than the caller's previous best.
    pub best_streak: u32,
}
