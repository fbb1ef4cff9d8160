//! In-memory habit store.
//!
//! Hosts drive the book through explicit method calls and persist the
//! result themselves; there is no shared global state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Habit, HabitUpdate, NewHabit};
use crate::error::{CoreError, Result};
use crate::streak::StreakState;

pub const DEFAULT_CATEGORIES: [&str; 6] =
    ["Morning", "Health", "Fitness", "Learning", "Mindfulness", "Other"];

/// Habits plus the user's habit categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitBook {
    pub habits: Vec<Habit>,
    pub categories: Vec<String>,
}

impl Default for HabitBook {
    fn default() -> Self {
        Self {
            habits: Vec::new(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl HabitBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, new: NewHabit) -> Result<&Habit> {
        let habit = Habit::new(new)?;
        tracing::info!(habit_id = %habit.id, title = %habit.title, "habit added");
        self.habits.push(habit);
        Ok(&self.habits[self.habits.len() - 1])
    }

    pub fn get(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Habit> {
        self.habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| CoreError::habit_not_found(id))
    }

    pub fn update(&mut self, id: &str, update: HabitUpdate) -> Result<&Habit> {
        let habit = self.get_mut(id)?;
        habit.apply(update)?;
        Ok(&*habit)
    }

    /// Remove a habit and its history.
    pub fn delete(&mut self, id: &str) -> Result<Habit> {
        let index = self
            .habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| CoreError::habit_not_found(id))?;
        tracing::info!(habit_id = %id, "habit deleted");
        Ok(self.habits.remove(index))
    }

    /// Toggle completion for one day and return the refreshed streaks.
    pub fn complete(&mut self, id: &str, date: NaiveDate, completed: bool) -> Result<StreakState> {
        let habit = self.get_mut(id)?;
        Ok(habit.record_completion(date, completed))
    }

    /// Habits scheduled on `date`, earliest time slot first, then by title.
    pub fn scheduled_on(&self, date: NaiveDate) -> Vec<&Habit> {
        let mut due: Vec<&Habit> = self
            .habits
            .iter()
            .filter(|h| h.is_scheduled_on(date))
            .collect();
        due.sort_by(|a, b| {
            a.time_of_day
                .primary_slot()
                .cmp(&b.time_of_day.primary_slot())
                .then_with(|| a.title.cmp(&b.title))
        });
        due
    }

    /// Returns false if the category already exists.
    pub fn add_category(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.categories.iter().any(|c| c == name) {
            return false;
        }
        self.categories.push(name.to_string());
        true
    }

    /// Returns false if the category did not exist.
    pub fn delete_category(&mut self, name: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c != name);
        self.categories.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::TimeOfDay;
    use crate::recurrence::RecurrenceRule;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn new_habit(title: &str, rule: RecurrenceRule, time_of_day: TimeOfDay) -> NewHabit {
        NewHabit {
            title: title.into(),
            rule,
            time_of_day,
            ..Default::default()
        }
    }

    #[test]
    fn starts_with_default_categories() {
        let book = HabitBook::new();
        assert_eq!(book.categories.len(), DEFAULT_CATEGORIES.len());
        assert!(book.habits.is_empty());
    }

    #[test]
    fn add_get_update_delete() {
        let mut book = HabitBook::new();
        let id = book
            .add(new_habit("Read", RecurrenceRule::Daily, TimeOfDay::default()))
            .unwrap()
            .id
            .clone();

        assert_eq!(book.get(&id).map(|h| h.title.as_str()), Some("Read"));

        book.update(
            &id,
            HabitUpdate {
                title: Some("Read 20 pages".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(book.get(&id).unwrap().title, "Read 20 pages");

        let removed = book.delete(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(book.get(&id).is_none());
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut book = HabitBook::new();
        let err = book.complete("missing", day(1), true).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert!(book.delete("missing").is_err());
    }

    #[test]
    fn complete_updates_streaks() {
        let mut book = HabitBook::new();
        let id = book
            .add(new_habit("Walk", RecurrenceRule::Daily, TimeOfDay::default()))
            .unwrap()
            .id
            .clone();

        book.complete(&id, day(1), true).unwrap();
        let state = book.complete(&id, day(2), true).unwrap();
        assert_eq!(state.current_streak, 2);
        assert_eq!(book.get(&id).unwrap().best_streak, 2);
    }

    #[test]
    fn scheduled_on_filters_and_orders_by_slot() {
        let mut book = HabitBook::new();
        let evening = TimeOfDay {
            evening: true,
            ..Default::default()
        };
        let morning = TimeOfDay {
            morning: true,
            ..Default::default()
        };
        book.add(new_habit("Journal", RecurrenceRule::Daily, evening)).unwrap();
        book.add(new_habit("Run", RecurrenceRule::weekly([1]).unwrap(), morning))
            .unwrap();
        book.add(new_habit("Meditate", RecurrenceRule::Daily, morning)).unwrap();
        book.add(new_habit("Pay rent", RecurrenceRule::monthly(), TimeOfDay::default()))
            .unwrap();

        // 2024-01-15 is a Monday
        let titles: Vec<&str> = book
            .scheduled_on(day(15))
            .into_iter()
            .map(|h| h.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Meditate", "Run", "Journal"]);

        let first: Vec<&str> = book
            .scheduled_on(day(1))
            .into_iter()
            .map(|h| h.title.as_str())
            .collect();
        // 2024-01-01 is also a Monday
        assert_eq!(first, vec!["Meditate", "Run", "Journal", "Pay rent"]);
    }

    #[test]
    fn categories_are_unique() {
        let mut book = HabitBook::new();
        assert!(book.add_category("Chores"));
        assert!(!book.add_category("Chores"));
        assert!(!book.add_category("  "));
        assert!(book.delete_category("Chores"));
        assert!(!book.delete_category("Chores"));
    }
}
