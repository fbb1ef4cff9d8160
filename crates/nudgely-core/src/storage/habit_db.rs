//! SQLite-based storage for habits, completions and categories.
//!
//! Completion rows are keyed by `(habit_id, date)`, so a second toggle for
//! the same day replaces the first instead of appending. The streak columns
//! on `habits` are a cache refreshed on every completion change.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use crate::error::{CoreError, DatabaseError, Result};
use crate::habit::{Habit, HabitBook, TimeOfDay, DEFAULT_CATEGORIES};
use crate::recurrence::RecurrenceRule;
use crate::streak::{CompletionRecord, StreakState};

const HABIT_COLUMNS: &str = "id, title, description, icon, category, rule, time_of_day, color, \
                             created_at, current_streak, best_streak";

const DATE_FORMAT: &str = "%Y-%m-%d";

// === Helper Functions ===

fn parse_date(table: &'static str, raw: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| DatabaseError::CorruptRow {
        table,
        message: format!("bad date '{raw}': {e}"),
    })
}

/// Rows with an unreadable date are logged and skipped so the habit stays usable.
fn decode_completion(habit_id: &str, raw: &str, completed: bool) -> Option<CompletionRecord> {
    match parse_date("habit_completions", raw) {
        Ok(date) => Some(CompletionRecord { date, completed }),
        Err(e) => {
            tracing::warn!(%habit_id, error = %e, "skipping unreadable completion");
            None
        }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Raw `habits` row before JSON/date decoding.
struct HabitRow {
    id: String,
    title: String,
    description: Option<String>,
    icon: Option<String>,
    category: String,
    rule: String,
    time_of_day: String,
    color: String,
    created_at: String,
    current_streak: u32,
    best_streak: u32,
}

impl HabitRow {
    fn from_row(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            icon: row.get(3)?,
            category: row.get(4)?,
            rule: row.get(5)?,
            time_of_day: row.get(6)?,
            color: row.get(7)?,
            created_at: row.get(8)?,
            current_streak: row.get(9)?,
            best_streak: row.get(10)?,
        })
    }

    fn into_habit(self, completions: Vec<CompletionRecord>) -> Result<Habit, DatabaseError> {
        let corrupt = |message: String| DatabaseError::CorruptRow {
            table: "habits",
            message: format!("habit {}: {message}", self.id),
        };
        let rule: RecurrenceRule =
            serde_json::from_str(&self.rule).map_err(|e| corrupt(format!("rule: {e}")))?;
        let time_of_day: TimeOfDay = serde_json::from_str(&self.time_of_day)
            .map_err(|e| corrupt(format!("time_of_day: {e}")))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| corrupt(format!("created_at: {e}")))?;

        Ok(Habit {
            id: self.id,
            title: self.title,
            description: self.description,
            icon: self.icon,
            category: self.category,
            rule,
            time_of_day,
            color: self.color,
            created_at,
            completions,
            current_streak: self.current_streak,
            best_streak: self.best_streak,
        })
    }
}

/// SQLite database for habits.
pub struct HabitDb {
    conn: Connection,
}

impl HabitDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/nudgely/nudgely.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("nudgely.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and throwaway hosts).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "PRAGMA foreign_keys = ON;

                CREATE TABLE IF NOT EXISTS habits (
                    id             TEXT PRIMARY KEY,
                    title          TEXT NOT NULL,
                    description    TEXT,
                    icon           TEXT,
                    category       TEXT NOT NULL,
                    rule           TEXT NOT NULL,
                    time_of_day    TEXT NOT NULL,
                    color          TEXT NOT NULL,
                    created_at     TEXT NOT NULL,
                    current_streak INTEGER NOT NULL DEFAULT 0,
                    best_streak    INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS habit_completions (
                    habit_id  TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
                    date      TEXT NOT NULL,
                    completed INTEGER NOT NULL,
                    PRIMARY KEY (habit_id, date)
                );

                CREATE TABLE IF NOT EXISTS habit_categories (
                    name     TEXT PRIMARY KEY,
                    position INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_habits_created_at ON habits(created_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let seeded = self.kv_get("categories_seeded")?.is_some();
        if !seeded {
            for name in DEFAULT_CATEGORIES {
                self.add_category(name)?;
            }
            self.kv_set("categories_seeded", "1")?;
        }
        Ok(())
    }

    /// Run `f` inside an immediate transaction, rolling back on error.
    fn in_transaction<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        match f() {
            Ok(value) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(value)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    // === Habit CRUD ===

    /// Insert a habit together with any completions it already carries.
    pub fn create_habit(&self, habit: &Habit) -> Result<()> {
        self.in_transaction(|| {
            self.conn.execute(
                &format!(
                    "INSERT INTO habits ({HABIT_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                params![
                    habit.id,
                    habit.title,
                    habit.description,
                    habit.icon,
                    habit.category,
                    serde_json::to_string(&habit.rule)?,
                    serde_json::to_string(&habit.time_of_day)?,
                    habit.color,
                    habit.created_at.to_rfc3339(),
                    habit.current_streak,
                    habit.best_streak,
                ],
            )?;
            for record in &habit.completions {
                self.upsert_completion(&habit.id, *record)?;
            }
            Ok(())
        })?;
        tracing::info!(habit_id = %habit.id, title = %habit.title, "habit created");
        Ok(())
    }

    pub fn get_habit(&self, id: &str) -> Result<Option<Habit>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
                params![id],
                HabitRow::from_row,
            )
            .optional()?;

        match row {
            Some(row) => {
                let completions = self.load_completions(id)?;
                Ok(Some(row.into_habit(completions)?))
            }
            None => Ok(None),
        }
    }

    /// All habits in creation order. Rows that cannot be decoded are logged
    /// and skipped.
    pub fn list_habits(&self) -> Result<Vec<Habit>> {
        let mut completions = self.load_all_completions()?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits ORDER BY created_at, id"
        ))?;
        let rows = stmt
            .query_map([], HabitRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut habits = Vec::with_capacity(rows.len());
        for row in rows {
            let history = completions.remove(&row.id).unwrap_or_default();
            match row.into_habit(history) {
                Ok(habit) => habits.push(habit),
                Err(e) => tracing::warn!(error = %e, "skipping unreadable habit"),
            }
        }
        Ok(habits)
    }

    /// Overwrite a habit's fields (not its completions).
    pub fn update_habit(&self, habit: &Habit) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE habits
             SET title = ?2, description = ?3, icon = ?4, category = ?5, rule = ?6,
                 time_of_day = ?7, color = ?8, current_streak = ?9, best_streak = ?10
             WHERE id = ?1",
            params![
                habit.id,
                habit.title,
                habit.description,
                habit.icon,
                habit.category,
                serde_json::to_string(&habit.rule)?,
                serde_json::to_string(&habit.time_of_day)?,
                habit.color,
                habit.current_streak,
                habit.best_streak,
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::habit_not_found(&habit.id));
        }
        Ok(())
    }

    /// Delete a habit and its completion history.
    pub fn delete_habit(&self, id: &str) -> Result<()> {
        self.in_transaction(|| {
            self.conn.execute(
                "DELETE FROM habit_completions WHERE habit_id = ?1",
                params![id],
            )?;
            let changed = self
                .conn
                .execute("DELETE FROM habits WHERE id = ?1", params![id])?;
            if changed == 0 {
                return Err(CoreError::habit_not_found(id));
            }
            Ok(())
        })?;
        tracing::info!(habit_id = %id, "habit deleted");
        Ok(())
    }

    // === Completions ===

    /// Mark `date` done or not done for a habit and refresh its streaks.
    ///
    /// The stored best streak is the floor for the recomputed one.
    pub fn set_completion(&self, id: &str, date: NaiveDate, completed: bool) -> Result<StreakState> {
        let state = self.in_transaction(|| {
            let mut habit = self
                .get_habit(id)?
                .ok_or_else(|| CoreError::habit_not_found(id))?;
            let state = habit.record_completion(date, completed);
            self.upsert_completion(id, CompletionRecord { date, completed })?;
            self.conn.execute(
                "UPDATE habits SET current_streak = ?2, best_streak = ?3 WHERE id = ?1",
                params![id, state.current_streak, state.best_streak],
            )?;
            Ok(state)
        })?;
        tracing::info!(
            habit_id = %id,
            %date,
            completed,
            current = state.current_streak,
            best = state.best_streak,
            "completion recorded"
        );
        Ok(state)
    }

    fn upsert_completion(&self, id: &str, record: CompletionRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO habit_completions (habit_id, date, completed)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(habit_id, date) DO UPDATE SET completed = excluded.completed",
            params![id, format_date(record.date), record.completed],
        )?;
        Ok(())
    }

    fn load_completions(&self, id: &str) -> Result<Vec<CompletionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, completed FROM habit_completions WHERE habit_id = ?1 ORDER BY date",
        )?;
        let rows = stmt
            .query_map(params![id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(rows.len());
        for (date, completed) in rows {
            if let Some(record) = decode_completion(id, &date, completed) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn load_all_completions(&self) -> Result<HashMap<String, Vec<CompletionRecord>>> {
        let mut stmt = self.conn.prepare(
            "SELECT habit_id, date, completed FROM habit_completions ORDER BY habit_id, date",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut by_habit: HashMap<String, Vec<CompletionRecord>> = HashMap::new();
        for (habit_id, date, completed) in rows {
            if let Some(record) = decode_completion(&habit_id, &date, completed) {
                by_habit.entry(habit_id).or_default().push(record);
            }
        }
        Ok(by_habit)
    }

    // === Categories ===

    pub fn list_categories(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM habit_categories ORDER BY position, name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Returns false if the category already exists.
    pub fn add_category(&self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO habit_categories (name, position)
             VALUES (?1, (SELECT COALESCE(MAX(position), -1) + 1 FROM habit_categories))",
            params![name],
        )?;
        Ok(inserted == 1)
    }

    /// Returns false if the category did not exist.
    pub fn delete_category(&self, name: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM habit_categories WHERE name = ?1", params![name])?;
        Ok(deleted == 1)
    }

    /// Snapshot of everything as an in-memory [`HabitBook`].
    pub fn load_book(&self) -> Result<HabitBook> {
        Ok(HabitBook {
            habits: self.list_habits()?,
            categories: self.list_categories()?,
        })
    }

    // === Key-value store ===

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}
