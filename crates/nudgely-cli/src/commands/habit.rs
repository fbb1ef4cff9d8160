//! Habit management commands for CLI.

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use nudgely_core::{
    Config, Habit, HabitDb, HabitUpdate, MonthlyAnchor, NewHabit, RecurrenceKind, RecurrenceRule,
    TimeOfDay, WeekdaySet,
};

use super::{local_date, today};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit title
        title: String,
        /// Category name (default: Other)
        #[arg(long)]
        category: Option<String>,
        /// Frequency: daily, weekly or monthly
        #[arg(long, default_value = "daily")]
        frequency: RecurrenceKind,
        /// Weekdays for weekly habits: indices (Sunday = 0) or weekdays/weekend/all
        #[arg(long)]
        days: Option<String>,
        /// Monthly anchor: "first" (default), "created" or a day of month (1-31)
        #[arg(long)]
        anchor: Option<String>,
        /// Comma-separated times of day (morning, afternoon, evening)
        #[arg(long)]
        times: Option<TimeOfDay>,
        /// Display color
        #[arg(long)]
        color: Option<String>,
        /// Habit description
        #[arg(long)]
        description: Option<String>,
        /// Icon name
        #[arg(long)]
        icon: Option<String>,
    },
    /// List habits
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,
    },
    /// Get habit details
    Get {
        /// Habit ID
        id: String,
    },
    /// Update a habit
    Update {
        /// Habit ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<String>,
        /// New frequency; replaces the rule
        #[arg(long)]
        frequency: Option<RecurrenceKind>,
        /// New weekdays; keeps the current frequency unless --frequency is given
        #[arg(long)]
        days: Option<String>,
        /// New monthly anchor; keeps the current frequency unless --frequency is given
        #[arg(long)]
        anchor: Option<String>,
        /// New times of day
        #[arg(long)]
        times: Option<TimeOfDay>,
        /// New color
        #[arg(long)]
        color: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New icon
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a habit and its history
    Delete {
        /// Habit ID
        id: String,
    },
    /// Mark a day done (or not done with --undo)
    Complete {
        /// Habit ID
        id: String,
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Record the day as not done
        #[arg(long)]
        undo: bool,
    },
    /// Show current and best streak
    Streak {
        /// Habit ID
        id: String,
        /// Evaluate as of this date, treating an abandoned streak as broken
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

/// Build a rule from CLI flags. `created` is the local day `--anchor created`
/// resolves to. Flags that do not apply to `kind` are rejected.
pub fn build_rule(
    kind: RecurrenceKind,
    days: Option<&str>,
    anchor: Option<&str>,
    created: NaiveDate,
) -> Result<RecurrenceRule, Box<dyn std::error::Error>> {
    if days.is_some() && kind != RecurrenceKind::Weekly {
        return Err(format!("--days only applies to weekly habits, not {kind}").into());
    }
    if anchor.is_some() && kind != RecurrenceKind::Monthly {
        return Err(format!("--anchor only applies to monthly habits, not {kind}").into());
    }

    let rule = match kind {
        RecurrenceKind::Daily => RecurrenceRule::Daily,
        RecurrenceKind::Weekly => {
            let weekdays: WeekdaySet = days
                .ok_or("weekly habits need --days (e.g. 1,3,5 or weekdays)")?
                .parse()?;
            if weekdays.is_empty() {
                return Err("weekly habits need at least one day".into());
            }
            RecurrenceRule::Weekly { weekdays }
        }
        RecurrenceKind::Monthly => RecurrenceRule::Monthly {
            anchor: parse_anchor(anchor.unwrap_or("first"), created)?,
        },
    };
    Ok(rule)
}

fn load(db: &HabitDb, id: &str) -> Result<Habit, Box<dyn std::error::Error>> {
    Ok(db
        .get_habit(id)?
        .ok_or_else(|| nudgely_core::CoreError::habit_not_found(id))?)
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = HabitDb::open()?;

    match action {
        HabitAction::Add {
            title,
            category,
            frequency,
            days,
            anchor,
            times,
            color,
            description,
            icon,
        } => {
            let created_at = Utc::now();
            let rule = build_rule(
                frequency,
                days.as_deref(),
                anchor.as_deref(),
                local_date(created_at),
            )?;
            let habit = Habit::new_at(
                NewHabit {
                    title,
                    description,
                    icon,
                    category,
                    rule,
                    time_of_day: times.unwrap_or_default(),
                    color,
                },
                created_at,
            )?;
            db.create_habit(&habit)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List { category } => {
            let habits: Vec<Habit> = db
                .list_habits()?
                .into_iter()
                .filter(|h| category.as_ref().map_or(true, |c| &h.category == c))
                .collect();
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Get { id } => {
            let habit = load(&db, &id)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Update {
            id,
            title,
            category,
            frequency,
            days,
            anchor,
            times,
            color,
            description,
            icon,
        } => {
            let mut habit = load(&db, &id)?;
            let kind = frequency
                .or_else(|| (days.is_some() || anchor.is_some()).then(|| habit.rule.kind()));
            let rule = kind
                .map(|kind| {
                    build_rule(
                        kind,
                        days.as_deref(),
                        anchor.as_deref(),
                        local_date(habit.created_at),
                    )
                })
                .transpose()?;
            habit.apply(HabitUpdate {
                title,
                description,
                icon,
                category,
                rule,
                time_of_day: times,
                color,
            })?;
            db.update_habit(&habit)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Delete { id } => {
            db.delete_habit(&id)?;
            println!("Habit deleted: {id}");
        }
        HabitAction::Complete { id, date, undo } => {
            let date = date.unwrap_or_else(today);
            let state = db.set_completion(&id, date, !undo)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        HabitAction::Streak { id, as_of } => {
            let habit = load(&db, &id)?;
            let live_decay = Config::load()?.streaks.live_decay;
            let state = match as_of {
                Some(day) => habit.streaks_as_of(day),
                None if live_decay => habit.streaks_as_of(today()),
                None => habit.streaks(),
            };
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }
    Ok(())
}
