//! Schedule queries and calendar planning.

use chrono::NaiveDate;
use clap::Subcommand;
use nudgely_core::storage::PlannerConfig;
use nudgely_core::{is_scheduled, plan_all, Config, HabitDb, RecurrenceKind};
use serde::Serialize;

use super::habit::build_rule;
use super::today;

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Habits scheduled on a date, earliest slot first
    Day {
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Evaluate a rule for a date without storing anything
    Check {
        /// Date to evaluate (YYYY-MM-DD)
        date: NaiveDate,
        /// Frequency: daily, weekly or monthly
        #[arg(long)]
        frequency: RecurrenceKind,
        /// Weekdays for weekly rules: indices (Sunday = 0) or weekdays/weekend/all
        #[arg(long)]
        days: Option<String>,
        /// Day of month for monthly rules (default: 1)
        #[arg(long)]
        anchor_day: Option<u32>,
    },
    /// Planned calendar events for all habits
    Plan {
        /// First day of the plan (YYYY-MM-DD, default: today)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Number of days to plan (default: planner.horizon_days)
        #[arg(
            long,
            value_parser = clap::value_parser!(u32).range(0..=i64::from(PlannerConfig::MAX_HORIZON_DAYS))
        )]
        days: Option<u32>,
    },
}

#[derive(Serialize)]
struct DueHabit<'a> {
    id: &'a str,
    title: &'a str,
    category: &'a str,
    rule: String,
    done: bool,
    current_streak: u32,
}

#[derive(Serialize)]
struct CheckResult {
    date: NaiveDate,
    rule: String,
    scheduled: bool,
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ScheduleAction::Day { date } => {
            let date = date.unwrap_or_else(today);
            let book = HabitDb::open()?.load_book()?;
            let live_decay = Config::load()?.streaks.live_decay;
            let due: Vec<DueHabit> = book
                .scheduled_on(date)
                .into_iter()
                .map(|h| DueHabit {
                    id: &h.id,
                    title: &h.title,
                    category: &h.category,
                    rule: h.rule.to_string(),
                    done: h.completion_on(date).unwrap_or(false),
                    current_streak: if live_decay {
                        h.streaks_as_of(date).current_streak
                    } else {
                        h.current_streak
                    },
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&due)?);
        }
        ScheduleAction::Check {
            date,
            frequency,
            days,
            anchor_day,
        } => {
            let anchor = anchor_day.map(|d| d.to_string());
            let rule = build_rule(frequency, days.as_deref(), anchor.as_deref(), date)?;
            let result = CheckResult {
                date,
                rule: rule.to_string(),
                scheduled: is_scheduled(&rule, date),
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        ScheduleAction::Plan { from, days } => {
            let mut planner = Config::load()?.planner;
            if let Some(days) = days {
                planner.horizon_days = days;
            }
            let habits = HabitDb::open()?.list_habits()?;
            let events = plan_all(&habits, from.unwrap_or_else(today), &planner);
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
    }
    Ok(())
}
