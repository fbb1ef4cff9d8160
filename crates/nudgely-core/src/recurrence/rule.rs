//! Recurrence rule types.
//!
//! A rule is a tagged union: each frequency carries only the fields it
//! needs, so a daily rule can never hold a stray weekday set.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Set of weekdays, indexed 0 (Sunday) ..= 6 (Saturday).
///
/// Serialized as a sorted list of indices, e.g. `[1, 3, 5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);
    pub const ALL: WeekdaySet = WeekdaySet(0x7F);
    /// Monday through Friday.
    pub const WORKDAYS: WeekdaySet = WeekdaySet(0b0011_1110);
    pub const WEEKEND: WeekdaySet = WeekdaySet(0b0100_0001);

    /// Build a set from weekday indices, rejecting anything outside 0-6.
    pub fn from_indices(days: impl IntoIterator<Item = u8>) -> Result<Self, ValidationError> {
        let mut mask = 0u8;
        for day in days {
            if day > 6 {
                return Err(ValidationError::WeekdayOutOfRange(day));
            }
            mask |= 1 << day;
        }
        Ok(Self(mask))
    }

    pub fn contains_index(&self, index: u32) -> bool {
        index < 7 && self.0 & (1 << index) != 0
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.contains_index(weekday.num_days_from_sunday())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Indices in ascending order (Sunday first).
    pub fn indices(&self) -> Vec<u8> {
        (0..7u8).filter(|i| self.0 & (1 << i) != 0).collect()
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = ValidationError;

    fn try_from(days: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_indices(days)
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(set: WeekdaySet) -> Self {
        set.indices()
    }
}

impl std::ops::BitOr for WeekdaySet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl FromStr for WeekdaySet {
    type Err = ValidationError;

    /// Parses a comma-separated list of indices (Sunday = 0) and the names
    /// `weekdays`, `weekend` and `all`, e.g. `weekend,3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = WeekdaySet::EMPTY;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            set = set
                | match part.to_ascii_lowercase().as_str() {
                    "weekdays" | "workdays" => WeekdaySet::WORKDAYS,
                    "weekend" => WeekdaySet::WEEKEND,
                    "all" => WeekdaySet::ALL,
                    other => {
                        let index: u8 = other
                            .parse()
                            .map_err(|_| ValidationError::UnknownWeekday(part.to_string()))?;
                        WeekdaySet::from_indices([index])?
                    }
                };
        }
        Ok(set)
    }
}

const SHORT_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .indices()
            .into_iter()
            .map(|i| SHORT_NAMES[i as usize])
            .collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Which day a monthly rule fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "MonthlyAnchorRepr")]
pub enum MonthlyAnchor {
    /// The 1st of every month.
    #[default]
    FirstOfMonth,
    /// A fixed day (1-31). Months shorter than the day fire on their last day.
    DayOfMonth(u32),
}

impl MonthlyAnchor {
    pub fn day_of_month(day: u32) -> Result<Self, ValidationError> {
        if (1..=31).contains(&day) {
            Ok(Self::DayOfMonth(day))
        } else {
            Err(ValidationError::DayOfMonthOutOfRange(day))
        }
    }

    /// Anchor on the day of month an activity was created.
    pub fn anniversary_of(created: NaiveDate) -> Self {
        Self::DayOfMonth(created.day())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum MonthlyAnchorRepr {
    FirstOfMonth,
    DayOfMonth(u32),
}

impl TryFrom<MonthlyAnchorRepr> for MonthlyAnchor {
    type Error = ValidationError;

    fn try_from(repr: MonthlyAnchorRepr) -> Result<Self, Self::Error> {
        match repr {
            MonthlyAnchorRepr::FirstOfMonth => Ok(Self::FirstOfMonth),
            MonthlyAnchorRepr::DayOfMonth(day) => Self::day_of_month(day),
        }
    }
}

/// When an activity repeats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecurrenceRule {
    #[default]
    Daily,
    Weekly {
        weekdays: WeekdaySet,
    },
    Monthly {
        #[serde(default)]
        anchor: MonthlyAnchor,
    },
}

impl RecurrenceRule {
    /// Weekly rule on the given weekday indices (Sunday = 0).
    pub fn weekly(days: impl IntoIterator<Item = u8>) -> Result<Self, ValidationError> {
        Ok(Self::Weekly {
            weekdays: WeekdaySet::from_indices(days)?,
        })
    }

    /// Monthly rule firing on the 1st.
    pub fn monthly() -> Self {
        Self::Monthly {
            anchor: MonthlyAnchor::FirstOfMonth,
        }
    }

    pub fn monthly_on(day: u32) -> Result<Self, ValidationError> {
        Ok(Self::Monthly {
            anchor: MonthlyAnchor::day_of_month(day)?,
        })
    }

    pub fn kind(&self) -> RecurrenceKind {
        match self {
            Self::Daily => RecurrenceKind::Daily,
            Self::Weekly { .. } => RecurrenceKind::Weekly,
            Self::Monthly { .. } => RecurrenceKind::Monthly,
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly { weekdays } if weekdays.is_empty() => write!(f, "weekly (no days)"),
            Self::Weekly { weekdays } => write!(f, "weekly on {weekdays}"),
            Self::Monthly {
                anchor: MonthlyAnchor::FirstOfMonth,
            } => write!(f, "monthly on the 1st"),
            Self::Monthly {
                anchor: MonthlyAnchor::DayOfMonth(day),
            } => write!(f, "monthly on day {day}"),
        }
    }
}

/// Frequency without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for RecurrenceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(ValidationError::UnknownKind(s.to_string())),
        }
    }
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        };
        f.write_str(name)
    }
}
