//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Streak display behavior (live decay)
//! - Calendar export planning (horizon, event length, reminder offset)
//! - Wall-clock times for the morning/afternoon/evening slots
//!
//! Configuration is stored at `~/.config/nudgely/config.toml`.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::habit::TimeSlot;

/// Streak-related preferences.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Report a streak as 0 once its last completion can no longer be
    /// continued today. Off by default: streaks only change on new completions.
    #[serde(default)]
    pub live_decay: bool,
}

/// Calendar export planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    #[serde(default = "default_event_duration_min")]
    pub event_duration_min: u32,
    #[serde(default = "default_reminder_offset_min")]
    pub reminder_offset_min: u32,
    #[serde(default = "default_morning", with = "hhmm")]
    pub morning: NaiveTime,
    #[serde(default = "default_afternoon", with = "hhmm")]
    pub afternoon: NaiveTime,
    #[serde(default = "default_evening", with = "hhmm")]
    pub evening: NaiveTime,
    /// Used when a habit has no time-of-day flag.
    #[serde(default = "default_slot", with = "hhmm")]
    pub default_slot: NaiveTime,
}

impl PlannerConfig {
    /// Upper bound for `horizon_days` (about ten years).
    pub const MAX_HORIZON_DAYS: u32 = 3660;

    pub fn slot_time(&self, slot: TimeSlot) -> NaiveTime {
        match slot {
            TimeSlot::Morning => self.morning,
            TimeSlot::Afternoon => self.afternoon,
            TimeSlot::Evening => self.evening,
            TimeSlot::Anytime => self.default_slot,
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/nudgely/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub streaks: StreakConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
}

// Default functions
fn default_horizon_days() -> u32 {
    30
}
fn default_event_duration_min() -> u32 {
    30
}
fn default_reminder_offset_min() -> u32 {
    5
}
fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}
fn default_morning() -> NaiveTime {
    hm(8, 0)
}
fn default_afternoon() -> NaiveTime {
    hm(14, 0)
}
fn default_evening() -> NaiveTime {
    hm(19, 0)
}
fn default_slot() -> NaiveTime {
    hm(9, 0)
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
            event_duration_min: default_event_duration_min(),
            reminder_offset_min: default_reminder_offset_min(),
            morning: default_morning(),
            afternoon: default_afternoon(),
            evening: default_evening(),
            default_slot: default_slot(),
        }
    }
}

/// `HH:MM` (de)serialization for wall-clock slots.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::error::ValidationError;

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(|_| {
            serde::de::Error::custom(ValidationError::InvalidTime {
                field: "planner slot",
                value: raw,
            })
        })
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location, inside [`data_dir`].
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "writing default configuration");
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving. The value is parsed
    /// according to the existing field's type.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        if updated.planner.horizon_days > PlannerConfig::MAX_HORIZON_DAYS {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!(
                    "horizon_days must be at most {}",
                    PlannerConfig::MAX_HORIZON_DAYS
                ),
            }
            .into());
        }
        *self = updated;
        Ok(())
    }

    /// Set a value by key and save to the default location.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value)?;
        self.save()
    }
}
