mod config;
pub mod habit_db;

pub use config::{Config, PlannerConfig, StreakConfig};
pub use habit_db::HabitDb;

use std::path::PathBuf;

use crate::error::Result;

/// Overrides the data directory entirely (used by tests and portable installs).
pub const DATA_DIR_ENV: &str = "NUDGELY_DATA_DIR";

/// Returns `~/.config/nudgely[-dev]/` based on NUDGELY_ENV.
///
/// Set NUDGELY_ENV=dev to use the development data directory, or
/// NUDGELY_DATA_DIR to point somewhere else altogether.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(path) => PathBuf::from(path),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("NUDGELY_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("nudgely-dev")
            } else {
                base_dir.join("nudgely")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
