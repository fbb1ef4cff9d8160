//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify its JSON output.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    run_cli_with_env(data_dir, &[], args)
}

fn run_cli_with_env(
    data_dir: &Path,
    envs: &[(&str, &str)],
    args: &[&str],
) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_nudgely"))
        .args(args)
        .env("NUDGELY_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .envs(envs.iter().copied())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout is not JSON")
}

fn add_habit(data_dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["habit", "add"];
    full.extend_from_slice(args);
    let (code, stdout, stderr) = run_cli(data_dir, &full);
    assert_eq!(code, 0, "habit add failed: {stderr}");
    json(&stdout)["id"].as_str().unwrap().to_string()
}

#[test]
fn test_habit_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Read", "--category", "Learning"]);

    let (code, stdout, _) = run_cli(dir.path(), &["habit", "list"]);
    assert_eq!(code, 0);
    let habits = json(&stdout);
    let habits = habits.as_array().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["id"], id.as_str());
    assert_eq!(habits[0]["rule"]["kind"], "daily");
}

#[test]
fn test_habit_complete_reports_streak() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Walk"]);

    for date in ["2024-01-01", "2024-01-02", "2024-01-03"] {
        let (code, _, stderr) =
            run_cli(dir.path(), &["habit", "complete", &id, "--date", date]);
        assert_eq!(code, 0, "complete failed: {stderr}");
    }
    let (code, stdout, _) = run_cli(
        dir.path(),
        &["habit", "complete", &id, "--date", "2024-01-05"],
    );
    assert_eq!(code, 0);
    let state = json(&stdout);
    assert_eq!(state["current_streak"], 1);
    assert_eq!(state["best_streak"], 3);

    let (_, stdout, _) = run_cli(
        dir.path(),
        &["habit", "complete", &id, "--date", "2024-01-05", "--undo"],
    );
    assert_eq!(json(&stdout)["current_streak"], 3);
}

#[test]
fn test_habit_streak_as_of() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Journal"]);
    for date in ["2024-01-01", "2024-01-02"] {
        run_cli(dir.path(), &["habit", "complete", &id, "--date", date]);
    }

    let (_, stdout, _) = run_cli(dir.path(), &["habit", "streak", &id, "--as-of", "2024-01-03"]);
    assert_eq!(json(&stdout)["current_streak"], 2);

    let (_, stdout, _) = run_cli(dir.path(), &["habit", "streak", &id, "--as-of", "2024-01-10"]);
    let state = json(&stdout);
    assert_eq!(state["current_streak"], 0);
    assert_eq!(state["best_streak"], 2);
}

#[test]
fn test_weekly_habit_requires_days() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(
        dir.path(),
        &["habit", "add", "Gym", "--frequency", "weekly"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (code, _, _) = run_cli(
        dir.path(),
        &["habit", "add", "Gym", "--frequency", "weekly", "--days", "1,3,5"],
    );
    assert_eq!(code, 0);
}

#[test]
fn test_unknown_frequency_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["habit", "add", "Nap", "--frequency", "hourly"]);
    assert_ne!(code, 0);
}

#[test]
fn test_unknown_habit_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["habit", "get", "missing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_schedule_day_orders_by_slot() {
    let dir = tempfile::tempdir().unwrap();
    add_habit(dir.path(), &["Journal", "--times", "evening"]);
    add_habit(dir.path(), &["Stretch", "--times", "morning"]);
    add_habit(dir.path(), &["Pay rent", "--frequency", "monthly"]);

    let (code, stdout, _) = run_cli(dir.path(), &["schedule", "day", "--date", "2024-01-15"]);
    assert_eq!(code, 0);
    let titles: Vec<String> = json(&stdout)
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Stretch", "Journal"]);
}

#[test]
fn test_schedule_check() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        dir.path(),
        &["schedule", "check", "2024-01-01", "--frequency", "monthly"],
    );
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["scheduled"], true);

    let (_, stdout, _) = run_cli(
        dir.path(),
        &["schedule", "check", "2024-01-15", "--frequency", "monthly"],
    );
    assert_eq!(json(&stdout)["scheduled"], false);
}

#[test]
fn test_schedule_plan_uses_slot_times() {
    let dir = tempfile::tempdir().unwrap();
    add_habit(dir.path(), &["Stretch", "--times", "morning"]);

    let (code, stdout, _) = run_cli(
        dir.path(),
        &["schedule", "plan", "--from", "2024-01-01", "--days", "3"],
    );
    assert_eq!(code, 0);
    let events = json(&stdout);
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["start"], "2024-01-01T08:00:00");
    assert_eq!(events[0]["reminder_at"], "2024-01-01T07:55:00");
}

#[test]
fn test_category_add_delete() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["category", "add", "Chores"]);
    assert_eq!(code, 0);
    let (code, _, _) = run_cli(dir.path(), &["category", "add", "Chores"]);
    assert_ne!(code, 0);

    let (_, stdout, _) = run_cli(dir.path(), &["category", "list"]);
    assert!(json(&stdout)
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c == "Chores"));

    let (code, _, _) = run_cli(dir.path(), &["category", "delete", "Chores"]);
    assert_eq!(code, 0);
}

#[test]
fn test_config_set_get_reset() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["config", "set", "planner.morning", "07:30"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "planner.morning"]);
    assert_eq!(stdout.trim(), "07:30");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "planner.morning", "25:00"]);
    assert_ne!(code, 0);

    run_cli(dir.path(), &["config", "reset"]);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "planner.morning"]);
    assert_eq!(stdout.trim(), "08:00");
}

#[test]
fn test_created_anchor_matches_between_add_and_update() {
    // One of these zones is on a different calendar day than UTC at any hour.
    for tz in ["Etc/GMT+12", "Etc/GMT-14"] {
        let dir = tempfile::tempdir().unwrap();
        let env = [("TZ", tz)];
        let (code, stdout, stderr) = run_cli_with_env(
            dir.path(),
            &env,
            &["habit", "add", "Budget", "--frequency", "monthly", "--anchor", "created"],
        );
        assert_eq!(code, 0, "add failed: {stderr}");
        let added = json(&stdout);
        let id = added["id"].as_str().unwrap().to_string();

        let (code, stdout, stderr) = run_cli_with_env(
            dir.path(),
            &env,
            &["habit", "update", &id, "--frequency", "monthly", "--anchor", "created"],
        );
        assert_eq!(code, 0, "update failed: {stderr}");
        let updated = json(&stdout);
        assert_eq!(
            added["rule"]["anchor"]["day_of_month"],
            updated["rule"]["anchor"]["day_of_month"],
            "anchor day differs under TZ={tz}"
        );
    }
}

#[test]
fn test_live_decay_applies_to_streak_and_day_views() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Meditate"]);
    for date in ["2024-01-01", "2024-01-02"] {
        run_cli(dir.path(), &["habit", "complete", &id, "--date", date]);
    }

    let (_, stdout, _) = run_cli(dir.path(), &["habit", "streak", &id]);
    assert_eq!(json(&stdout)["current_streak"], 2);
    let (_, stdout, _) = run_cli(dir.path(), &["schedule", "day", "--date", "2024-01-10"]);
    assert_eq!(json(&stdout)[0]["current_streak"], 2);

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "streaks.live_decay", "true"]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(dir.path(), &["habit", "streak", &id]);
    let state = json(&stdout);
    assert_eq!(state["current_streak"], 0);
    assert_eq!(state["best_streak"], 2);

    let (_, stdout, _) = run_cli(dir.path(), &["schedule", "day", "--date", "2024-01-10"]);
    assert_eq!(json(&stdout)[0]["current_streak"], 0);
    let (_, stdout, _) = run_cli(dir.path(), &["schedule", "day", "--date", "2024-01-03"]);
    assert_eq!(json(&stdout)[0]["current_streak"], 2);
}

#[test]
fn test_habit_update_rule_recomputes_and_persists_streaks() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Swim"]);
    // Mon, Wed, Fri
    for date in ["2024-01-15", "2024-01-17", "2024-01-19"] {
        run_cli(dir.path(), &["habit", "complete", &id, "--date", date]);
    }
    let (_, stdout, _) = run_cli(dir.path(), &["habit", "get", &id]);
    assert_eq!(json(&stdout)["current_streak"], 1);

    let (code, stdout, stderr) = run_cli(
        dir.path(),
        &["habit", "update", &id, "--frequency", "weekly", "--days", "1,3,5", "--title", "Swim laps"],
    );
    assert_eq!(code, 0, "update failed: {stderr}");
    assert_eq!(json(&stdout)["current_streak"], 3);

    let (_, stdout, _) = run_cli(dir.path(), &["habit", "get", &id]);
    let stored = json(&stdout);
    assert_eq!(stored["title"], "Swim laps");
    assert_eq!(stored["rule"]["weekdays"], serde_json::json!([1, 3, 5]));
    assert_eq!(stored["current_streak"], 3);
    assert_eq!(stored["best_streak"], 3);
}

#[test]
fn test_habit_update_days_keeps_weekly_frequency() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Gym", "--frequency", "weekly", "--days", "1"]);

    let (code, stdout, _) = run_cli(dir.path(), &["habit", "update", &id, "--days", "weekend"]);
    assert_eq!(code, 0);
    let rule = &json(&stdout)["rule"];
    assert_eq!(rule["kind"], "weekly");
    assert_eq!(rule["weekdays"], serde_json::json!([0, 6]));

    let (code, _, stderr) = run_cli(dir.path(), &["habit", "update", &id, "--anchor", "15"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("--anchor"));

    let daily = add_habit(dir.path(), &["Floss"]);
    let (code, _, _) = run_cli(dir.path(), &["habit", "update", &daily, "--days", "1"]);
    assert_ne!(code, 0);
}

#[test]
fn test_habit_delete() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Nap"]);
    run_cli(dir.path(), &["habit", "complete", &id, "--date", "2024-01-01"]);

    let (code, stdout, _) = run_cli(dir.path(), &["habit", "delete", &id]);
    assert_eq!(code, 0);
    assert!(stdout.contains(&id));

    let (code, _, stderr) = run_cli(dir.path(), &["habit", "get", &id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));

    let (_, stdout, _) = run_cli(dir.path(), &["habit", "list"]);
    assert!(json(&stdout).as_array().unwrap().is_empty());

    let (code, _, _) = run_cli(dir.path(), &["habit", "delete", &id]);
    assert_eq!(code, 1);
}

#[test]
fn test_schedule_plan_rejects_oversized_horizon() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["schedule", "plan", "--days", "4000000000"]);
    assert_ne!(code, 0);

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "planner.horizon_days", "4000000000"]);
    assert_ne!(code, 0);
}
