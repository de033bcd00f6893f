//! End-to-end tests for the one-shot commands against a throwaway database

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn triagectl(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("triagectl").unwrap();
    cmd.current_dir(dir.path())
        .env("TRIAGECTL_CONFIG", dir.path().join("config.toml"))
        .env_remove("TRIAGECTL_DB")
        .env("RUST_LOG", "off")
        .arg("--db")
        .arg(dir.path().join("patients.db"));
    cmd
}

fn add(dir: &TempDir, name: &str, age: u32, severity: u32) {
    triagectl(dir)
        .args(["add", name, "--age", &age.to_string(), "--severity", &severity.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{} (severity {})", name, severity)));
}

fn json(cmd: &mut Command) -> Vec<Value> {
    let output = cmd.arg("--format").arg("json").output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn names(rows: &[Value]) -> Vec<&str> {
    rows.iter().map(|r| r["name"].as_str().unwrap()).collect()
}

// === Help ===

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    triagectl(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("queue"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("search"));
}

#[test]
fn test_add_help() {
    let dir = TempDir::new().unwrap();
    triagectl(&dir)
        .args(["add", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Urgency from 1 (low) to 5 (high)"));
}

// === Queue ===

#[test]
fn test_queue_orders_by_severity_then_arrival() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Bob", 50, 2);
    add(&dir, "Anna", 34, 5);
    add(&dir, "Juan", 61, 2);

    let rows = json(triagectl(&dir).arg("queue"));
    assert_eq!(names(&rows), vec!["Anna", "Bob", "Juan"]);
    assert_eq!(rows[2]["position"], 2);
    assert_eq!(rows[2]["est_wait_minutes"], 14);
    assert_eq!(rows[0]["status"], "waiting");
}

#[test]
fn test_queue_filter_keeps_positions() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Bob", 50, 2);
    add(&dir, "Anna", 34, 5);
    add(&dir, "Juan", 61, 2);

    let rows = json(triagectl(&dir).args(["queue", "--filter", "AN"]));
    assert_eq!(names(&rows), vec!["Anna", "Juan"]);
    assert_eq!(rows[1]["position"], 2);
}

#[test]
fn test_queue_table_shows_waited_column() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Anna", 34, 5);

    triagectl(&dir)
        .arg("queue")
        .assert()
        .success()
        .stdout(predicate::str::contains("Waited"))
        .stdout(predicate::str::contains("0 min"));
}

#[test]
fn test_empty_queue() {
    let dir = TempDir::new().unwrap();
    triagectl(&dir)
        .arg("queue")
        .assert()
        .success()
        .stdout(predicate::str::contains("No patients waiting"));

    triagectl(&dir)
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("Queue is empty"));
}

#[test]
fn test_next_serves_head_and_moves_to_history() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Bob", 50, 2);
    add(&dir, "Anna", 34, 5);

    triagectl(&dir)
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("Calling: Anna"));

    let waiting = json(triagectl(&dir).arg("queue"));
    assert_eq!(names(&waiting), vec!["Bob"]);

    let history = json(triagectl(&dir).arg("history"));
    assert_eq!(history.len(), 2);
    let anna = history.iter().find(|r| r["name"] == "Anna").unwrap();
    assert_eq!(anna["status"], "served");
}

#[test]
fn test_serve_by_id() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Anna", 34, 3);

    let id = json(triagectl(&dir).arg("queue"))[0]["id"].as_i64().unwrap();

    triagectl(&dir)
        .args(["serve", &id.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Served #{}", id)));

    // A second serve finds nothing waiting
    triagectl(&dir)
        .args(["serve", &id.to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No waiting patient"));
}

#[test]
fn test_clear_serves_everyone() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Anna", 34, 3);
    add(&dir, "Juan", 61, 1);

    triagectl(&dir)
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 waiting patient(s)"));

    assert!(json(triagectl(&dir).arg("queue")).is_empty());
    assert_eq!(json(triagectl(&dir).arg("history")).len(), 2);
}

// === Validation ===

#[test]
fn test_add_rejects_blank_name() {
    let dir = TempDir::new().unwrap();
    triagectl(&dir)
        .args(["add", "   ", "--severity", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid name"));

    assert!(json(triagectl(&dir).arg("queue")).is_empty());
}

#[test]
fn test_add_rejects_out_of_range_severity() {
    let dir = TempDir::new().unwrap();
    triagectl(&dir)
        .args(["add", "Anna", "--severity", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid severity"));
}

// === History and search ===

#[test]
fn test_history_limit() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Anna", 34, 3);
    add(&dir, "Juan", 61, 1);
    add(&dir, "Bob", 50, 2);

    assert_eq!(json(triagectl(&dir).args(["history", "--limit", "2"])).len(), 2);
    assert_eq!(json(triagectl(&dir).args(["history", "--limit", "0"])).len(), 3);
}

#[test]
fn test_search_is_case_insensitive_substring() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Anna", 34, 3);
    add(&dir, "Juan", 61, 1);
    add(&dir, "Bob", 50, 2);
    triagectl(&dir).arg("next").assert().success();

    let rows = json(triagectl(&dir).args(["search", "AN"]));
    let mut found = names(&rows);
    found.sort();
    assert_eq!(found, vec!["Anna", "Juan"]);
}

#[test]
fn test_search_treats_wildcards_literally() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Anna", 34, 3);

    triagectl(&dir)
        .args(["search", "%"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No patients matching '%'"));
}

// === Config ===

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = TempDir::new().unwrap();

    triagectl(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));
    assert!(dir.path().join("config.toml").exists());

    triagectl(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    triagectl(&dir).args(["config", "init", "--force"]).assert().success();
}

#[test]
fn test_config_show_reflects_db_override() {
    let dir = TempDir::new().unwrap();
    triagectl(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("minutes_per_patient = 7"))
        .stdout(predicate::str::contains("patients.db"));
}

#[test]
fn test_config_repairable_when_file_is_invalid() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[queue\nbroken = ").unwrap();

    triagectl(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    triagectl(&dir)
        .arg("queue")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));

    triagectl(&dir).args(["config", "init", "--force"]).assert().success();
    triagectl(&dir).arg("queue").assert().success();
}
