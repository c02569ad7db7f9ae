//! Integration tests for the `agenda` CLI.
//!
//! Each test points the binary at a task file in a temp directory, runs it
//! as a subprocess, and verifies stdout and/or the file contents.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

/// Get the path to the built `agenda` binary.
fn agenda_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("agenda");
    path
}

/// Run `agenda` against the given task file, returning (stdout, stderr, success).
fn run(file: &std::path::Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(agenda_bin())
        .arg("-f")
        .arg(file)
        .args(args)
        .output()
        .expect("failed to run agenda binary");
    (
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
        output.status.success(),
    )
}

/// Ids in display order from `list --json`.
fn listed_ids(file: &std::path::Path, sort: &str) -> Vec<String> {
    let (stdout, _, ok) = run(file, &["list", "--sort", sort, "--json"]);
    assert!(ok, "list failed");
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    v["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn add_puts_new_tasks_first() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("agenda.json");

    let (_, _, ok) = run(&file, &["add", "first task"]);
    assert!(ok);
    let (_, _, ok) = run(&file, &["add", "second task", "--urgency", "high"]);
    assert!(ok);

    let (stdout, _, ok) = run(&file, &["list"]);
    assert!(ok);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("second task"), "newest should list first");
    assert!(lines[1].contains("first task"));
}

#[test]
fn positions_are_numeric_in_the_task_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("agenda.json");

    run(&file, &["add", "uno"]);
    run(&file, &["add", "dos"]);

    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert!(row["position"].is_number(), "position must round-trip numeric");
    }
    // first insert got the baseline, second got half of it
    let positions: Vec<f64> = rows.iter().map(|r| r["position"].as_f64().unwrap()).collect();
    assert!(positions.contains(&1000.0));
    assert!(positions.contains(&500.0));
}

#[test]
fn mv_reorders_within_displayed_order() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("agenda.json");

    run(&file, &["add", "c"]); // ends up last (oldest head-insert is lowest)
    run(&file, &["add", "b"]);
    run(&file, &["add", "a"]);

    let before = listed_ids(&file, "manual");
    // drag the last task onto the middle one
    let (stdout, _, ok) = run(&file, &["mv", &before[2], &before[1]]);
    assert!(ok, "mv failed: {stdout}");
    assert!(stdout.contains("moved"));

    let after = listed_ids(&file, "manual");
    assert_eq!(after, vec![before[0].clone(), before[2].clone(), before[1].clone()]);
}

#[test]
fn mv_accepts_unique_id_prefixes() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("agenda.json");

    run(&file, &["add", "x"]);
    run(&file, &["add", "y"]);
    let ids = listed_ids(&file, "manual");

    let (stdout, _, ok) = run(&file, &["mv", &ids[1][..8], &ids[0][..8]]);
    assert!(ok, "mv failed: {stdout}");
    assert_eq!(listed_ids(&file, "manual"), vec![ids[1].clone(), ids[0].clone()]);
}

#[test]
fn done_toggles_and_completed_sorts_last() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("agenda.json");

    run(&file, &["add", "stays open"]);
    run(&file, &["add", "gets done"]);
    let ids = listed_ids(&file, "manual");

    // "gets done" is first; completing it pushes it below the open task
    let (stdout, _, ok) = run(&file, &["done", &ids[0]]);
    assert!(ok);
    assert!(stdout.contains("completed"));

    let (stdout, _, _) = run(&file, &["list"]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("[ ]"));
    assert!(lines[0].contains("stays open"));
    assert!(lines[1].starts_with("[x]"));
    assert!(lines[1].contains("gets done"));
}

#[test]
fn list_by_urgency_orders_by_weight() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("agenda.json");

    run(&file, &["add", "relax", "--urgency", "low"]);
    run(&file, &["add", "deadline", "--urgency", "high"]);
    run(&file, &["add", "errand", "--urgency", "medium"]);

    let (stdout, _, ok) = run(&file, &["list", "--sort", "urgency"]);
    assert!(ok);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].contains("deadline"));
    assert!(lines[1].contains("errand"));
    assert!(lines[2].contains("relax"));
}

#[test]
fn legacy_file_is_repaired_on_first_load() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("agenda.json");

    // three records from before manual ordering existed: no position field
    fs::write(
        &file,
        r#"[
  {"id": "t2", "text": "middle", "urgency": "medium", "createdAt": 2000},
  {"id": "t1", "text": "oldest", "urgency": "low", "createdAt": 1000},
  {"id": "t3", "text": "newest", "urgency": "high", "createdAt": 3000}
]"#,
    )
    .unwrap();

    let (_, stderr, ok) = run(&file, &["list"]);
    assert!(ok);
    assert!(stderr.contains("repaired 3"));

    // the file now carries evenly spaced keys in creation order
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    let pos = |id: &str| {
        v.as_array()
            .unwrap()
            .iter()
            .find(|r| r["id"] == id)
            .unwrap()["position"]
            .as_f64()
            .unwrap()
    };
    assert_eq!(pos("t1"), 1000.0);
    assert_eq!(pos("t2"), 2000.0);
    assert_eq!(pos("t3"), 3000.0);

    // and a second run has nothing left to repair
    let (_, stderr, _) = run(&file, &["list"]);
    assert!(!stderr.contains("repaired"));
}

#[test]
fn legacy_short_ids_work_everywhere() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("agenda.json");

    // hand-written files predate uuid ids; nothing may assume 8+ chars
    fs::write(
        &file,
        r#"[
  {"id": "t1", "text": "vieja", "urgency": "low", "createdAt": 1000, "position": 1000},
  {"id": "t2", "text": "otra", "urgency": "medium", "createdAt": 2000, "position": 2000}
]"#,
    )
    .unwrap();

    let (stdout, stderr, ok) = run(&file, &["done", "t1"]);
    assert!(ok, "done failed: {stderr}");
    assert!(stdout.contains("completed t1"));

    let (stdout, _, ok) = run(&file, &["mv", "t2", "t1"]);
    assert!(ok);
    assert!(stdout.contains("moved t2"));

    let (stdout, _, ok) = run(&file, &["rm", "t1"]);
    assert!(ok);
    assert!(stdout.contains("deleted t1"));
}

#[test]
fn list_filter_matches_text_case_insensitively() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("agenda.json");

    run(&file, &["add", "Buy milk"]);
    run(&file, &["add", "buy stamps"]);
    run(&file, &["add", "walk the dog"]);

    let (stdout, _, ok) = run(&file, &["list", "--filter", "BUY"]);
    assert!(ok);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.to_lowercase().contains("buy")));

    let (stdout, _, ok) = run(&file, &["list", "--filter", "piano"]);
    assert!(ok);
    assert!(stdout.contains("no matching tasks"));
}

#[test]
fn rm_clear_and_stats() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("agenda.json");

    run(&file, &["add", "one"]);
    run(&file, &["add", "two"]);
    run(&file, &["add", "three"]);
    let ids = listed_ids(&file, "manual");

    let (stdout, _, ok) = run(&file, &["rm", &ids[0]]);
    assert!(ok);
    assert!(stdout.contains("deleted"));
    assert_eq!(listed_ids(&file, "manual").len(), 2);

    run(&file, &["done", &ids[1]]);
    let (stdout, _, _) = run(&file, &["stats"]);
    assert!(stdout.contains("1/2 done (50%)"));

    let (stdout, _, ok) = run(&file, &["clear", "--completed"]);
    assert!(ok);
    assert!(stdout.contains("deleted 1"));
    assert_eq!(listed_ids(&file, "manual").len(), 1);

    run(&file, &["clear"]);
    let (stdout, _, _) = run(&file, &["list"]);
    assert!(stdout.contains("no tasks"));
}

#[test]
fn unknown_id_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("agenda.json");
    run(&file, &["add", "solo"]);

    let (_, stderr, ok) = run(&file, &["done", "zzzz"]);
    assert!(!ok);
    assert!(stderr.contains("no task matching"));
}
