//! End-to-end tests for the `slate` binary.
//!
//! Each test runs `slate` as a subprocess against a plan in its own temp
//! directory. Every invocation opens the SQLite store, applies at most one
//! intent, and flushes before exiting, so later invocations observe the
//! earlier ones.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the slate binary, rooted in `dir`.
fn slate_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("slate"));
    cmd.current_dir(dir);
    cmd.arg("--root").arg(dir);
    // Keep tracing output off stderr so error assertions stay precise.
    cmd.env("SLATE_LOG", "error");
    cmd.env_remove("SLATE_FORMAT");
    cmd.env_remove("FORMAT");
    cmd
}

/// Initialize an empty plan (no seed catalog) in a fresh temp dir.
fn empty_plan() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    slate_cmd(dir.path())
        .args(["init", "--no-seed"])
        .assert()
        .success();
    dir
}

/// Run a command with `--json` and parse stdout.
fn json(dir: &Path, args: &[&str]) -> Value {
    let output = slate_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("slate should not crash");
    assert!(
        output.status.success(),
        "slate {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

/// Add a pool course with a fixed id.
fn add_course(dir: &Path, id: &str, code: &str, credits: &str) {
    let report = json(
        dir,
        &[
            "course", "add", "--id", id, "--code", code, "--name", code, "--credits", credits,
        ],
    );
    assert_eq!(report["applied"], true, "add {id}: {report}");
    assert_eq!(report["id"], id);
}

fn semester_courses(dir: &Path, semester: &str) -> Vec<String> {
    let rows = json(dir, &["semester", "list"]);
    rows.as_array()
        .expect("array")
        .iter()
        .find(|row| row["id"] == semester)
        .and_then(|row| row["courses"].as_array())
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[test]
fn init_creates_program_semesters_and_default_groups() {
    let dir = TempDir::new().expect("tempdir");
    let report = json(dir.path(), &["init", "--no-seed"]);
    assert_eq!(report["courses"], 0);
    assert_eq!(report["semesters"], 8);
    assert_eq!(report["groups"], 3);
    assert!(dir.path().join(".slate/slate.db").is_file());
    assert!(dir.path().join(".slate/config.toml").is_file());
}

#[test]
fn init_seeds_the_catalog_by_default() {
    let dir = TempDir::new().expect("tempdir");
    let report = json(dir.path(), &["init"]);
    assert_eq!(report["courses"], 35);

    let courses = json(dir.path(), &["course", "list"]);
    assert_eq!(courses.as_array().map(Vec::len), Some(35));
}

#[test]
fn second_init_without_force_fails() {
    let dir = empty_plan();
    slate_cmd(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn commands_before_init_report_not_initialized() {
    let dir = TempDir::new().expect("tempdir");
    slate_cmd(dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"))
        .stderr(predicate::str::contains("slate init"));
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

#[test]
fn place_move_and_unplace_round_trip_through_the_store() {
    let dir = empty_plan();
    let root = dir.path();
    add_course(root, "a", "COMP2011", "4");
    add_course(root, "b", "MATH1014", "3");

    let report = json(root, &["place", "fall-2024", "a", "b"]);
    assert_eq!(report["applied"], true);
    assert_eq!(report["affected"], 2);
    assert_eq!(semester_courses(root, "semester_2024_fall"), ["a", "b"]);

    let report = json(root, &["move", "Fall 2024", "spring-2025", "MATH1014"]);
    assert_eq!(report["applied"], true);
    assert_eq!(semester_courses(root, "semester_2024_fall"), ["a"]);
    assert_eq!(semester_courses(root, "semester_2025_spring"), ["b"]);

    let report = json(root, &["unplace", "semester_2025_spring", "b"]);
    assert_eq!(report["applied"], true);
    assert!(semester_courses(root, "semester_2025_spring").is_empty());

    let unplaced = json(root, &["course", "list", "--semester", "CREDIT_ONLY"]);
    assert_eq!(unplaced.as_array().map(Vec::len), Some(1));
    assert_eq!(unplaced[0]["id"], "b");
}

#[test]
fn placing_an_already_placed_course_is_unchanged() {
    let dir = empty_plan();
    let root = dir.path();
    add_course(root, "a", "COMP2011", "4");
    json(root, &["place", "fall-2024", "a"]);

    let report = json(root, &["place", "spring-2025", "a"]);
    assert_eq!(report["applied"], false);
    assert_eq!(report["reason"], "already_placed");
    assert_eq!(semester_courses(root, "semester_2024_fall"), ["a"]);
    assert!(semester_courses(root, "semester_2025_spring").is_empty());
}

#[test]
fn place_at_clamps_and_reorder_moves_by_index() {
    let dir = empty_plan();
    let root = dir.path();
    for id in ["a", "b", "c"] {
        add_course(root, id, &id.to_uppercase(), "3");
    }
    json(root, &["place", "fall-2024", "a"]);
    json(root, &["place", "fall-2024", "b"]);
    json(root, &["place", "fall-2024", "c", "--at", "99"]);
    assert_eq!(semester_courses(root, "semester_2024_fall"), ["a", "b", "c"]);

    let report = json(root, &["reorder", "fall-2024", "0", "2"]);
    assert_eq!(report["applied"], true);
    assert_eq!(semester_courses(root, "semester_2024_fall"), ["b", "c", "a"]);

    let report = json(root, &["reorder", "fall-2024", "--course", "a", "--course", "b", "--drop", "0"]);
    assert_eq!(report["affected"], 2);
    assert_eq!(semester_courses(root, "semester_2024_fall"), ["b", "a", "c"]);

    let report = json(root, &["reorder", "fall-2024", "0", "7"]);
    assert_eq!(report["reason"], "index_out_of_bounds");
}

// ---------------------------------------------------------------------------
// Semesters
// ---------------------------------------------------------------------------

#[test]
fn program_semesters_cannot_be_removed_but_extra_ones_can() {
    let dir = empty_plan();
    let root = dir.path();

    let report = json(root, &["semester", "remove", "fall-2024"]);
    assert_eq!(report["applied"], false);
    assert_eq!(report["reason"], "mandatory_semester");

    let report = json(root, &["semester", "add", "summer", "2025"]);
    assert_eq!(report["applied"], true);
    let summer = report["id"].as_str().expect("new id").to_string();
    assert!(summer.starts_with("semester_2025_summer_"));

    let duplicate = json(root, &["semester", "add", "Summer", "2025"]);
    assert_eq!(duplicate["reason"], "duplicate_semester");

    add_course(root, "a", "A100", "3");
    json(root, &["place", "summer-2025", "a"]);
    let report = json(root, &["semester", "remove", &summer]);
    assert_eq!(report["applied"], true);

    let rows = json(root, &["semester", "list"]);
    assert_eq!(rows.as_array().map(Vec::len), Some(8));
    let courses = json(root, &["course", "list", "--semester", "CREDIT_ONLY"]);
    assert_eq!(courses[0]["id"], "a");
}

#[test]
fn rename_trims_and_keeps_the_semester_findable_by_name() {
    let dir = empty_plan();
    let root = dir.path();
    let report = json(root, &["semester", "rename", "fall-2024", "  Year one  "]);
    assert_eq!(report["applied"], true);

    add_course(root, "a", "A100", "3");
    let report = json(root, &["place", "year one", "a"]);
    assert_eq!(report["applied"], true);
    assert_eq!(semester_courses(root, "semester_2024_fall"), ["a"]);
}

// ---------------------------------------------------------------------------
// Pool and aggregates
// ---------------------------------------------------------------------------

#[test]
fn status_counts_pool_courses_once_and_tracks_completion() {
    let dir = empty_plan();
    let root = dir.path();
    json(
        root,
        &[
            "course", "add", "--id", "a", "--code", "A100", "--name", "Alpha", "--credits", "4",
            "--req", "DSCT", "--into", "fall-2024",
        ],
    );
    add_course(root, "b", "B100", "3");

    let report = json(root, &["course", "done", "a", "b"]);
    assert_eq!(report["affected"], 2);
    let report = json(root, &["course", "done", "b", "--undo"]);
    assert_eq!(report["affected"], 1);

    let status = json(root, &["status"]);
    assert_eq!(status["courses"], 2);
    assert_eq!(status["placed"], 1);
    assert_eq!(status["credits"]["total"], 7);
    assert_eq!(status["credits"]["completed"], 4);
    let dsct = status["groups"]
        .as_array()
        .and_then(|groups| groups.iter().find(|g| g["id"] == "DSCT"))
        .expect("DSCT tally");
    assert_eq!(dsct["completed"], 4);
    assert_eq!(dsct["total"], 4);
}

#[test]
fn removing_a_course_cascades_out_of_its_semester() {
    let dir = empty_plan();
    let root = dir.path();
    add_course(root, "a", "A100", "3");
    json(root, &["place", "fall-2024", "a"]);

    let report = json(root, &["course", "remove", "a"]);
    assert_eq!(report["applied"], true);
    assert!(semester_courses(root, "semester_2024_fall").is_empty());

    slate_cmd(root)
        .args(["course", "show", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2001]"));
}

#[test]
fn invalid_course_fields_are_rejected_without_changes() {
    let dir = empty_plan();
    let root = dir.path();
    slate_cmd(root)
        .args(["course", "add", "--code", "  ", "--name", "Blank", "--credits", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2003"));
    slate_cmd(root)
        .args(["course", "add", "--code", "X1", "--name", "Heavy", "--credits", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid credits"));

    let courses = json(root, &["course", "list"]);
    assert_eq!(courses.as_array().map(Vec::len), Some(0));
}

#[test]
fn edit_and_show_course() {
    let dir = empty_plan();
    let root = dir.path();
    add_course(root, "a", "A100", "3");
    let report = json(
        root,
        &["course", "edit", "A100", "--name", " Renamed ", "--category", "elective", "--req", "CCC"],
    );
    assert_eq!(report["applied"], true);

    let course = json(root, &["course", "show", "a"]);
    assert_eq!(course["name"], "Renamed");
    assert_eq!(course["category"], "Electives");
    assert_eq!(course["requirements"], serde_json::json!(["CCC"]));
}

#[test]
fn search_finds_only_placed_courses() {
    let dir = empty_plan();
    let root = dir.path();
    add_course(root, "a", "COMP2011", "4");
    add_course(root, "b", "COMP3111", "4");
    json(root, &["place", "fall-2025", "b"]);

    let hits = json(root, &["course", "search", "comp"]);
    assert_eq!(hits.as_array().map(Vec::len), Some(1));
    assert_eq!(hits[0]["id"], "b");
    assert_eq!(hits[0]["semester"], "Fall 2025");
}

// ---------------------------------------------------------------------------
// Requirement groups
// ---------------------------------------------------------------------------

#[test]
fn groups_add_reorder_and_validate_color() {
    let dir = empty_plan();
    let root = dir.path();
    let report = json(root, &["groups", "add", "MATH", "Mathematics", "--color", "#dc2626"]);
    assert_eq!(report["applied"], true);

    let report = json(root, &["groups", "reorder", "3", "0"]);
    assert_eq!(report["applied"], true);
    let groups = json(root, &["groups", "list"]);
    let ids: Vec<&str> = groups
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|g| g["id"].as_str())
        .collect();
    assert_eq!(ids, ["MATH", "DSCT", "COSC", "CCC"]);
    assert_eq!(groups[0]["display_order"], 1);

    slate_cmd(root)
        .args(["groups", "add", "BAD", "Bad", "--color", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid_color"));
}

// ---------------------------------------------------------------------------
// Output modes
// ---------------------------------------------------------------------------

#[test]
fn json_errors_are_wrapped_on_stderr() {
    let dir = empty_plan();
    let output = slate_cmd(dir.path())
        .args(["semester", "clear", "winter-2040", "--json"])
        .output()
        .expect("run");
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).expect("json error");
    assert_eq!(err["error"]["error_code"], "E2002");
}

#[test]
fn text_mode_prints_headers_and_rows() {
    let dir = empty_plan();
    slate_cmd(dir.path())
        .args(["--format", "text", "semester", "list"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ID  KIND  YEAR"))
        .stdout(predicate::str::contains("semester_2028_spring"));
}

#[test]
fn completions_generate_for_slate() {
    let dir = TempDir::new().expect("tempdir");
    slate_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slate"));
}
