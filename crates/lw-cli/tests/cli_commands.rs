//! Integration tests for the `lw` binary.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Create a temp directory with a small but complete lore book.
fn test_book() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.json");
    fs::write(
        &path,
        r#"{
    "rules": [
        { "keywords": ["hello"], "personality": "Hi back!", "priority": 4 },
        { "tag": "mood_dark", "scenario": "Shadows lengthen.", "group": "mood" },
        { "keywords": ["storm"], "triggers": ["mood_dark"] },
        { "prev.keywords": ["question"], "personality": "Still thinking it over." },
        { "keywords": ["char.marcus"], "personality": "Marcus stiffens." }
    ],
    "entities": {
        "marcus": { "gender": "M", "aliases": ["the captain"] },
        "elara": { "gender": "F" }
    },
    "relationships": [
        {
            "pair": ["marcus", "elara"],
            "requireTags": ["mood_dark"],
            "injection": "They do not speak of the shipwreck."
        }
    ]
}"#,
    )
    .unwrap();
    (dir, path)
}

fn lw() -> Command {
    Command::cargo_bin("lw").unwrap()
}

#[test]
fn run_prints_matching_fragments() {
    let (_dir, book) = test_book();
    lw().args(["run", "--book"])
        .arg(&book)
        .args(["--message", "hello there"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hi back!"))
        .stdout(predicate::str::contains("1 rule selected"));
}

#[test]
fn run_reports_fired_tags_and_entities() {
    let (_dir, book) = test_book();
    lw().args(["run", "--book"])
        .arg(&book)
        .args(["--message", "Marcus and Elara watch the storm roll in."])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shadows lengthen."))
        .stdout(predicate::str::contains("Marcus stiffens."))
        .stdout(predicate::str::contains("They do not speak of the shipwreck."))
        .stdout(predicate::str::contains("tags: mood_dark"))
        .stdout(predicate::str::contains("active: elara, marcus"));
}

#[test]
fn run_uses_history_for_previous_turn_gates() {
    let (dir, book) = test_book();
    let history = dir.path().join("history.txt");
    fs::write(&history, "I have a question about the map\n").unwrap();
    lw().args(["run", "--book"])
        .arg(&book)
        .args(["--message", "never mind"])
        .arg("--history")
        .arg(&history)
        .assert()
        .success()
        .stdout(predicate::str::contains("Still thinking it over."));
}

#[test]
fn run_alias_counts_as_mention() {
    let (_dir, book) = test_book();
    lw().args(["run", "--book"])
        .arg(&book)
        .args(["--message", "the captain says hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Marcus stiffens."))
        .stdout(predicate::str::contains("active: marcus"));
}

#[test]
fn run_empty_buffers_are_labelled() {
    let (_dir, book) = test_book();
    lw().args(["run", "--book"])
        .arg(&book)
        .args(["--message", "nothing relevant at all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(empty)"));
}

#[test]
fn run_debug_prints_trace_lines() {
    let (_dir, book) = test_book();
    lw().args(["run", "--book"])
        .arg(&book)
        .args(["--message", "hello", "--debug"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dbg"));
}

#[test]
fn check_reports_counts() {
    let (_dir, book) = test_book();
    lw().args(["check", "--book"])
        .arg(&book)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 rules, 2 entities, 1 relationships"))
        .stdout(predicate::str::contains("compiled cleanly"));
}

#[test]
fn check_surfaces_compile_notes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.json");
    fs::write(&path, r#"{ "rules": [{ "keywords": ["char.ghost"] }] }"#).unwrap();
    lw().args(["check", "--book"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("note:"))
        .stdout(predicate::str::contains("char.ghost"));
}

#[test]
fn list_shows_rule_table() {
    let (_dir, book) = test_book();
    lw().args(["list", "--book"])
        .arg(&book)
        .assert()
        .success()
        .stdout(predicate::str::contains("mood_dark"))
        .stdout(predicate::str::contains("tag-only"))
        .stdout(predicate::str::contains("5 rules"));
}

#[test]
fn missing_book_fails() {
    lw().args(["run", "--book", "/no/such/book.json", "--message", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read lore book"));
}

#[test]
fn malformed_book_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.json");
    fs::write(&path, "{ not json").unwrap();
    lw().args(["check", "--book"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse lore book"));
}
