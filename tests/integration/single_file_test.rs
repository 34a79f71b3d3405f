//! Integration tests for the single-file tool

use predicates::prelude::*;
use serde_json::json;

use crate::helpers::{read_json, Workspace};

#[test]
fn default_output_sits_next_to_input() {
    let ws = Workspace::new();
    ws.add_fixture("water_opt_freq.log", "calc/water.log");

    ws.single()
        .arg("calc/water.log")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved: calc/water.cclib.json"));

    let record = read_json(&ws.path().join("calc/water.cclib.json"));
    assert_eq!(record["file"], "water.log");
    assert_eq!(record["nbasis"], 19);
    assert_eq!(record["mulliken_charges"], json!([-0.826210, 0.413105, 0.413105]));
    assert_eq!(record["zpe_au"], 0.021141);
    assert!(record.get("error").is_none());
}

#[test]
fn explicit_output_path() {
    let ws = Workspace::new();
    ws.add_fixture("water_opt_freq.log", "water.log");

    ws.single()
        .args(["water.log", "--out", "w.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved: w.json"));

    let record = read_json(&ws.path().join("w.json"));
    let dipole = &record["dipole_moment_debye"];
    assert_eq!(dipole["z"], -2.0956);
    assert!((dipole["total"].as_f64().unwrap() - 2.0956).abs() < 1e-12);
}

#[test]
fn unrecognised_file_fails() {
    let ws = Workspace::new();
    ws.add_fixture("not_a_log.log", "notes.log");

    ws.single()
        .arg("notes.log")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a recognised output log"));

    assert!(!ws.path().join("notes.cclib.json").exists());
}

#[test]
fn parse_error_fails() {
    let ws = Workspace::new();
    ws.add_fixture("truncated_scf.log", "broken.log");

    ws.single()
        .arg("broken.log")
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 7"));

    assert!(!ws.path().join("broken.cclib.json").exists());
}

#[test]
fn missing_logfile_argument_is_usage_error() {
    let ws = Workspace::new();

    ws.single()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<LOGFILE>"));
}
