//! Integration tests for the batch tool

use std::collections::BTreeSet;
use std::fs;

use predicates::prelude::*;
use serde_json::json;

use crate::helpers::{read_json, Workspace};

const AGGREGATE: &str = "out_molecules_json/out_molecules.json";

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn no_matches_prints_message_and_writes_nothing() {
    let ws = Workspace::new();
    for name in ["a.txt", "b.out", "c.dat"] {
        ws.add_file(&format!("logs/{name}"), "not a log");
    }

    ws.batch()
        .arg("logs")
        .assert()
        .success()
        .stdout(predicate::str::contains("No files matched '*.log' in"));

    assert!(!ws.path().join("out_molecules_json").exists());
}

#[test]
fn missing_input_directory_fails_before_output() {
    let ws = Workspace::new();

    ws.batch()
        .arg("does_not_exist")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input directory does not exist"));

    assert!(!ws.path().join("out_molecules_json").exists());
}

#[test]
fn default_input_directory_is_out_molecules() {
    let ws = Workspace::new();
    ws.add_fixture("water_opt_freq.log", "out_molecules/water.log");

    ws.batch()
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 records to"));

    let records = read_json(&ws.path().join(AGGREGATE));
    assert_eq!(records.as_array().unwrap().len(), 1);
}

#[test]
fn custom_pattern_selects_files() {
    let ws = Workspace::new();
    ws.add_fixture("water_opt_freq.log", "logs/water.out");
    ws.add_fixture("water_opt_freq.log", "logs/ignored.log");

    ws.batch().args(["logs", "-p", "*.out"]).assert().success();

    let records = read_json(&ws.path().join(AGGREGATE));
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["file"], "water.out");
}

// ============================================================================
// Aggregate mode
// ============================================================================

#[test]
fn unreadable_file_yields_error_record() {
    let ws = Workspace::new();
    ws.add_fixture("truncated_scf.log", "logs/broken.log");

    ws.batch().arg("logs").assert().success();

    let records = read_json(&ws.path().join(AGGREGATE));
    assert_eq!(
        records,
        json!([{"file": "broken.log", "error": "line 7: invalid number '-74.96##'"}])
    );
}

#[test]
fn mixed_batch_has_one_record_per_file() {
    let ws = Workspace::new();
    ws.add_fixture("water_opt_freq.log", "logs/water.log");
    ws.add_fixture("water_opt_freq.log", "logs/water_copy.log");
    ws.add_fixture("not_a_log.log", "logs/notes.log");
    ws.add_fixture("truncated_scf.log", "logs/broken.log");

    ws.batch()
        .args(["logs", "-j", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 records to"));

    let records = read_json(&ws.path().join(AGGREGATE));
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 4);

    let files: BTreeSet<_> = records.iter().map(|r| r["file"].as_str().unwrap()).collect();
    assert_eq!(
        files,
        BTreeSet::from(["broken.log", "notes.log", "water.log", "water_copy.log"])
    );

    for record in records {
        let object = record.as_object().unwrap();
        match object.get("error") {
            Some(_) => assert_eq!(object.len(), 2, "error record has extra keys: {record}"),
            None => assert!(object.contains_key("final_geometry_angstrom")),
        }
    }

    let notes = records.iter().find(|r| r["file"] == "notes.log").unwrap();
    assert_eq!(notes["error"], "failed to parse the file: not a recognised output log");
}

#[test]
fn parsed_record_reports_hartree_energies() {
    let ws = Workspace::new();
    ws.add_fixture("water_opt_freq.log", "logs/water.log");

    ws.batch().arg("logs").assert().success();

    let records = read_json(&ws.path().join(AGGREGATE));
    let water = &records[0];
    let energies: Vec<f64> = water["scf_energies_au"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_f64().unwrap())
        .collect();
    assert_eq!(energies.len(), 3);
    assert!((energies[2] - -76.4089641237).abs() < 1e-9);
    assert_eq!(water["final_scf_energy_au"].as_f64(), Some(energies[2]));
    assert_eq!(water["natoms"], 3);
    assert_eq!(water["multiplicity"], 1);
    assert_eq!(water["charge"], 0.0);
    assert_eq!(water["atom_numbers"], json!([8, 1, 1]));
    assert_eq!(
        water["vibrations"]["frequencies_cm-1"],
        json!([1713.1203, 3727.3746, 3849.1523])
    );
    assert_eq!(water["metadata"]["package"], "Gaussian");
}

#[test]
fn sort_flag_orders_by_file() {
    let ws = Workspace::new();
    for name in ["c.log", "a.log", "b.log"] {
        ws.add_fixture("water_opt_freq.log", &format!("logs/{name}"));
    }

    ws.batch().args(["logs", "--sort"]).assert().success();

    let records = read_json(&ws.path().join(AGGREGATE));
    let files: Vec<_> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["file"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(files, ["a.log", "b.log", "c.log"]);
}

#[test]
fn explicit_output_path_creates_parents() {
    let ws = Workspace::new();
    ws.add_fixture("water_opt_freq.log", "logs/water.log");

    ws.batch()
        .args(["logs", "-o", "results/run1/all.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("all.json"));

    let records = read_json(&ws.path().join("results/run1/all.json"));
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert!(!ws.path().join(AGGREGATE).exists());
}

#[test]
fn output_is_indented_with_trailing_newline() {
    let ws = Workspace::new();
    ws.add_fixture("truncated_scf.log", "logs/broken.log");

    ws.batch().arg("logs").assert().success();

    let text = fs::read_to_string(ws.path().join(AGGREGATE)).unwrap();
    assert_eq!(
        text,
        "[\n  {\n    \"file\": \"broken.log\",\n    \"error\": \"line 7: invalid number '-74.96##'\"\n  }\n]\n"
    );
}

// ============================================================================
// Separate mode
// ============================================================================

#[test]
fn separate_mode_writes_one_object_per_file() {
    let ws = Workspace::new();
    ws.add_fixture("water_opt_freq.log", "logs/water.log");
    ws.add_fixture("truncated_scf.log", "logs/broken.log");

    ws.batch()
        .args(["logs", "--separate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 records to"));

    let out = ws.path().join("out_molecules_json");
    let names: BTreeSet<_> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        BTreeSet::from(["broken.cclib.json".to_string(), "water.cclib.json".to_string()])
    );

    let water = read_json(&out.join("water.cclib.json"));
    assert!(water.is_object());
    assert_eq!(water["file"], "water.log");
    let broken = read_json(&out.join("broken.cclib.json"));
    assert_eq!(broken["file"], "broken.log");
    assert!(broken["error"].is_string());
    assert!(!out.join("out_molecules.json").exists());
}

// ============================================================================
// Logging and configuration
// ============================================================================

#[test]
fn log_files_record_progress_and_failures() {
    let ws = Workspace::new();
    ws.add_fixture("water_opt_freq.log", "logs/water.log");
    ws.add_fixture("truncated_scf.log", "logs/broken.log");

    ws.batch().arg("logs").assert().success();

    let info = fs::read_to_string(ws.path().join("parsing_info.log")).unwrap();
    assert!(info.contains("Found 2 files to process"));
    assert!(info.contains("Parsing completed successfully. Processed 2 files."));
    assert!(info.contains("skipping notification"));

    let errors = fs::read_to_string(ws.path().join("parsing_errors.log")).unwrap();
    assert!(errors.contains("Encountered error when parsing"));
    assert!(errors.contains("broken.log"));
    assert!(!errors.contains("Found 2 files"));
}

#[test]
fn config_file_supplies_defaults() {
    let ws = Workspace::new();
    ws.add_fixture("water_opt_freq.log", "runs/water.out");
    let config = ws.add_file(
        "gaussparse.toml",
        r#"
[input]
directory = "runs"
pattern = "*.out"

[output]
directory = "json"
aggregate_file = "everything.json"

[logging]
enabled = false
"#,
    );

    ws.batch()
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let records = read_json(&ws.path().join("json/everything.json"));
    assert_eq!(records[0]["file"], "water.out");
    assert!(!ws.path().join("parsing_info.log").exists());
}

#[test]
fn missing_config_file_is_an_error() {
    let ws = Workspace::new();

    ws.batch()
        .args(["--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.toml"));
}

// ============================================================================
// Help Output Tests
// ============================================================================

#[test]
fn help_lists_options() {
    let ws = Workspace::new();

    ws.batch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--separate"))
        .stdout(predicate::str::contains("--pattern"))
        .stdout(predicate::str::contains("[INPUT_DIR]"));
}

#[test]
fn version_prints_package_version() {
    let ws = Workspace::new();

    ws.batch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
