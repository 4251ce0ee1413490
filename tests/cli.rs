use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SOURCE: &str =
    "function f(x) {\nif (x == 1) { one(); }\nif (x == 2) { two(); }\nif (x == 3) { three(); }\n}\n";

fn write_input(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("input.js");
    fs::write(&path, SOURCE).expect("Failed to write input file");
    path
}

#[test]
fn test_refine_prints_cascade() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);

    Command::cargo_bin("elif-refine")
        .unwrap()
        .arg("refine")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("else if (x == 2)"));
}

#[test]
fn test_refine_writes_output_file_and_stats() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let output = dir.path().join("output.js");

    Command::cargo_bin("elif-refine")
        .unwrap()
        .arg("refine")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--stats")
        .assert()
        .success()
        .stderr(predicate::str::contains("\"cascades_built\": 1"));

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("else if (x == 3)"), "got: {}", written);
}

#[test]
fn test_analyze_reports_cascades() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);

    Command::cargo_bin("elif-refine")
        .unwrap()
        .arg("analyze")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 else-if cascade(s)"))
        .stdout(predicate::str::contains("3 statements at lines 2, 3, 4"));
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();

    Command::cargo_bin("elif-refine")
        .unwrap()
        .arg("refine")
        .arg(dir.path().join("missing.js"))
        .assert()
        .failure();
}
