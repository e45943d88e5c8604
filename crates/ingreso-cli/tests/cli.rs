use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FORM_JSON: &str = r#"{
  "fullText": "NOMBRE: JUANA PEREZ SOTO\nRUT 7.654.321-6\n68 AÑOS\nASEGURADOR/PLAN: FONASA/TRAMO B\nINGRESO: 02/11/2025\nCAMA: B204",
  "blocks": [
    {"text": "NOMBRE: JUANA PEREZ SOTO"},
    {"text": "RUT 7.654.321-6"},
    {"text": "68 AÑOS"},
    {"text": "ASEGURADOR/PLAN: FONASA/TRAMO B"},
    {"text": "INGRESO: 02/11/2025"},
    {"text": "CAMA: B204"}
  ]
}"#;

/// Workspace with an empty config file so the user's own config is never read.
fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();
    (dir, config)
}

fn ingreso(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ingreso").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn parse_json_input() {
    let (dir, config) = workspace();
    let input = dir.path().join("form.json");
    fs::write(&input, FORM_JSON).unwrap();

    ingreso(&config)
        .args(["parse", "--reference-date", "2025-11-02"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""bed":"B204""#))
        .stdout(predicate::str::contains(r#""rut":"7.654.321-6""#))
        .stdout(predicate::str::contains(r#""missingFields":["diagnosis","service"]"#));
}

#[test]
fn parse_plain_text_as_csv() {
    let (dir, config) = workspace();
    let input = dir.path().join("form.txt");
    fs::write(
        &input,
        "PACIENTE: LUIS ARAYA MUÑOZ\nRUT 7654321-6\n45 AÑOS\nPIEZA 14",
    )
    .unwrap();

    ingreso(&config)
        .args(["parse", "--format", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "name,rut,age,prevision,admission_date,bed,overall_confidence,review,missing_fields,rut_canonical\n",
        ))
        .stdout(predicate::str::contains("LUIS ARAYA MUÑOZ,7654321-6,45,,,14,"))
        .stdout(predicate::str::contains(",7.654.321-6\n"));
}

#[test]
fn parse_writes_output_file() {
    let (dir, config) = workspace();
    let input = dir.path().join("form.json");
    let output = dir.path().join("out.json");
    fs::write(&input, FORM_JSON).unwrap();

    ingreso(&config)
        .args(["parse", "--reference-date", "2025-11-02", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains(r#""prevision":"Fonasa""#));
}

#[test]
fn parse_missing_file_fails() {
    let (dir, config) = workspace();

    ingreso(&config)
        .arg("parse")
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn parse_malformed_json_fails() {
    let (dir, config) = workspace();
    let input = dir.path().join("broken.json");
    fs::write(&input, "{ not json").unwrap();

    ingreso(&config).arg("parse").arg(&input).assert().failure();
}

#[test]
fn batch_writes_outputs_and_summary() {
    let (dir, config) = workspace();
    let forms = dir.path().join("forms");
    let out = dir.path().join("out");
    fs::create_dir_all(&forms).unwrap();
    fs::write(forms.join("a.json"), FORM_JSON).unwrap();
    fs::write(forms.join("b.txt"), "CAMA: 12").unwrap();
    fs::write(forms.join("ignored.md"), "CAMA: 99").unwrap();

    let pattern = format!("{}/*", forms.display());

    ingreso(&config)
        .args(["batch", "--summary", "--reference-date", "2025-11-02", "-j", "2"])
        .arg(&pattern)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    assert!(out.join("a.json").exists());
    assert!(out.join("b.json").exists());
    assert!(!out.join("ignored.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(
        lines[0],
        "filename,status,fields,confidence,warnings,processing_time_ms,error"
    );
    assert!(lines[1].starts_with("a.json,success,6,0.91,2,"));
    assert!(lines[2].starts_with("b.txt,success,1,"));
}

#[test]
fn batch_accepts_huge_job_count() {
    let (dir, config) = workspace();
    let forms = dir.path().join("forms");
    fs::create_dir_all(&forms).unwrap();
    fs::write(forms.join("a.txt"), "CAMA 12").unwrap();

    let pattern = format!("{}/*.txt", forms.display());

    ingreso(&config)
        .args(["batch", "-j", &usize::MAX.to_string()])
        .arg(&pattern)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful"));
}

#[test]
fn batch_continue_on_error() {
    let (dir, config) = workspace();
    fs::write(dir.path().join("good.txt"), "CAMA: 12").unwrap();
    fs::write(dir.path().join("bad.json"), "[1, 2").unwrap();

    let pattern = format!("{}/*.*", dir.path().display());

    ingreso(&config)
        .args(["batch", "--continue-on-error"])
        .arg(&pattern)
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed files:"));
}

#[test]
fn batch_no_matches_fails() {
    let (dir, config) = workspace();
    let pattern = format!("{}/forms/*.json", dir.path().display());

    ingreso(&config)
        .arg("batch")
        .arg(&pattern)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_init_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("settings").join("config.json");

    ingreso(&config)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(config.exists());

    ingreso(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    ingreso(&config)
        .args(["config", "set", "extraction.reference_date", "2025-11-02"])
        .assert()
        .success();

    ingreso(&config)
        .args(["config", "get", "extraction.reference_date"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"2025-11-02\""));

    ingreso(&config)
        .args(["config", "set", "extraction.review_threshold", "1.5"])
        .assert()
        .failure();

    ingreso(&config)
        .args(["config", "get", "extraction.unknown"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}
