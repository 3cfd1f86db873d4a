use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Map, Value};
use std::path::Path;
use tempfile::TempDir;

const LANDMARKS: [(usize, f64, f64); 8] = [
    (11, 0.45, 0.3),
    (12, 0.55, 0.3),
    (23, 0.47, 0.5),
    (24, 0.53, 0.5),
    (25, 0.46, 0.7),
    (26, 0.54, 0.7),
    (27, 0.45, 0.9),
    (28, 0.55, 0.9),
];

/// 7 seconds at 30 fps with short turns
fn write_table(path: &Path) {
    let phases = [
        ("Sit-To-Stand", 30),
        ("Walk-From-Chair", 45),
        ("Turn-First", 30),
        ("Walk-To-Chair", 45),
        ("Turn-Second", 30),
        ("Stand-To-Sit", 30),
    ];

    let mut rows = Vec::new();
    let mut frame = 0u64;
    for (label, count) in phases {
        for _ in 0..count {
            let mut row = Map::new();
            row.insert("frame".into(), json!(frame));
            for (id, x, y) in LANDMARKS {
                row.insert(format!("x_{}", id), json!(x));
                row.insert(format!("y_{}", id), json!(y));
                row.insert(format!("z_{}", id), json!(0.0));
                row.insert(format!("visibility_{}", id), json!(0.9));
            }
            row.insert("raw_phase_label".into(), json!(label));
            rows.push(Value::Object(row));
            frame += 1;
        }
    }

    std::fs::write(path, serde_json::to_string(&rows).unwrap()).unwrap();
}

fn cli(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tug-analysis").unwrap();
    cmd.env("TUG_ANALYSIS_CONFIG", config_dir.path().join("config.toml"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("tug-analysis").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Timed Up and Go"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("classify"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("tug-analysis").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("tug-analysis"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = Command::cargo_bin("tug-analysis").unwrap();
    cmd.args(["completions", "bash"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("tug-analysis"));
}

#[test]
fn test_classify_slight() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["classify", "--total-time", "12.0", "--ratio", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Slight"))
        .stdout(predicate::str::contains("indicating slight mobility issues"));
}

#[test]
fn test_classify_json_output() {
    let dir = TempDir::new().unwrap();
    let output = cli(&dir)
        .args(["classify", "--total-time", "25.0", "--ratio", "0.8", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["level"], "Severe");
    assert_eq!(result["score"], 4);
}

#[test]
fn test_classify_requires_total_time() {
    let mut cmd = Command::cargo_bin("tug-analysis").unwrap();
    cmd.args(["classify", "--ratio", "0.5"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--total-time"));
}

#[test]
fn test_analyze_writes_artifacts_and_summary() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("patient_01.json");
    let output_dir = dir.path().join("out");
    let summary = dir.path().join("summary.json");
    write_table(&input);

    cli(&dir)
        .arg("analyze")
        .arg(&input)
        .arg("--output-dir")
        .arg(&output_dir)
        .arg("--summary")
        .arg(&summary)
        .assert()
        .success()
        .stdout(predicate::str::contains("patient_01"))
        .stdout(predicate::str::contains("Normal"));

    assert!(output_dir.join("patient_01_labeled.json").exists());
    assert!(output_dir.join("patient_01_metrics.json").exists());
    assert!(output_dir.join("patient_01_phase_durations.json").exists());
    assert!(output_dir.join("patient_01_processing_info.json").exists());

    let rows: Value = serde_json::from_str(&std::fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
}

#[test]
fn test_parallel_analyze_runs_share_summary() {
    let dir = TempDir::new().unwrap();
    let summary = dir.path().join("summary.json");

    let children: Vec<_> = (0..4)
        .map(|i| {
            let input = dir.path().join(format!("patient_{}.json", i));
            write_table(&input);
            std::process::Command::new(assert_cmd::cargo::cargo_bin("tug-analysis"))
                .env("TUG_ANALYSIS_CONFIG", dir.path().join("config.toml"))
                .arg("analyze")
                .arg(&input)
                .arg("--output-dir")
                .arg(dir.path().join("out"))
                .arg("--summary")
                .arg(&summary)
                .stdout(std::process::Stdio::null())
                .spawn()
                .unwrap()
        })
        .collect();
    for mut child in children {
        assert!(child.wait().unwrap().success());
    }

    let rows: Value = serde_json::from_str(&std::fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 4);
}

#[test]
fn test_analyze_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .arg("analyze")
        .arg(dir.path().join("absent.json"))
        .arg("--no-summary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load frame table"));
}

#[test]
fn test_batch_then_report() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("tables");
    std::fs::create_dir(&input_dir).unwrap();
    write_table(&input_dir.join("a.json"));
    write_table(&input_dir.join("b.json"));
    std::fs::write(input_dir.join("broken.json"), "{ not json").unwrap();
    let summary = dir.path().join("summary.json");
    let export = dir.path().join("report.json");

    cli(&dir)
        .arg("batch")
        .arg(&input_dir)
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .arg("--summary")
        .arg(&summary)
        .args(["--concurrency", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("broken"));

    cli(&dir)
        .arg("report")
        .arg("--summary")
        .arg(&summary)
        .arg("--export")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total tests:            2"));

    let report: Value = serde_json::from_str(&std::fs::read_to_string(&export).unwrap()).unwrap();
    assert_eq!(report["total_tests"], 2);
}

#[test]
fn test_report_without_summary() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .arg("report")
        .arg("--summary")
        .arg(dir.path().join("none.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No analyzed videos"));
}

#[test]
fn test_config_init_and_show() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");

    cli(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration initialized"));
    assert!(config_path.exists());

    cli(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    cli(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("min_persistence"));
}
