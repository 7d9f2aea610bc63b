use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const ENDL_DATA: &str = r#"
{
  "atomicNumber": 13,
  "elasticEnergyGrid": [1e-5, 1e5],
  "cutoffElasticCrossSection": [2.0, 1.0],
  "totalElasticCrossSection": [2.0, 1.0],
  "cutoffElasticAngularEnergyGrid": [1e-5, 1e5],
  "cutoffElasticAngles": [
    { "energy": 1e-5, "values": [1e-6, 2.0] },
    { "energy": 1e5, "values": [1e-6, 2.0] }
  ],
  "cutoffElasticPdf": [
    { "energy": 1e-5, "values": [0.5, 0.5] },
    { "energy": 1e5, "values": [0.5, 0.5] }
  ]
}
"#;

fn native_data(grid_policy: &str) -> String {
    format!(
        r#"
        {{
          "atomicNumber": 79,
          "electronEnergyGrid": [1e-5, 1.0, 1e5],
          "cutoffElasticCrossSection": [3.0, 2.0, 1.0],
          "totalElasticCrossSection": [3.0, 2.5, 2.0],
          "elasticAngularEnergyGrid": [1e-5, 1e5],
          "cutoffElasticAngles": [
            {{ "energy": 1e-5, "values": [-1.0, 0.0, 0.999999] }},
            {{ "energy": 1e5, "values": [-1.0, 0.0, 0.999999] }}
          ],
          "cutoffElasticPdf": [
            {{ "energy": 1e-5, "values": [0.5, 0.5, 0.5] }},
            {{ "energy": 1e5, "values": [0.1, 0.4, 1.2] }}
          ],
          "minElectronEnergy": 1e-5,
          "maxElectronEnergy": 1e5,
          "cutoffAngleCosine": 0.9,
          "numberOfMomentPreservingAngles": 1,
          "electronTabularEvaluationTolerance": 1e-7,
          "electronTwoDGridPolicy": "{grid_policy}",
          "electronTwoDInterpPolicy": "Log-Log-Log"
        }}
        "#
    )
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent directory should be created");
    }
    fs::write(path, content).expect("file should be written");
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_elastic-datagen"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("elastic-datagen should run")
}

fn read_json(path: &Path) -> Value {
    let content = fs::read_to_string(path).expect("output should be readable");
    serde_json::from_str(&content).expect("output should be valid JSON")
}

#[test]
fn evaluate_writes_secondary_distribution_json() {
    let temp = TempDir::new().expect("tempdir should be created");
    let data_path = temp.path().join("endl.json");
    let output_path = temp.path().join("out/elastic.json");
    write_file(&data_path, ENDL_DATA);
    write_file(
        &temp.path().join("config.json"),
        r#"{ "numberOfMomentPreservingAngles": 1 }"#,
    );

    let output = run_cli(&[
        "evaluate",
        "--format",
        "endl",
        "--data",
        data_path.to_str().expect("path should be UTF-8"),
        "--config",
        temp.path()
            .join("config.json")
            .to_str()
            .expect("path should be UTF-8"),
        "--output",
        output_path.to_str().expect("path should be UTF-8"),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let result = read_json(&output_path);
    assert_eq!(result["angularEnergyGrid"], serde_json::json!([1e-5, 1e5]));
    assert_eq!(result["elasticAngle"][0]["values"], serde_json::json!([-1.0, 0.999999]));
    let reductions = result["momentPreservingCrossSectionReduction"]
        .as_array()
        .expect("reductions should be an array");
    assert_eq!(reductions.len(), 2);
    let angle = result["momentPreservingAngles"][0]["values"][0]
        .as_f64()
        .expect("angle should be a number");
    assert!((angle - 0.933_333_333_3).abs() < 1e-9, "angle {angle}");
}

#[test]
fn evaluate_prints_to_stdout_for_basic_native_data() {
    let temp = TempDir::new().expect("tempdir should be created");
    let data_path = temp.path().join("native.json");
    write_file(&data_path, &native_data("Unit-base Correlated"));

    let output = run_cli(&[
        "evaluate",
        "--format",
        "native",
        "--basic",
        "--data",
        data_path.to_str().expect("path should be UTF-8"),
        "--grid",
        "1e-5,1.0,1e5",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let result: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(result["angularEnergyGrid"], serde_json::json!([1e-5, 1.0, 1e5]));
    assert_eq!(
        result["momentPreservingWeights"]
            .as_array()
            .map(Vec::len),
        Some(3)
    );
}

#[test]
fn unsupported_policy_exits_with_input_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    let data_path = temp.path().join("native.json");
    write_file(&data_path, &native_data("Histogram"));

    let output = run_cli(&[
        "evaluate",
        "--format",
        "native",
        "--basic",
        "--data",
        data_path.to_str().expect("path should be UTF-8"),
    ]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(
            "ERROR: [INPUT.ELASTIC_CONFIGURATION] the desired 2D grid policy 'Histogram' is currently not supported"
        ),
        "stderr: {stderr}"
    );
}

#[test]
fn missing_data_file_exits_with_io_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    let output = run_cli(&[
        "evaluate",
        "--format",
        "endl",
        "--data",
        temp.path()
            .join("absent.json")
            .to_str()
            .expect("path should be UTF-8"),
    ]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("[IO.ELASTIC_DATA]"));
}

#[test]
fn usage_errors_exit_with_input_error() {
    let output = run_cli(&["interpolate"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("[INPUT.CLI_USAGE]"));

    let temp = TempDir::new().expect("tempdir should be created");
    let data_path = temp.path().join("endl.json");
    write_file(&data_path, ENDL_DATA);
    let output = run_cli(&[
        "evaluate",
        "--format",
        "endl",
        "--basic",
        "--data",
        data_path.to_str().expect("path should be UTF-8"),
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn rutherford_reports_threshold_and_tail() {
    let temp = TempDir::new().expect("tempdir should be created");
    let data_path = temp.path().join("native.json");
    write_file(&data_path, &native_data("Direct"));

    let output = run_cli(&[
        "rutherford",
        "--data",
        data_path.to_str().expect("path should be UTF-8"),
        "--tolerance",
        "1e-6",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["thresholdIndex"], 1);
    assert_eq!(report["thresholdEnergy"], 1.0);
    assert_eq!(report["crossSection"], serde_json::json!([0.5, 1.0]));
}

#[test]
fn help_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("evaluate"));
    assert!(stdout.contains("rutherford"));
}
