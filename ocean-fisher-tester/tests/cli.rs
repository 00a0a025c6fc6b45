use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "ocean-fisher-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_ocean-fisher-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("deterministic-replay"));
}

#[test]
fn cli_runs_smoke_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_ocean-fisher-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--scenarios",
            "smoke,idle-timeout",
            "--iterations",
            "1",
            "--seeds",
            "1,harbor-dawn",
            "--rounds",
            "3",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ocean Fisher Automated Tester"));

    let report = std::fs::read_to_string(output_path).expect("read report");
    let value: serde_json::Value = serde_json::from_str(&report).expect("json report");
    let scenarios = value["scenarios"].as_array().expect("scenario list");
    assert_eq!(scenarios.len(), 4);
    assert!(scenarios.iter().all(|s| s["passed"] == true));
    assert!(value["playthroughs"].as_array().is_some_and(|p| p.len() == 8));
}

#[test]
fn cli_drifting_variant_runs() {
    let exe = env!("CARGO_BIN_EXE_ocean-fisher-tester");
    let output = Command::new(exe)
        .args([
            "--variant",
            "drifting-target",
            "--scenarios",
            "smoke",
            "--iterations",
            "1",
            "--skip-playthrough",
        ])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Smoke Test"));
}

#[test]
fn cli_rejects_bad_seed() {
    let exe = env!("CARGO_BIN_EXE_ocean-fisher-tester");
    let output = Command::new(exe)
        .args(["--seeds", "not a seed!", "--skip-playthrough"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unrecognized seed token"));
}
