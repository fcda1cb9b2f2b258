use std::path::{Path, PathBuf};
use std::process::Command;

fn temp_workspace(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("defectlab-cli-{name}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&root).expect("create temp workspace");
    root
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join(name)
}

fn run_cli(ws: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_defectlab"))
        .current_dir(ws)
        .args(args)
        .output()
        .expect("run cli")
}

fn stdout_json(out: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&out.stdout);
    serde_json::from_str(stdout.trim()).unwrap_or_else(|err| panic!("invalid json ({err}): {stdout}"))
}

#[test]
fn list_json_returns_whole_catalog() {
    let ws = temp_workspace("list");
    let out = run_cli(&ws, &["list", "--json"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let doc = stdout_json(&out);
    let rows = doc.as_array().expect("array");
    assert_eq!(rows.len(), 40);
    assert_eq!(rows[0]["id"], "crash_01");
    assert_eq!(rows[0]["complexityTier"], "C0");
}

#[test]
fn list_filters_by_category_and_glob() {
    let ws = temp_workspace("list-filter");
    let out = run_cli(&ws, &["list", "--category", "auth"]);
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.starts_with("auth"));
    assert!(text.contains("auth_04"));
    assert!(!text.contains("crash_01"));

    let out = run_cli(&ws, &["--json", "list", "--filter", "*_05"]);
    assert!(out.status.success());
    assert_eq!(stdout_json(&out).as_array().map(Vec::len), Some(8));
}

#[test]
fn show_prints_actions_and_hints() {
    let ws = temp_workspace("show");
    let out = run_cli(&ws, &["show", "crash_05", "--json"]);
    assert!(out.status.success());
    let doc = stdout_json(&out);
    assert_eq!(doc["category"], "crash");
    assert!(doc["hintSteps"].as_array().is_some_and(|h| !h.is_empty()));
    assert!(doc["actions"].as_array().expect("actions").iter().any(|a| a == "login"));
}

#[test]
fn exec_crash_exits_with_crash_code() {
    let ws = temp_workspace("exec-crash");
    let out = run_cli(&ws, &["exec", "crash_01", "--step", "primary", "--json"]);
    assert_eq!(out.status.code(), Some(4));
    let doc = stdout_json(&out);
    assert_eq!(doc["status"], "crash");
    assert_eq!(doc["finalView"]["view"], "faulted");
    assert_eq!(doc["finalView"]["faultMessage"], "profile is null: cannot read display name");
    assert!(ws.join(".defectlab").join("faults.json").exists());
}

#[test]
fn exec_runs_compact_steps() {
    let ws = temp_workspace("exec-steps");
    let out = run_cli(
        &ws,
        &[
            "exec",
            "no_response_03",
            "--step",
            "check",
            "--step",
            "primary",
            "--step",
            "advance:100ms",
        ],
    );
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("status=Pass"));
    assert!(text.contains("items=1"));
}

#[test]
fn unknown_scenario_is_a_usage_error() {
    let ws = temp_workspace("unknown");
    let out = run_cli(&ws, &["--json", "exec", "crash_99", "--step", "primary"]);
    assert_eq!(out.status.code(), Some(2));
    let doc = stdout_json(&out);
    assert_eq!(doc["status"], "error");
    assert_eq!(doc["code"], "scenario_not_found");

    let out = run_cli(&ws, &["exec", "crash_01", "--step", "jump"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown action"));
}

#[test]
fn run_script_exit_codes_follow_status() {
    let ws = temp_workspace("run");
    let pass = fixture_path("crash_02.script.json");
    let timeline = ws.join("out").join("crash_02.timeline.json");
    let out = run_cli(
        &ws,
        &[
            "run",
            pass.to_str().expect("utf8 path"),
            "--timeline",
            timeline.to_str().expect("utf8 path"),
        ],
    );
    assert_eq!(out.status.code(), Some(0), "stdout: {}", String::from_utf8_lossy(&out.stdout));
    assert!(timeline.exists());

    let fail = fixture_path("counter_only.script.json");
    let out = run_cli(&ws, &["run", fail.to_str().expect("utf8 path"), "--json"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout_json(&out)["status"], "fail");
}

#[test]
fn config_file_overrides_timings() {
    let ws = temp_workspace("config");
    std::fs::write(ws.join("defectlab.toml"), "[timings]\ntoast_flash_ms = 20\n").expect("write config");
    let out = run_cli(
        &ws,
        &["exec", "error_message_04", "--step", "primary", "--step", "advance:600ms", "--json"],
    );
    assert!(out.status.success());
    let doc = stdout_json(&out);
    assert_eq!(doc["finalView"]["snapshot"]["state"]["toast"]["expiresAtMs"], 620);
}

#[test]
fn version_reports_build_info() {
    let ws = temp_workspace("version");
    let out = run_cli(&ws, &["version", "--json"]);
    assert!(out.status.success());
    let doc = stdout_json(&out);
    assert_eq!(doc["defectlab"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(doc["scenarios"], 40);
}
