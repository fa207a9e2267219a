//! Integration tests for the kredis-cli binary.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::NamedTempFile;

const SNAPSHOT: &str = "\
07c37dfeb235213a872192d90877d0cd55635b91 127.0.0.1:30004@31004 slave e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca 0 1426238317239 4 connected
67ed2db8d677e59ec4a4cefb06858cf2a1a89fa1 127.0.0.1:30002@31002 master - 0 1426238316232 2 connected 5461-10922
292f8b365bb7edb5e285caf0b7e6ddc7265d2f4f 127.0.0.1:30003@31003 master - 0 1426238318243 3 connected 10923-16383
e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca 127.0.0.1:30001@31001 myself,master - 0 0 1 connected 0-5460
";

/// Runs the CLI with `args`, feeding `stdin` to it.
fn run_cli(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_kredis-cli"))
        .args(args)
        .arg("--no-color")
        .env("RUST_LOG", "error")
        .env_remove("KREDIS_SNAPSHOT")
        .env_remove("KREDIS_OUTPUT")
        .env_remove("KREDIS_MASTERS")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn kredis-cli");

    // the CLI may exit without reading stdin; a closed pipe is fine
    if let Some(mut pipe) = child.stdin.take() {
        let _ = pipe.write_all(stdin.as_bytes());
    }
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn snapshot_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn nodes_from_stdin_is_canonical() {
    let output = run_cli(&["nodes"], SNAPSHOT);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let expected = SNAPSHOT.trim_end().replace("myself,master", "master,myself");
    assert_eq!(stdout(&output).trim_end(), expected);
}

#[test]
fn nodes_output_parses_again() {
    let first = stdout(&run_cli(&["nodes"], SNAPSHOT));
    let second = stdout(&run_cli(&["nodes"], &first));
    assert_eq!(first, second);
}

#[test]
fn myself_from_file() {
    let file = snapshot_file(SNAPSHOT);
    let path = file.path().to_str().unwrap();

    let output = run_cli(&["myself", "--file", path], "");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca"), "got: {out}");
    assert!(out.contains("0-5460"), "got: {out}");
}

#[test]
fn myself_json() {
    let output = run_cli(&["myself", "--output", "json"], SNAPSHOT);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["kind"], "local_node");
    assert_eq!(value["data"]["id"], "e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca");
    assert_eq!(value["data"]["slots"].as_array().map(|s| s.len()), Some(5461));
}

#[test]
fn check_passes_for_full_coverage() {
    let output = run_cli(&["check"], SNAPSHOT);
    assert!(output.status.success(), "stdout: {}", stdout(&output));
    assert!(stdout(&output).contains("all slots covered"));
}

#[test]
fn check_fails_for_missing_slots() {
    let partial = SNAPSHOT.replace("0-5460", "0-5000");
    let output = run_cli(&["check"], &partial);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("5001-5460"));
}

#[test]
fn check_json_reports_coverage() {
    let output = run_cli(&["check", "--output", "json"], SNAPSHOT);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["node_count"], 4);
    assert_eq!(value["assigned_slots"], 16384);
    assert_eq!(value["uncovered"], serde_json::json!([]));
}

#[test]
fn check_json_fails_for_missing_slots() {
    let partial = SNAPSHOT.replace("0-5460", "0-5000");
    let output = run_cli(&["check", "--output", "json"], &partial);
    assert!(!output.status.success());

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["uncovered"][0]["start"], 5001);
    assert_eq!(value["uncovered"][0]["end"], 5460);
}

#[test]
fn keyslot_json() {
    let output = run_cli(&["keyslot", "foo", "--output", "json"], SNAPSHOT);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["kind"], "key_route");
    assert_eq!(value["data"]["slot"], 12182);
    assert_eq!(
        value["data"]["owner"]["id"],
        "292f8b365bb7edb5e285caf0b7e6ddc7265d2f4f"
    );
}

#[test]
fn keyslot_routes_to_owner() {
    let output = run_cli(&["keyslot", "foo"], SNAPSHOT);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "12182 292f8b365bb7edb5e285caf0b7e6ddc7265d2f4f 127.0.0.1:30003@31003"
    );
}

#[test]
fn slots_table() {
    let output = run_cli(&["slots"], SNAPSHOT);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert_eq!(out.lines().count(), 3);
    assert!(out.contains("slots:5461 replicas:1"), "got: {out}");
}

#[test]
fn masters_group() {
    let output = run_cli(&["masters", "redis-0, redis-1:7001"], "");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "redis-0:6379,redis-1:7001");
}

#[test]
fn masters_group_error_names_part() {
    let output = run_cli(&["masters", "a,b:1:2"], "");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("parsing part 1"), "got: {}", stderr(&output));
}

#[test]
fn malformed_snapshot_reports_line() {
    let text = format!("{SNAPSHOT}\nnot a node line\n");
    let output = run_cli(&["nodes"], &text);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("parsing line 5 of cluster nodes"), "got: {err}");
}

#[test]
fn snapshot_without_myself_is_rejected() {
    let text = SNAPSHOT.replace("myself,", "");
    let output = run_cli(&["nodes"], &text);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no `myself` node found"));
}

#[test]
fn unknown_output_mode() {
    let output = run_cli(&["nodes", "--output", "yaml"], SNAPSHOT);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown output mode"));
}
