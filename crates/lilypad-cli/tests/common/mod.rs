//! Common utilities for CLI E2E tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Build a command for the CLI binary with an isolated data directory.
pub fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lilypad"));
    cmd.env("LILYPAD_DATA_DIR", data_dir).env_remove("RUST_LOG");
    cmd
}

/// Invoke a CLI command and return (stdout, stderr, exit code).
pub fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = cli(data_dir)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Invoke a CLI command and expect success.
pub fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(
        code, 0,
        "CLI command failed with code {}: {:?}\nstderr: {}",
        code, args, stderr
    );
    stdout
}

/// Invoke a CLI command and expect failure.
pub fn run_cli_failure(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert!(code != 0, "CLI command unexpectedly succeeded: {:?}", args);
    (stdout, stderr, code)
}

/// Start the interactive shell with piped stdin.
pub fn spawn_focus(data_dir: &Path, args: &[&str]) -> Child {
    cli(data_dir)
        .arg("focus")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn focus shell")
}

/// Send one line to a running shell.
pub fn send_line(child: &mut Child, line: &str) {
    let stdin = child.stdin.as_mut().expect("stdin not piped");
    writeln!(stdin, "{line}").expect("Failed to write to shell");
    stdin.flush().expect("Failed to flush shell stdin");
}

/// All habits as JSON values.
pub fn list_habits(data_dir: &Path) -> Vec<serde_json::Value> {
    let stdout = run_cli_success(data_dir, &["habit", "list", "--json"]);
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

/// Check if string contains substring
pub fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "Expected '{}' to contain '{}'",
        haystack,
        needle
    );
}
