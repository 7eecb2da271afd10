//! E2E tests for the interactive focus shell.

mod common;

use std::thread::sleep;
use std::time::Duration;

use common::*;

fn fast_ticks(dir: &std::path::Path) {
    run_cli_success(dir, &["config", "set", "timer.tick_interval_ms", "50"]);
}

fn only_habit_id(dir: &std::path::Path) -> String {
    list_habits(dir)[0]["id"].as_str().unwrap().to_string()
}

#[test]
fn test_shell_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = spawn_focus(dir.path(), &[]);
    send_line(&mut child, "add 30 Read a book");
    send_line(&mut child, "list");
    send_line(&mut child, "quit");
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_contains(&stdout, "Read a book");
    assert_eq!(list_habits(dir.path())[0]["name"], "Read a book");
}

#[test]
fn test_tracked_time_is_saved_on_stop() {
    let dir = tempfile::tempdir().unwrap();
    fast_ticks(dir.path());
    run_cli_success(dir.path(), &["habit", "add", "Read", "--goal", "30"]);
    let id = only_habit_id(dir.path());

    let mut child = spawn_focus(dir.path(), &[]);
    send_line(&mut child, &format!("track {id}"));
    sleep(Duration::from_millis(600));
    send_line(&mut child, "stop");
    send_line(&mut child, "quit");
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_contains(&stdout, "tracking Read");
    assert_contains(&stdout, "stopped Read");
    assert!(list_habits(dir.path())[0]["timeSpent"].as_u64().unwrap() > 0);
}

#[test]
fn test_paused_session_is_flushed_when_stdin_closes() {
    let dir = tempfile::tempdir().unwrap();
    fast_ticks(dir.path());
    run_cli_success(dir.path(), &["habit", "add", "Read", "--goal", "30"]);
    let id = only_habit_id(dir.path());

    let mut child = spawn_focus(dir.path(), &["--habit", id.as_str()]);
    sleep(Duration::from_millis(600));
    send_line(&mut child, "pause");
    sleep(Duration::from_millis(200));
    drop(child.stdin.take());
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let spent = list_habits(dir.path())[0]["timeSpent"].as_u64().unwrap();
    assert!(spent > 0);
}

#[test]
fn test_unknown_command_keeps_shell_alive() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = spawn_focus(dir.path(), &[]);
    send_line(&mut child, "dance");
    send_line(&mut child, "track missing");
    send_line(&mut child, "status");
    send_line(&mut child, "quit");
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_contains(&stderr, "unknown command");
    assert_contains(&stderr, "Habit not found");
    assert_contains(&stdout, "no active habit");
}
