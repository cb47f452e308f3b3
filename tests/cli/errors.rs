//! Tests for error handling and CLI flags.

use crate::support::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("send"));
    assert!(out.contains("check"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "courier");
}

#[test]
fn test_verbose_flag_accepted() {
    let t = Test::new();

    let output = t.authed().args(["--verbose", "check"]).output().unwrap();
    assert_success(&output);
}

#[test]
fn test_malformed_config_file() {
    let t = Test::new();
    t.write("courier.toml", "[courier\nendpoint = ");

    let output = t.check(&[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config file");
}

#[test]
fn test_unknown_config_key() {
    let t = Test::new();
    t.write("courier.toml", "[courier]\nlifetime = 3\n");

    let output = t.check(&[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "lifetime");
}

#[test]
fn test_invalid_endpoint() {
    let t = Test::new();

    let output = t.check(&["--endpoint", "ftp://files.example.com"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "endpoint");
}

#[test]
fn test_missing_config_path() {
    let t = Test::new();

    let output = t.check(&["--config", "nowhere.toml"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to read config file");
}
