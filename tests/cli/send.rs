//! Tests for `courier send`.

use crate::support::service::FakeService;
use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_no_files_fails_without_network() {
    let t = Test::new();

    let output = t.send(&["--endpoint", "http://127.0.0.1:9"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no files were found");
    assert_stderr_contains(&output, "--include");
}

#[test]
fn test_excluded_everything_is_no_files() {
    let t = Test::with_files(&[("a.tmp", "x"), ("b.tmp", "y")]);

    let output = t.send(&["--exclude", "*.tmp", "--endpoint", "http://127.0.0.1:9"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no files were found");
}

#[test]
fn test_zero_life_rejected() {
    let t = Test::with_files(&[("a.txt", "x")]);

    let output = t.send(&["--life", "0"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid value for 'life'");
}

#[test]
fn test_invalid_pattern_rejected() {
    let t = Test::with_files(&[("a.txt", "x")]);

    let output = t.send(&["--include", "[z-a"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid pattern");
}

#[test]
fn test_missing_path_rejected() {
    let t = Test::new();

    let output = t.send(&["missing.bin"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "missing.bin");
}

#[test]
fn test_missing_credential_fails_before_upload() {
    let t = Test::with_files(&[("a.txt", "x")]);

    t.cmd()
        .args(["send", "--endpoint", "http://127.0.0.1:9"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_send_prints_link() {
    let service = FakeService::builder()
        .notifies(&["ops@example.com"])
        .start();
    let t = Test::with_files(&[("dist/app.bin", "binary"), ("dist/README.md", "docs")]);

    let output = t.send(&[
        "dist",
        "--recipients",
        "ops@example.com",
        "--life",
        "2",
        "--endpoint",
        service.endpoint(),
    ]);
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("Found 2 file(s) to upload."));
    assert!(out.contains("Updating package life for PKG-1 to 2."));
    assert!(out.contains("package finalized"));
    assert!(out.contains("#keyCode="));
    assert!(out.contains("ops@example.com"));

    assert_eq!(service.of("upload").len(), 2);
    assert_eq!(service.of("recipient").len(), 1);
}

#[test]
fn test_send_reports_service_failure() {
    let service = FakeService::builder()
        .reject("finalize", "APPROVER_REQUIRED", "approval pending")
        .start();
    let t = Test::with_files(&[("a.txt", "x")]);

    let output = t.send(&["--endpoint", service.endpoint()]);
    assert_failure(&output);
    assert_stderr_contains(&output, "approval pending");
    assert_stderr_contains(&output, "approver must release");
    assert_stdout_contains(&output, "was left unfinalized");
}

#[test]
fn test_send_failure_printed_once() {
    let service = FakeService::builder()
        .reject("upload", "LIMIT_EXCEEDED", "package quota reached")
        .start();
    let t = Test::with_files(&[("a.txt", "x")]);

    let output = t.send(&["--endpoint", service.endpoint()]);
    assert_failure(&output);

    let out = stdout(&output);
    let err = stderr(&output);
    assert!(!out.contains("package quota reached"), "stdout: {}", out);
    assert!(!out.contains("Upload failed"), "stdout: {}", out);
    assert_eq!(err.matches("package quota reached").count(), 1, "stderr: {}", err);
    assert_stdout_contains(&output, "was left unfinalized");
}
