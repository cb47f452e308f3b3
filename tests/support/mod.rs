//! Test support utilities for courier integration tests.
//!
//! Provides isolated CLI environments, a recording package client and a
//! fake package service speaking the HTTP protocol.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod service;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own working dir and home dir. No process-global
/// state is mutated; child processes use `.current_dir()` so tests can
/// run in parallel.
pub struct Test {
    /// Working directory of the command under test
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");

        Self { dir, home }
    }

    /// Create a test environment with the given files in its working dir.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let t = Self::new();
        for (name, contents) in files {
            t.write(name, contents);
        }
        t
    }

    /// Write a file relative to the working dir, creating parents.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, contents).expect("failed to write file");
        path
    }
}
