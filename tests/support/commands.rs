//! Command helper methods for Test.

use super::fixtures::{API_KEY, API_SECRET};
use super::Test;
use assert_cmd::Command;
use std::process::Output;

/// Variables that would leak settings from the developer's environment.
const SCRUBBED: &[&str] = &[
    "COURIER_API_KEY",
    "COURIER_API_SECRET",
    "COURIER_ENDPOINT",
    "COURIER_LOG",
    "XDG_CONFIG_HOME",
];

impl Test {
    /// Create a courier command isolated from the real environment.
    ///
    /// Returns a Command configured with:
    /// - HOME set to the temporary home directory
    /// - Current directory set to the test working directory
    /// - No courier variables inherited
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("courier").expect("failed to find courier binary");
        for name in SCRUBBED {
            cmd.env_remove(name);
        }
        cmd.env("HOME", self.home.path());
        // Windows uses USERPROFILE instead of HOME for home directory
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// A courier command with the default credential set.
    pub fn authed(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.env("COURIER_API_KEY", API_KEY);
        cmd.env("COURIER_API_SECRET", API_SECRET);
        cmd
    }

    /// Shortcut for `courier send` with credentials.
    pub fn send(&self, args: &[&str]) -> Output {
        self.authed()
            .arg("send")
            .args(args)
            .output()
            .expect("failed to run courier send")
    }

    /// Shortcut for `courier check` with credentials.
    pub fn check(&self, args: &[&str]) -> Output {
        self.authed()
            .arg("check")
            .args(args)
            .output()
            .expect("failed to run courier check")
    }
}
