//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a gpgpad command bound to this environment.
    ///
    /// Sets HOME, the settings path, and NO_COLOR, and runs in the
    /// document directory.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("gpgpad").expect("failed to find gpgpad binary");
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("GPGPAD_CONFIG", self.config_path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("GPGPAD_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run gpgpad")
    }

    /// Run with `stdin` piped in.
    pub fn run_with_stdin(&self, args: &[&str], stdin: &[u8]) -> Output {
        self.cmd()
            .args(args)
            .write_stdin(stdin.to_vec())
            .output()
            .expect("failed to run gpgpad")
    }

    pub fn detect(&self, name: &str) -> Output {
        self.run(&["detect", name])
    }
}
