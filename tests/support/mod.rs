//! Test support utilities for gpgpad integration tests.
//!
//! Provides isolated CLI environments, an in-memory keyring provider,
//! and the shared alice/bob fixtures.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod keyring;
pub mod skip;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use keyring::FakeKeyring;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Every command gets its own settings file through `GPGPAD_CONFIG`, so
/// tests never touch the user's config and can run in parallel.
pub struct Test {
    /// Working directory for documents
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
}

impl Test {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");
        Self { dir, home }
    }

    /// Environment whose settings point at a gpg binary that does not exist.
    pub fn without_gpg() -> Self {
        let t = Self::new();
        t.write_config("[gpg]\nbinary = \"gpgpad-test-no-such-gpg\"\n");
        t
    }

    /// Settings file used by every command of this environment.
    pub fn config_path(&self) -> PathBuf {
        self.home.path().join("gpgpad").join("config.toml")
    }

    pub fn write_config(&self, contents: &str) {
        let path = self.config_path();
        std::fs::create_dir_all(path.parent().expect("config has a parent"))
            .expect("failed to create config dir");
        std::fs::write(path, contents).expect("failed to write config");
    }

    pub fn read_config(&self) -> String {
        std::fs::read_to_string(self.config_path()).unwrap_or_default()
    }

    /// Write a document into the working directory.
    pub fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("failed to write document");
        path
    }

    pub fn read(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.dir.path().join(name)).expect("failed to read document")
    }

    pub fn exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }
}
