//! Shared test utilities for integration and E2E tests.
//!
//! This module provides site fixtures and local git remotes so tests can
//! exercise real checkouts without network access.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let remote = LocalRemote::new(&[("docs/guide.md", "---\n---\n")]);
//!     let site = SiteFixture::new().with_file("_software/tool.md", &remote.software_index("Tool"));
//!     site.command().arg("sync").assert().success();
//! }
//! ```

#![allow(dead_code)]

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{LocalRemote, SiteFixture, COMMIT_DATE};
}

/// Committer date of every commit made by `LocalRemote`.
pub const COMMIT_DATE: &str = "2024-02-03T04:05:06+00:00";

/// A site source directory in a temporary location.
pub struct SiteFixture {
    temp_dir: assert_fs::TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `_config.yml` with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file("_config.yml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A `project-hub` command running against this site, isolated from
    /// the caller's environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("project-hub");
        cmd.current_dir(self.path())
            .env_remove("PROJECT_HUB_SOURCE")
            .env_remove("PROJECT_HUB_REFRESH")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for SiteFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A git repository on the local filesystem acting as a remote, with
/// `master` as its only branch.
pub struct LocalRemote {
    temp_dir: assert_fs::TempDir,
}

impl LocalRemote {
    /// Create a remote whose first commit contains `files`.
    pub fn new(files: &[(&str, &str)]) -> Self {
        let remote = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        };
        remote.git(&["init", "--quiet", "--initial-branch=master"]);
        remote.commit(files, "Initial commit");
        remote
    }

    /// Write `files` and commit them.
    pub fn commit(&self, files: &[(&str, &str)], message: &str) {
        for (path, content) in files {
            self.temp_dir
                .child(path)
                .write_str(content)
                .expect("Failed to write file");
        }
        self.git(&["add", "--all"]);
        self.git(&["commit", "--quiet", "--allow-empty", "-m", message]);
    }

    /// URL to use as `git_repo_url` / `repo_url`.
    pub fn url(&self) -> String {
        format!("file://{}", self.temp_dir.path().display())
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Front matter of a software index document pointing at this remote.
    pub fn software_index(&self, title: &str) -> String {
        format!("---\ntitle: {}\nrepo_url: {}\n---\n", title, self.url())
    }

    fn git(&self, args: &[&str]) {
        let status = Command::new("git")
            .arg("-C")
            .arg(self.temp_dir.path())
            .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .env("GIT_COMMITTER_DATE", COMMIT_DATE)
            .env("GIT_AUTHOR_DATE", COMMIT_DATE)
            .status()
            .expect("Failed to run git");
        assert!(status.success(), "git {:?} failed", args);
    }
}
