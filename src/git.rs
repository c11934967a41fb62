//! Thin wrappers around the system `git` binary.
//!
//! Using the system command means SSH keys, credential helpers and any
//! authentication configured in `~/.gitconfig` work without extra setup.
//! Every function runs git inside the checkout at `repo_path`.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use chrono::{DateTime, FixedOffset};
use log::debug;

use crate::error::{Error, Result};

/// Message older git versions print when a sparse checkout would leave an
/// empty working tree.
const SPARSE_EMPTY_MESSAGE: &str = "Sparse checkout leaves no entry on working directory";

/// Outcome of a forced checkout that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStatus {
    /// The requested revision is checked out.
    Done,
    /// The sparse allow-list excludes every file of the revision.
    SparseEmpty,
}

fn git(repo_path: &Path, args: &[&str]) -> Result<Output> {
    debug!("git {} (in {})", args.join(" "), repo_path.display());
    Command::new("git")
        .arg("-C")
        .arg(repo_path)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            path: repo_path.to_path_buf(),
            stderr: e.to_string(),
        })
}

/// Run git and return its trimmed stdout, failing on a non-zero exit.
fn run(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = git(repo_path, args)?;
    if !output.status.success() {
        return Err(command_error(repo_path, args, &output));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn command_error(repo_path: &Path, args: &[&str], output: &Output) -> Error {
    let stderr = String::from_utf8_lossy(&output.stderr);

    // Give a helpful message for the most common auth failures
    let stderr = if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        format!(
            "Authentication failed. Make sure the build has access to the repository \
             (SSH agent, credential helper or access token).\nError: {}",
            stderr.trim()
        )
    } else {
        stderr.trim().to_string()
    };

    Error::GitCommand {
        command: args.join(" "),
        path: repo_path.to_path_buf(),
        stderr,
    }
}

/// Create an empty repository at `repo_path`, creating the directory if
/// needed.
pub fn init(repo_path: &Path) -> Result<()> {
    fs::create_dir_all(repo_path)?;
    run(repo_path, &["init", "--quiet"]).map(|_| ())
}

pub fn set_config(repo_path: &Path, key: &str, value: &str) -> Result<()> {
    run(repo_path, &["config", key, value]).map(|_| ())
}

pub fn add_remote(repo_path: &Path, name: &str, url: &str) -> Result<()> {
    run(repo_path, &["remote", "add", name, url]).map(|_| ())
}

/// URL of remote `name`, or `None` if no such remote is configured.
pub fn remote_url(repo_path: &Path, name: &str) -> Result<Option<String>> {
    let key = format!("remote.{}.url", name);
    let args = ["config", "--get", key.as_str()];
    let output = git(repo_path, &args)?;
    match output.status.code() {
        Some(0) => Ok(Some(
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        )),
        // `git config --get` exits with 1 when the key is unset
        Some(1) => Ok(None),
        _ => Err(command_error(repo_path, &args, &output)),
    }
}

/// Depth-1 fetch of `branch` from `remote`, updating its remote-tracking
/// ref.
pub fn fetch_shallow(repo_path: &Path, remote: &str, branch: &str) -> Result<()> {
    run(repo_path, &["fetch", "--depth=1", remote, branch]).map(|_| ())
}

/// Discard local modifications of tracked files.
pub fn reset_hard(repo_path: &Path) -> Result<()> {
    run(repo_path, &["reset", "--hard", "--quiet"]).map(|_| ())
}

/// Force a checkout of `rev`, overwriting local modifications.
pub fn checkout_force(repo_path: &Path, rev: &str) -> Result<CheckoutStatus> {
    let args = ["checkout", "--force", "--quiet", rev];
    let output = git(repo_path, &args)?;
    if output.status.success() {
        return Ok(CheckoutStatus::Done);
    }
    if String::from_utf8_lossy(&output.stderr).contains(SPARSE_EMPTY_MESSAGE) {
        return Ok(CheckoutStatus::SparseEmpty);
    }
    Err(command_error(repo_path, &args, &output))
}

/// Whether the tree of `rev` contains anything under one of `paths`.
pub fn tree_has_any(repo_path: &Path, rev: &str, paths: &[String]) -> Result<bool> {
    let mut args = vec!["ls-tree", "-r", "--name-only", rev, "--"];
    args.extend(paths.iter().map(String::as_str));
    Ok(!run(repo_path, &args)?.is_empty())
}

/// Whether `rev` resolves to a commit in the local repository.
pub fn rev_exists(repo_path: &Path, rev: &str) -> bool {
    let spec = format!("{}^{{commit}}", rev);
    git(repo_path, &["rev-parse", "--verify", "--quiet", spec.as_str()])
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Committer timestamp of the commit `rev` points at.
pub fn commit_time(repo_path: &Path, rev: &str) -> Result<DateTime<FixedOffset>> {
    let stdout = run(repo_path, &["log", "-1", "--format=%cI", rev])?;
    Ok(DateTime::parse_from_rfc3339(&stdout)?)
}
