//! # Shallow Sparse Checkout Engine
//!
//! This module provides the `RepositoryManager`, which materializes a
//! `RemoteSource` as a local shallow (depth 1), optionally sparse checkout
//! and reports the timestamp of the latest commit it checked out.
//!
//! ## Design
//!
//! Git access goes through the `GitOperations` trait. The application uses
//! `DefaultGitOperations`, which wraps the system `git` command (see
//! `crate::git`); tests substitute a mock to count network operations and
//! simulate failures without touching a real remote.
//!
//! ## Sync sequence
//!
//! 1.  Probe the cache entry at the target path. A missing entry is
//!     initialized: `git init`, the SSH command, the `origin` remote and, for
//!     sparse sources, the allow-list, all before the first fetch. An
//!     existing entry must already point at the same remote.
//! 2.  Ask the sync policy (`crate::policy`) how to proceed and run the plan:
//!     fetch + (reset) + forced checkout, or local checkout with a single
//!     fetch-and-retry on failure, or no git operation at all.
//! 3.  A checkout that leaves nothing of the declared subtrees is reported as
//!     `SyncStatus::SparseAbsent`, not as an error.
//! 4.  On success, the committer time of the checked-out commit is read.
//!
//! If an entry created by the current call fails to sync, its `.git`
//! metadata is removed again so no half-initialized entry survives.

use std::fs;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use log::{debug, info};

use crate::cache::CacheEntry;
use crate::config::{RefreshMode, RemoteSource};
use crate::defaults::{REMOTE_NAME, SSH_COMMAND};
use crate::error::{Error, Result};
pub use crate::git::CheckoutStatus;
use crate::policy::{self, SyncPlan};

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    fn init(&self, repo_path: &Path) -> Result<()>;

    fn set_config(&self, repo_path: &Path, key: &str, value: &str) -> Result<()>;

    fn add_remote(&self, repo_path: &Path, name: &str, url: &str) -> Result<()>;

    fn remote_url(&self, repo_path: &Path, name: &str) -> Result<Option<String>>;

    /// Depth-1 fetch of one branch. The only operation that uses the
    /// network.
    fn fetch_shallow(&self, repo_path: &Path, remote: &str, branch: &str) -> Result<()>;

    fn reset_hard(&self, repo_path: &Path) -> Result<()>;

    fn checkout_force(&self, repo_path: &Path, rev: &str) -> Result<CheckoutStatus>;

    fn tree_has_any(&self, repo_path: &Path, rev: &str, paths: &[String]) -> Result<bool>;

    fn rev_exists(&self, repo_path: &Path, rev: &str) -> bool;

    fn commit_time(&self, repo_path: &Path, rev: &str) -> Result<DateTime<FixedOffset>>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn init(&self, repo_path: &Path) -> Result<()> {
        crate::git::init(repo_path)
    }

    fn set_config(&self, repo_path: &Path, key: &str, value: &str) -> Result<()> {
        crate::git::set_config(repo_path, key, value)
    }

    fn add_remote(&self, repo_path: &Path, name: &str, url: &str) -> Result<()> {
        crate::git::add_remote(repo_path, name, url)
    }

    fn remote_url(&self, repo_path: &Path, name: &str) -> Result<Option<String>> {
        crate::git::remote_url(repo_path, name)
    }

    fn fetch_shallow(&self, repo_path: &Path, remote: &str, branch: &str) -> Result<()> {
        crate::git::fetch_shallow(repo_path, remote, branch)
    }

    fn reset_hard(&self, repo_path: &Path) -> Result<()> {
        crate::git::reset_hard(repo_path)
    }

    fn checkout_force(&self, repo_path: &Path, rev: &str) -> Result<CheckoutStatus> {
        crate::git::checkout_force(repo_path, rev)
    }

    fn tree_has_any(&self, repo_path: &Path, rev: &str, paths: &[String]) -> Result<bool> {
        crate::git::tree_has_any(repo_path, rev, paths)
    }

    fn rev_exists(&self, repo_path: &Path, rev: &str) -> bool {
        crate::git::rev_exists(repo_path, rev)
    }

    fn commit_time(&self, repo_path: &Path, rev: &str) -> Result<DateTime<FixedOffset>> {
        crate::git::commit_time(repo_path, rev)
    }
}

/// How a synchronization attempt ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The source is checked out (or its refs are current) at a commit made
    /// at `modified_at`.
    CheckedOut { modified_at: DateTime<FixedOffset> },
    /// The declared subtrees do not exist on the branch; there is nothing
    /// to read.
    SparseAbsent,
    /// No local checkout exists and the refresh mode forbids creating one.
    NotCached,
}

/// Outcome of one synchronization attempt. Transient, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchResult {
    /// Whether the cache entry was created by this attempt.
    pub newly_initialized: bool,
    pub status: SyncStatus,
}

impl FetchResult {
    pub fn success(&self) -> bool {
        matches!(self.status, SyncStatus::CheckedOut { .. })
    }

    /// Timestamp of the most recent commit, absent unless successful.
    pub fn modified_at(&self) -> Option<DateTime<FixedOffset>> {
        match self.status {
            SyncStatus::CheckedOut { modified_at } => Some(modified_at),
            _ => None,
        }
    }
}

/// The checkout engine.
///
/// Holds the refresh mode for the whole run; every source is synchronized
/// under the same policy.
pub struct RepositoryManager {
    git_ops: Box<dyn GitOperations>,
    mode: RefreshMode,
}

impl RepositoryManager {
    /// Creates a `RepositoryManager` backed by the system `git` command.
    pub fn new(mode: RefreshMode) -> Self {
        Self {
            git_ops: Box::new(DefaultGitOperations),
            mode,
        }
    }

    /// Creates a `RepositoryManager` with a custom `GitOperations`
    /// implementation.
    pub fn with_operations(git_ops: Box<dyn GitOperations>, mode: RefreshMode) -> Self {
        Self { git_ops, mode }
    }

    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    /// Synchronize `source` into a working-tree checkout at `path`.
    pub fn sync(&self, path: &Path, source: &RemoteSource) -> Result<FetchResult> {
        let entry = CacheEntry::probe(path);
        let plan = policy::plan(self.mode, &entry);
        debug!(
            "Sync {} ({}) into {}: {:?}",
            source.url(),
            source.branch(),
            path.display(),
            plan
        );

        if !entry.exists() && !plan.initializes() {
            return Ok(FetchResult {
                newly_initialized: false,
                status: SyncStatus::NotCached,
            });
        }

        let newly_initialized = !entry.exists();
        let created_dir = !path.exists();
        let outcome = self
            .prepare(&entry, source)
            .and_then(|_| self.run_plan(&entry, source, plan));

        let status = match outcome {
            Ok(status) => status,
            Err(e) => {
                if newly_initialized {
                    rollback(&entry, created_dir);
                }
                return Err(e);
            }
        };

        match status {
            SyncStatus::CheckedOut { modified_at } => info!(
                "Checked out {}@{} into {} (last commit {})",
                source.url(),
                source.branch(),
                path.display(),
                modified_at.to_rfc3339()
            ),
            SyncStatus::SparseAbsent => info!(
                "{}@{} has none of [{}], nothing to read",
                source.url(),
                source.branch(),
                source.subtrees().join(", ")
            ),
            SyncStatus::NotCached => {}
        }

        Ok(FetchResult {
            newly_initialized,
            status,
        })
    }

    /// Bring the refs of `url`@`branch` up to date in a checkout at `path`
    /// without materializing a working tree, and read the timestamp of the
    /// branch tip.
    pub fn sync_bare(&self, path: &Path, url: &str, branch: &str) -> Result<FetchResult> {
        let source = RemoteSource::new(url, Some(branch));
        let entry = CacheEntry::probe(path);

        if self.mode == RefreshMode::Skip && !entry.exists() {
            return Ok(FetchResult {
                newly_initialized: false,
                status: SyncStatus::NotCached,
            });
        }

        let newly_initialized = !entry.exists();
        let created_dir = !path.exists();
        let outcome = self.prepare(&entry, &source).and_then(|_| {
            let tracking = source.tracking_ref();
            let known = !newly_initialized && self.git_ops.rev_exists(path, &tracking);
            if policy::should_fetch_refs(self.mode, &entry, known) {
                self.git_ops
                    .fetch_shallow(path, REMOTE_NAME, source.branch())?;
            } else if !known {
                return Ok(SyncStatus::NotCached);
            }
            let modified_at = self.git_ops.commit_time(path, &tracking)?;
            Ok(SyncStatus::CheckedOut { modified_at })
        });

        match outcome {
            Ok(status) => Ok(FetchResult {
                newly_initialized,
                status,
            }),
            Err(e) => {
                if newly_initialized {
                    rollback(&entry, created_dir);
                }
                Err(e)
            }
        }
    }

    /// Initialize a missing entry, or check that an existing one belongs to
    /// `source`.
    fn prepare(&self, entry: &CacheEntry, source: &RemoteSource) -> Result<()> {
        let path = entry.path();
        if entry.exists() {
            return match self.git_ops.remote_url(path, REMOTE_NAME)? {
                Some(found) if found == source.url() => Ok(()),
                Some(found) => Err(Error::RemoteMismatch {
                    path: path.to_path_buf(),
                    expected: source.url().to_string(),
                    found,
                }),
                None => self.git_ops.add_remote(path, REMOTE_NAME, source.url()),
            };
        }

        self.git_ops.init(path)?;
        self.git_ops.set_config(path, "core.sshCommand", SSH_COMMAND)?;
        self.git_ops.add_remote(path, REMOTE_NAME, source.url())?;

        if source.is_sparse() {
            self.git_ops.set_config(path, "core.sparseCheckout", "true")?;
            let sparse_file = entry.sparse_checkout_file();
            if let Some(info_dir) = sparse_file.parent() {
                fs::create_dir_all(info_dir)?;
            }
            let mut allow_list = source.subtrees().join("\n");
            allow_list.push('\n');
            fs::write(&sparse_file, allow_list)?;
        }
        Ok(())
    }

    fn run_plan(
        &self,
        entry: &CacheEntry,
        source: &RemoteSource,
        plan: SyncPlan,
    ) -> Result<SyncStatus> {
        let path = entry.path();
        match plan {
            SyncPlan::FetchThenCheckout { reset } => {
                self.git_ops
                    .fetch_shallow(path, REMOTE_NAME, source.branch())?;
                if reset {
                    self.git_ops.reset_hard(path)?;
                }
                self.checkout_tip(path, source)
            }
            SyncPlan::CheckoutThenFetch => match self.checkout_tip(path, source) {
                Ok(status) => Ok(status),
                Err(first) => {
                    debug!(
                        "Local checkout of {} failed ({}), fetching",
                        source.tracking_ref(),
                        first
                    );
                    self.git_ops
                        .fetch_shallow(path, REMOTE_NAME, source.branch())?;
                    self.checkout_tip(path, source)
                        .map_err(|e| Error::Checkout {
                            url: source.url().to_string(),
                            branch: source.branch().to_string(),
                            message: e.to_string(),
                        })
                }
            },
            SyncPlan::UseAsIs => {
                if source.is_sparse() && !self.git_ops.tree_has_any(path, "HEAD", source.subtrees())? {
                    return Ok(SyncStatus::SparseAbsent);
                }
                let modified_at = self.git_ops.commit_time(path, "HEAD")?;
                Ok(SyncStatus::CheckedOut { modified_at })
            }
            SyncPlan::Unavailable => Ok(SyncStatus::NotCached),
        }
    }

    fn checkout_tip(&self, path: &Path, source: &RemoteSource) -> Result<SyncStatus> {
        if self.git_ops.checkout_force(path, &source.tracking_ref())? == CheckoutStatus::SparseEmpty {
            return Ok(SyncStatus::SparseAbsent);
        }
        // Recent git versions accept an empty sparse checkout, so the tree
        // itself is the authority on whether the subtrees exist.
        if source.is_sparse() && !self.git_ops.tree_has_any(path, "HEAD", source.subtrees())? {
            return Ok(SyncStatus::SparseAbsent);
        }
        let modified_at = self.git_ops.commit_time(path, "HEAD")?;
        Ok(SyncStatus::CheckedOut { modified_at })
    }
}

/// Remove the metadata of an entry created by a failed sync.
fn rollback(entry: &CacheEntry, created_dir: bool) {
    let git_dir = entry.git_dir();
    if git_dir.exists() {
        if let Err(e) = fs::remove_dir_all(&git_dir) {
            log::warn!(
                "Could not remove partial checkout metadata at {}: {}",
                git_dir.display(),
                e
            );
        }
    }
    if created_dir {
        // Only succeeds if nothing else was written there.
        let _ = fs::remove_dir(entry.path());
    }
}
