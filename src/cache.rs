//! On-disk cache entries: local shallow/sparse checkouts

use std::path::{Path, PathBuf};

/// Directory whose presence marks a checkout.
pub const GIT_DIR: &str = ".git";

/// One local checkout location and whether version-control metadata is
/// already present there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    path: PathBuf,
    exists: bool,
}

impl CacheEntry {
    /// Inspect `path`. Pure filesystem check, no git invocation.
    pub fn probe(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            exists: path.join(GIT_DIR).exists(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a checkout already exists at this path.
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn git_dir(&self) -> PathBuf {
        self.path.join(GIT_DIR)
    }

    /// Location of the sparse-checkout allow-list.
    pub fn sparse_checkout_file(&self) -> PathBuf {
        self.git_dir().join("info").join("sparse-checkout")
    }
}
