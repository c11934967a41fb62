//! Default values and fixed names used across the synchronization phase.
//!
//! This module provides centralized constants so the engine, the reader and
//! the orchestrator agree on branch names, directory layouts and file types.

/// Name under which every cache entry registers its single remote.
pub const REMOTE_NAME: &str = "origin";

/// Branch used when a source block does not name one.
pub const DEFAULT_BRANCH: &str = "master";

/// Subtree holding software documentation when no `docs` override says
/// otherwise.
pub const DEFAULT_DOCS_SUBTREE: &str = "docs";

/// Site configuration file at the root of the site source.
pub const CONFIG_FILE: &str = "_config.yml";

/// Subtrees of a project repository that a hub needs.
pub const PROJECT_SUBTREES: [&str; 4] = ["assets", "_posts", "_software", "_specs"];

/// Subtrees of the parent hub repository that a project site borrows for
/// its branding.
pub const PARENT_HUB_SUBTREES: [&str; 2] = ["assets", "title.html"];

/// Directory (under the site source) receiving the parent hub branding.
pub const PARENT_HUB_DIR: &str = "parent-hub";

/// File extensions read as content documents. Everything else is a static
/// asset.
pub const DOCUMENT_EXTENSIONS: [&str; 3] = ["adoc", "md", "markdown"];

/// SSH command configured on every cache entry.
///
/// Host-key verification is disabled so builds can reach hosts that were
/// never added to `known_hosts`.
pub const SSH_COMMAND: &str = "ssh -o UserKnownHostsFile=/dev/null -o StrictHostKeyChecking=no";

/// Returns true when `extension` (without the dot) names a content document.
pub fn is_document_extension(extension: &str) -> bool {
    DOCUMENT_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(extension))
}
