//! # Error Handling
//!
//! This module defines the centralized error type for `project-hub`. It uses
//! `thiserror` to build a single `Error` enum covering every failure the
//! synchronization phase can run into, with enough context (URLs, paths,
//! git commands and their stderr) to make log lines actionable.
//!
//! ## Taxonomy
//!
//! - **Configuration errors** (`ConfigParse`): fatal. An invalid
//!   `refresh_remote_data` value aborts the whole run before any source is
//!   touched.
//! - **Per-source errors** (`GitCommand`, `Checkout`, `Descriptor`,
//!   `SpecBuild`): scoped to one content source. The
//!   orchestrator logs them and continues without that source's content.
//! - **Structural inconsistencies** (`RemoteMismatch`): a cache entry that
//!   would have to be re-pointed at a different remote. Contained to the one
//!   source like other per-source errors, but reported at error level.
//!
//! Note that a sparse checkout that legitimately leaves nothing on disk is
//! *not* an error; it is reported through `repository::SyncStatus`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for project-hub operations
#[derive(Error, Debug)]
pub enum Error {
    /// The site configuration could not be parsed or holds an invalid value.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A git command exited unsuccessfully or could not be spawned.
    #[error("Git command failed in {}: git {command} - {stderr}", path.display())]
    GitCommand {
        command: String,
        path: PathBuf,
        stderr: String,
    },

    /// Checking out a remote branch failed, including after a retry fetch.
    #[error("Checkout of {url}@{branch} failed: {message}")]
    Checkout {
        url: String,
        branch: String,
        message: String,
    },

    /// An existing cache entry points at a different remote than requested.
    #[error("Cache entry at {} is bound to {found}, refusing to re-point it to {expected}", path.display())]
    RemoteMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// A document declares a remote source block that cannot be understood.
    #[error("Invalid source descriptor in {document}: {message}")]
    Descriptor { document: String, message: String },

    /// A content document could not be read.
    #[error("Document error in {}: {message}", path.display())]
    Document { path: PathBuf, message: String },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// The spec-build collaborator failed.
    #[error("Spec build error ({engine}): {message}")]
    SpecBuild { engine: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A directory walk error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A timestamp parsing error, wrapped from `chrono::ParseError`.
    #[error("Timestamp parsing error: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

impl Error {
    /// Whether this error must abort the whole synchronization phase rather
    /// than being contained to a single source.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ConfigParse { .. })
    }

    /// Whether this error signals on-disk state that contradicts the site
    /// declarations and needs operator attention.
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::RemoteMismatch { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
