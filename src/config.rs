//! # Site Configuration and Source Descriptors
//!
//! This module defines the data structures read from the site's
//! `_config.yml` and from the front matter of index documents, together with
//! the parsing logic that turns them into typed values.
//!
//! ## Key Components
//!
//! - **`SiteConfig`**: The site-wide settings the synchronization phase
//!   consumes (`is_hub`, `refresh_remote_data`, `parent_hub`, ...). It is
//!   parsed once and passed explicitly to whoever needs it.
//!
//! - **`RefreshMode`**: The global refresh policy (`always`, `last-resort`,
//!   `skip`). An unknown value is a fatal configuration error raised while
//!   the configuration is loaded, before any network activity.
//!
//! - **Descriptors**: `ProjectSite`, `DocsOverride`, `SpecSource` and
//!   `BuildDescriptor` mirror the front-matter blocks through which documents
//!   declare where their content lives. `RemoteSource` is the normalized,
//!   immutable form handed to the checkout engine.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::defaults::{CONFIG_FILE, DEFAULT_BRANCH, DEFAULT_DOCS_SUBTREE};
use crate::error::{Error, Result};

/// Global policy deciding when remote data is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshMode {
    /// Fetch every source and hard-reset it to the remote branch tip.
    Always,
    /// Check out from local refs; fetch only if that fails.
    #[default]
    LastResort,
    /// Never touch the network; use checkouts as they are.
    Skip,
}

impl RefreshMode {
    pub const VALID_VALUES: [&'static str; 3] = ["always", "last-resort", "skip"];

    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshMode::Always => "always",
            RefreshMode::LastResort => "last-resort",
            RefreshMode::Skip => "skip",
        }
    }
}

impl FromStr for RefreshMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "always" => Ok(RefreshMode::Always),
            "last-resort" => Ok(RefreshMode::LastResort),
            "skip" => Ok(RefreshMode::Skip),
            other => Err(Error::ConfigParse {
                message: format!("Invalid refresh_remote_data value '{}'", other),
                hint: Some(format!(
                    "expected one of: {}",
                    RefreshMode::VALID_VALUES.join(", ")
                )),
            }),
        }
    }
}

impl fmt::Display for RefreshMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `parent_hub` block of a project site's configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentHub {
    #[serde(default)]
    pub git_repo_url: Option<String>,
    #[serde(default)]
    pub git_repo_branch: Option<String>,
}

/// Raw shape of `_config.yml`; `refresh_remote_data` stays a string until
/// it is validated.
#[derive(Debug, Deserialize)]
struct RawSiteConfig {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    is_hub: bool,
    #[serde(default)]
    refresh_remote_data: Option<String>,
    #[serde(default)]
    parent_hub: Option<ParentHub>,
    #[serde(default)]
    collections: Option<CollectionsDecl>,
    #[serde(flatten)]
    extra: Mapping,
}

/// Jekyll allows `collections` to be either a list of labels or a map from
/// label to per-collection settings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CollectionsDecl {
    List(Vec<String>),
    Map(Mapping),
}

impl CollectionsDecl {
    fn labels(self) -> Vec<String> {
        match self {
            CollectionsDecl::List(labels) => labels,
            CollectionsDecl::Map(map) => map
                .into_iter()
                .filter_map(|(key, _)| key.as_str().map(str::to_string))
                .collect(),
        }
    }
}

/// Site-wide settings consumed by the synchronization phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteConfig {
    pub title: Option<String>,
    pub is_hub: bool,
    pub refresh_remote_data: RefreshMode,
    pub parent_hub: Option<ParentHub>,
    /// Collections declared by the site, if any.
    pub collections: Option<Vec<String>>,
    /// Keys this crate does not interpret, kept for the templating stage.
    pub extra: Mapping,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: None,
            is_hub: false,
            refresh_remote_data: RefreshMode::default(),
            parent_hub: None,
            collections: None,
            extra: Mapping::new(),
        }
    }
}

impl SiteConfig {
    /// Parse a `_config.yml` document.
    pub fn parse(yaml: &str) -> Result<Self> {
        let raw: RawSiteConfig = if yaml.trim().is_empty() {
            serde_yaml::from_str("{}")?
        } else {
            serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse {
                message: e.to_string(),
                hint: None,
            })?
        };

        let refresh_remote_data = match raw.refresh_remote_data {
            Some(value) => value.parse()?,
            None => RefreshMode::default(),
        };

        Ok(Self {
            title: raw.title,
            is_hub: raw.is_hub,
            refresh_remote_data,
            parent_hub: raw.parent_hub,
            collections: raw.collections.map(CollectionsDecl::labels),
            extra: raw.extra,
        })
    }

    /// Load `_config.yml` from a site source directory. A missing file
    /// yields the default configuration.
    pub fn load(source: &Path) -> Result<Self> {
        let path = source.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No {} in {}, using defaults", CONFIG_FILE, source.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    /// Labels of the collections the site loader reads, not counting the
    /// site-level posts.
    pub fn collection_labels(&self) -> Vec<String> {
        match &self.collections {
            Some(labels) => labels.clone(),
            None if self.is_hub => vec!["projects".to_string()],
            None => vec!["software".to_string(), "specs".to_string()],
        }
    }

    /// The parent hub source, when the site declares one with a URL.
    pub fn parent_hub_source(&self) -> Option<(String, String)> {
        let hub = self.parent_hub.as_ref()?;
        let url = hub.git_repo_url.clone()?;
        let branch = hub
            .git_repo_branch
            .clone()
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        Some((url, branch))
    }
}

/// One fetchable unit: remote URL, branch and optional sparse subtrees.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteSource {
    url: String,
    branch: String,
    subtrees: Vec<String>,
}

impl RemoteSource {
    pub fn new(url: impl Into<String>, branch: Option<&str>) -> Self {
        Self {
            url: url.into(),
            branch: branch.unwrap_or(DEFAULT_BRANCH).to_string(),
            subtrees: Vec::new(),
        }
    }

    /// Restrict the checkout to the given subtrees. Blank entries are
    /// ignored.
    pub fn with_subtrees<I, S>(mut self, subtrees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.subtrees = subtrees
            .into_iter()
            .map(|s| s.as_ref().trim_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn subtrees(&self) -> &[String] {
        &self.subtrees
    }

    pub fn is_sparse(&self) -> bool {
        !self.subtrees.is_empty()
    }

    /// The remote-tracking ref this source is checked out from.
    pub fn tracking_ref(&self) -> String {
        format!("{}/{}", crate::defaults::REMOTE_NAME, self.branch)
    }
}

/// `site` block of a project index document on a hub.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSite {
    pub git_repo_url: String,
    #[serde(default)]
    pub git_repo_branch: Option<String>,
}

/// `docs` block of a software index document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocsOverride {
    #[serde(default)]
    pub git_repo_url: Option<String>,
    #[serde(default)]
    pub git_repo_branch: Option<String>,
    #[serde(default)]
    pub git_repo_subtree: Option<String>,
}

/// `build` block of a spec source.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildDescriptor {
    pub engine: String,
    #[serde(default)]
    pub options: Mapping,
}

/// `spec_source` block of a spec index document.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecSource {
    pub git_repo_url: String,
    #[serde(default)]
    pub git_repo_branch: Option<String>,
    #[serde(default)]
    pub git_repo_subtree: Option<String>,
    pub build: BuildDescriptor,
}

impl SpecSource {
    pub fn remote(&self) -> RemoteSource {
        RemoteSource::new(&self.git_repo_url, self.git_repo_branch.as_deref())
            .with_subtrees(self.git_repo_subtree.iter())
    }
}

/// Where a software item's documentation and timestamp come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareSources {
    /// The item's main repository (`repo_url`).
    pub main_repo: String,
    /// Source of the documentation subtree.
    pub docs: RemoteSource,
}

impl SoftwareSources {
    /// Resolve the documentation source of a software item: the main
    /// repository's `docs` subtree unless a `docs` block overrides the URL,
    /// branch or subtree.
    pub fn resolve(main_repo: &str, docs: Option<&DocsOverride>) -> Self {
        let url = docs
            .and_then(|d| d.git_repo_url.as_deref())
            .unwrap_or(main_repo);
        let branch = docs.and_then(|d| d.git_repo_branch.as_deref());
        let subtree = docs
            .and_then(|d| d.git_repo_subtree.as_deref())
            .unwrap_or(DEFAULT_DOCS_SUBTREE);

        Self {
            main_repo: main_repo.to_string(),
            docs: RemoteSource::new(url, branch).with_subtrees([subtree]),
        }
    }

    /// Whether the documentation lives in a repository other than the main
    /// one, so the main repository must be fetched for its timestamp.
    pub fn docs_in_separate_repo(&self) -> bool {
        self.docs.url() != self.main_repo
    }
}

/// Deserialize an optional front-matter block into a descriptor.
pub fn descriptor<T>(data: &Mapping, key: &str, document: &str) -> Result<Option<T>>
where
    T: for<'de> Deserialize<'de>,
{
    match data.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_yaml::from_value(value.clone())
            .map(Some)
            .map_err(|e| Error::Descriptor {
                document: document.to_string(),
                message: format!("{}: {}", key, e),
            }),
    }
}
