//! # Project and Source Resolution
//!
//! The orchestrator walks the index documents of a site, synchronizes the
//! remote source each one declares through the `RepositoryManager`, reads
//! the resulting checkouts into the site's collections and stamps every
//! index document with the time of its latest commit (`last_update`).
//!
//! ## Hub sites
//!
//! Every project index (`/projects/<name>/index`) declaring a `site`
//! repository is synchronized into its own directory, restricted to the
//! project subtrees (`assets`, `_posts`, `_software`, `_specs`), and read
//! into the `projects` collection. The software and spec index documents
//! of that project are resolved right after it.
//!
//! ## Project sites
//!
//! Software and spec index documents of the site's own `software` and
//! `specs` collections are resolved, and the parent hub branding is
//! fetched when `parent_hub` is configured.
//!
//! ## Failure containment
//!
//! A source that fails to synchronize or read contributes no content. The
//! failure is logged and recorded in the `ReadReport`; resolution continues
//! with the next source.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::config::{descriptor, DocsOverride, ProjectSite, RemoteSource, SoftwareSources, SpecSource};
use crate::defaults::{DEFAULT_BRANCH, PARENT_HUB_DIR, PARENT_HUB_SUBTREES, PROJECT_SUBTREES};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::reader::{self, ReadSummary};
use crate::repository::{FetchResult, RepositoryManager, SyncStatus};
use crate::site::{Site, PROJECTS};
use crate::spec_builder::SpecBuilder;

/// Metadata key receiving the freshness timestamp of an index document.
pub const LAST_UPDATE: &str = "last_update";

/// Label of the software collection on project sites.
pub const SOFTWARE: &str = "software";

/// Label of the specs collection on project sites.
pub const SPECS: &str = "specs";

/// Kind of remote source a report entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// A hub project's site repository.
    Project,
    /// The documentation of a software item.
    Software,
    /// The main repository of a software item, fetched for its timestamp.
    SoftwareRepo,
    Spec,
    ParentHub,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Project => "project",
            SourceKind::Software => "software",
            SourceKind::SoftwareRepo => "software-repo",
            SourceKind::Spec => "spec",
            SourceKind::ParentHub => "parent-hub",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the synchronization of one source ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Synced,
    /// The declared subtrees do not exist on the branch.
    Absent,
    /// No local checkout and the refresh mode forbids creating one.
    NotCached,
    Failed,
}

impl From<SyncStatus> for Outcome {
    fn from(status: SyncStatus) -> Self {
        match status {
            SyncStatus::CheckedOut { .. } => Outcome::Synced,
            SyncStatus::SparseAbsent => Outcome::Absent,
            SyncStatus::NotCached => Outcome::NotCached,
        }
    }
}

/// One synchronized source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub kind: SourceKind,
    /// URL of the declaring index document.
    pub document: String,
    pub remote: String,
    pub path: PathBuf,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_commit: Option<String>,
    pub read: ReadSummary,
    pub pages: usize,
}

/// Everything one `Orchestrator::read` did, in order.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ReadReport {
    pub sources: Vec<SourceReport>,
}

impl ReadReport {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.sources.iter().filter(|s| s.outcome == outcome).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| s.outcome == Outcome::Failed)
    }

    fn last_mut(&mut self) -> Option<&mut SourceReport> {
        self.sources.last_mut()
    }
}

/// Drives source resolution for one build.
pub struct Orchestrator<'a> {
    repos: &'a RepositoryManager,
    builder: &'a dyn SpecBuilder,
}

impl<'a> Orchestrator<'a> {
    pub fn new(repos: &'a RepositoryManager, builder: &'a dyn SpecBuilder) -> Self {
        Self { repos, builder }
    }

    /// Resolve every declared source of `site` and merge what was retrieved
    /// into its collections.
    pub fn read(&self, site: &mut Site) -> ReadReport {
        let mut report = ReadReport::default();
        info!(
            "Reading remote sources of {} (refresh: {})",
            site.source.display(),
            self.repos.mode()
        );

        if site.is_hub() {
            self.fetch_and_read_projects(site, &mut report);
        } else {
            self.fetch_and_read_software(site, SOFTWARE, None, &mut report);
            self.fetch_and_read_specs(site, SPECS, None, true, &mut report);
            self.fetch_parent_hub(site, &mut report);
        }

        info!(
            "Synchronized {} sources: {} checked out, {} absent, {} not cached, {} failed",
            report.sources.len(),
            report.count(Outcome::Synced),
            report.count(Outcome::Absent),
            report.count(Outcome::NotCached),
            report.count(Outcome::Failed)
        );
        report
    }

    fn fetch_and_read_projects(&self, site: &mut Site, report: &mut ReadReport) {
        let projects: Vec<Document> = match site.collection(PROJECTS) {
            Some(collection) => collection
                .docs
                .iter()
                .filter(|doc| doc.url.is_project_index())
                .cloned()
                .collect(),
            None => return,
        };

        for project in projects {
            let Some(name) = project.url.segment(1).map(str::to_string) else {
                continue;
            };
            let document = project.url.to_string();
            let project_path = project.parent_dir().to_path_buf();

            match descriptor::<ProjectSite>(project.data(), "site", &document) {
                Ok(Some(site_repo)) => {
                    let source = RemoteSource::new(
                        &site_repo.git_repo_url,
                        site_repo.git_repo_branch.as_deref(),
                    )
                    .with_subtrees(PROJECT_SUBTREES);
                    let result = self.repos.sync(&project_path, &source);
                    let synced = record(
                        report,
                        SourceKind::Project,
                        &document,
                        source.url(),
                        &project_path,
                        result,
                    )
                    .filter(FetchResult::success);

                    if synced.is_some() {
                        let summary = read_tree(site, PROJECTS, &project_path);
                        if let Some(entry) = report.last_mut() {
                            entry.read = summary;
                        }
                    }
                }
                Ok(None) => debug!("Project {} declares no site repository", name),
                Err(e) => {
                    record(report, SourceKind::Project, &document, "", &project_path, Err(e));
                }
            }

            self.fetch_and_read_software(site, PROJECTS, Some(&name), report);
            self.fetch_and_read_specs(site, PROJECTS, Some(&name), false, report);
        }
    }

    fn fetch_and_read_software(
        &self,
        site: &mut Site,
        label: &str,
        project: Option<&str>,
        report: &mut ReadReport,
    ) {
        for index_doc in index_documents(site, label, project, "repo_url") {
            let document = index_doc.url.to_string();
            let docs_path = index_doc.item_checkout_path();
            let Some(main_repo) = index_doc.get_str("repo_url") else {
                warn!("{}: repo_url is not a string, skipping", document);
                continue;
            };

            let docs = match descriptor::<DocsOverride>(index_doc.data(), "docs", &document) {
                Ok(docs) => docs,
                Err(e) => {
                    record(report, SourceKind::Software, &document, main_repo, &docs_path, Err(e));
                    continue;
                }
            };
            let sources = SoftwareSources::resolve(main_repo, docs.as_ref());

            let result = self.repos.sync(&docs_path, &sources.docs);
            let docs_checkout = record(
                report,
                SourceKind::Software,
                &document,
                sources.docs.url(),
                &docs_path,
                result,
            )
            .filter(FetchResult::success);

            if docs_checkout.is_some() {
                let summary = read_tree(site, label, &docs_path);
                if let Some(entry) = report.last_mut() {
                    entry.read = summary;
                }
            }

            let modified_at = match docs_checkout {
                Some(checkout) if !sources.docs_in_separate_repo() => checkout.modified_at(),
                _ => {
                    let repo_path = index_doc
                        .parent_dir()
                        .join(format!("_{}_repo", index_doc.item_name()));
                    // A branch override on the main repository applies to its
                    // timestamp too.
                    let branch = if sources.docs_in_separate_repo() {
                        DEFAULT_BRANCH
                    } else {
                        sources.docs.branch()
                    };
                    let result = self.repos.sync_bare(&repo_path, &sources.main_repo, branch);
                    record(
                        report,
                        SourceKind::SoftwareRepo,
                        &document,
                        &sources.main_repo,
                        &repo_path,
                        result,
                    )
                    .and_then(|checkout| checkout.modified_at())
                }
            };

            merge_last_update(site, label, &index_doc, modified_at.map(|t| t.to_rfc3339()));
        }
    }

    fn fetch_and_read_specs(
        &self,
        site: &mut Site,
        label: &str,
        project: Option<&str>,
        build_pages: bool,
        report: &mut ReadReport,
    ) {
        for index_doc in index_documents(site, label, project, "spec_source") {
            let document = index_doc.url.to_string();
            let checkout_path = index_doc.item_checkout_path();

            let spec = match descriptor::<SpecSource>(index_doc.data(), "spec_source", &document) {
                Ok(Some(spec)) => spec,
                Ok(None) => continue,
                Err(e) => {
                    record(report, SourceKind::Spec, &document, "", &checkout_path, Err(e));
                    continue;
                }
            };
            let source = spec.remote();

            let result = self.repos.sync(&checkout_path, &source);
            let Some(checkout) = record(
                report,
                SourceKind::Spec,
                &document,
                source.url(),
                &checkout_path,
                result,
            )
            .filter(FetchResult::success) else {
                continue;
            };

            if build_pages {
                let pages = self.build_spec_pages(site, &index_doc, &spec, &checkout_path);
                let summary = read_tree(site, label, &checkout_path);
                if let Some(entry) = report.last_mut() {
                    entry.pages = pages;
                    entry.read = summary;
                }
            }

            merge_last_update(
                site,
                label,
                &index_doc,
                checkout.modified_at().map(|t| t.to_rfc3339()),
            );
        }
    }

    /// Build the pages of a checked-out spec and add them to the site.
    /// Returns the number of pages added.
    fn build_spec_pages(
        &self,
        site: &mut Site,
        index_doc: &Document,
        spec: &SpecSource,
        checkout_path: &Path,
    ) -> usize {
        let spec_root = match spec.git_repo_subtree.as_deref() {
            Some(subtree) => checkout_path.join(subtree.trim_matches('/')),
            None => checkout_path.to_path_buf(),
        };
        let dest_prefix = format!("{}/{}", SPECS, index_doc.item_name());

        match self.builder.build(
            site,
            index_doc,
            &spec_root,
            &dest_prefix,
            &spec.build.engine,
            &spec.build.options,
        ) {
            Ok(pages) => {
                let count = pages.len();
                debug!("Built {} pages for {}", count, index_doc.url);
                site.pages.extend(pages);
                count
            }
            Err(e) => {
                warn!("Could not build pages for {}: {}", index_doc.url, e);
                0
            }
        }
    }

    fn fetch_parent_hub(&self, site: &Site, report: &mut ReadReport) {
        let Some((url, branch)) = site.config.parent_hub_source() else {
            return;
        };
        let path = site.source.join(PARENT_HUB_DIR);
        let source = RemoteSource::new(url, Some(branch.as_str())).with_subtrees(PARENT_HUB_SUBTREES);
        let result = self.repos.sync(&path, &source);
        record(report, SourceKind::ParentHub, "parent_hub", source.url(), &path, result);
    }
}

/// Index documents of `label` declaring `key`, limited to one hub project
/// when `project` is given.
fn index_documents(site: &Site, label: &str, project: Option<&str>, key: &str) -> Vec<Document> {
    let Some(collection) = site.collection(label) else {
        return Vec::new();
    };
    collection
        .docs
        .iter()
        .filter(|doc| doc.get(key).is_some_and(|value| !value.is_null()))
        .filter(|doc| match project {
            Some(name) => {
                doc.url.segment(0) == Some(PROJECTS) && doc.url.segment(1) == Some(name)
            }
            None => true,
        })
        .cloned()
        .collect()
}

/// Record the outcome of one synchronization, logging contained failures.
fn record(
    report: &mut ReadReport,
    kind: SourceKind,
    document: &str,
    remote: &str,
    path: &Path,
    result: Result<FetchResult>,
) -> Option<FetchResult> {
    let (outcome, error, fetch) = match result {
        Ok(fetch) => (Outcome::from(fetch.status), None, Some(fetch)),
        Err(e) => {
            log_failure(kind, document, &e);
            (Outcome::Failed, Some(e.to_string()), None)
        }
    };

    report.sources.push(SourceReport {
        kind,
        document: document.to_string(),
        remote: remote.to_string(),
        path: path.to_path_buf(),
        outcome,
        error,
        last_commit: fetch
            .and_then(|f| f.modified_at())
            .map(|t| t.to_rfc3339()),
        read: ReadSummary::default(),
        pages: 0,
    });
    fetch
}

fn log_failure(kind: SourceKind, document: &str, e: &Error) {
    if e.is_structural() {
        error!("{} source of {} is inconsistent: {}", kind, document, e);
    } else {
        warn!("Skipping {} source of {}: {}", kind, document, e);
    }
}

fn read_tree(site: &mut Site, label: &str, root: &Path) -> ReadSummary {
    let site_source = site.source.clone();
    let Some(collection) = site.collection_mut(label) else {
        return ReadSummary::default();
    };
    match reader::read(&site_source, root, collection) {
        Ok(summary) => summary,
        Err(e) => {
            warn!("Could not read {}: {}", root.display(), e);
            ReadSummary::default()
        }
    }
}

fn merge_last_update(site: &mut Site, label: &str, index_doc: &Document, last_update: Option<String>) {
    let Some(last_update) = last_update else {
        return;
    };
    let Some(doc) = site
        .collection_mut(label)
        .and_then(|c| c.find_by_path_mut(&index_doc.path))
    else {
        return;
    };
    let mut update = Mapping::new();
    update.insert(Value::from(LAST_UPDATE), Value::from(last_update));
    doc.merge_data(update);
}
