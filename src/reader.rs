//! Document Tree Reader
//!
//! Walks a checked-out directory tree and registers what it finds in a
//! collection. Documents whose identity has exactly four segments become
//! addressable documents; other documents are parsed but not enumerated,
//! and every other file becomes a static asset. An `index` document directly
//! under the root is a container marker and is skipped.

use std::path::Path;

use log::{debug, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::defaults::is_document_extension;
use crate::document::{Document, StaticFile};
use crate::error::Result;
use crate::path::is_hidden;
use crate::site::Collection;

/// Basename of container marker documents.
const INDEX_NAME: &str = "index";

/// What one `read` call registered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadSummary {
    /// Addressable documents pushed into the collection.
    pub documents: usize,
    /// Documents parsed but not addressable (nested supporting material).
    pub supporting: usize,
    /// Static assets attached to the collection.
    pub assets: usize,
    /// Top-level `index` documents left alone.
    pub skipped_indexes: usize,
}

impl ReadSummary {
    pub fn is_empty(&self) -> bool {
        self.documents == 0 && self.assets == 0
    }
}

/// Read the tree under `root` into `collection`.
///
/// `site_source` anchors static asset paths. Does nothing if `root` is not a
/// directory or is itself a symbolic link.
pub fn read(site_source: &Path, root: &Path, collection: &mut Collection) -> Result<ReadSummary> {
    let mut summary = ReadSummary::default();
    if !root.is_dir() || root.is_symlink() {
        debug!("Nothing to read at {}", root.display());
        return Ok(summary);
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry.path()) && !entry.path_is_symlink());

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        // Entries directly under the root are top level.
        let nested = entry.depth() > 1;

        if !has_document_extension(path) {
            collection.push_file(StaticFile::new(path, site_source)?);
            summary.assets += 1;
            continue;
        }

        if !nested && is_index(path) {
            summary.skipped_indexes += 1;
            continue;
        }

        let doc = match Document::read(path, &collection.label, &collection.directory) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Skipping unreadable document: {}", e);
                continue;
            }
        };

        if doc.url.is_addressable() {
            collection.push_doc(doc);
            summary.documents += 1;
        } else {
            summary.supporting += 1;
        }
    }

    debug!(
        "Read {} into '{}': {:?}",
        root.display(),
        collection.label,
        summary
    );
    Ok(summary)
}

fn has_document_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| is_document_extension(&ext.to_string_lossy()))
        .unwrap_or(false)
}

fn is_index(path: &Path) -> bool {
    path.file_stem().map(|stem| stem == INDEX_NAME).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn urls(collection: &Collection) -> Vec<String> {
        collection.docs.iter().map(|d| d.url.to_string()).collect()
    }

    #[test]
    fn test_reads_tree_with_index_rules() {
        let temp_dir = TempDir::new().unwrap();
        let site = temp_dir.path();
        let root = site.join("_software/a");
        write(&root, "index.md", "---\ntitle: A\n---\n");
        write(&root, "b/index.md", "---\ntitle: B\n---\n");
        write(&root, "b/c.md", "---\ntitle: C\n---\nBody\n");
        write(&root, "readme.txt", "plain");

        let mut collection = Collection::new("software", site);
        let summary = read(site, &root, &mut collection).unwrap();

        assert_eq!(urls(&collection), vec!["/software/a/b/c", "/software/a/b/index"]);
        assert_eq!(summary.documents, 2);
        assert_eq!(summary.skipped_indexes, 1);
        assert_eq!(summary.assets, 1);
        assert_eq!(collection.files.len(), 1);
        assert_eq!(
            collection.files[0].relative_path(),
            PathBuf::from("_software/a/readme.txt")
        );
    }

    #[test]
    fn test_deep_documents_are_not_addressable() {
        let temp_dir = TempDir::new().unwrap();
        let site = temp_dir.path();
        let root = site.join("_software/tool");
        write(&root, "docs/guide.md", "---\n---\n");
        write(&root, "docs/usage/advanced.adoc", "= Advanced\n");

        let mut collection = Collection::new("software", site);
        let summary = read(site, &root, &mut collection).unwrap();

        assert_eq!(urls(&collection), vec!["/software/tool/docs/guide"]);
        assert_eq!(summary.supporting, 1);
    }

    #[test]
    fn test_skips_hidden_entries() {
        let temp_dir = TempDir::new().unwrap();
        let site = temp_dir.path();
        let root = site.join("_software/tool");
        write(&root, ".git/HEAD", "ref: refs/heads/master\n");
        write(&root, "docs/.draft.md", "---\n---\n");
        write(&root, "docs/guide.md", "---\n---\n");

        let mut collection = Collection::new("software", site);
        let summary = read(site, &root, &mut collection).unwrap();

        assert_eq!(summary.documents, 1);
        assert_eq!(summary.assets, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_skips_symlinked_directories() {
        let temp_dir = TempDir::new().unwrap();
        let site = temp_dir.path();
        let outside = site.join("outside");
        write(&outside, "page.md", "---\n---\n");
        let root = site.join("_software/tool");
        write(&root, "docs/guide.md", "---\n---\n");
        std::os::unix::fs::symlink(&outside, root.join("linked")).unwrap();

        let mut collection = Collection::new("software", site);
        read(site, &root, &mut collection).unwrap();
        assert_eq!(urls(&collection), vec!["/software/tool/docs/guide"]);

        let mut collection = Collection::new("software", site);
        let linked_root = site.join("_software/link");
        std::os::unix::fs::symlink(&root, &linked_root).unwrap();
        let summary = read(site, &linked_root, &mut collection).unwrap();
        assert_eq!(summary, ReadSummary::default());
    }

    #[test]
    fn test_missing_root_reads_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut collection = Collection::new("specs", temp_dir.path());
        let summary = read(
            temp_dir.path(),
            &temp_dir.path().join("_specs/none"),
            &mut collection,
        )
        .unwrap();
        assert!(summary.is_empty());
    }

    #[test]
    fn test_reading_twice_does_not_duplicate() {
        let temp_dir = TempDir::new().unwrap();
        let site = temp_dir.path();
        let root = site.join("_software/tool");
        write(&root, "docs/guide.md", "---\n---\n");
        write(&root, "docs/diagram.svg", "<svg/>");

        let mut collection = Collection::new("software", site);
        read(site, &root, &mut collection).unwrap();
        read(site, &root, &mut collection).unwrap();
        assert_eq!(collection.docs.len(), 1);
        assert_eq!(collection.files.len(), 1);
    }

    #[test]
    fn test_project_tree_on_hub() {
        let temp_dir = TempDir::new().unwrap();
        let site = temp_dir.path();
        let root = site.join("_projects/alpha");
        write(&root, "index.md", "---\ntitle: Alpha\n---\n");
        write(&root, "_posts/2024-01-01-hello.md", "---\ntitle: Hello\n---\n");
        write(&root, "_software/tool.md", "---\nrepo_url: https://example.com/tool.git\n---\n");
        write(&root, "assets/logo.svg", "<svg/>");

        let mut collection = Collection::new("projects", site);
        let summary = read(site, &root, &mut collection).unwrap();

        assert_eq!(
            urls(&collection),
            vec![
                "/projects/alpha/_posts/2024-01-01-hello",
                "/projects/alpha/_software/tool",
            ]
        );
        assert_eq!(summary.skipped_indexes, 1);
        assert_eq!(summary.assets, 1);
    }
}
