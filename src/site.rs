//! # Site and Content Collections
//!
//! The `Site` is the in-memory content store the synchronization phase
//! reads from and writes into: the site configuration, one `Collection` per
//! content kind, the pages produced by spec builds, and the combined post
//! feed once it has been published.
//!
//! ## Loading
//!
//! `Site::load` reads `_config.yml` and every declared collection from
//! `<source>/_<label>`, plus the site-level posts from `<source>/_posts`.
//! Below a collection root, entries whose name starts with `_` or `.` are
//! left alone; those hold project subtrees and cache entries that the
//! orchestrator reads explicitly.
//!
//! ## Mutation
//!
//! Collections are mutated only by the orchestrator and the document tree
//! reader during synchronization. Registration is keyed by source path, so
//! reading the same checkout twice does not duplicate documents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::defaults::is_document_extension;
use crate::document::{Document, Page, StaticFile};
use crate::error::{Error, Result};
use crate::feed::{CombinedFeed, FeedEntry};
use crate::path::is_hidden;

/// Label of the site-level posts collection.
pub const POSTS: &str = "posts";

/// Label of the collection holding project index documents on a hub.
pub const PROJECTS: &str = "projects";

/// A named, ordered set of documents plus a parallel set of static assets.
#[derive(Debug, Clone)]
pub struct Collection {
    pub label: String,
    /// Directory the collection is rooted at, `<source>/_<label>`.
    pub directory: PathBuf,
    pub docs: Vec<Document>,
    pub files: Vec<StaticFile>,
}

impl Collection {
    pub fn new(label: &str, source: &Path) -> Self {
        Self {
            label: label.to_string(),
            directory: source.join(format!("_{}", label)),
            docs: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Register a document, replacing any document read from the same path.
    pub fn push_doc(&mut self, doc: Document) {
        match self.docs.iter_mut().find(|d| d.path == doc.path) {
            Some(existing) => *existing = doc,
            None => self.docs.push(doc),
        }
    }

    /// Register a static asset, replacing any asset with the same path.
    pub fn push_file(&mut self, file: StaticFile) {
        match self.files.iter_mut().find(|f| f.path == file.path) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
    }

    pub fn find_by_url(&self, url: &str) -> Option<&Document> {
        self.docs.iter().find(|d| d.url.to_string() == url)
    }

    pub fn find_by_path_mut(&mut self, path: &Path) -> Option<&mut Document> {
        self.docs.iter_mut().find(|d| d.path == path)
    }
}

/// The site being built.
#[derive(Debug)]
pub struct Site {
    pub source: PathBuf,
    pub config: SiteConfig,
    collections: BTreeMap<String, Collection>,
    pub pages: Vec<Page>,
    feed: Option<CombinedFeed>,
}

impl Site {
    /// Create a site with empty collections for every declared label and
    /// for the site posts.
    pub fn new(source: PathBuf, config: SiteConfig) -> Self {
        let mut collections = BTreeMap::new();
        for label in config
            .collection_labels()
            .into_iter()
            .chain(std::iter::once(POSTS.to_string()))
        {
            let collection = Collection::new(&label, &source);
            collections.insert(label, collection);
        }

        Self {
            source,
            config,
            collections,
            pages: Vec::new(),
            feed: None,
        }
    }

    /// Load configuration and collections from a site source directory.
    pub fn load(source: &Path) -> Result<Self> {
        let config = SiteConfig::load(source)?;
        Self::load_with_config(source, config)
    }

    /// Load collections from disk using an already parsed configuration.
    pub fn load_with_config(source: &Path, config: SiteConfig) -> Result<Self> {
        if !source.is_dir() {
            return Err(Error::Path {
                message: format!("site source is not a directory: {}", source.display()),
            });
        }

        let mut site = Self::new(source.to_path_buf(), config);
        let site_source = site.source.clone();
        for collection in site.collections.values_mut() {
            load_collection(collection, &site_source)?;
            debug!(
                "Loaded collection '{}': {} documents, {} files",
                collection.label,
                collection.docs.len(),
                collection.files.len()
            );
        }
        Ok(site)
    }

    pub fn is_hub(&self) -> bool {
        self.config.is_hub
    }

    pub fn collection(&self, label: &str) -> Option<&Collection> {
        self.collections.get(label)
    }

    pub fn collection_mut(&mut self, label: &str) -> Option<&mut Collection> {
        self.collections.get_mut(label)
    }

    pub fn has_collection(&self, label: &str) -> bool {
        self.collections.contains_key(label)
    }

    pub fn collections(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }

    /// Add a collection, replacing one with the same label.
    pub fn insert_collection(&mut self, collection: Collection) {
        self.collections.insert(collection.label.clone(), collection);
    }

    /// Site-level posts.
    pub fn posts(&self) -> &[Document] {
        self.collections
            .get(POSTS)
            .map(|c| c.docs.as_slice())
            .unwrap_or_default()
    }

    /// Publish the combined feed for the templating stage.
    pub fn publish_feed(&mut self, feed: CombinedFeed) {
        self.feed = Some(feed);
    }

    pub fn feed(&self) -> Option<&CombinedFeed> {
        self.feed.as_ref()
    }

    /// The published combined posts, empty before publication.
    pub fn posts_combined(&self) -> &[FeedEntry] {
        self.feed.as_ref().map(|f| f.posts()).unwrap_or_default()
    }

    pub fn num_posts_combined(&self) -> usize {
        self.posts_combined().len()
    }
}

fn load_collection(collection: &mut Collection, site_source: &Path) -> Result<()> {
    if !collection.directory.is_dir() {
        return Ok(());
    }

    let walker = WalkDir::new(&collection.directory)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !name.starts_with('_') && !is_hidden(entry.path()) && !entry.path_is_symlink()
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_document = path
            .extension()
            .map(|ext| is_document_extension(&ext.to_string_lossy()))
            .unwrap_or(false);

        if is_document {
            match Document::read(path, &collection.label, &collection.directory) {
                Ok(doc) => collection.push_doc(doc),
                Err(e) => warn!("Skipping unreadable document {}: {}", path.display(), e),
            }
        } else {
            collection.push_file(StaticFile::new(path, site_source)?);
        }
    }
    Ok(())
}
