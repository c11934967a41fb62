//! Content documents, static assets and built pages.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::frontmatter;
use crate::path::UrlPath;

/// A unit of retrieved content: an article, a software doc page, a spec
/// page, a post, or an index document declaring a remote source.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Absolute path of the source file.
    pub path: PathBuf,
    /// Identity of the document, derived from its collection and path.
    pub url: UrlPath,
    /// Label of the collection the document belongs to.
    pub collection: String,
    /// Front-matter metadata.
    data: Mapping,
    /// Body following the front matter.
    #[serde(skip)]
    pub content: String,
}

impl Document {
    pub fn new(path: PathBuf, url: UrlPath, collection: &str, data: Mapping) -> Self {
        Self {
            path,
            url,
            collection: collection.to_string(),
            data,
            content: String::new(),
        }
    }

    /// Read a document from disk. `collection_dir` is the directory the
    /// collection is rooted at (e.g. `<source>/_software`); the URL is
    /// derived from the path relative to it.
    pub fn read(path: &Path, label: &str, collection_dir: &Path) -> Result<Self> {
        let relative = path
            .strip_prefix(collection_dir)
            .map_err(|_| Error::Document {
                path: path.to_path_buf(),
                message: format!("not inside collection directory {}", collection_dir.display()),
            })?;
        let url = UrlPath::for_document(label, relative)?;

        let raw = std::fs::read_to_string(path).map_err(|e| Error::Document {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let (data, body) = frontmatter::split(&raw).map_err(|e| Error::Document {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            url,
            collection: label.to_string(),
            data,
            content: body.to_string(),
        })
    }

    pub fn data(&self) -> &Mapping {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Merge `update` into the metadata. Keys present in `update` overwrite
    /// existing values; every other key is kept.
    pub fn merge_data(&mut self, update: Mapping) {
        for (key, value) in update {
            self.data.insert(key, value);
        }
    }

    /// The last URL segment, i.e. the item name of an index document.
    pub fn item_name(&self) -> &str {
        self.url.basename().unwrap_or_default()
    }

    /// Directory containing the source file.
    pub fn parent_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Path the checkout for this index document's own content goes to:
    /// a directory named after the item, next to the document.
    pub fn item_checkout_path(&self) -> PathBuf {
        self.parent_dir().join(self.item_name())
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }
}

/// A non-document file attached to a collection as an opaque asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Directory of the file relative to the site source.
    pub relative_dir: PathBuf,
    /// File name.
    pub name: String,
}

impl StaticFile {
    pub fn new(path: &Path, site_source: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Path {
                message: format!("static file without a name: {}", path.display()),
            })?;
        let relative_dir = path
            .parent()
            .and_then(|dir| dir.strip_prefix(site_source).ok())
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::Path {
                message: format!(
                    "static file {} is outside the site source {}",
                    path.display(),
                    site_source.display()
                ),
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            relative_dir,
            name,
        })
    }

    /// Path relative to the site source.
    pub fn relative_path(&self) -> PathBuf {
        self.relative_dir.join(&self.name)
    }
}

/// A renderable page produced by the spec-build collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub url: String,
    pub source: PathBuf,
}
