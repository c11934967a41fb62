//! Path segmentation utilities for document identity

use std::fmt;
use std::path::{Component, Path};

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Number of segments an addressable document URL has:
/// `/<kind>/<project-or-collection>/<item>/<name>`.
pub const ADDRESSABLE_SEGMENTS: usize = 4;

/// A normalized, `/`-separated URL path such as `/projects/alpha/index`.
///
/// Empty components are dropped on construction, so `segments()` never
/// yields an empty string and `//a//b/` equals `/a/b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrlPath {
    segments: Vec<String>,
}

impl UrlPath {
    /// Parse a URL path.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Build the URL of a document from its collection label and its path
    /// relative to the collection directory. The extension of the last
    /// component is dropped.
    pub fn for_document(label: &str, relative: &Path) -> Result<Self> {
        let mut segments = vec![label.to_string()];
        let mut components = relative.components().peekable();

        while let Some(component) = components.next() {
            let Component::Normal(part) = component else {
                return Err(Error::Path {
                    message: format!(
                        "document path must be relative and normalized: {}",
                        relative.display()
                    ),
                });
            };
            let part = part.to_string_lossy();
            if components.peek().is_none() {
                let stem = Path::new(part.as_ref())
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                segments.push(stem);
            } else {
                segments.push(part.into_owned());
            }
        }

        Ok(Self { segments })
    }

    /// The non-empty components of this path.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last component, i.e. the document name.
    pub fn basename(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Whether any component equals `segment` exactly.
    pub fn contains_segment(&self, segment: &str) -> bool {
        self.segments.iter().any(|s| s == segment)
    }

    /// Whether this URL identifies a top-level, addressable item.
    pub fn is_addressable(&self) -> bool {
        self.segments.len() == ADDRESSABLE_SEGMENTS
    }

    /// Whether this is a project index: `/projects/<project>/index`.
    pub fn is_project_index(&self) -> bool {
        matches!(self.segments.as_slice(), [kind, _, name] if kind == "projects" && name == "index")
    }
}

impl fmt::Display for UrlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

impl Serialize for UrlPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Whether the file name of `path` starts with a dot.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
