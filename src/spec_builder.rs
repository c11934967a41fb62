//! Spec-build collaborator
//!
//! Turns a checked-out spec subtree into renderable pages. The rendering
//! engines themselves live outside this crate; they plug in by implementing
//! `SpecBuilder`.

use std::path::Path;

use log::debug;
use serde_yaml::Mapping;
use walkdir::WalkDir;

use crate::defaults::is_document_extension;
use crate::document::{Document, Page};
use crate::error::{Error, Result};
use crate::path::is_hidden;
use crate::site::Site;

/// Builds the pages of one spec from its checked-out sources.
pub trait SpecBuilder {
    /// Build pages for the spec declared by `index_doc` from the files under
    /// `source_root`. Page URLs are placed under `/<dest_prefix>/`.
    fn build(
        &self,
        site: &Site,
        index_doc: &Document,
        source_root: &Path,
        dest_prefix: &str,
        engine: &str,
        options: &Mapping,
    ) -> Result<Vec<Page>>;
}

/// Publishes every document file of the spec as a page of its own, without
/// running an engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticSpecBuilder;

impl SpecBuilder for StaticSpecBuilder {
    fn build(
        &self,
        _site: &Site,
        index_doc: &Document,
        source_root: &Path,
        dest_prefix: &str,
        engine: &str,
        _options: &Mapping,
    ) -> Result<Vec<Page>> {
        debug!(
            "Building {} with engine '{}' from {}",
            index_doc.url,
            engine,
            source_root.display()
        );
        if !source_root.is_dir() {
            return Err(Error::SpecBuild {
                engine: engine.to_string(),
                message: format!("spec sources not found at {}", source_root.display()),
            });
        }

        let prefix = dest_prefix.trim_matches('/');
        let mut pages = Vec::new();
        let walker = WalkDir::new(source_root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry.path()) && !entry.path_is_symlink());

        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            let is_document = entry.file_type().is_file()
                && path
                    .extension()
                    .map(|ext| is_document_extension(&ext.to_string_lossy()))
                    .unwrap_or(false);
            if !is_document {
                continue;
            }

            let relative = path
                .strip_prefix(source_root)
                .map_err(|_| Error::SpecBuild {
                    engine: engine.to_string(),
                    message: format!("{} is outside {}", path.display(), source_root.display()),
                })?
                .with_extension("");
            let rel = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            pages.push(Page {
                url: format!("/{}/{}/", prefix, rel),
                source: path.to_path_buf(),
            });
        }
        Ok(pages)
    }
}
