//! Software and spec item indexes.
//!
//! An item is the index document of one software package or spec, stored
//! directly inside a `_software` or `_specs` directory. On hubs items are
//! gathered from every project in the `projects` collection.

use std::collections::BTreeMap;
use std::path::Path;

use serde_yaml::Value;

use crate::document::Document;
use crate::site::{Site, PROJECTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Software,
    Specs,
}

impl ItemKind {
    pub const ALL: [ItemKind; 2] = [ItemKind::Software, ItemKind::Specs];

    /// Collection label on project sites, also the index page name.
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Software => "software",
            ItemKind::Specs => "specs",
        }
    }

    fn directory(&self) -> &'static str {
        match self {
            ItemKind::Software => "_software",
            ItemKind::Specs => "_specs",
        }
    }

    /// Whether a document at `relative` (relative to the site source) is an
    /// item of this kind. Documentation nested below an item never is.
    pub fn matches(&self, relative: &Path) -> bool {
        relative
            .parent()
            .and_then(Path::file_name)
            .map(|dir| dir == self.directory())
            .unwrap_or(false)
    }
}

/// Items of `kind`, in collection order.
pub fn select_items(site: &Site, kind: ItemKind) -> Vec<&Document> {
    let label = if site.is_hub() { PROJECTS } else { kind.label() };
    let Some(collection) = site.collection(label) else {
        return Vec::new();
    };

    collection
        .docs
        .iter()
        .filter(|doc| {
            let relative = doc.path.strip_prefix(&site.source).unwrap_or(&doc.path);
            kind.matches(relative)
        })
        .collect()
}

/// Group items by each tag in their `tags` list.
pub fn tag_index<'a>(items: &[&'a Document]) -> BTreeMap<String, Vec<&'a Document>> {
    let mut tags: BTreeMap<String, Vec<&'a Document>> = BTreeMap::new();
    for item in items {
        let Some(Value::Sequence(list)) = item.get("tags") else {
            continue;
        };
        for tag in list.iter().filter_map(Value::as_str) {
            tags.entry(tag.to_string()).or_default().push(*item);
        }
    }
    tags
}
