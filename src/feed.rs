//! # Combined Feed Builder
//!
//! Merges the site's own posts with (on hub sites) every project's posts into
//! one sequence ordered by publication date, most recent first. Ties keep
//! their original relative order.
//!
//! Each project post records the name of its parent project, resolved
//! against an index of project documents built from `/projects/<name>/index`
//! URLs. Author emails are replaced by their MD5 hex digest, suitable for
//! avatar lookup, with the plaintext kept under `plaintext_email`. The
//! rewriting applies to the feed entries' own copies of the metadata; the
//! collection documents are left untouched.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use log::warn;
use md5::{Digest, Md5};
use regex::Regex;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::document::Document;
use crate::path::UrlPath;
use crate::site::{Site, PROJECTS};

static FILENAME_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})-").expect("valid date prefix regex")
});

/// A project a post can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    /// Directory name of the project, which may differ from its title.
    pub name: String,
    pub url: UrlPath,
    pub title: Option<String>,
}

/// One post of the combined feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry {
    pub url: UrlPath,
    pub path: PathBuf,
    pub date: DateTime<FixedOffset>,
    pub title: Option<String>,
    /// Copy of the post metadata, with author emails hashed.
    pub data: Mapping,
    /// Name of the parent project, for posts coming from a project.
    pub parent_project: Option<String>,
}

/// The combined, date-ordered post sequence.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CombinedFeed {
    posts: Vec<FeedEntry>,
    projects: BTreeMap<String, ProjectSummary>,
}

impl CombinedFeed {
    pub fn posts(&self) -> &[FeedEntry] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Resolve the parent project of a feed entry.
    pub fn parent_of(&self, entry: &FeedEntry) -> Option<&ProjectSummary> {
        entry
            .parent_project
            .as_deref()
            .and_then(|name| self.projects.get(name))
    }
}

/// Build the combined feed from the site's collections.
pub fn build(site: &Site) -> CombinedFeed {
    let mut projects = BTreeMap::new();
    let mut candidates: Vec<(&Document, Option<String>)> = Vec::new();

    if site.is_hub() {
        if let Some(collection) = site.collection(PROJECTS) {
            for doc in collection.docs.iter().filter(|d| d.url.is_project_index()) {
                if let Some(name) = doc.url.segment(1) {
                    projects.insert(
                        name.to_string(),
                        ProjectSummary {
                            name: name.to_string(),
                            url: doc.url.clone(),
                            title: doc.title().map(str::to_string),
                        },
                    );
                }
            }

            for post in collection
                .docs
                .iter()
                .filter(|d| d.url.contains_segment("_posts"))
            {
                let parent = post
                    .url
                    .segment(1)
                    .filter(|name| projects.contains_key(*name))
                    .map(str::to_string);
                candidates.push((post, parent));
            }
        }
    }

    candidates.extend(site.posts().iter().map(|post| (post, None)));

    let mut posts: Vec<FeedEntry> = candidates
        .into_iter()
        .filter_map(|(post, parent_project)| {
            let Some(date) = post_date(post) else {
                warn!("Post {} has no usable date, leaving it out of the feed", post.url);
                return None;
            };
            let mut data = post.data().clone();
            hash_author_email(&mut data);
            Some(FeedEntry {
                url: post.url.clone(),
                path: post.path.clone(),
                date,
                title: post.title().map(str::to_string),
                data,
                parent_project,
            })
        })
        .collect();

    // `sort_by` is stable, so equal dates keep their original order.
    posts.sort_by(|a, b| b.date.cmp(&a.date));

    CombinedFeed { posts, projects }
}

/// Build the combined feed and publish it on the site. Returns the number of
/// posts published.
pub fn build_and_publish(site: &mut Site) -> usize {
    let feed = build(site);
    let count = feed.len();
    site.publish_feed(feed);
    count
}

/// Publication date of a post: the `date` front-matter field, else the
/// `YYYY-MM-DD-` prefix of its file name.
pub fn post_date(post: &Document) -> Option<DateTime<FixedOffset>> {
    if let Some(date) = post.get_str("date").and_then(parse_date) {
        return Some(date);
    }
    let file_name = post.path.file_name()?.to_string_lossy();
    let prefix = FILENAME_DATE.captures(&file_name)?.get(1)?.as_str().to_string();
    parse_date(&prefix)
}

fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date);
    }
    if let Ok(date) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z") {
        return Some(date);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// MD5 hex digest of an email address, as used for avatar lookup.
pub fn email_hash(email: &str) -> String {
    hex::encode(Md5::digest(email.as_bytes()))
}

fn hash_author_email(data: &mut Mapping) {
    let Some(Value::Mapping(author)) = data.get_mut("author") else {
        return;
    };
    let Some(email) = author.get("email").and_then(Value::as_str).map(str::to_string) else {
        return;
    };
    author.insert("email".into(), email_hash(&email).into());
    author.insert("plaintext_email".into(), email.into());
}
