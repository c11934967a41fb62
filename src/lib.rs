//! # Project Hub Library
//!
//! This library provides the synchronization phase of a multi-project
//! documentation site. It discovers the remote sources declared by a site's
//! content (hub projects, software documentation, specs), materializes them
//! as shallow sparse git checkouts, reads the retrieved trees into the site's
//! content collections and builds the combined post feed. It is used by the
//! `project-hub` command-line tool and can be embedded by a site generator.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use project_hub::orchestrator::Orchestrator;
//! use project_hub::repository::RepositoryManager;
//! use project_hub::site::Site;
//! use project_hub::spec_builder::StaticSpecBuilder;
//!
//! let mut site = Site::load(Path::new("site")).unwrap();
//! let repos = RepositoryManager::new(site.config.refresh_remote_data);
//! let report = Orchestrator::new(&repos, &StaticSpecBuilder).read(&mut site);
//! let posts = project_hub::feed::build_and_publish(&mut site);
//! println!("{} sources, {} posts", report.sources.len(), posts);
//! ```
//!
//! ## Core Concepts
//!
//! - **Site (`site`, `config`, `document`)**: The site source directory, its
//!   `_config.yml`, and the collections of documents and static assets read
//!   from `_<label>` directories.
//! - **Checkouts (`cache`, `policy`, `git`, `repository`)**: Each remote source
//!   is a shallow, optionally sparse, single-branch checkout at a fixed path.
//!   The refresh mode decides when the network is used.
//! - **Reading (`reader`, `path`)**: Checked-out trees become documents and
//!   assets. Only documents with four URL segments are addressable.
//! - **Resolution (`orchestrator`, `spec_builder`)**: Walks the index
//!   documents, synchronizes what they declare and stamps them with
//!   `last_update`.
//! - **Aggregation (`feed`, `items`)**: The combined post feed across
//!   projects, and the software and spec item indexes.
//!
//! ## Execution Flow
//!
//! 1.  **Load**: Read `_config.yml` and the declared collections.
//! 2.  **Resolve**: On hubs, synchronize and read every project, then its
//!     software and specs. On project sites, resolve software, specs and the
//!     parent hub branding.
//! 3.  **Aggregate**: Build and publish the combined feed.
//!
//! Per-source failures never abort the phase; only an invalid refresh mode
//! does, and it is reported while loading the configuration.

pub mod cache;
pub mod config;
pub mod defaults;
pub mod document;
pub mod error;
pub mod feed;
pub mod frontmatter;
pub mod git;
pub mod items;
pub mod orchestrator;
pub mod output;
pub mod path;
pub mod policy;
pub mod reader;
pub mod repository;
pub mod site;
pub mod spec_builder;

#[cfg(test)]
mod path_proptest;
