//! # CLI Command Implementations
//!
//! Each subcommand of `project-hub` lives in its own file with an `Args`
//! struct derived using `clap` and an `execute` function calling into the
//! `project_hub` library. Options shared by every command (site source and
//! refresh mode) are defined here.

pub mod feed;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::info;

use project_hub::config::{RefreshMode, SiteConfig};
use project_hub::orchestrator::{Orchestrator, ReadReport};
use project_hub::repository::RepositoryManager;
use project_hub::site::Site;
use project_hub::spec_builder::StaticSpecBuilder;

/// Options locating the site and choosing the refresh mode.
#[derive(Args, Debug)]
pub struct SiteArgs {
    /// Site source directory containing `_config.yml`.
    #[arg(short, long, value_name = "DIR", env = "PROJECT_HUB_SOURCE", default_value = ".")]
    pub source: PathBuf,

    /// Refresh mode overriding `refresh_remote_data` (always, last-resort, skip).
    #[arg(long, value_name = "MODE", env = "PROJECT_HUB_REFRESH")]
    pub refresh: Option<String>,
}

impl SiteArgs {
    /// Load the site configuration with the command-line override applied.
    ///
    /// An invalid refresh mode, in the file or on the command line, fails
    /// here, before any source is touched.
    pub fn load_config(&self) -> Result<SiteConfig> {
        let mut config = SiteConfig::load(&self.source).map_err(|e| {
            let reason = if e.is_fatal() {
                "Invalid site configuration, no source was synchronized"
            } else {
                "Failed to load site configuration"
            };
            anyhow::Error::new(e).context(format!("{} ({})", reason, self.source.display()))
        })?;
        if let Some(mode) = &self.refresh {
            config.refresh_remote_data = mode.parse::<RefreshMode>()?;
        }
        Ok(config)
    }

    pub fn load_site(&self) -> Result<Site> {
        let config = self.load_config()?;
        let site = Site::load_with_config(&self.source, config)
            .with_context(|| format!("Failed to read site at {}", self.source.display()))?;
        Ok(site)
    }
}

/// Resolve every remote source of `site` with the default spec builder.
pub fn synchronize(site: &mut Site) -> ReadReport {
    let repos = RepositoryManager::new(site.config.refresh_remote_data);
    info!(
        "Synchronizing {} site at {}",
        if site.is_hub() { "hub" } else { "project" },
        site.source.display()
    );
    Orchestrator::new(&repos, &StaticSpecBuilder).read(site)
}
