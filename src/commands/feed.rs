//! # Feed Command Implementation
//!
//! Prints the combined post feed of a site as JSON, the shape the
//! templating stage consumes. With `--no-sync` the feed is built from what
//! is already on disk, without running any git command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use project_hub::feed::{self, CombinedFeed};

use super::{synchronize, SiteArgs};

/// Print the combined post feed as JSON
#[derive(Args, Debug)]
pub struct FeedArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Build the feed from local content only.
    #[arg(long)]
    pub no_sync: bool,
}

#[derive(Debug, Serialize)]
struct FeedOutput<'a> {
    num_posts_combined: usize,
    #[serde(flatten)]
    feed: &'a CombinedFeed,
}

/// Execute the `feed` command.
pub fn execute(args: FeedArgs) -> Result<()> {
    let mut site = args.site.load_site()?;
    if !args.no_sync {
        synchronize(&mut site);
    }

    let num_posts_combined = feed::build_and_publish(&mut site);
    if let Some(feed) = site.feed() {
        let output = FeedOutput {
            num_posts_combined,
            feed,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}
