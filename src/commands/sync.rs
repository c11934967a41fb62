//! # Sync Command Implementation
//!
//! This module implements the `sync` subcommand: load the site, resolve every
//! declared remote source, build the combined feed and print a summary of
//! what ended up in the site's collections.
//!
//! Sources that cannot be synchronized are reported but do not make the
//! command fail; only an invalid configuration does.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use project_hub::feed;
use project_hub::items::{self, ItemKind};
use project_hub::orchestrator::{ReadReport, LAST_UPDATE};
use project_hub::output::OutputConfig;
use project_hub::site::Site;

use super::{synchronize, SiteArgs};

/// Fetch every declared remote source and read it into the site
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct CollectionSummary {
    label: String,
    documents: usize,
    assets: usize,
}

#[derive(Debug, Serialize)]
struct SyncSummary {
    refresh: String,
    is_hub: bool,
    sources: ReadReport,
    collections: Vec<CollectionSummary>,
    pages: usize,
    /// Number of software and spec items, by kind.
    items: BTreeMap<&'static str, usize>,
    /// `last_update` of every index document carrying one, by URL.
    last_updates: BTreeMap<String, String>,
    num_posts_combined: usize,
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs, color_flag: &str) -> Result<()> {
    let mut site = args.site.load_site()?;
    let report = synchronize(&mut site);
    let posts = feed::build_and_publish(&mut site);
    let summary = summarize(&site, report, posts);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, &OutputConfig::from_env_and_flag(color_flag));
    }
    Ok(())
}

fn summarize(site: &Site, sources: ReadReport, num_posts_combined: usize) -> SyncSummary {
    let collections = site
        .collections()
        .map(|c| CollectionSummary {
            label: c.label.clone(),
            documents: c.docs.len(),
            assets: c.files.len(),
        })
        .collect();

    let items = ItemKind::ALL
        .iter()
        .map(|kind| (kind.label(), items::select_items(site, *kind).len()))
        .collect();

    let last_updates = site
        .collections()
        .flat_map(|c| c.docs.iter())
        .filter_map(|doc| {
            doc.get_str(LAST_UPDATE)
                .map(|t| (doc.url.to_string(), t.to_string()))
        })
        .collect();

    SyncSummary {
        refresh: site.config.refresh_remote_data.to_string(),
        is_hub: site.is_hub(),
        sources,
        collections,
        pages: site.pages.len(),
        items,
        last_updates,
        num_posts_combined,
    }
}

fn print_summary(summary: &SyncSummary, out: &OutputConfig) {
    println!(
        "{} ({} site, refresh: {})",
        out.heading("Sources"),
        if summary.is_hub { "hub" } else { "project" },
        summary.refresh
    );
    if summary.sources.sources.is_empty() {
        println!("  (none declared)");
    }
    for source in &summary.sources.sources {
        println!(
            "  {} {} {} <- {}",
            out.outcome(source.outcome),
            source.kind,
            source.document,
            source.remote
        );
        if let Some(error) = &source.error {
            println!("      {}", error);
        }
    }

    println!("\n{}", out.heading("Collections"));
    for collection in &summary.collections {
        println!(
            "  {}: {} documents, {} assets",
            collection.label, collection.documents, collection.assets
        );
    }
    println!("  pages built: {}", summary.pages);
    for (kind, count) in &summary.items {
        println!("  {} items: {}", kind, count);
    }

    if !summary.last_updates.is_empty() {
        println!("\n{}", out.heading("Last updates"));
        for (url, time) in &summary.last_updates {
            println!("  {} {}", url, time);
        }
    }

    println!("\nCombined posts: {}", summary.num_posts_combined);
}
