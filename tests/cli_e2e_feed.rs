//! End-to-end tests for the `feed` command.

mod common;

use common::prelude::*;

fn feed_json(site: &SiteFixture, args: &[&str]) -> serde_json::Value {
    let output = site
        .command()
        .arg("feed")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn test_feed_orders_posts_newest_first() {
    let site = SiteFixture::new()
        .with_config("title: Tool\n")
        .with_file("_posts/2024-01-02-older.md", "---\ntitle: Older\n---\n")
        .with_file("_posts/2024-03-04-newer.md", "---\ntitle: Newer\n---\n")
        .with_file(
            "_posts/2023-12-31-dated.md",
            "---\ntitle: Dated\ndate: 2024-02-01 09:00:00 +0000\n---\n",
        );

    let json = feed_json(&site, &["--no-sync"]);
    assert_eq!(json["num_posts_combined"], 3);
    let titles: Vec<&str> = json["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Newer", "Dated", "Older"]);
}

#[test]
fn test_feed_hashes_author_email() {
    let site = SiteFixture::new()
        .with_config("title: Tool\n")
        .with_file(
            "_posts/2024-01-02-hello.md",
            "---\ntitle: Hello\nauthor:\n  name: A\n  email: a@b.com\n---\n",
        );

    let json = feed_json(&site, &["--no-sync"]);
    let author = &json["posts"][0]["data"]["author"];
    assert_eq!(author["email"], "357a20e8c56e69d6f9734d23ef9517e8");
    assert_eq!(author["plaintext_email"], "a@b.com");
}

#[test]
fn test_feed_on_hub_without_checkouts() {
    let site = SiteFixture::new()
        .with_config("title: Hub\nis_hub: true\n")
        .with_file(
            "_projects/alpha/index.md",
            "---\ntitle: Alpha\nsite:\n  git_repo_url: https://invalid.example/alpha.git\n---\n",
        )
        .with_file("_posts/2024-01-02-welcome.md", "---\ntitle: Welcome\n---\n");

    let json = feed_json(&site, &["--no-sync"]);
    assert_eq!(json["num_posts_combined"], 1);
    assert_eq!(json["projects"]["alpha"]["title"], "Alpha");
    assert!(json["posts"][0]["parent_project"].is_null());
    site.child("_projects/alpha/.git")
        .assert(predicate::path::missing());
}

#[test]
fn test_feed_skip_mode_runs_no_git() {
    let site = SiteFixture::new()
        .with_config("title: Tool\nrefresh_remote_data: skip\n")
        .with_file(
            "_software/tool.md",
            "---\ntitle: Tool\nrepo_url: https://invalid.example/tool.git\n---\n",
        )
        .with_file("_posts/2024-01-02-hello.md", "---\ntitle: Hello\n---\n");

    let json = feed_json(&site, &[]);
    assert_eq!(json["num_posts_combined"], 1);
    site.child("_software/tool").assert(predicate::path::missing());
}

#[test]
fn test_feed_invalid_config_exits_1() {
    let site = SiteFixture::new().with_config("title: [unclosed\n");

    site.command().args(["feed", "--no-sync"]).assert().code(1);
}
