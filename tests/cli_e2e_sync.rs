//! End-to-end tests for the `sync` command.

mod common;

use common::prelude::*;

#[test]
fn test_help_lists_commands() {
    let mut cmd = cargo_bin_cmd!("project-hub");

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("feed"));
}

#[test]
fn test_version() {
    let mut cmd = cargo_bin_cmd!("project-hub");

    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_sync_empty_site() {
    let site = SiteFixture::new().with_config("title: Empty\n");

    site.command()
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("(none declared)"))
        .stdout(predicate::str::contains("Combined posts: 0"));
}

#[test]
fn test_sync_local_posts_without_sources() {
    let site = SiteFixture::new()
        .with_config("title: Tool\n")
        .with_file("_posts/2024-01-02-hello.md", "---\ntitle: Hello\n---\n")
        .with_file("_posts/2024-01-03-again.md", "---\ntitle: Again\n---\n");

    site.command()
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Combined posts: 2"));
}

#[test]
fn test_sync_source_option() {
    let site = SiteFixture::new()
        .with_config("title: Tool\n")
        .with_file("_posts/2024-01-02-hello.md", "---\ntitle: Hello\n---\n");
    let elsewhere = assert_fs::TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("project-hub");
    cmd.current_dir(elsewhere.path())
        .env_remove("PROJECT_HUB_SOURCE")
        .env_remove("PROJECT_HUB_REFRESH")
        .arg("sync")
        .arg("--source")
        .arg(site.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Combined posts: 1"));
}

#[test]
fn test_invalid_refresh_in_config_exits_1() {
    let site = SiteFixture::new().with_config("refresh_remote_data: hourly\n");

    site.command()
        .arg("sync")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("hourly"));
}

#[test]
fn test_invalid_refresh_option_exits_1() {
    let site = SiteFixture::new().with_config("title: Tool\n");

    site.command()
        .args(["sync", "--refresh", "bogus"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bogus"));
}

#[test]
fn test_refresh_from_environment() {
    let site = SiteFixture::new().with_config("title: Tool\n");

    site.command()
        .env("PROJECT_HUB_REFRESH", "skip")
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("refresh: skip"));
}

#[test]
fn test_sync_json_summary() {
    let site = SiteFixture::new()
        .with_config("title: Tool\nrefresh_remote_data: always\n")
        .with_file("_posts/2024-01-02-hello.md", "---\ntitle: Hello\n---\n");

    let output = site
        .command()
        .args(["sync", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["num_posts_combined"], 1);
    assert_eq!(json["refresh"], "always");
    assert_eq!(json["is_hub"], false);
    assert!(json["sources"]["sources"].as_array().unwrap().is_empty());
}

#[test]
fn test_skip_with_uncached_source() {
    let site = SiteFixture::new()
        .with_config("title: Tool\nrefresh_remote_data: skip\n")
        .with_file(
            "_software/tool.md",
            "---\ntitle: Tool\nrepo_url: https://invalid.example/tool.git\n---\n",
        );

    site.command()
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("[not cached]"))
        .stdout(predicate::str::contains("Combined posts: 0"));
    site.child("_software/tool").assert(predicate::path::missing());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_sync_software_item_from_local_remote() {
    let remote = LocalRemote::new(&[
        ("docs/index.md", "---\ntitle: Tool docs\n---\n"),
        ("docs/guide.md", "---\ntitle: Guide\n---\n"),
        ("src/main.rs", "fn main() {}\n"),
    ]);
    let site = SiteFixture::new()
        .with_config("title: Tool\n")
        .with_file("_software/tool.md", &remote.software_index("Tool"));

    site.command()
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("[ok] software"))
        .stdout(predicate::str::contains(format!(
            "/software/tool {}",
            COMMIT_DATE
        )));

    site.child("_software/tool/docs/guide.md")
        .assert(predicate::path::exists());
    site.child("_software/tool/src")
        .assert(predicate::path::missing());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_unreachable_source_does_not_fail_sync() {
    let site = SiteFixture::new()
        .with_config("title: Tool\n")
        .with_file(
            "_software/tool.md",
            "---\ntitle: Tool\nrepo_url: file:///nonexistent/project-hub/tool\n---\n",
        );

    site.command()
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("[failed]"));
    site.child("_software/tool").assert(predicate::path::missing());
}
