//! End-to-end runs of the `sitepub` binary against scratch git repositories.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn sitepub_cmd(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sitepub"));
    cmd.arg("--project-root").arg(root).env_remove("RUST_LOG");
    cmd
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write");
}

/// A working clone on `main` plus a bare origin carrying `asf-site`.
struct Repo {
    _tmp: TempDir,
    work: PathBuf,
    origin: PathBuf,
}

impl Repo {
    fn new() -> Self {
        let tmp = TempDir::new().expect("tmp");
        let origin = tmp.path().join("origin.git");
        let work = tmp.path().join("work");
        fs::create_dir_all(&origin).expect("mkdir");
        fs::create_dir_all(&work).expect("mkdir");

        git(&origin, &["init", "-q", "--bare"]);
        git(&work, &["init", "-q"]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(&work, &["config", "user.name", "Site Publisher"]);
        git(&work, &["config", "user.email", "publisher@example.org"]);
        git(&work, &["config", "commit.gpgsign", "false"]);
        let url = origin.to_string_lossy().to_string();
        git(&work, &["remote", "add", "origin", url.as_str()]);

        write(&work.join(".gitignore"), "build/\n");
        write(&work.join("website/src/index.md"), "# Docs\n");
        git(&work, &["add", "-A"]);
        git(&work, &["commit", "-q", "-m", "site sources"]);

        git(&work, &["checkout", "-q", "-b", "asf-site"]);
        write(&work.join("website/generated-content/index.html"), "<h1>old</h1>");
        git(&work, &["add", "-A"]);
        git(&work, &["commit", "-q", "-m", "old site"]);
        git(&work, &["push", "-q", "origin", "asf-site"]);
        git(&work, &["checkout", "-q", "main"]);
        git(&work, &["branch", "-q", "-D", "asf-site"]);

        Self {
            _tmp: tmp,
            work,
            origin,
        }
    }

    fn built(&self, relative: &str, contents: &str) {
        write(
            &self.work.join("build/website/generated-content").join(relative),
            contents,
        );
    }
}

macro_rules! require_git {
    () => {
        if !git_available() {
            eprintln!("skipping: git not available");
            return;
        }
    };
}

#[test]
fn help_lists_every_stage() {
    let root = TempDir::new().unwrap();
    sitepub_cmd(root.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            contains("provision")
                .and(contains("build"))
                .and(contains("test"))
                .and(contains("teardown"))
                .and(contains("publish-push"))
                .and(contains("all")),
        );
}

#[test]
fn publish_then_push_updates_origin() {
    require_git!();
    let repo = Repo::new();
    repo.built("index.html", "<h1>new</h1>");
    let before = git(&repo.origin, &["rev-list", "--count", "asf-site"]);

    sitepub_cmd(&repo.work)
        .arg("publish")
        .assert()
        .success()
        .stdout(contains("committed"));
    sitepub_cmd(&repo.work)
        .arg("publish-push")
        .assert()
        .success()
        .stdout(contains("pushed"));

    let after = git(&repo.origin, &["rev-list", "--count", "asf-site"]);
    assert_eq!(
        after.parse::<usize>().unwrap(),
        before.parse::<usize>().unwrap() + 1
    );
    assert_eq!(git(&repo.work, &["remote"]), "origin");
    assert_eq!(
        git(
            &repo.origin,
            &["show", "asf-site:website/generated-content/index.html"]
        ),
        "<h1>new</h1>"
    );
}

#[test]
fn pydoc_content_exits_with_two() {
    require_git!();
    let repo = Repo::new();
    repo.built("index.html", "<h1>new</h1>");
    repo.built("documentation/sdks/pydoc/index.html", "<p>pydoc</p>");

    sitepub_cmd(&repo.work)
        .arg("publish")
        .assert()
        .code(2)
        .stderr(contains("unexpected generated doc content"));

    assert_eq!(git(&repo.work, &["rev-parse", "--abbrev-ref", "HEAD"]), "main");
}

#[test]
fn missing_index_exits_with_two() {
    require_git!();
    let repo = Repo::new();
    repo.built("about.html", "<p>about</p>");

    sitepub_cmd(&repo.work).arg("publish").assert().code(2);
}

#[test]
fn unchanged_content_is_a_successful_no_op() {
    require_git!();
    let repo = Repo::new();
    repo.built("index.html", "<h1>old</h1>");
    let origin_head = git(&repo.origin, &["rev-parse", "asf-site"]);

    let assert = sitepub_cmd(&repo.work)
        .args(["publish", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(json["outcome"], "no_change");
    assert!(json["commit"].is_null());

    sitepub_cmd(&repo.work)
        .arg("publish-push")
        .assert()
        .success()
        .stdout(contains("nothing to push"));
    assert_eq!(git(&repo.origin, &["rev-parse", "asf-site"]), origin_head);
}

#[test]
fn push_to_unreachable_remote_fails_and_cleans_up() {
    require_git!();
    let repo = Repo::new();
    repo.built("index.html", "<h1>new</h1>");
    sitepub_cmd(&repo.work).arg("publish").assert().success();

    let missing = repo.work.join("nowhere.git");
    sitepub_cmd(&repo.work)
        .args(["publish-push", "--remote-url"])
        .arg(&missing)
        .assert()
        .code(1)
        .stderr(contains("publish-push failed"));

    assert_eq!(git(&repo.work, &["remote"]), "origin");
}

#[test]
fn build_without_container_fails_with_one() {
    let root = TempDir::new().unwrap();
    sitepub_cmd(root.path())
        .arg("build")
        .assert()
        .code(1)
        .stderr(contains("sitepub provision"));
}

#[test]
fn teardown_without_container_is_a_no_op() {
    let root = TempDir::new().unwrap();
    sitepub_cmd(root.path())
        .arg("teardown")
        .assert()
        .success()
        .stdout(contains("no container provisioned"));
}

#[test]
fn malformed_config_fails_with_one() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("sitepub.yaml"), "container: [not, a, map]\n").unwrap();
    sitepub_cmd(root.path())
        .arg("teardown")
        .assert()
        .code(1)
        .stderr(contains("sitepub.yaml"));
}

#[test]
fn publish_outside_git_fails_with_one() {
    require_git!();
    let root = TempDir::new().unwrap();
    write(
        &root.path().join("build/website/generated-content/index.html"),
        "<h1>x</h1>",
    );
    sitepub_cmd(root.path())
        .arg("publish")
        .assert()
        .code(1)
        .stderr(contains("git"));
}

#[test]
fn explicit_missing_config_file_fails_with_one() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("missing.yaml");
    sitepub_cmd(root.path())
        .arg("--config-file")
        .arg(&missing)
        .arg("teardown")
        .assert()
        .code(1)
        .stderr(contains("missing.yaml").and(contains("does not exist")));
}
