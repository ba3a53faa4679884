//! Scratch repositories for publish tests: a working clone on `main` and a
//! bare `origin` that already carries the publishing branch.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use sitepub_core::{BranchName, BuildArtifact, Layout, PipelineConfig};
use sitepub_publish::{Git, PublishOptions, PushOptions};
use tempfile::TempDir;

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git in `dir`, panicking on failure; returns trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
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

pub struct Fixture {
    _tmp: TempDir,
    pub work: PathBuf,
    pub origin: PathBuf,
    pub config: PipelineConfig,
    pub layout: Layout,
}

impl Fixture {
    /// `origin` has `main` (sources) and `asf-site` (old generated content
    /// plus a stale page); the working clone has only `main` checked out.
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("tmp");
        let origin = tmp.path().join("origin.git");
        let work = tmp.path().join("work");
        fs::create_dir_all(&origin).expect("mkdir origin");
        fs::create_dir_all(&work).expect("mkdir work");

        git(&origin, &["init", "-q", "--bare"]);
        git(&work, &["init", "-q"]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(&work, &["config", "user.name", "Site Publisher"]);
        git(&work, &["config", "user.email", "publisher@example.org"]);
        git(&work, &["config", "commit.gpgsign", "false"]);
        let origin_url = origin.to_string_lossy().to_string();
        git(&work, &["remote", "add", "origin", origin_url.as_str()]);

        write(&work.join(".gitignore"), "build/\n");
        write(&work.join("website/src/index.md"), "# Docs\n");
        git(&work, &["add", "-A"]);
        git(&work, &["commit", "-q", "-m", "site sources"]);
        git(&work, &["push", "-q", "origin", "main"]);

        git(&work, &["checkout", "-q", "-b", "asf-site"]);
        write(&work.join("website/generated-content/index.html"), "<h1>old</h1>");
        write(&work.join("website/generated-content/stale.html"), "<p>gone soon</p>");
        git(&work, &["add", "-A"]);
        git(&work, &["commit", "-q", "-m", "old site"]);
        git(&work, &["push", "-q", "origin", "asf-site"]);
        git(&work, &["checkout", "-q", "main"]);
        git(&work, &["branch", "-q", "-D", "asf-site"]);

        let config = PipelineConfig::default();
        let layout = Layout::new(&work, &config);
        Self {
            _tmp: tmp,
            work,
            origin,
            config,
            layout,
        }
    }

    pub fn git(&self) -> Git {
        Git::open(&self.work).expect("open work repo")
    }

    pub fn artifact(&self) -> BuildArtifact {
        self.layout.artifact()
    }

    /// Write a file into the built site.
    pub fn build_file(&self, relative: &str, contents: &str) {
        write(&self.layout.artifact_dir().join(relative), contents);
    }

    pub fn publish_options(&self) -> PublishOptions {
        PublishOptions::from_config(&self.config, &self.layout)
    }

    pub fn push_options(&self) -> PushOptions {
        PushOptions::from_config(&self.config, &self.layout, false)
    }

    pub fn branch(&self) -> BranchName {
        self.config.publish_branch()
    }

    pub fn origin_head(&self, branch: &str) -> String {
        git(&self.origin, &["rev-parse", branch])
    }
}
