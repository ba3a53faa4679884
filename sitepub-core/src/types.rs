//! Domain types shared by the pipeline stages.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Records that outlive a single CLI invocation are serde-serializable.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identifier of a container as reported by the container runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub String);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ContainerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContainerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Tag of the image the site generator runs in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageTag(pub String);

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ImageTag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ImageTag {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A git branch name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchName(pub String);

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for BranchName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BranchName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A full git commit id (hex object name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitId(pub String);

impl CommitId {
    /// Length of the abbreviated id used in commit messages.
    pub const SHORT_LEN: usize = 7;

    /// The abbreviated id (first seven hex digits, or the whole id if shorter).
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(Self::SHORT_LEN)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CommitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Pipeline records
// ---------------------------------------------------------------------------

/// What the container image is built from.
///
/// The manifest file set is the build recipe plus the dependency lockfile; the
/// image cannot be built unless both exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSpec {
    pub tag: ImageTag,
    /// Build context handed to the runtime.
    pub context_dir: PathBuf,
    /// Dockerfile (or compatible) recipe.
    pub recipe: PathBuf,
    pub lockfile: PathBuf,
}

impl ImageSpec {
    /// Manifest files the image build reads.
    pub fn manifest(&self) -> [&Path; 2] {
        [self.lockfile.as_path(), self.recipe.as_path()]
    }
}

/// A running container provisioned for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerHandle {
    pub id: ContainerId,
    pub image: ImageTag,
    /// Absolute host path bind-mounted into the container.
    pub project_root: PathBuf,
    /// Where `project_root` appears inside the container.
    pub mount_point: PathBuf,
    pub created_at: DateTime<Utc>,
}

impl ContainerHandle {
    /// Map a host path under the project root to its in-container path.
    ///
    /// Returns `None` for paths outside the bind mount.
    pub fn container_path(&self, host: &Path) -> Option<PathBuf> {
        let relative = host.strip_prefix(&self.project_root).ok()?;
        Some(self.mount_point.join(relative))
    }
}

/// The directory of generated site content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    pub root: PathBuf,
}

impl BuildArtifact {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/index.html`, which every publishable artifact must carry.
    pub fn index_path(&self) -> PathBuf {
        self.root.join("index.html")
    }

    /// Whether `relative` exists inside the artifact.
    pub fn contains(&self, relative: &Path) -> bool {
        self.root.join(relative).exists()
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }
}

/// Result of a publish or push step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOutcome {
    /// Nothing differed from the branch, or there was nothing to push.
    NoChange,
    /// A commit was created on the publishing branch.
    Committed,
    /// The commit was pushed to the authoritative repository.
    CommittedAndPushed,
    /// A git operation failed.
    Error,
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishOutcome::NoChange => write!(f, "no change"),
            PublishOutcome::Committed => write!(f, "committed"),
            PublishOutcome::CommittedAndPushed => write!(f, "committed and pushed"),
            PublishOutcome::Error => write!(f, "error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
