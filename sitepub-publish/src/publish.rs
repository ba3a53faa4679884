//! Commit generated content to the publishing branch.
//!
//! ## `publish`: steps
//!
//! 1. Check the artifact (index present, excluded subdirectories absent).
//! 2. Record the source commit, then check out the publishing branch,
//!    creating it from `<upstream>/<branch>` when there is no local branch.
//! 3. Remove the previous generated content; assert it is gone.
//! 4. Copy the artifact into place; assert the new content is present.
//! 5. Stage the content path.
//! 6. Nothing staged under the content path → `NoChange`.
//! 7. Otherwise commit the content path only → `Committed`, and persist a
//!    receipt for a later push.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use sitepub_core::{
    state, BranchName, BuildArtifact, CommitId, Layout, PipelineConfig, PublishOutcome,
};

use crate::content;
use crate::error::PublishError;
use crate::git::Git;

/// Where and how to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    pub branch: BranchName,
    pub upstream: String,
    /// Repository-relative location of the content on the publishing branch.
    pub content_path: PathBuf,
    pub excluded: Vec<PathBuf>,
    pub receipt_path: PathBuf,
}

impl PublishOptions {
    pub fn from_config(config: &PipelineConfig, layout: &Layout) -> Self {
        Self {
            branch: config.publish_branch(),
            upstream: config.publish.upstream.clone(),
            content_path: config.publish.content_path.clone(),
            excluded: config.publish.excluded.clone(),
            receipt_path: layout.receipt_path(),
        }
    }
}

/// Result of [`publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub outcome: PublishOutcome,
    /// The new commit on the publishing branch, if one was made.
    pub commit: Option<CommitId>,
    /// `HEAD` of the branch the run started from.
    pub source_commit: CommitId,
    pub branch: BranchName,
}

impl PublishReport {
    /// The commit a subsequent push should deliver, if any.
    pub fn pending(&self) -> Option<&CommitId> {
        match self.outcome {
            PublishOutcome::Committed => self.commit.as_ref(),
            _ => None,
        }
    }
}

/// Persisted record of a commit not yet pushed, read by a later
/// `publish-push` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub committed: bool,
    pub commit: CommitId,
    pub branch: BranchName,
    pub source_commit: CommitId,
    pub created_at: DateTime<Utc>,
}

/// Publish `artifact` onto the publishing branch of the repository at `git`.
pub fn publish(
    git: &Git,
    artifact: &BuildArtifact,
    options: &PublishOptions,
) -> Result<PublishReport, PublishError> {
    content::check_artifact(artifact, &options.excluded)?;

    let source_commit = git.head_commit()?;
    checkout_publishing_branch(git, &options.branch, &options.upstream)?;

    let copied = content::replace_content(git, &options.content_path, artifact)?;
    git.add(&options.content_path)?;

    if !git.has_staged_changes(&options.content_path)? {
        tracing::info!(branch = %options.branch, "generated content unchanged, nothing to commit");
        if state::remove_at(&options.receipt_path)? {
            tracing::debug!("removed stale publish receipt");
        }
        return Ok(PublishReport {
            outcome: PublishOutcome::NoChange,
            commit: None,
            source_commit,
            branch: options.branch.clone(),
        });
    }

    let message = commit_message(Utc::now(), &source_commit);
    let commit = git.commit(&message, &options.content_path)?;
    tracing::info!(
        branch = %options.branch,
        commit = %commit.short(),
        files = copied,
        "committed generated content"
    );

    save_receipt(
        &options.receipt_path,
        &PublishReceipt {
            committed: true,
            commit: commit.clone(),
            branch: options.branch.clone(),
            source_commit: source_commit.clone(),
            created_at: Utc::now(),
        },
    )?;

    Ok(PublishReport {
        outcome: PublishOutcome::Committed,
        commit: Some(commit),
        source_commit,
        branch: options.branch.clone(),
    })
}

/// Check out `branch`, creating a local branch tracking `<upstream>/<branch>`
/// when needed.
pub(crate) fn checkout_publishing_branch(
    git: &Git,
    branch: &BranchName,
    upstream: &str,
) -> Result<(), PublishError> {
    if git.current_branch()?.as_ref() == Some(branch) {
        return Ok(());
    }
    if git.branch_exists(branch)? {
        git.checkout(branch)?;
    } else if git.remote_branch_exists(upstream, branch)? {
        tracing::info!(%branch, %upstream, "creating local publishing branch");
        git.checkout_new_tracking(branch, upstream)?;
    } else {
        return Err(PublishError::BranchNotFound {
            branch: branch.to_string(),
            upstream: upstream.to_string(),
        });
    }
    tracing::debug!(%branch, "checked out publishing branch");
    Ok(())
}

/// `Publishing website <timestamp> at commit <short id>`.
pub fn commit_message(at: DateTime<Utc>, source: &CommitId) -> String {
    format!(
        "Publishing website {} at commit {}",
        at.to_rfc3339_opts(SecondsFormat::Secs, true),
        source.short()
    )
}

pub fn save_receipt(path: &Path, receipt: &PublishReceipt) -> Result<(), PublishError> {
    Ok(state::save_at(path, receipt)?)
}

/// Load the receipt, `None` if no unpushed commit is recorded.
pub fn load_receipt(path: &Path) -> Result<Option<PublishReceipt>, PublishError> {
    Ok(state::load_at(path)?)
}

pub fn clear_receipt(path: &Path) -> Result<bool, PublishError> {
    Ok(state::remove_at(path)?)
}
