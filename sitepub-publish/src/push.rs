//! Push the publishing branch through a transient remote.

use std::path::PathBuf;

use sitepub_core::{BranchName, CommitId, Layout, PipelineConfig, PublishOutcome};

use crate::error::PublishError;
use crate::git::Git;
use crate::publish::{checkout_publishing_branch, clear_receipt};

/// Where and how to push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOptions {
    pub branch: BranchName,
    pub upstream: String,
    pub remote_name: String,
    /// Explicit target; otherwise the upstream remote's URL.
    pub remote_url: Option<String>,
    pub receipt_path: PathBuf,
    pub dry_run: bool,
}

impl PushOptions {
    pub fn from_config(config: &PipelineConfig, layout: &Layout, dry_run: bool) -> Self {
        Self {
            branch: config.publish_branch(),
            upstream: config.publish.upstream.clone(),
            remote_name: config.publish.remote_name.clone(),
            remote_url: config.publish.remote_url.clone(),
            receipt_path: layout.receipt_path(),
            dry_run,
        }
    }

    /// `refs/heads/<branch>:refs/heads/<branch>`.
    pub fn refspec(&self) -> String {
        format!("refs/heads/{0}:refs/heads/{0}", self.branch)
    }
}

/// Result of [`publish_push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    pub outcome: PublishOutcome,
    pub commit: Option<CommitId>,
    pub remote_url: Option<String>,
    pub dry_run: bool,
}

impl PushReport {
    fn no_change() -> Self {
        Self {
            outcome: PublishOutcome::NoChange,
            commit: None,
            remote_url: None,
            dry_run: false,
        }
    }
}

/// Push `pending` to the authoritative repository.
///
/// `None` means this run made no commit; that is a `NoChange` no-op.
pub fn publish_push(
    git: &Git,
    pending: Option<&CommitId>,
    options: &PushOptions,
) -> Result<PushReport, PublishError> {
    let Some(commit) = pending else {
        tracing::info!("no commit to push");
        return Ok(PushReport::no_change());
    };

    checkout_publishing_branch(git, &options.branch, &options.upstream)?;
    let url = resolve_url(git, options)?;
    let refspec = options.refspec();

    if options.dry_run {
        tracing::info!(
            commit = %commit.short(),
            url = %url,
            %refspec,
            "dry run, not pushing"
        );
        return Ok(PushReport {
            outcome: PublishOutcome::Committed,
            commit: Some(commit.clone()),
            remote_url: Some(url),
            dry_run: true,
        });
    }

    {
        let _remote = RemoteGuard::add(git, &options.remote_name, &url, &refspec)?;
        tracing::info!(commit = %commit.short(), url = %url, "pushing publishing branch");
        git.push(&options.remote_name, &refspec)?;
    }

    clear_receipt(&options.receipt_path)?;
    Ok(PushReport {
        outcome: PublishOutcome::CommittedAndPushed,
        commit: Some(commit.clone()),
        remote_url: Some(url),
        dry_run: false,
    })
}

fn resolve_url(git: &Git, options: &PushOptions) -> Result<String, PublishError> {
    if let Some(url) = &options.remote_url {
        return Ok(url.clone());
    }
    git.remote_url(&options.upstream)?
        .ok_or_else(|| PublishError::NoRemoteUrl {
            remote: options.upstream.clone(),
        })
}

// ---------------------------------------------------------------------------
// RemoteGuard
// ---------------------------------------------------------------------------

/// A named remote that is removed again when the guard drops, whether or not
/// the push it was added for succeeded.
#[derive(Debug)]
pub struct RemoteGuard<'g> {
    git: &'g Git,
    name: String,
}

impl<'g> RemoteGuard<'g> {
    /// Add remote `name` unless it already exists. Either way, it is removed
    /// when the guard drops.
    pub fn add(
        git: &'g Git,
        name: &str,
        url: &str,
        refspec: &str,
    ) -> Result<Self, PublishError> {
        let guard = Self {
            git,
            name: name.to_string(),
        };
        if git.has_remote(name)? {
            tracing::debug!(remote = name, "transient remote already present");
        } else {
            git.add_remote(name, url, refspec)?;
            tracing::debug!(remote = name, url, "added transient remote");
        }
        Ok(guard)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RemoteGuard<'_> {
    fn drop(&mut self) {
        if let Ok(false) = self.git.has_remote(&self.name) {
            return;
        }
        match self.git.remove_remote(&self.name) {
            Ok(()) => tracing::debug!(remote = %self.name, "removed transient remote"),
            Err(err) => tracing::warn!(
                remote = %self.name,
                "failed to remove transient remote (ignored): {err}"
            ),
        }
    }
}
