//! Thin wrapper over the `git` CLI, scoped to one working tree.

use std::path::{Path, PathBuf};

use sitepub_core::{BranchName, CommandError, CommandLine, CommitId, ExecOutput};

use crate::error::PublishError;

/// A git working tree, addressed by its top-level directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Git {
    root: PathBuf,
}

impl Git {
    /// Open the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self, PublishError> {
        let output = CommandLine::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(path)
            .output()?;
        if !output.success() {
            return Err(PublishError::NotARepository {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            root: PathBuf::from(output.stdout.trim()),
        })
    }

    /// Top-level directory of the working tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cmd(&self) -> CommandLine {
        CommandLine::new("git").current_dir(&self.root)
    }

    fn run<const N: usize>(&self, args: [&str; N]) -> Result<String, PublishError> {
        Ok(self.cmd().args(args).run()?.stdout)
    }

    /// Full id of the commit `HEAD` points at.
    pub fn head_commit(&self) -> Result<CommitId, PublishError> {
        let out = self.run(["rev-parse", "HEAD"])?;
        Ok(CommitId::from(out.trim()))
    }

    /// Abbreviated id of `HEAD`, as it appears in commit messages.
    pub fn short_id(&self) -> Result<String, PublishError> {
        Ok(self.head_commit()?.short().to_string())
    }

    /// Checked-out branch, `None` on a detached `HEAD`.
    pub fn current_branch(&self) -> Result<Option<BranchName>, PublishError> {
        let cmd = self.cmd().args(["symbolic-ref", "--short", "-q", "HEAD"]);
        let output = cmd.output()?;
        match output.code {
            Some(0) => Ok(Some(BranchName::from(output.stdout.trim()))),
            Some(1) => Ok(None),
            _ => Err(unexpected_status(&cmd, &output)),
        }
    }

    pub fn branch_exists(&self, branch: &BranchName) -> Result<bool, PublishError> {
        self.ref_exists(&format!("refs/heads/{branch}"))
    }

    pub fn remote_branch_exists(
        &self,
        remote: &str,
        branch: &BranchName,
    ) -> Result<bool, PublishError> {
        self.ref_exists(&format!("refs/remotes/{remote}/{branch}"))
    }

    fn ref_exists(&self, reference: &str) -> Result<bool, PublishError> {
        let cmd = self
            .cmd()
            .args(["show-ref", "--verify", "--quiet", reference]);
        let output = cmd.output()?;
        match output.code {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(unexpected_status(&cmd, &output)),
        }
    }

    pub fn checkout(&self, branch: &BranchName) -> Result<(), PublishError> {
        self.run(["checkout", "-q", branch.0.as_str()])?;
        Ok(())
    }

    /// Create `branch` tracking `<remote>/<branch>` and check it out.
    pub fn checkout_new_tracking(
        &self,
        branch: &BranchName,
        remote: &str,
    ) -> Result<(), PublishError> {
        let start = format!("{remote}/{branch}");
        self.run([
            "checkout",
            "-q",
            "-b",
            branch.0.as_str(),
            "--track",
            start.as_str(),
        ])?;
        Ok(())
    }

    /// Remove `path` from the index and working tree; a no-op if untracked.
    pub fn rm_recursive(&self, path: &Path) -> Result<(), PublishError> {
        let path = path.to_string_lossy();
        self.run(["rm", "-r", "-f", "-q", "--ignore-unmatch", "--", path.as_ref()])?;
        Ok(())
    }

    pub fn add(&self, path: &Path) -> Result<(), PublishError> {
        let path = path.to_string_lossy();
        self.run(["add", "-A", "--", path.as_ref()])?;
        Ok(())
    }

    /// Whether the index differs from `HEAD` under `path`.
    pub fn has_staged_changes(&self, path: &Path) -> Result<bool, PublishError> {
        let path = path.to_string_lossy();
        let cmd = self
            .cmd()
            .args(["diff", "--cached", "--quiet", "--", path.as_ref()]);
        let output = cmd.output()?;
        match output.code {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(unexpected_status(&cmd, &output)),
        }
    }

    /// Commit what is under `path` and return the new commit id. Changes
    /// staged elsewhere stay in the index, out of the commit.
    pub fn commit(&self, message: &str, path: &Path) -> Result<CommitId, PublishError> {
        let path = path.to_string_lossy();
        self.run(["commit", "-q", "-m", message, "--", path.as_ref()])?;
        self.head_commit()
    }

    /// Number of commits reachable from `rev`.
    pub fn commit_count(&self, rev: &str) -> Result<usize, PublishError> {
        let out = self.run(["rev-list", "--count", rev])?;
        out.trim().parse().map_err(|_| {
            PublishError::Git(CommandError::Failed {
                command: format!("git rev-list --count {rev}"),
                status: "0".to_string(),
                detail: format!("unexpected output '{}'", out.trim()),
            })
        })
    }

    pub fn remotes(&self) -> Result<Vec<String>, PublishError> {
        let out = self.run(["remote"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn has_remote(&self, name: &str) -> Result<bool, PublishError> {
        Ok(self.remotes()?.iter().any(|r| r == name))
    }

    /// URL of `name`, `None` if no such remote exists.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, PublishError> {
        if !self.has_remote(name)? {
            return Ok(None);
        }
        let out = self.run(["remote", "get-url", name])?;
        Ok(Some(out.trim().to_string()))
    }

    /// Add remote `name` with a push refspec.
    pub fn add_remote(
        &self,
        name: &str,
        url: &str,
        push_refspec: &str,
    ) -> Result<(), PublishError> {
        self.run(["remote", "add", name, url])?;
        let key = format!("remote.{name}.push");
        self.run(["config", key.as_str(), push_refspec])?;
        Ok(())
    }

    pub fn remove_remote(&self, name: &str) -> Result<(), PublishError> {
        self.run(["remote", "remove", name])?;
        Ok(())
    }

    pub fn push(&self, remote: &str, refspec: &str) -> Result<(), PublishError> {
        self.run(["push", "-q", remote, refspec])?;
        Ok(())
    }
}

/// A status the caller does not interpret, reported as a git failure.
fn unexpected_status(cmd: &CommandLine, output: &ExecOutput) -> PublishError {
    PublishError::Git(CommandError::Failed {
        command: cmd.to_string(),
        status: output.status_label(),
        detail: output.detail(),
    })
}
