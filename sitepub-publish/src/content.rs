//! Generated-content checks and the copy onto the publishing branch.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use sitepub_core::BuildArtifact;

use crate::error::{io_err, InvariantError, PublishError};
use crate::git::Git;

/// Assert the artifact is fit to publish: it has an `index.html` and none of
/// the `excluded` subdirectories.
pub fn check_artifact(
    artifact: &BuildArtifact,
    excluded: &[PathBuf],
) -> Result<(), InvariantError> {
    let index = artifact.index_path();
    if !index.is_file() {
        return Err(InvariantError::MissingIndex { path: index });
    }
    if let Some(path) = excluded.iter().find(|p| artifact.contains(p)) {
        return Err(InvariantError::ExcludedContent {
            path: artifact.root.join(path),
        });
    }
    Ok(())
}

/// Replace `content_path` in the checked-out tree with a copy of `artifact`.
///
/// The previous subtree is removed from the index and the working tree, then
/// asserted gone before the new copy is made and asserted present. Returns the
/// number of files copied.
pub fn replace_content(
    git: &Git,
    content_path: &Path,
    artifact: &BuildArtifact,
) -> Result<usize, PublishError> {
    let target = git.root().join(content_path);

    git.rm_recursive(content_path)?;
    if target.exists() {
        // Untracked leftovers survive `git rm`.
        std::fs::remove_dir_all(&target).map_err(|e| io_err(&target, e))?;
    }
    if target.exists() {
        return Err(InvariantError::OldContentPresent { path: target }.into());
    }

    let copied = copy_tree(&artifact.root, &target)?;
    let index = target.join("index.html");
    if !index.is_file() {
        return Err(InvariantError::NewContentMissing { path: index }.into());
    }
    tracing::debug!(files = copied, target = %target.display(), "copied generated content");
    Ok(copied)
}

/// Recursively copy `source` into `target`, creating directories as needed.
pub(crate) fn copy_tree(source: &Path, target: &Path) -> Result<usize, PublishError> {
    let mut copied = 0;
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| PublishError::Walk {
            path: source.to_path_buf(),
            source: e,
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let dest = target.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest).map_err(|e| io_err(&dest, e))?;
        } else {
            std::fs::copy(entry.path(), &dest).map_err(|e| io_err(&dest, e))?;
            copied += 1;
        }
    }
    Ok(copied)
}
