//! Error types for sitepub-publish.

use std::path::PathBuf;

use thiserror::Error;

use sitepub_core::{CommandError, StateError};

/// Post-build content assertions that failed. Never proceed to commit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantError {
    #[error("unexpected generated doc content: built site has no {path}")]
    MissingIndex { path: PathBuf },

    #[error("unexpected generated doc content: {path} must not be published")]
    ExcludedContent { path: PathBuf },

    #[error("unexpected generated doc content: previous content still present at {path}")]
    OldContentPresent { path: PathBuf },

    #[error("unexpected generated doc content: new content missing at {path}")]
    NewContentMissing { path: PathBuf },
}

/// All errors that can arise from publish and push.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Invariant(#[from] InvariantError),

    #[error("git error: {0}")]
    Git(#[from] CommandError),

    #[error("{path} is not inside a git repository")]
    NotARepository { path: PathBuf },

    #[error("publishing branch '{branch}' exists neither locally nor on '{upstream}'")]
    BranchNotFound { branch: String, upstream: String },

    #[error("no URL for remote '{remote}'; pass --remote-url or set publish.remote_url")]
    NoRemoteUrl { remote: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read built site at {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("publish receipt error: {0}")]
    State(#[from] StateError),
}

/// Convenience constructor for [`PublishError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PublishError {
    PublishError::Io {
        path: path.into(),
        source,
    }
}
