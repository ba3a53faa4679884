//! Error types for sitepub-site.

use std::path::PathBuf;

use thiserror::Error;

use sitepub_core::{CommandError, StateError};

/// All errors that can arise from the build stage.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input tree at {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A path the generator needs is not visible through the bind mount.
    #[error("{path} is outside the mounted project root")]
    OutsideProject { path: PathBuf },

    /// The container runtime could not run the generator at all.
    #[error("container exec failed: {0}")]
    Exec(#[from] CommandError),

    /// The generator ran and exited non-zero.
    #[error("site build failed (status {status}) running `{command}`: {detail}")]
    GeneratorFailed {
        command: String,
        status: String,
        detail: String,
    },

    #[error("site build succeeded but produced no output at {path}")]
    NoOutput { path: PathBuf },

    #[error("fingerprint store error: {0}")]
    State(#[from] StateError),
}

/// All errors that can arise from the test stage.
#[derive(Debug, Error)]
pub enum TestError {
    #[error("no built site to test at {path}")]
    MissingArtifact { path: PathBuf },

    #[error("{path} is outside the mounted project root")]
    OutsideProject { path: PathBuf },

    #[error("container exec failed: {0}")]
    Exec(#[from] CommandError),

    #[error("site tests failed (status {status}) running `{command}`: {detail}")]
    Failed {
        command: String,
        status: String,
        detail: String,
    },
}

/// Convenience constructor for [`BuildError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> BuildError {
    BuildError::Io {
        path: path.into(),
        source,
    }
}
