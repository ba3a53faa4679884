use std::path::PathBuf;

use thiserror::Error;

use sitepub_core::{CommandError, StateError};

/// Error surface for image build, container creation and start.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("image manifest file missing: {path}")]
    MissingManifest { path: PathBuf },

    #[error("image build failed: {0}")]
    ImageBuild(#[source] CommandError),

    #[error("container creation failed: {0}")]
    Create(#[source] CommandError),

    #[error("container start failed: {0}")]
    Start(#[source] CommandError),

    #[error("container runtime returned an empty container id")]
    EmptyContainerId,

    #[error("cannot resolve host user: {0}")]
    HostUser(String),

    #[error("no container is provisioned (record missing: {record})")]
    NotProvisioned { record: PathBuf },

    #[error("container state error: {0}")]
    State(#[from] StateError),
}
