//! sitepub core library: domain types, pipeline configuration, state files.
//!
//! - [`types`]: newtypes and the records passed between pipeline stages
//! - [`command`]: external command lines with captured output
//! - [`config`]: `sitepub.yaml` loading and CLI overrides
//! - [`layout`]: paths derived from the project root and build directory
//! - [`state`]: atomic JSON state files under `<build>/.sitepub/`
//! - [`error`]: [`ConfigError`], [`StateError`], [`CommandError`]

pub mod command;
pub mod config;
pub mod error;
pub mod layout;
pub mod state;
pub mod types;

pub use command::{CommandLine, ExecOutput};
pub use config::{ContainerSettings, PipelineConfig, PublishSettings, SiteSettings};
pub use error::{CommandError, ConfigError, StateError};
pub use layout::Layout;
pub use types::{
    BranchName, BuildArtifact, CommitId, ContainerHandle, ContainerId, ImageSpec, ImageTag,
    PublishOutcome,
};
