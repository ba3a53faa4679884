//! # sitepub-container
//!
//! Container provisioning for the site build.
//!
//! [`provision`] builds the generator image, creates a container with the
//! project root bind-mounted, and starts it. [`teardown`] removes it again on
//! a best-effort basis; [`ContainerGuard`] ties that removal to scope exit.
//! All runtime interaction goes through the [`ContainerRuntime`] trait:
//! [`CliRuntime`] drives `docker`/`podman`, [`mock::MockRuntime`] records
//! calls for tests.

mod error;
pub mod mock;
pub mod provision;
pub mod runtime;

pub use error::ProvisionError;
pub use provision::{
    clear_handle, load_handle, provision, save_handle, teardown, ContainerGuard, ProvisionOptions,
};
pub use runtime::{host_user, CliRuntime, ContainerRuntime, CreateRequest, HostUser};
