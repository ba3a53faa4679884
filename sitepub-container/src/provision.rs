//! Provision and tear down the build container.
//!
//! ## `provision`: steps
//!
//! 1. Check the image manifest files (lockfile + recipe) exist.
//! 2. Build the image.
//! 3. Create a container with the project root bind-mounted read/write.
//! 4. Start it. A container that was created but failed to start is removed
//!    before the error is returned.
//!
//! Teardown is best-effort: it runs on cleanup paths and must never replace
//! the error that triggered the cleanup.

use std::path::{Path, PathBuf};

use chrono::Utc;

use sitepub_core::{state, ContainerHandle, ImageSpec, PipelineConfig};

use crate::error::ProvisionError;
use crate::runtime::{host_user, ContainerRuntime, CreateRequest, HostUser};

/// Container creation settings resolved for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOptions {
    /// Absolute host path to bind-mount.
    pub project_root: PathBuf,
    pub mount_point: PathBuf,
    pub keepalive: Vec<String>,
    pub user: Option<HostUser>,
}

impl ProvisionOptions {
    /// Resolve options from config, looking up the host user when mapping is on.
    pub fn from_config(
        project_root: &Path,
        config: &PipelineConfig,
    ) -> Result<Self, ProvisionError> {
        let user = if config.container.map_user {
            Some(host_user()?)
        } else {
            None
        };
        Ok(Self {
            project_root: project_root.to_path_buf(),
            mount_point: config.container.mount_point.clone(),
            keepalive: config.container.keepalive.clone(),
            user,
        })
    }
}

/// Build the image, then create and start a container from it.
pub fn provision<R>(
    runtime: &R,
    spec: &ImageSpec,
    options: &ProvisionOptions,
) -> Result<ContainerHandle, ProvisionError>
where
    R: ContainerRuntime + ?Sized,
{
    for path in spec.manifest() {
        if !path.is_file() {
            return Err(ProvisionError::MissingManifest {
                path: path.to_path_buf(),
            });
        }
    }

    runtime.build_image(spec).map_err(ProvisionError::ImageBuild)?;

    let request = CreateRequest {
        image: spec.tag.clone(),
        project_root: options.project_root.clone(),
        mount_point: options.mount_point.clone(),
        user: options.user,
        keepalive: options.keepalive.clone(),
    };
    let id = runtime.create(&request).map_err(ProvisionError::Create)?;
    if id.0.is_empty() {
        return Err(ProvisionError::EmptyContainerId);
    }

    let handle = ContainerHandle {
        id,
        image: spec.tag.clone(),
        project_root: options.project_root.clone(),
        mount_point: options.mount_point.clone(),
        created_at: Utc::now(),
    };

    if let Err(err) = runtime.start(&handle.id) {
        teardown(runtime, &handle);
        return Err(ProvisionError::Start(err));
    }

    tracing::info!(container = %handle.id, image = %handle.image, "container started");
    Ok(handle)
}

/// Forcibly remove the container. Failures are logged, never returned.
pub fn teardown<R>(runtime: &R, handle: &ContainerHandle)
where
    R: ContainerRuntime + ?Sized,
{
    match runtime.remove(&handle.id) {
        Ok(()) => tracing::info!(container = %handle.id, "container removed"),
        Err(err) => {
            tracing::warn!(container = %handle.id, error = %err, "container removal failed")
        }
    }
}

/// Owns a running container and removes it when dropped.
///
/// Wraps the build and test stages so the container goes away on every exit
/// path, including `?` returns and panics.
pub struct ContainerGuard<'r, R>
where
    R: ContainerRuntime + ?Sized,
{
    runtime: &'r R,
    handle: ContainerHandle,
    armed: bool,
}

impl<'r, R> ContainerGuard<'r, R>
where
    R: ContainerRuntime + ?Sized,
{
    pub fn new(runtime: &'r R, handle: ContainerHandle) -> Self {
        Self {
            runtime,
            handle,
            armed: true,
        }
    }

    pub fn handle(&self) -> &ContainerHandle {
        &self.handle
    }

    /// Disarm the guard; the caller becomes responsible for teardown.
    pub fn into_handle(mut self) -> ContainerHandle {
        self.armed = false;
        self.handle.clone()
    }

    /// Tear down now rather than at scope exit.
    pub fn release(mut self) {
        self.armed = false;
        teardown(self.runtime, &self.handle);
    }
}

impl<R> Drop for ContainerGuard<'_, R>
where
    R: ContainerRuntime + ?Sized,
{
    fn drop(&mut self) {
        if self.armed {
            teardown(self.runtime, &self.handle);
        }
    }
}

// ---------------------------------------------------------------------------
// Handle record (between CLI invocations)
// ---------------------------------------------------------------------------

/// Persist the handle so later `build`/`test` invocations can find it.
pub fn save_handle(path: &Path, handle: &ContainerHandle) -> Result<(), ProvisionError> {
    state::save_at(path, handle)?;
    Ok(())
}

/// Load the persisted handle; [`ProvisionError::NotProvisioned`] if absent.
pub fn load_handle(path: &Path) -> Result<ContainerHandle, ProvisionError> {
    state::load_at(path)?.ok_or_else(|| ProvisionError::NotProvisioned {
        record: path.to_path_buf(),
    })
}

/// Delete the persisted handle. Returns `true` if one existed.
pub fn clear_handle(path: &Path) -> Result<bool, ProvisionError> {
    Ok(state::remove_at(path)?)
}
