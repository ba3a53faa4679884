//! The container runtime seam and its CLI implementation.

use std::path::{Path, PathBuf};

use sitepub_core::{CommandError, CommandLine, ContainerId, ExecOutput, ImageSpec, ImageTag};

use crate::error::ProvisionError;

/// Host user the container processes run as, so files written through the
/// bind mount stay owned by the invoking user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostUser {
    pub uid: u32,
    pub gid: u32,
}

/// Everything needed to create the build container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub image: ImageTag,
    pub project_root: PathBuf,
    pub mount_point: PathBuf,
    pub user: Option<HostUser>,
    pub keepalive: Vec<String>,
}

/// Operations consumed from a container runtime.
///
/// `exec` reports non-zero exits through [`ExecOutput`]; only a failure to run
/// the runtime itself is an error.
pub trait ContainerRuntime {
    fn build_image(&self, spec: &ImageSpec) -> Result<(), CommandError>;
    fn create(&self, request: &CreateRequest) -> Result<ContainerId, CommandError>;
    fn start(&self, id: &ContainerId) -> Result<(), CommandError>;
    fn exec(
        &self,
        id: &ContainerId,
        workdir: &Path,
        script: &str,
    ) -> Result<ExecOutput, CommandError>;
    /// Forcibly remove a container, running or not.
    fn remove(&self, id: &ContainerId) -> Result<(), CommandError>;
}

/// Drives a docker-compatible CLI (`docker`, `podman`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliRuntime {
    program: String,
}

impl CliRuntime {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self) -> CommandLine {
        CommandLine::new(&self.program)
    }

    pub(crate) fn build_command(&self, spec: &ImageSpec) -> CommandLine {
        self.command()
            .args(["build", "-t", spec.tag.0.as_str(), "-f"])
            .arg(spec.recipe.display().to_string())
            .arg(spec.context_dir.display().to_string())
    }

    pub(crate) fn create_command(&self, request: &CreateRequest) -> CommandLine {
        let mount = format!(
            "{}:{}",
            request.project_root.display(),
            request.mount_point.display()
        );
        let mut cmd = self.command().args(["create", "-v"]).arg(mount);
        if let Some(user) = request.user {
            cmd = cmd.arg("-u").arg(format!("{}:{}", user.uid, user.gid));
        }
        cmd.arg("-w")
            .arg(request.mount_point.display().to_string())
            .arg(&request.image.0)
            .args(request.keepalive.iter().cloned())
    }

    pub(crate) fn exec_command(
        &self,
        id: &ContainerId,
        workdir: &Path,
        script: &str,
    ) -> CommandLine {
        self.command()
            .args(["exec", "-w"])
            .arg(workdir.display().to_string())
            .arg(&id.0)
            .args(["/bin/sh", "-c", script])
    }
}

impl ContainerRuntime for CliRuntime {
    fn build_image(&self, spec: &ImageSpec) -> Result<(), CommandError> {
        tracing::info!(image = %spec.tag, "building image");
        self.build_command(spec).run()?;
        Ok(())
    }

    fn create(&self, request: &CreateRequest) -> Result<ContainerId, CommandError> {
        let output = self.create_command(request).run()?;
        Ok(ContainerId::from(output.stdout.trim()))
    }

    fn start(&self, id: &ContainerId) -> Result<(), CommandError> {
        self.command().args(["start", id.0.as_str()]).run()?;
        Ok(())
    }

    fn exec(
        &self,
        id: &ContainerId,
        workdir: &Path,
        script: &str,
    ) -> Result<ExecOutput, CommandError> {
        tracing::info!(container = %id, script, "exec");
        self.exec_command(id, workdir, script).output()
    }

    fn remove(&self, id: &ContainerId) -> Result<(), CommandError> {
        self.command().args(["rm", "-f", id.0.as_str()]).run()?;
        Ok(())
    }
}

/// Resolve the invoking user's uid and gid via `id -u` / `id -g`.
pub fn host_user() -> Result<HostUser, ProvisionError> {
    Ok(HostUser {
        uid: id_number("-u")?,
        gid: id_number("-g")?,
    })
}

fn id_number(flag: &str) -> Result<u32, ProvisionError> {
    let output = CommandLine::new("id")
        .arg(flag)
        .run()
        .map_err(|e| ProvisionError::HostUser(e.to_string()))?;
    let value = output.stdout.trim();
    if value.is_empty() {
        return Err(ProvisionError::HostUser(format!(
            "`id {flag}` printed nothing"
        )));
    }
    value
        .parse()
        .map_err(|_| ProvisionError::HostUser(format!("`id {flag}` printed '{value}'")))
}
