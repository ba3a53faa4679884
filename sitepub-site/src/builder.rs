//! Site build stage.
//!
//! ## `build`: steps
//!
//! 1. Fingerprint the declared inputs; return `UpToDate` if nothing changed
//!    and both outputs exist (unless forced).
//! 2. Drop the stored fingerprint so a failed build is never considered fresh.
//! 3. Stage the build inputs (Gemfile etc.) into the build directory and
//!    write the config overlay that points the generator at the cache.
//! 4. Run the generator in the container, reusing the cache directory.
//! 5. Require the generated-content directory to exist.
//! 6. Store the new fingerprint.

use std::path::Path;
use std::time::{Duration, Instant};

use sitepub_container::ContainerRuntime;
use sitepub_core::{BuildArtifact, ContainerHandle};

use crate::error::{io_err, BuildError};
use crate::fingerprint::{self, Staleness};
use crate::plan::SitePlan;

/// How the build stage concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// The generator ran.
    Built { duration: Duration },
    /// Inputs unchanged and outputs present; the generator was not run.
    UpToDate,
}

/// Outcome of the build stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub artifact: BuildArtifact,
    pub status: BuildStatus,
}

/// Build the site inside the container described by `handle`.
pub fn build<R>(
    runtime: &R,
    handle: &ContainerHandle,
    plan: &SitePlan,
    force: bool,
) -> Result<BuildReport, BuildError>
where
    R: ContainerRuntime + ?Sized,
{
    let current = fingerprint::compute(plan, &handle.project_root)?;
    if force {
        tracing::info!("forced build, skipping staleness check");
    } else {
        match fingerprint::check(plan, &current)? {
            Staleness::UpToDate => {
                tracing::info!(
                    artifact = %plan.artifact_dir.display(),
                    "site is up to date, skipping build"
                );
                return Ok(BuildReport {
                    artifact: plan.artifact(),
                    status: BuildStatus::UpToDate,
                });
            }
            Staleness::NeverBuilt => tracing::debug!("no previous build recorded"),
            Staleness::MissingOutputs { paths } => {
                tracing::debug!(missing = paths.len(), "build outputs missing")
            }
            Staleness::Stale { reason } => tracing::debug!(%reason, "build inputs changed"),
        }
    }

    fingerprint::invalidate(plan)?;
    stage_inputs(plan)?;

    let workdir = plan
        .workdir(handle)
        .map_err(|path| BuildError::OutsideProject { path })?;
    let script = plan
        .build_script(handle)
        .map_err(|path| BuildError::OutsideProject { path })?;
    let overlay = plan
        .overlay_config(handle)
        .map_err(|path| BuildError::OutsideProject { path })?;
    write_overlay(&plan.overlay_path, &overlay)?;

    let started = Instant::now();
    let output = runtime.exec(&handle.id, &workdir, &script)?;
    if !output.success() {
        return Err(BuildError::GeneratorFailed {
            command: script,
            status: output.status_label(),
            detail: output.detail(),
        });
    }
    let duration = started.elapsed();

    let artifact = plan.artifact();
    if !artifact.exists() {
        return Err(BuildError::NoOutput {
            path: artifact.root,
        });
    }

    fingerprint::save(plan, &current)?;
    tracing::info!(
        artifact = %artifact.root.display(),
        duration_ms = duration.as_millis() as u64,
        "site built"
    );
    Ok(BuildReport {
        artifact,
        status: BuildStatus::Built { duration },
    })
}

/// Copy each staged input into the build directory, creating it.
fn stage_inputs(plan: &SitePlan) -> Result<(), BuildError> {
    std::fs::create_dir_all(&plan.build_dir).map_err(|e| io_err(&plan.build_dir, e))?;
    for input in &plan.stage_inputs {
        let Some(name) = input.file_name() else {
            return Err(io_err(
                input,
                std::io::Error::other("staged input has no file name"),
            ));
        };
        let target = plan.build_dir.join(name);
        copy_if_changed(input, &target)?;
    }
    Ok(())
}

fn write_overlay(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| io_err(path, e))
}

fn copy_if_changed(source: &Path, target: &Path) -> Result<(), BuildError> {
    let content = std::fs::read(source).map_err(|e| io_err(source, e))?;
    if let Ok(existing) = std::fs::read(target) {
        if existing == content {
            tracing::debug!("unchanged: {}", target.display());
            return Ok(());
        }
    }
    std::fs::write(target, content).map_err(|e| io_err(target, e))?;
    tracing::debug!("staged: {}", target.display());
    Ok(())
}
