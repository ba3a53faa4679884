//! Site test stage.

use std::time::{Duration, Instant};

use sitepub_container::ContainerRuntime;
use sitepub_core::{BuildArtifact, ContainerHandle};

use crate::error::TestError;
use crate::plan::SitePlan;

/// Outcome of a passing test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub stdout: String,
    pub duration: Duration,
}

/// Run the generator's test task against `artifact`.
pub fn test<R>(
    runtime: &R,
    handle: &ContainerHandle,
    plan: &SitePlan,
    artifact: &BuildArtifact,
) -> Result<TestResult, TestError>
where
    R: ContainerRuntime + ?Sized,
{
    if !artifact.exists() {
        return Err(TestError::MissingArtifact {
            path: artifact.root.clone(),
        });
    }

    let workdir = plan
        .workdir(handle)
        .map_err(|path| TestError::OutsideProject { path })?;
    let script = plan.test_script();

    let started = Instant::now();
    let output = runtime.exec(&handle.id, &workdir, &script)?;
    if !output.success() {
        return Err(TestError::Failed {
            command: script,
            status: output.status_label(),
            detail: output.detail(),
        });
    }

    let duration = started.elapsed();
    tracing::info!(duration_ms = duration.as_millis() as u64, "site tests passed");
    Ok(TestResult {
        stdout: output.stdout,
        duration,
    })
}
