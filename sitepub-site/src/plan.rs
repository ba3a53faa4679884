//! Resolved inputs, outputs and commands for the build and test stages.

use std::path::{Path, PathBuf};

use sitepub_core::{BuildArtifact, ContainerHandle, Layout, PipelineConfig};

/// Everything the build and test stages read or write, as absolute host paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePlan {
    pub build_dir: PathBuf,
    pub source_dir: PathBuf,
    pub config_file: PathBuf,
    pub lockfile: PathBuf,
    /// Copied into `build_dir` before the generator runs.
    pub stage_inputs: Vec<PathBuf>,
    pub artifact_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// Generated config carrying `cache_dir`, passed after `config_file`.
    pub overlay_path: PathBuf,
    pub fingerprint_path: PathBuf,
    pub build_command: String,
    pub test_command: String,
}

impl SitePlan {
    pub fn new(layout: &Layout, config: &PipelineConfig) -> Self {
        Self {
            build_dir: layout.build_dir.clone(),
            source_dir: layout.resolve(&config.site.source_dir),
            config_file: layout.resolve(&config.site.config),
            lockfile: layout.resolve(&config.container.lockfile),
            stage_inputs: config
                .site
                .stage_inputs
                .iter()
                .map(|p| layout.resolve(p))
                .collect(),
            artifact_dir: layout.artifact_dir(),
            cache_dir: layout.cache_dir(),
            overlay_path: layout.overlay_path(),
            fingerprint_path: layout.fingerprint_path(),
            build_command: config.site.build_command.clone(),
            test_command: config.site.test_command.clone(),
        }
    }

    pub fn artifact(&self) -> BuildArtifact {
        BuildArtifact::new(&self.artifact_dir)
    }

    /// Declared inputs: lockfile, generator config, source tree.
    pub fn inputs(&self) -> [&Path; 3] {
        [&self.lockfile, &self.config_file, &self.source_dir]
    }

    /// Declared outputs: incremental cache, generated content.
    pub fn outputs(&self) -> [&Path; 2] {
        [&self.cache_dir, &self.artifact_dir]
    }

    /// Shell script that runs the generator build, with container paths.
    /// The overlay is layered after the site config so its keys win.
    ///
    /// Returns the first path not visible through the bind mount as `Err`.
    pub fn build_script(&self, handle: &ContainerHandle) -> Result<String, PathBuf> {
        let source = container_path(handle, &self.source_dir)?;
        let config = container_path(handle, &self.config_file)?;
        let overlay = container_path(handle, &self.overlay_path)?;
        let destination = container_path(handle, &self.artifact_dir)?;
        Ok(format!(
            "{} --source {} --config {} --destination {}",
            self.build_command.trim(),
            shell_quote(&source),
            shell_quote(&format!("{config},{overlay}")),
            shell_quote(&destination),
        ))
    }

    /// Contents of the generated config overlay: the incremental cache
    /// location as the container sees it.
    pub fn overlay_config(&self, handle: &ContainerHandle) -> Result<String, PathBuf> {
        let cache = container_path(handle, &self.cache_dir)?;
        let quoted = cache.replace('\\', "\\\\").replace('"', "\\\"");
        Ok(format!("cache_dir: \"{quoted}\"\n"))
    }

    pub fn test_script(&self) -> String {
        self.test_command.trim().to_string()
    }

    /// In-container working directory for both stages.
    pub fn workdir(&self, handle: &ContainerHandle) -> Result<PathBuf, PathBuf> {
        handle
            .container_path(&self.build_dir)
            .ok_or_else(|| self.build_dir.clone())
    }
}

fn container_path(handle: &ContainerHandle, host: &Path) -> Result<String, PathBuf> {
    handle
        .container_path(host)
        .map(|p| p.display().to_string())
        .ok_or_else(|| host.to_path_buf())
}

/// Quote `value` for `/bin/sh -c` unless it is made of unambiguous characters.
pub(crate) fn shell_quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-:=@+,".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}
