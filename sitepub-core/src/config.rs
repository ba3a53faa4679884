//! Pipeline configuration: `sitepub.yaml` at the project root.
//!
//! # File format
//!
//! ```yaml
//! container:
//!   runtime: podman
//!   image_tag: my-site
//! site:
//!   source_dir: website/src
//! publish:
//!   branch: asf-site
//!   remote_url: https://example.org/repo.git
//! ```
//!
//! Every field is optional. A missing file yields [`PipelineConfig::default`];
//! a malformed file is a [`ConfigError::Parse`]. All relative paths are
//! resolved against the project root.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{config_io_err, ConfigError};
use crate::types::{BranchName, ImageSpec, ImageTag};

/// Default config file name, looked up in the project root.
pub const CONFIG_FILE: &str = "sitepub.yaml";

/// Root of `sitepub.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub container: ContainerSettings,
    pub site: SiteSettings,
    pub publish: PublishSettings,
}

/// Container image and runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Runtime binary: `docker`, `podman`, or anything CLI-compatible.
    pub runtime: String,
    pub image_tag: String,
    pub context_dir: PathBuf,
    pub recipe: PathBuf,
    pub lockfile: PathBuf,
    /// Where the project root is mounted inside the container.
    pub mount_point: PathBuf,
    /// Command that keeps the container alive between `exec` calls.
    pub keepalive: Vec<String>,
    /// Run the container as the invoking host user (uid:gid).
    pub map_user: bool,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            runtime: "docker".to_string(),
            image_tag: "sitepub-website".to_string(),
            context_dir: PathBuf::from("website"),
            recipe: PathBuf::from("website/Dockerfile"),
            lockfile: PathBuf::from("website/Gemfile.lock"),
            mount_point: PathBuf::from("/repo"),
            keepalive: vec!["sleep".to_string(), "infinity".to_string()],
            map_user: true,
        }
    }
}

/// Static-site generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub source_dir: PathBuf,
    /// Generator config file.
    pub config: PathBuf,
    pub build_dir: PathBuf,
    /// Files copied into `build_dir` before the generator runs.
    pub stage_inputs: Vec<PathBuf>,
    pub build_command: String,
    pub test_command: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("website/src"),
            config: PathBuf::from("website/_config.yml"),
            build_dir: PathBuf::from("build/website"),
            stage_inputs: vec![
                PathBuf::from("website/Gemfile"),
                PathBuf::from("website/Gemfile.lock"),
            ],
            build_command: "bundle exec jekyll build --incremental".to_string(),
            test_command: "bundle exec rake test".to_string(),
        }
    }
}

/// Publishing branch and remote settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSettings {
    pub branch: String,
    /// Remote the publishing branch is tracked from.
    pub upstream: String,
    /// Where generated content lives on the publishing branch.
    pub content_path: PathBuf,
    /// Artifact subdirectories that must never be published by this pipeline.
    pub excluded: Vec<PathBuf>,
    /// Name of the transient remote added for the push.
    pub remote_name: String,
    /// Authoritative repository URL; falls back to the upstream remote's URL.
    pub remote_url: Option<String>,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            branch: "asf-site".to_string(),
            upstream: "origin".to_string(),
            content_path: PathBuf::from("website/generated-content"),
            excluded: vec![
                PathBuf::from("documentation/sdks/javadoc"),
                PathBuf::from("documentation/sdks/pydoc"),
            ],
            remote_name: "sitepub-publish".to_string(),
            remote_url: None,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub image_tag: Option<String>,
    pub remote_url: Option<String>,
    pub runtime: Option<String>,
}

impl PipelineConfig {
    /// Load `path`, or the defaults when it does not exist.
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| config_io_err(path, e))?;
        // An empty file parses as YAML null; treat it like a missing file.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`load_at`](Self::load_at), but a missing file is an error.
    /// Used when the path was given explicitly.
    pub fn load_required(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }
        Self::load_at(path)
    }

    /// Load `<project_root>/sitepub.yaml`.
    pub fn load_from_root(project_root: &Path) -> Result<Self, ConfigError> {
        Self::load_at(&project_root.join(CONFIG_FILE))
    }

    /// Apply command-line overrides in place.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(source_dir) = overrides.source_dir {
            self.site.source_dir = source_dir;
        }
        if let Some(config) = overrides.config {
            self.site.config = config;
        }
        if let Some(tag) = overrides.image_tag {
            self.container.image_tag = tag;
        }
        if let Some(url) = overrides.remote_url {
            self.publish.remote_url = Some(url);
        }
        if let Some(runtime) = overrides.runtime {
            self.container.runtime = runtime;
        }
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.container.runtime.trim().is_empty() {
            return Err(ConfigError::Invalid("container.runtime is empty".to_string()));
        }
        if self.container.image_tag.trim().is_empty() {
            return Err(ConfigError::Invalid("container.image_tag is empty".to_string()));
        }
        if !self.container.mount_point.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "container.mount_point must be absolute, got {}",
                self.container.mount_point.display()
            )));
        }
        if self.site.build_command.trim().is_empty() || self.site.test_command.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "site.build_command and site.test_command must be set".to_string(),
            ));
        }
        if self.publish.branch.trim().is_empty() || self.publish.remote_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "publish.branch and publish.remote_name must be set".to_string(),
            ));
        }
        if self.publish.content_path.is_absolute() {
            return Err(ConfigError::Invalid(
                "publish.content_path must be relative to the repository root".to_string(),
            ));
        }
        if let Some(path) = self.publish.excluded.iter().find(|p| p.is_absolute()) {
            return Err(ConfigError::Invalid(format!(
                "publish.excluded entries must be relative to the artifact root, got {}",
                path.display()
            )));
        }
        Ok(())
    }

    /// The image to build, with paths resolved against `project_root`.
    pub fn image_spec(&self, project_root: &Path) -> ImageSpec {
        ImageSpec {
            tag: ImageTag::from(self.container.image_tag.as_str()),
            context_dir: project_root.join(&self.container.context_dir),
            recipe: project_root.join(&self.container.recipe),
            lockfile: project_root.join(&self.container.lockfile),
        }
    }

    pub fn publish_branch(&self) -> BranchName {
        BranchName::from(self.publish.branch.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = PipelineConfig::load_from_root(tmp.path()).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.publish.branch, "asf-site");
        assert_eq!(
            config.publish.content_path,
            PathBuf::from("website/generated-content")
        );
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "container:\n  runtime: podman\npublish:\n  remote_url: https://example.org/r.git\n",
        )
        .unwrap();

        let config = PipelineConfig::load_from_root(tmp.path()).unwrap();
        assert_eq!(config.container.runtime, "podman");
        assert_eq!(config.container.image_tag, "sitepub-website");
        assert_eq!(
            config.publish.remote_url.as_deref(),
            Some("https://example.org/r.git")
        );
        assert_eq!(config.site, SiteSettings::default());
    }

    #[test]
    fn empty_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "\n").unwrap();
        let config = PipelineConfig::load_from_root(tmp.path()).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = PipelineConfig::default();
        config.apply(Overrides {
            source_dir: Some(PathBuf::from("docs")),
            config: None,
            image_tag: Some("custom".to_string()),
            remote_url: Some("https://example.org/x.git".to_string()),
            runtime: None,
        });
        assert_eq!(config.site.source_dir, PathBuf::from("docs"));
        assert_eq!(config.site.config, PathBuf::from("website/_config.yml"));
        assert_eq!(config.container.image_tag, "custom");
        assert_eq!(config.container.runtime, "docker");
        assert_eq!(
            config.publish.remote_url.as_deref(),
            Some("https://example.org/x.git")
        );
    }

    #[test]
    fn relative_mount_point_is_invalid() {
        let mut config = PipelineConfig::default();
        config.container.mount_point = PathBuf::from("repo");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got: {err}");
    }

    #[test]
    fn image_spec_resolves_against_root() {
        let config = PipelineConfig::default();
        let spec = config.image_spec(Path::new("/work"));
        assert_eq!(spec.recipe, PathBuf::from("/work/website/Dockerfile"));
        assert_eq!(spec.lockfile, PathBuf::from("/work/website/Gemfile.lock"));
        assert_eq!(spec.tag, ImageTag::from("sitepub-website"));
    }
}
