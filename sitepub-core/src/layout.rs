//! Paths derived from the project root and the configured build directory.
//!
//! ```text
//! <project_root>/
//!   <build_dir>/
//!     generated-content/     (the build artifact)
//!     .cache/                (generator incremental cache)
//!     .sitepub/
//!       fingerprint.json
//!       generator-overlay.yml  (cache_dir, layered over the site config)
//!       container.json
//!       publish-receipt.json
//! ```

use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::types::BuildArtifact;

pub const GENERATED_CONTENT_DIR: &str = "generated-content";
pub const CACHE_DIR: &str = ".cache";
pub const STATE_DIR: &str = ".sitepub";
pub const FINGERPRINT_FILE: &str = "fingerprint.json";
pub const CONTAINER_FILE: &str = "container.json";
pub const OVERLAY_FILE: &str = "generator-overlay.yml";
pub const RECEIPT_FILE: &str = "publish-receipt.json";

/// Resolved filesystem layout for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub project_root: PathBuf,
    pub build_dir: PathBuf,
}

impl Layout {
    pub fn new(project_root: impl Into<PathBuf>, config: &PipelineConfig) -> Self {
        let project_root = project_root.into();
        let build_dir = project_root.join(&config.site.build_dir);
        Self {
            project_root,
            build_dir,
        }
    }

    pub fn artifact_dir(&self) -> PathBuf {
        self.build_dir.join(GENERATED_CONTENT_DIR)
    }

    pub fn artifact(&self) -> BuildArtifact {
        BuildArtifact::new(self.artifact_dir())
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.build_dir.join(CACHE_DIR)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.build_dir.join(STATE_DIR)
    }

    pub fn fingerprint_path(&self) -> PathBuf {
        self.state_dir().join(FINGERPRINT_FILE)
    }

    /// Generated config layered after the site's own generator config.
    pub fn overlay_path(&self) -> PathBuf {
        self.state_dir().join(OVERLAY_FILE)
    }

    pub fn container_record_path(&self) -> PathBuf {
        self.state_dir().join(CONTAINER_FILE)
    }

    pub fn receipt_path(&self) -> PathBuf {
        self.state_dir().join(RECEIPT_FILE)
    }

    /// Resolve a config-relative path against the project root.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.project_root.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_hang_off_build_dir() {
        let layout = Layout::new("/work", &PipelineConfig::default());
        assert_eq!(layout.build_dir, PathBuf::from("/work/build/website"));
        assert_eq!(
            layout.artifact_dir(),
            PathBuf::from("/work/build/website/generated-content")
        );
        assert_eq!(layout.cache_dir(), PathBuf::from("/work/build/website/.cache"));
        assert_eq!(
            layout.overlay_path(),
            PathBuf::from("/work/build/website/.sitepub/generator-overlay.yml")
        );
        assert_eq!(
            layout.receipt_path(),
            PathBuf::from("/work/build/website/.sitepub/publish-receipt.json")
        );
    }
}
