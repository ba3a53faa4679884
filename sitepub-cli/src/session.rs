//! Per-invocation context: project root, merged config and derived paths.

use std::path::PathBuf;

use anyhow::{Context, Result};

use sitepub_container::CliRuntime;
use sitepub_core::config::{Overrides, CONFIG_FILE};
use sitepub_core::{Layout, PipelineConfig};
use sitepub_publish::Git;
use sitepub_site::SitePlan;

use crate::GlobalArgs;

#[derive(Debug, Clone)]
pub struct Session {
    pub root: PathBuf,
    pub config: PipelineConfig,
    pub layout: Layout,
}

impl Session {
    /// Resolve the project root, load the config file and apply `overrides`.
    pub fn load(global: &GlobalArgs, mut overrides: Overrides) -> Result<Self> {
        let root = global.project_root.canonicalize().with_context(|| {
            format!(
                "project root {} does not exist",
                global.project_root.display()
            )
        })?;
        let (config_path, loaded) = match &global.config_file {
            Some(path) => (path.clone(), PipelineConfig::load_required(path)),
            None => {
                let path = root.join(CONFIG_FILE);
                let loaded = PipelineConfig::load_at(&path);
                (path, loaded)
            }
        };
        let mut config =
            loaded.with_context(|| format!("failed to load {}", config_path.display()))?;
        if overrides.runtime.is_none() {
            overrides.runtime = global.runtime.clone();
        }
        config.apply(overrides);
        config.validate().context("invalid configuration")?;

        let layout = Layout::new(&root, &config);
        tracing::debug!(
            root = %root.display(),
            build_dir = %layout.build_dir.display(),
            "session ready"
        );
        Ok(Self {
            root,
            config,
            layout,
        })
    }

    pub fn runtime(&self) -> CliRuntime {
        CliRuntime::new(self.config.container.runtime.as_str())
    }

    pub fn plan(&self) -> SitePlan {
        SitePlan::new(&self.layout, &self.config)
    }

    pub fn git(&self) -> Result<Git> {
        Git::open(&self.root).context("publishing needs a git working tree")
    }
}
