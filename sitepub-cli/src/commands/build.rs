//! `sitepub build`: run the site generator in the provisioned container.

use anyhow::{Context, Result};
use clap::Args;

use sitepub_container::load_handle;
use sitepub_site::build;

use crate::commands::{print_build, SiteArgs};
use crate::session::Session;
use crate::GlobalArgs;

/// Arguments for `sitepub build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Rebuild even when inputs are unchanged.
    #[arg(long)]
    pub force: bool,
}

impl BuildArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let session = Session::load(global, self.site.overrides())?;
        let handle = load_handle(&session.layout.container_record_path())
            .context("run `sitepub provision` first")?;

        let report = build(&session.runtime(), &handle, &session.plan(), self.force)
            .context("site build failed")?;
        print_build(&report);
        Ok(())
    }
}
