//! `sitepub teardown`: remove the provisioned container.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use sitepub_container::{clear_handle, load_handle, teardown, ProvisionError};
use sitepub_core::config::Overrides;

use crate::session::Session;
use crate::GlobalArgs;

/// Arguments for `sitepub teardown`.
#[derive(Args, Debug)]
pub struct TeardownArgs {}

impl TeardownArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let session = Session::load(global, Overrides::default())?;
        let record = session.layout.container_record_path();

        let handle = match load_handle(&record) {
            Ok(handle) => handle,
            Err(ProvisionError::NotProvisioned { .. }) => {
                println!("{} no container provisioned", "·".dimmed());
                return Ok(());
            }
            Err(err) => return Err(err).context("failed to read container record"),
        };

        teardown(&session.runtime(), &handle);
        clear_handle(&record).context("failed to clear container record")?;
        println!("{} container {} removed", "✓".green(), handle.id);
        Ok(())
    }
}
