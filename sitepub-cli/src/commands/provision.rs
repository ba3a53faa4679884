//! `sitepub provision`: build the image and start a long-lived container.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use sitepub_container::{
    load_handle, provision, save_handle, teardown, ContainerGuard, ProvisionError,
    ProvisionOptions,
};
use sitepub_core::config::Overrides;

use crate::session::Session;
use crate::GlobalArgs;

/// Arguments for `sitepub provision`.
#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Tag for the generator image.
    #[arg(long)]
    pub image_tag: Option<String>,
}

impl ProvisionArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let session = Session::load(
            global,
            Overrides {
                image_tag: self.image_tag,
                ..Overrides::default()
            },
        )?;
        let runtime = session.runtime();
        let record = session.layout.container_record_path();

        // One live container per project: replace whatever an earlier run left.
        match load_handle(&record) {
            Ok(previous) => {
                tracing::info!(container = %previous.id, "removing previously provisioned container");
                teardown(&runtime, &previous);
            }
            Err(ProvisionError::NotProvisioned { .. }) => {}
            Err(err) => return Err(err).context("failed to read container record"),
        }

        let options = ProvisionOptions::from_config(&session.root, &session.config)?;
        let handle = provision(&runtime, &session.config.image_spec(&session.root), &options)
            .context("provisioning failed")?;

        // Until the record is written nothing else can find this container.
        let guard = ContainerGuard::new(&runtime, handle);
        save_handle(&record, guard.handle()).context("failed to record container")?;
        let handle = guard.into_handle();

        println!(
            "{} container {} running ({})",
            "✓".green(),
            handle.id.to_string().bold(),
            handle.image
        );
        Ok(())
    }
}
