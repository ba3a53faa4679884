//! `sitepub all`: the whole pipeline in one invocation.
//!
//! The container lives only for build and test; it is torn down before
//! publishing, on success and on failure alike.

use anyhow::{Context, Result};
use clap::Args;

use sitepub_container::{provision, ContainerGuard, ProvisionOptions};
use sitepub_core::config::Overrides;
use sitepub_publish::{publish, publish_push, PublishOptions, PushOptions};
use sitepub_site::{build, test};

use crate::commands::{print_build, print_publish, print_push, SiteArgs};
use crate::session::Session;
use crate::GlobalArgs;

/// Arguments for `sitepub all`.
#[derive(Args, Debug)]
pub struct AllArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Tag for the generator image.
    #[arg(long)]
    pub image_tag: Option<String>,

    /// Authoritative repository to push to (default: the upstream remote's URL).
    #[arg(long)]
    pub remote_url: Option<String>,

    /// Push the publishing branch after a successful commit.
    #[arg(long)]
    pub push: bool,

    /// Rebuild even when inputs are unchanged.
    #[arg(long)]
    pub force: bool,
}

impl AllArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let overrides = Overrides {
            image_tag: self.image_tag,
            remote_url: self.remote_url,
            ..self.site.overrides()
        };
        let session = Session::load(global, overrides)?;
        // Fail on a non-repository before spending time on the build.
        let git = session.git()?;
        let runtime = session.runtime();
        let plan = session.plan();

        let options = ProvisionOptions::from_config(&session.root, &session.config)?;
        let handle = provision(&runtime, &session.config.image_spec(&session.root), &options)
            .context("provisioning failed")?;

        let artifact = {
            let guard = ContainerGuard::new(&runtime, handle);
            let report = build(&runtime, guard.handle(), &plan, self.force)
                .context("site build failed")?;
            print_build(&report);
            test(&runtime, guard.handle(), &plan, &report.artifact)
                .context("site tests failed")?;
            guard.release();
            report.artifact
        };

        let publish_options = PublishOptions::from_config(&session.config, &session.layout);
        let report = publish(&git, &artifact, &publish_options).context("publish failed")?;
        print_publish(&report);

        if self.push {
            let push_options = PushOptions::from_config(&session.config, &session.layout, false);
            let pushed = publish_push(&git, report.pending(), &push_options)
                .context("publish-push failed")?;
            print_push(&pushed);
        }
        Ok(())
    }
}
