//! `sitepub publish` and `sitepub publish-push`.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use sitepub_core::config::Overrides;
use sitepub_core::PublishOutcome;
use sitepub_publish::{
    load_receipt, publish, publish_push, PublishOptions, PublishReport, PushOptions, PushReport,
};

use crate::commands::{print_publish, print_push};
use crate::session::Session;
use crate::GlobalArgs;

/// Arguments for `sitepub publish`.
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl PublishArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let session = Session::load(global, Overrides::default())?;
        let git = session.git()?;
        let options = PublishOptions::from_config(&session.config, &session.layout);

        let report =
            publish(&git, &session.layout.artifact(), &options).context("publish failed")?;
        if self.json {
            print_json(&PublishJson::from(&report))?;
        } else {
            print_publish(&report);
        }
        Ok(())
    }
}

/// Arguments for `sitepub publish-push`.
#[derive(Args, Debug)]
pub struct PublishPushArgs {
    /// Authoritative repository to push to (default: the upstream remote's URL).
    #[arg(long)]
    pub remote_url: Option<String>,

    /// Report what would be pushed without touching any remote.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl PublishPushArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let session = Session::load(
            global,
            Overrides {
                remote_url: self.remote_url,
                ..Overrides::default()
            },
        )?;
        let options = PushOptions::from_config(&session.config, &session.layout, self.dry_run);

        let pending = load_receipt(&options.receipt_path)
            .context("failed to read publish receipt")?
            .filter(|receipt| receipt.committed)
            .map(|receipt| receipt.commit);

        let git = session.git()?;
        let report =
            publish_push(&git, pending.as_ref(), &options).context("publish-push failed")?;
        if self.json {
            print_json(&PushJson::from(&report))?;
        } else {
            print_push(&report);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct PublishJson {
    outcome: PublishOutcome,
    branch: String,
    commit: Option<String>,
    source_commit: String,
}

impl From<&PublishReport> for PublishJson {
    fn from(report: &PublishReport) -> Self {
        Self {
            outcome: report.outcome,
            branch: report.branch.to_string(),
            commit: report.commit.as_ref().map(ToString::to_string),
            source_commit: report.source_commit.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PushJson {
    outcome: PublishOutcome,
    commit: Option<String>,
    remote_url: Option<String>,
    dry_run: bool,
}

impl From<&PushReport> for PushJson {
    fn from(report: &PushReport) -> Self {
        Self {
            outcome: report.outcome,
            commit: report.commit.as_ref().map(ToString::to_string),
            remote_url: report.remote_url.clone(),
            dry_run: report.dry_run,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
