//! Subcommand implementations and shared output helpers.

pub mod all;
pub mod build;
pub mod provision;
pub mod publish;
pub mod teardown;

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use sitepub_core::config::Overrides;
use sitepub_core::PublishOutcome;
use sitepub_publish::{PublishReport, PushReport};
use sitepub_site::{BuildReport, BuildStatus};

/// Site source flags shared by `build` and `all`.
#[derive(Args, Debug, Clone, Default)]
pub struct SiteArgs {
    /// Site source tree, relative to the project root.
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Generator config file, relative to the project root.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl SiteArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            source_dir: self.source_dir.clone(),
            config: self.config.clone(),
            ..Overrides::default()
        }
    }
}

pub fn print_build(report: &BuildReport) {
    match &report.status {
        BuildStatus::Built { duration } => println!(
            "{} site built in {:.1}s → {}",
            "✓".green(),
            duration.as_secs_f64(),
            report.artifact.root.display()
        ),
        BuildStatus::UpToDate => println!(
            "{} site up to date → {}",
            "·".dimmed(),
            report.artifact.root.display()
        ),
    }
}

pub fn print_publish(report: &PublishReport) {
    match (&report.outcome, &report.commit) {
        (PublishOutcome::Committed, Some(commit)) => println!(
            "{} committed {} to {} (source {})",
            "✓".green(),
            commit.short().bold(),
            report.branch,
            report.source_commit.short()
        ),
        (outcome, _) => println!("{} {outcome} on {}", "·".dimmed(), report.branch),
    }
}

pub fn print_push(report: &PushReport) {
    let url = report.remote_url.as_deref().unwrap_or("-");
    match (&report.outcome, &report.commit) {
        (_, Some(commit)) if report.dry_run => println!(
            "[dry-run] {} would push {} to {url}",
            "~".yellow(),
            commit.short()
        ),
        (PublishOutcome::CommittedAndPushed, Some(commit)) => println!(
            "{} pushed {} to {url}",
            "✓".green(),
            commit.short().bold()
        ),
        _ => println!("{} nothing to push", "·".dimmed()),
    }
}
