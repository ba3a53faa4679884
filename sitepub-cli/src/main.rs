//! sitepub: build a static site in a container and publish it to a branch.
//!
//! # Usage
//!
//! ```text
//! sitepub provision [--image-tag <tag>]
//! sitepub build [--source-dir <dir>] [--config <file>] [--force]
//! sitepub test
//! sitepub teardown
//! sitepub publish [--json]
//! sitepub publish-push [--remote-url <url>] [--dry-run] [--json]
//! sitepub all [--push] [--force] [--source-dir ..] [--config ..] [--image-tag ..] [--remote-url ..]
//! ```
//!
//! Exit codes: 0 on success or no-op, 1 when a stage fails, 2 when the built
//! site carries unexpected generated doc content.

mod commands;
mod logging;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use commands::{
    all::AllArgs,
    build::BuildArgs,
    provision::ProvisionArgs,
    publish::{PublishArgs, PublishPushArgs},
    teardown::TeardownArgs,
    test::TestArgs,
};
use sitepub_publish::{InvariantError, PublishError};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "sitepub",
    version,
    about = "Build the project website in a container and publish it to a git branch",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Repository root the pipeline runs against.
    #[arg(long, global = true, default_value = ".")]
    pub project_root: PathBuf,

    /// Pipeline config file (default: `<project-root>/sitepub.yaml`).
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,

    /// Container runtime binary, e.g. `docker` or `podman`.
    #[arg(long, global = true)]
    pub runtime: Option<String>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as newline-delimited JSON.
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the generator image and start a container for later stages.
    Provision(ProvisionArgs),

    /// Build the site inside the provisioned container.
    Build(BuildArgs),

    /// Run the site test task inside the provisioned container.
    Test(TestArgs),

    /// Remove the provisioned container.
    Teardown(TeardownArgs),

    /// Commit the built site to the publishing branch.
    Publish(PublishArgs),

    /// Push a commit made by `publish` to the authoritative repository.
    PublishPush(PublishPushArgs),

    /// Provision, build, test, tear down and publish in one run.
    All(AllArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.global.verbose, cli.global.log_json);

    let global = cli.global;
    let result = match cli.command {
        Commands::Provision(args) => args.run(&global),
        Commands::Build(args) => args.run(&global),
        Commands::Test(args) => args.run(&global),
        Commands::Teardown(args) => args.run(&global),
        Commands::Publish(args) => args.run(&global),
        Commands::PublishPush(args) => args.run(&global),
        Commands::All(args) => args.run(&global),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(exit_code(&err))
        }
    }
}

/// 2 for unexpected generated content anywhere in the chain, else 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    let invariant = err.chain().any(|cause| {
        cause.downcast_ref::<InvariantError>().is_some()
            || matches!(
                cause.downcast_ref::<PublishError>(),
                Some(PublishError::Invariant(_))
            )
    });
    if invariant {
        2
    } else {
        1
    }
}
