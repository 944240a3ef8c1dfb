use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::vhost::SiteMode;

#[derive(Parser)]
#[command(name = "appsilo")]
#[command(version)]
#[command(about = "Provision isolated PHP applications: account, FPM pool and nginx site")]
#[command(long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file to use instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an application: account, web root, FPM pool and nginx site
    Create(CreateArgs),

    /// Create only the account, web root and FPM pool (no site)
    Pool(PoolArgs),

    /// Check that this host can be provisioned
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct CreateArgs {
    /// Application name; becomes the account, pool and site name
    pub name: String,

    /// Domain served by the site
    pub domain: String,

    /// How requests reach PHP (defaults to the configured mode)
    #[arg(short, long, value_enum)]
    pub mode: Option<SiteModeArg>,

    /// Do not copy your authorized_keys into the new account
    #[arg(long)]
    pub no_ssh: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Parser)]
pub struct PoolArgs {
    /// Application name; becomes the account and pool name
    pub name: String,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Flags shared by the provisioning commands
#[derive(Parser, Clone, Copy)]
pub struct RunArgs {
    /// Dry run - show what would be done
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SiteModeArg {
    /// Serve <app>/public and execute any .php file
    DirectRoot,
    /// Serve <app>/current/public and route everything through index.php
    FrontController,
}

impl From<SiteModeArg> for SiteMode {
    fn from(arg: SiteModeArg) -> Self {
        match arg {
            SiteModeArg::DirectRoot => Self::DirectRoot,
            SiteModeArg::FrontController => Self::FrontController,
        }
    }
}
