mod app;
mod cli;
mod commands;
mod config;
mod host;
mod layout;
mod oracle;
mod paths;
mod pipeline;
mod pool;
mod progress;
mod runner;
mod steps;
mod sudo;
mod ui;
mod vhost;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use colored::Colorize;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// `--config` override
    pub config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
    };

    match dispatch(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Create(args) => commands::create::create(ctx, args),
        Command::Pool(args) => commands::create::pool(ctx, args),
        Command::Doctor => commands::doctor::run(ctx),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "appsilo", &mut io::stdout());
            Ok(())
        }
    }
}

/// Print the error chain, plus advice when it came from the pipeline
fn report(err: &anyhow::Error) {
    ui::error(&format!("{err:#}"));

    if let Some(e) = err.downcast_ref::<provision::Error>() {
        let category = e.category();
        if let Some(step) = e.step() {
            eprintln!("  {} {}", "Failed step:".dimmed(), step);
        }
        eprintln!("  {} {}", format!("{}:", category.description()).dimmed(), category.advice());
        if category.may_have_mutated() {
            eprintln!(
                "  {}",
                "Steps before the failure were applied and are not rolled back.".yellow()
            );
        }
    }
}
