//! `appsilo create` and `appsilo pool`

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use provision::{CommandExecutor, ExecuteSummary, StepContext};

use crate::Context;
use crate::app::ApplicationIdentity;
use crate::cli::{CreateArgs, PoolArgs, RunArgs};
use crate::config::SiloConfig;
use crate::host::HostFs;
use crate::paths;
use crate::pipeline::{self, Features, Pipeline, Request};
use crate::progress::ConsoleProgress;
use crate::runner::SystemRunner;
use crate::sudo::{self, SudoSession};
use crate::ui;

/// Full pipeline: account, pool and site
pub fn create(ctx: &Context, args: CreateArgs) -> Result<()> {
    let config = load_config(ctx)?;

    let request = Request {
        identity: ApplicationIdentity::new(&args.name, &args.domain)?,
        mode: args.mode.map_or(config.site.mode, Into::into),
        features: Features {
            ssh_access: config.site.ssh_access && !args.no_ssh,
            proxy_site: true,
        },
        invoker: sudo::invoking_user(),
    };

    run_pipeline(ctx, &config, &request, args.run)
}

/// Reduced pipeline: account and pool only
pub fn pool(ctx: &Context, args: PoolArgs) -> Result<()> {
    let config = load_config(ctx)?;

    let request = Request {
        identity: ApplicationIdentity::pool_only(&args.name)?,
        mode: config.site.mode,
        features: Features::pool_only(),
        invoker: None,
    };

    run_pipeline(ctx, &config, &request, args.run)
}

fn load_config(ctx: &Context) -> Result<SiloConfig> {
    let source = paths::config_file(ctx.config.as_deref());
    SiloConfig::load(&source)
}

fn run_pipeline(ctx: &Context, config: &SiloConfig, request: &Request, run: RunArgs) -> Result<()> {
    let name = request.identity.name();
    let privilege = sudo::detect_privilege(&config.privilege.wrapper);
    log::info!("Privilege mode: {privilege}");

    // Held until the run ends; probes go through the wrapper too
    let _session = SudoSession::acquire(&privilege, &format!("provisioning {name}"))?;

    let runner = SystemRunner;
    let fs = HostFs;
    let exec = CommandExecutor::new(&runner, privilege);

    let pipeline = pipeline::build(config, request, &exec, &fs)?;

    if !ctx.quiet {
        print_plan(&pipeline, request, run.dry_run);
    }

    if !run.dry_run && !run.yes && !confirm_proceed()? {
        ui::info("Aborted, nothing was changed");
        return Ok(());
    }

    let step_ctx = StepContext::new(&exec, &fs)
        .with_dry_run(run.dry_run)
        .with_verbose(ctx.verbose > 0);
    let mut progress = ConsoleProgress::new(ctx.quiet);

    println!();
    let summary = pipeline::run(&pipeline, &step_ctx, &mut progress)?;

    print_summary(&pipeline, &summary, run.dry_run);
    Ok(())
}

fn print_plan(pipeline: &Pipeline, request: &Request, dry_run: bool) {
    let layout = &pipeline.layout;
    let title = if dry_run {
        format!("Dry run: {}", layout.name())
    } else {
        format!("Provisioning {}", layout.name())
    };

    ui::header(&title);
    if let Some(domain) = request.identity.domain() {
        ui::kv("Domain", domain);
    }
    ui::kv("PHP", &pipeline.runtime.to_string());
    ui::kv("Web root", &layout.web_root().display().to_string());
    ui::kv("Pool", &layout.pool_config().display().to_string());
    ui::kv("Socket", &layout.socket().display().to_string());
    if request.features.proxy_site {
        ui::kv("Mode", layout.mode().label());
        ui::kv("Site", &layout.site_available().display().to_string());
    }
}

/// Confirm with user
fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    println!();
    Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()
        .context("Failed to read confirmation")
}

/// Print final summary
fn print_summary(pipeline: &Pipeline, summary: &ExecuteSummary, dry_run: bool) {
    println!();
    let name = pipeline.layout.name();

    if dry_run {
        println!(
            "  {} {} steps would run for {}",
            "○".cyan().bold(),
            summary.planned,
            name
        );
    } else {
        println!("  {} {} is provisioned", "✓".green().bold(), name);
    }

    if summary.applied > 0 {
        println!("    • {} steps applied", summary.applied);
    }
    if summary.skipped > 0 {
        println!("    • {} steps already done", summary.skipped);
    }
    if summary.warned > 0 {
        println!("    • {} {}", summary.warned, "warnings".yellow());
    }
}
