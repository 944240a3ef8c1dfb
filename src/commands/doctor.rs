use anyhow::Result;
use colored::Colorize;
use provision::{CommandExecutor, Privilege};

use crate::Context;
use crate::app::{self, RuntimeVersion};
use crate::config::SiloConfig;
use crate::layout;
use crate::paths;
use crate::runner::{self, SystemRunner};
use crate::sudo;
use crate::ui;

struct Issue {
    category: &'static str,
    summary: String,
    detail: Option<String>,
    fix: Option<String>,
    fix_cmd: Option<String>,
}

pub fn run(ctx: &Context) -> Result<()> {
    ui::banner();
    ui::header("Host Readiness Check");

    let mut issues: Vec<Issue> = Vec::new();

    // Check 1: Configuration
    let config = check_config(ctx, &mut issues);

    // Check 2: Privileges
    check_privilege(&config, &mut issues);

    // Check 3: Required commands
    check_commands(&config, &mut issues);

    // Check 4: PHP-FPM
    check_runtime(&config, &mut issues);

    // Check 5: nginx layout
    check_proxy(&config, &mut issues);

    // Summary
    println!();
    if issues.is_empty() {
        ui::success("Host is ready for appsilo");
    } else {
        print_issue_summary(&issues);
    }

    Ok(())
}

fn print_issue_summary(issues: &[Issue]) {
    let count = issues.len();
    let label = if count == 1 { "Issue" } else { "Issues" };
    ui::header(&format!("{count} {label} Found"));

    for (i, issue) in issues.iter().enumerate() {
        let num = i + 1;
        println!(
            "  {}  {} {}",
            format!("{num}.").bold(),
            issue.summary,
            format!("[{}]", issue.category).dimmed()
        );
        if let Some(detail) = &issue.detail {
            for line in detail.lines() {
                println!("      {}", line.dimmed());
            }
        }
        if let Some(fix) = &issue.fix {
            println!("      {} {}", "Fix:".cyan(), fix);
        }
        if let Some(cmd) = &issue.fix_cmd {
            println!("      {} {}", "$".dimmed(), cmd.bold());
        }
        println!();
    }

    let fix_cmds: Vec<&str> = issues.iter().filter_map(|i| i.fix_cmd.as_deref()).collect();

    if !fix_cmds.is_empty() {
        ui::section("Quick Fixes");
        println!(
            "  {}",
            "Run these commands to resolve the issues above:".dimmed()
        );
        println!();
        for cmd in &fix_cmds {
            println!("    {}", cmd.bold());
        }
    }
}

fn check_config(ctx: &Context, issues: &mut Vec<Issue>) -> SiloConfig {
    ui::section("Configuration");

    let source = paths::config_file(ctx.config.as_deref());
    let path = source.path().display().to_string();

    if !source.path().exists() {
        println!(
            "  {} {} {}",
            "○".dimmed(),
            path,
            "(not present, using defaults)".dimmed()
        );
    }

    match SiloConfig::load(&source) {
        Ok(config) => {
            if source.path().exists() {
                println!("  {} {}", "✓".green(), path);
            }
            config
        }
        Err(e) => {
            let reason = format!("{:#}", e.root_cause());
            println!("  {} {} {}", "✗".red(), path, format!("({reason})").red());
            issues.push(Issue {
                category: "Configuration",
                summary: format!("{path} could not be loaded"),
                detail: Some(format!("{e:#}")),
                fix: Some("Fix the file, or point --config at a valid one".into()),
                fix_cmd: Some(format!("$EDITOR {path}")),
            });
            SiloConfig::default()
        }
    }
}

fn check_privilege(config: &SiloConfig, issues: &mut Vec<Issue>) {
    ui::section("Privileges");

    let wrapper = &config.privilege.wrapper;
    match sudo::detect_privilege(wrapper) {
        Privilege::Elevated => println!("  {} running as root", "✓".green()),
        Privilege::Escalate { .. } if runner::command_exists(wrapper) => {
            println!("  {} commands will run through {}", "✓".green(), wrapper);
        }
        Privilege::Escalate { .. } => {
            println!("  {} {} {}", "✗".red(), wrapper, "(missing)".red());
            issues.push(Issue {
                category: "Privileges",
                summary: format!("not root and {wrapper} is not installed"),
                detail: Some("Creating accounts and writing under /etc needs root".into()),
                fix: Some("Run appsilo as root, or set privilege.wrapper".into()),
                fix_cmd: None,
            });
        }
    }
}

fn check_commands(config: &SiloConfig, issues: &mut Vec<Issue>) {
    ui::section("Required Commands");

    let commands = [
        ("useradd", "Account creation", "apt install passwd"),
        ("getent", "Account lookup", "apt install libc-bin"),
        ("systemctl", "Service control", "apt install systemd"),
        (config.runtime.php_binary.as_str(), "PHP CLI", "apt install php-cli"),
        (config.proxy.service.as_str(), "Web server", "apt install nginx"),
    ];

    for (cmd, desc, install_hint) in commands {
        if runner::command_exists(cmd) {
            println!("  {} {} - {}", "✓".green(), cmd, desc.dimmed());
        } else {
            println!("  {} {} - {} {}", "✗".red(), cmd, desc, "(missing)".red());
            issues.push(Issue {
                category: "Required Commands",
                summary: format!("{cmd} is not installed"),
                detail: Some(format!("{desc}, used while provisioning")),
                fix: Some(format!("Install {cmd}")),
                fix_cmd: Some(install_hint.to_string()),
            });
        }
    }
}

fn check_runtime(config: &SiloConfig, issues: &mut Vec<Issue>) {
    ui::section("PHP-FPM");

    // Read-only probe; no wrapper needed
    let exec = CommandExecutor::new(&SystemRunner, Privilege::Elevated);
    let version = match app::detect_runtime(
        &exec,
        &config.runtime.php_binary,
        config.runtime.version.as_deref(),
    ) {
        Ok(v) => {
            println!("  {} PHP {}", "✓".green(), v);
            v
        }
        Err(e) => {
            println!("  {} PHP version {}", "✗".red(), "(unknown)".red());
            issues.push(Issue {
                category: "PHP-FPM",
                summary: "PHP version could not be determined".into(),
                detail: Some(e.to_string()),
                fix: Some("Install PHP, or set runtime.version in the config".into()),
                fix_cmd: None,
            });
            return;
        }
    };

    check_template(config, version, issues);

    let sockets = layout::socket_dir(config);
    if sockets.is_dir() {
        println!("  {} {}", "✓".green(), sockets.display());
    } else {
        println!(
            "  {} {} {}",
            "○".dimmed(),
            sockets.display(),
            "(created when the pool service starts)".dimmed()
        );
    }
}

fn check_template(config: &SiloConfig, version: RuntimeVersion, issues: &mut Vec<Issue>) {
    let template = layout::pool_template_for(config, version);
    if template.is_file() {
        println!("  {} {}", "✓".green(), template.display());
    } else {
        println!("  {} {} {}", "✗".red(), template.display(), "(missing)".red());
        issues.push(Issue {
            category: "PHP-FPM",
            summary: format!("pool template for PHP {version} is missing"),
            detail: Some(format!("Every pool is derived from {}", template.display())),
            fix: Some(format!("Install php{version}-fpm")),
            fix_cmd: Some(format!("apt install php{version}-fpm")),
        });
    }
}

fn check_proxy(config: &SiloConfig, issues: &mut Vec<Issue>) {
    ui::section("nginx");

    let root = config.paths.etc.join(&config.proxy.dir);
    for dir in ["sites-available", "sites-enabled"] {
        let path = root.join(dir);
        if path.is_dir() {
            println!("  {} {}", "✓".green(), path.display());
        } else {
            println!("  {} {} {}", "✗".yellow(), path.display(), "(missing)".yellow());
            issues.push(Issue {
                category: "nginx",
                summary: format!("{} is missing", path.display()),
                detail: Some("Needed by `appsilo create`; `appsilo pool` works without it".into()),
                fix: Some("Create the directory".into()),
                fix_cmd: Some(format!("mkdir -p {}", path.display())),
            });
        }
    }
}
