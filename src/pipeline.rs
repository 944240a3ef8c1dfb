//! Provisioning pipeline assembly
//!
//! Order: detect runtime, ensure user, (ssh access), directories,
//! ownership, permissions, pool config, (virtual host, enable site,
//! reload proxy), restart worker pool.
//!
//! Building the plan detects the runtime and reads the pool template. Both
//! happen before any step runs, so a host without a template is rejected
//! without being touched.

use provision::{
    CommandExecutor, Error, ExecuteSummary, ExecutionPlan, Filesystem, ProgressCallback, Result,
    StepContext,
};

use crate::app::{self, ApplicationIdentity, RuntimeVersion};
use crate::config::SiloConfig;
use crate::layout::HostLayout;
use crate::pool::{self, PoolParams};
use crate::steps::{
    ApplyOwnership, ApplyPermissions, EnableSite, EnsureDirectories, EnsureSshAccess, EnsureUser,
    ReloadProxy, RestartWorkerPool, WritePoolConfig, WriteVirtualHost,
};
use crate::vhost::{self, SiteMode, VhostParams};

/// Optional parts of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    /// Copy the operator's authorized_keys into the new account
    pub ssh_access: bool,
    /// Generate, enable and load an nginx site
    pub proxy_site: bool,
}

impl Features {
    /// Worker pool only: no site, no keys
    pub fn pool_only() -> Self {
        Self {
            ssh_access: false,
            proxy_site: false,
        }
    }
}

/// What to provision
#[derive(Debug, Clone)]
pub struct Request {
    pub identity: ApplicationIdentity,
    pub mode: SiteMode,
    pub features: Features,
    /// Operator whose SSH keys are copied
    pub invoker: Option<String>,
}

/// A ready-to-run plan and the layout it was derived from
pub struct Pipeline {
    pub runtime: RuntimeVersion,
    pub layout: HostLayout,
    pub plan: ExecutionPlan,
}

/// Detect the runtime, read the template and lay out the steps
pub fn build(
    config: &SiloConfig,
    request: &Request,
    exec: &CommandExecutor,
    fs: &dyn Filesystem,
) -> Result<Pipeline> {
    let features = request.features;
    let identity = &request.identity;
    let name = identity.name();

    let domain = match (features.proxy_site, identity.domain()) {
        (true, Some(domain)) => Some(domain),
        (true, None) => {
            return Err(Error::invalid("domain", "", "a site needs a domain"));
        }
        (false, _) => None,
    };

    // Without a site the web root stays at <app>/public
    let mode = if features.proxy_site {
        request.mode
    } else {
        SiteMode::DirectRoot
    };

    // Version detection only reads; PHP never runs under the wrapper
    let runtime = app::detect_runtime(
        &exec.unwrapped(),
        &config.runtime.php_binary,
        config.runtime.version.as_deref(),
    )?;
    let layout = HostLayout::new(config, identity, runtime, mode);

    let template = read_template(fs, &layout)?;
    let socket = layout.socket().display().to_string();
    let pool_text = pool::rewrite_with(
        &template,
        &PoolParams {
            app_name: name,
            socket_path: &socket,
            listen_owner: &config.pool.listen_owner,
            listen_group: &config.pool.listen_group,
        },
    );

    let mut plan = ExecutionPlan::new();

    plan.push(EnsureUser {
        name: name.to_string(),
        home: layout.home(),
        shell: config.account.shell.clone(),
    });
    plan.push_if(
        features.ssh_access,
        EnsureSshAccess {
            name: name.to_string(),
            home: layout.home(),
            invoker: request.invoker.clone(),
        },
    );
    plan.push(EnsureDirectories {
        web_root: layout.web_root(),
    });
    plan.push(ApplyOwnership {
        name: name.to_string(),
        app_root: layout.app_root(),
    });
    plan.push(ApplyPermissions {
        app_root: layout.app_root(),
    });
    plan.push(WritePoolConfig {
        path: layout.pool_config(),
        content: pool_text,
    });

    if let Some(domain) = domain {
        let web_root = layout.web_root();
        let socket_path = layout.socket();
        let log_dir = layout.proxy_log_dir();
        let site_text = vhost::generate(&VhostParams {
            app_name: name,
            domain,
            version: runtime,
            mode,
            web_root: &web_root,
            socket: &socket_path,
            log_dir: &log_dir,
        });

        plan.push(WriteVirtualHost {
            path: layout.site_available(),
            content: site_text,
        });
        plan.push(EnableSite {
            available: layout.site_available(),
            enabled: layout.site_enabled(),
        });
        plan.push(ReloadProxy {
            service: layout.proxy_service().to_string(),
        });
    }

    plan.push(RestartWorkerPool {
        service: layout.pool_service(),
    });

    Ok(Pipeline {
        runtime,
        layout,
        plan,
    })
}

fn read_template(fs: &dyn Filesystem, layout: &HostLayout) -> Result<String> {
    let path = layout.pool_template();
    if !fs.exists(&path) {
        return Err(Error::precondition(format!(
            "pool template {} not found (is php{}-fpm installed?)",
            path.display(),
            layout.version()
        )));
    }
    fs.read_to_string(&path).map_err(|e| {
        Error::precondition(format!("pool template {} unreadable: {e}", path.display()))
    })
}

/// Run a built pipeline
pub fn run<P: ProgressCallback>(
    pipeline: &Pipeline,
    ctx: &StepContext,
    progress: &mut P,
) -> Result<ExecuteSummary> {
    provision::execute(&pipeline.plan, ctx, progress)
}
