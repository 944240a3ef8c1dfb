//! Host paths and service names for one application
//!
//! Everything here is derived from the application name, the runtime
//! version and the configured roots. Other tooling on the host relies on
//! these exact locations.

use std::path::{Path, PathBuf};

use crate::app::{ApplicationIdentity, RuntimeVersion};
use crate::config::SiloConfig;
use crate::vhost::SiteMode;

/// Suffix of the temporary file written before the atomic rename
pub const TMP_SUFFIX: &str = ".appsilo-tmp";

#[derive(Debug, Clone)]
pub struct HostLayout {
    name: String,
    version: RuntimeVersion,
    mode: SiteMode,
    etc: PathBuf,
    run: PathBuf,
    www: PathBuf,
    home: PathBuf,
    log: PathBuf,
    fpm_dir: String,
    proxy_dir: String,
    proxy_service: String,
}

impl HostLayout {
    pub fn new(
        config: &SiloConfig,
        identity: &ApplicationIdentity,
        version: RuntimeVersion,
        mode: SiteMode,
    ) -> Self {
        Self {
            name: identity.name().to_string(),
            version,
            mode,
            etc: config.paths.etc.clone(),
            run: config.paths.run.clone(),
            www: config.paths.www.clone(),
            home: config.paths.home.clone(),
            log: config.paths.log.clone(),
            fpm_dir: config.runtime.fpm_dir.clone(),
            proxy_dir: config.proxy.dir.clone(),
            proxy_service: config.proxy.service.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> RuntimeVersion {
        self.version
    }

    pub fn mode(&self) -> SiteMode {
        self.mode
    }

    /// `/etc/php/<version>/fpm/pool.d`
    pub fn pool_dir(&self) -> PathBuf {
        pool_dir(&self.etc, &self.fpm_dir, self.version)
    }

    /// The stock pool every derived pool starts from
    pub fn pool_template(&self) -> PathBuf {
        self.pool_dir().join("www.conf")
    }

    pub fn pool_config(&self) -> PathBuf {
        self.pool_dir().join(format!("{}.conf", self.name))
    }

    /// `/run/php/php<version>-fpm-<name>.sock`
    pub fn socket(&self) -> PathBuf {
        self.run
            .join(&self.fpm_dir)
            .join(format!("php{}-fpm-{}.sock", self.version, self.name))
    }

    pub fn site_available(&self) -> PathBuf {
        self.etc
            .join(&self.proxy_dir)
            .join("sites-available")
            .join(&self.name)
    }

    pub fn site_enabled(&self) -> PathBuf {
        self.etc
            .join(&self.proxy_dir)
            .join("sites-enabled")
            .join(&self.name)
    }

    /// `/var/www/<name>`; ownership and permissions apply from here down
    pub fn app_root(&self) -> PathBuf {
        self.www.join(&self.name)
    }

    /// Document root served by the proxy
    pub fn web_root(&self) -> PathBuf {
        self.app_root().join(self.mode.web_root_suffix())
    }

    /// Home directory of the new account
    pub fn home(&self) -> PathBuf {
        self.home.join(&self.name)
    }

    /// Where the proxy writes per-site logs
    pub fn proxy_log_dir(&self) -> PathBuf {
        self.log.join(&self.proxy_dir)
    }

    /// `php<version>-fpm`
    pub fn pool_service(&self) -> String {
        format!("php{}-fpm", self.version)
    }

    pub fn proxy_service(&self) -> &str {
        &self.proxy_service
    }
}

fn pool_dir(etc: &Path, fpm_dir: &str, version: RuntimeVersion) -> PathBuf {
    etc.join(fpm_dir)
        .join(version.to_string())
        .join("fpm")
        .join("pool.d")
}

/// Stock pool template for `version`, independent of any application
pub fn pool_template_for(config: &SiloConfig, version: RuntimeVersion) -> PathBuf {
    pool_dir(&config.paths.etc, &config.runtime.fpm_dir, version).join("www.conf")
}

/// Directory holding the per-version FPM sockets
pub fn socket_dir(config: &SiloConfig) -> PathBuf {
    config.paths.run.join(&config.runtime.fpm_dir)
}
