//! appsilo configuration (`config.toml`)
//!
//! Every field has a default matching a stock Debian/Ubuntu host with nginx
//! and PHP-FPM, so an empty or missing file is a valid configuration.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::paths::{self, ConfigSource};
use crate::vhost::SiteMode;

// ============================================================================
// Main Config Schema
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiloConfig {
    pub runtime: RuntimeConfig,
    pub pool: PoolConfig,
    pub proxy: ProxyConfig,
    pub paths: PathsConfig,
    pub account: AccountConfig,
    pub privilege: PrivilegeConfig,
    pub site: SiteConfig,
}

/// PHP runtime detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Binary asked for its version when `version` is unset
    pub php_binary: String,
    /// Pin the runtime version (e.g. "8.2") instead of probing
    pub version: Option<String>,
    /// Directory name under /etc and /run used by PHP-FPM
    pub fpm_dir: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            php_binary: "php".to_string(),
            version: None,
            fpm_dir: "php".to_string(),
        }
    }
}

/// Worker pool socket ownership
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Account the reverse proxy runs as; owns the pool socket
    pub listen_owner: String,
    pub listen_group: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            listen_owner: "www-data".to_string(),
            listen_group: "www-data".to_string(),
        }
    }
}

/// Reverse proxy layout and service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Directory name under /etc holding sites-available / sites-enabled
    pub dir: String,
    /// systemd unit reloaded after the site changes
    pub service: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            dir: "nginx".to_string(),
            service: "nginx".to_string(),
        }
    }
}

/// Filesystem roots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub etc: PathBuf,
    pub run: PathBuf,
    pub www: PathBuf,
    pub home: PathBuf,
    pub log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            etc: PathBuf::from("/etc"),
            run: PathBuf::from("/run"),
            www: PathBuf::from("/var/www"),
            home: PathBuf::from("/home"),
            log: PathBuf::from("/var/log"),
        }
    }
}

impl PathsConfig {
    /// Expand ~ and environment variables in every root
    fn expand(&mut self) {
        for path in [
            &mut self.etc,
            &mut self.run,
            &mut self.www,
            &mut self.home,
            &mut self.log,
        ] {
            *path = paths::expand(&path.to_string_lossy());
        }
    }
}

/// New account settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Login shell of the new account
    pub shell: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            shell: "/usr/sbin/nologin".to_string(),
        }
    }
}

/// Privilege escalation when not running as root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivilegeConfig {
    pub wrapper: String,
}

impl Default for PrivilegeConfig {
    fn default() -> Self {
        Self {
            wrapper: "sudo".to_string(),
        }
    }
}

/// Defaults for `appsilo create`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub mode: SiteMode,
    /// Copy the operator's authorized_keys into the new account
    pub ssh_access: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            mode: SiteMode::FrontController,
            ssh_access: true,
        }
    }
}

impl SiloConfig {
    /// Load the config from the resolved location
    ///
    /// An explicitly named file must exist. A missing default file yields
    /// the built-in defaults.
    pub fn load(source: &ConfigSource) -> Result<Self> {
        let path = source.path();

        if !path.exists() {
            if let ConfigSource::Explicit(_) = source {
                bail!("Config file not found: {}", path.display());
            }
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }

    /// Parse config text
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.paths.expand();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("runtime.php_binary", &self.runtime.php_binary),
            ("runtime.fpm_dir", &self.runtime.fpm_dir),
            ("pool.listen_owner", &self.pool.listen_owner),
            ("pool.listen_group", &self.pool.listen_group),
            ("proxy.dir", &self.proxy.dir),
            ("proxy.service", &self.proxy.service),
            ("privilege.wrapper", &self.privilege.wrapper),
        ] {
            if value.trim().is_empty() {
                bail!("{key} must not be empty");
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SiloConfig::from_toml("").unwrap();
        assert_eq!(config.pool.listen_owner, "www-data");
        assert_eq!(config.pool.listen_group, "www-data");
        assert_eq!(config.runtime.fpm_dir, "php");
        assert_eq!(config.proxy.dir, "nginx");
        assert_eq!(config.paths.www, PathBuf::from("/var/www"));
        assert_eq!(config.site.mode, SiteMode::FrontController);
        assert!(config.site.ssh_access);
        assert!(config.runtime.version.is_none());
    }

    #[test]
    fn test_partial_override() {
        let config = SiloConfig::from_toml(
            r#"
[runtime]
version = "8.3"

[pool]
listen_owner = "nginx"
listen_group = "nginx"

[site]
mode = "direct-root"
ssh_access = false
"#,
        )
        .unwrap();

        assert_eq!(config.runtime.version.as_deref(), Some("8.3"));
        assert_eq!(config.runtime.php_binary, "php");
        assert_eq!(config.pool.listen_owner, "nginx");
        assert_eq!(config.site.mode, SiteMode::DirectRoot);
        assert!(!config.site.ssh_access);
    }

    #[test]
    fn test_rejects_empty_values() {
        assert!(SiloConfig::from_toml("[privilege]\nwrapper = \"\"\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(SiloConfig::from_toml("[site]\nmode = \"proxy-pass\"\n").is_err());
    }

    #[test]
    fn test_missing_default_file_is_defaults() {
        let source = ConfigSource::Default(PathBuf::from("/nonexistent/appsilo/config.toml"));
        let config = SiloConfig::load(&source).unwrap();
        assert_eq!(config.privilege.wrapper, "sudo");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let source = ConfigSource::Explicit(PathBuf::from("/nonexistent/appsilo/config.toml"));
        assert!(SiloConfig::load(&source).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[paths]\nwww = \"/srv/www\"\n").unwrap();

        let config = SiloConfig::load(&ConfigSource::Explicit(path)).unwrap();
        assert_eq!(config.paths.www, Path::new("/srv/www"));
        assert_eq!(config.paths.etc, Path::new("/etc"));
    }
}
