//! Config file location for appsilo
//!
//! # Environment Variables
//!
//! - `APPSILO_CONFIG` - Path of the config file to use
//!
//! # Resolution Priority
//!
//! 1. `--config <path>` on the command line
//! 2. `APPSILO_CONFIG` environment variable
//! 3. `~/.config/appsilo/config.toml`, if it exists
//! 4. `/etc/appsilo/config.toml` (system-wide default)

use std::path::{Path, PathBuf};

/// Environment variable for config file override
pub const ENV_CONFIG: &str = "APPSILO_CONFIG";

/// System-wide config file
pub const SYSTEM_CONFIG: &str = "/etc/appsilo/config.toml";

/// Where the config file was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named explicitly (flag or env var); must exist
    Explicit(PathBuf),
    /// Default location; may be absent
    Default(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(p) | Self::Default(p) => p,
        }
    }
}

/// Resolve the config file location
pub fn config_file(cli_override: Option<&Path>) -> ConfigSource {
    // 1. Command line
    if let Some(path) = cli_override {
        let path = expand(&path.to_string_lossy());
        log::debug!("Using config from --config: {}", path.display());
        return ConfigSource::Explicit(path);
    }

    // 2. Environment variable
    if let Ok(value) = std::env::var(ENV_CONFIG) {
        let path = expand(&value);
        log::debug!("Using config from {}: {}", ENV_CONFIG, path.display());
        return ConfigSource::Explicit(path);
    }

    // 3. Per-user config, when present
    if let Some(home) = dirs::home_dir() {
        let user_path = home.join(".config").join("appsilo").join("config.toml");
        if user_path.exists() {
            log::debug!("Using user config: {}", user_path.display());
            return ConfigSource::Default(user_path);
        }
    }

    // 4. System default
    log::debug!("Using system config: {SYSTEM_CONFIG}");
    ConfigSource::Default(PathBuf::from(SYSTEM_CONFIG))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================
