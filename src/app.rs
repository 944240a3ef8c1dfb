//! Application identity and runtime version

use provision::{CommandExecutor, CommandLine, Error, Result};
use std::fmt;
use std::str::FromStr;

/// Longest account name accepted (useradd's limit on most distributions)
const MAX_NAME_LEN: usize = 32;

/// Characters that would break out of an nginx directive
const DOMAIN_FORBIDDEN: &[char] = &[';', '{', '}', '"', '\'', '$', '#'];

/// The application being provisioned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationIdentity {
    name: String,
    domain: Option<String>,
}

impl ApplicationIdentity {
    /// Identity for the full pipeline (account + pool + site)
    pub fn new(name: &str, domain: &str) -> Result<Self> {
        validate_name(name)?;
        validate_domain(domain)?;
        Ok(Self {
            name: name.to_string(),
            domain: Some(domain.to_string()),
        })
    }

    /// Identity for the reduced pipeline, which generates no site
    pub fn pool_only(name: &str) -> Result<Self> {
        validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            domain: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }
}

/// Check that `name` is usable as an OS account name
///
/// Lowercase letters, digits, `_` and `-`; must not start with a digit or
/// `-`; at most 32 bytes.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid("name", name, "must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::invalid(
            "name",
            name,
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }

    let mut chars = name.chars();
    let first = chars.next().unwrap_or_default();
    if !(first.is_ascii_lowercase() || first == '_') {
        return Err(Error::invalid(
            "name",
            name,
            "must start with a lowercase letter or '_'",
        ));
    }

    let allowed =
        |c: &char| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(*c, '_' | '-');
    if let Some(bad) = chars.find(|c| !allowed(c)) {
        return Err(Error::invalid(
            "name",
            name,
            format!("contains invalid character '{bad}'"),
        ));
    }

    Ok(())
}

/// Check that `domain` is a single token safe to interpolate into config text
pub fn validate_domain(domain: &str) -> Result<()> {
    if domain.is_empty() {
        return Err(Error::invalid("domain", domain, "must not be empty"));
    }
    if let Some(bad) = domain
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || DOMAIN_FORBIDDEN.contains(c))
    {
        return Err(Error::invalid(
            "domain",
            domain,
            format!("contains invalid character {bad:?}"),
        ));
    }
    Ok(())
}

/// Active PHP runtime version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
}

impl RuntimeVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for RuntimeVersion {
    type Err = Error;

    /// Parse `8.2`, `8.2.12` or `8.2.12-1+ubuntu` (patch and suffix ignored)
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let mut parts = trimmed.split('.');

        let parse = |part: Option<&str>| -> Option<u32> {
            let digits: String = part?.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        };

        match (parse(parts.next()), parse(parts.next())) {
            (Some(major), Some(minor)) => Ok(Self { major, minor }),
            _ => Err(Error::invalid(
                "runtime version",
                trimmed,
                "expected MAJOR.MINOR",
            )),
        }
    }
}

/// Determine the runtime version once for the whole run
///
/// A configured version wins; otherwise the PHP binary is asked. The probe
/// does not need privileges, but goes through the executor like every
/// other command.
pub fn detect_runtime(
    exec: &CommandExecutor,
    php_binary: &str,
    configured: Option<&str>,
) -> Result<RuntimeVersion> {
    if let Some(version) = configured {
        log::debug!("Using configured runtime version {version}");
        return version.parse();
    }

    let probe = CommandLine::new(php_binary).args([
        "-r",
        "echo PHP_MAJOR_VERSION.'.'.PHP_MINOR_VERSION;",
    ]);
    let output = exec.run(&probe).map_err(|e| {
        Error::precondition(format!("could not detect the PHP version with {php_binary}: {e}"))
    })?;

    let version = output.stdout_str().parse()?;
    log::debug!("Detected runtime version {version}");
    Ok(version)
}
