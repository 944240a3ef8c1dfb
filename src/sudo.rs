//! Privilege mode and the invoking operator
//!
//! The privilege mode is probed once at startup and handed to the command
//! executor. Nothing else in the program reads the process identity.

use anyhow::{Context, Result, bail};
use provision::{CommandExecutor, CommandLine, Privilege};
use std::path::PathBuf;
use std::process::Command;

/// Decide the privilege mode for this run
pub fn detect_privilege(wrapper: &str) -> Privilege {
    // SAFETY: geteuid has no preconditions and cannot fail
    let euid = unsafe { libc::geteuid() };
    privilege_for_euid(euid, wrapper)
}

fn privilege_for_euid(euid: u32, wrapper: &str) -> Privilege {
    if euid == 0 {
        Privilege::Elevated
    } else {
        Privilege::Escalate {
            wrapper: wrapper.to_string(),
        }
    }
}

/// The operator behind this run, even when already elevated through sudo
pub fn invoking_user() -> Option<String> {
    resolve_invoker(std::env::var("SUDO_USER").ok(), std::env::var("USER").ok())
}

fn resolve_invoker(sudo_user: Option<String>, user: Option<String>) -> Option<String> {
    sudo_user
        .filter(|u| !u.is_empty() && u != "root")
        .or(user)
        .filter(|u| !u.is_empty())
}

/// Home directory of `user` from the account database
///
/// Returns `None` when the account is unknown or has no home field.
pub fn lookup_home(exec: &CommandExecutor, user: &str) -> provision::Result<Option<PathBuf>> {
    let cmd = CommandLine::new("getent").args(["passwd", user]);
    match exec.run(&cmd) {
        Ok(output) => Ok(parse_passwd_home(&output.stdout_str())),
        Err(provision::Error::CommandFailed { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Sixth field of the first passwd line
fn parse_passwd_home(line: &str) -> Option<PathBuf> {
    let home = line.lines().next()?.split(':').nth(5)?;
    if home.is_empty() {
        None
    } else {
        Some(PathBuf::from(home))
    }
}

/// Cached sudo credentials for the length of one run
///
/// Prompts once up front, so the password prompt is not interleaved with
/// step output. Invalidated again on drop.
pub struct SudoSession {
    wrapper: String,
}

impl SudoSession {
    /// Validate credentials when commands will go through `sudo`
    ///
    /// Returns `None` when already elevated or when the wrapper is not sudo.
    pub fn acquire(privilege: &Privilege, reason: &str) -> Result<Option<Self>> {
        let wrapper = match privilege {
            Privilege::Escalate { wrapper } if wrapper == "sudo" => wrapper.clone(),
            _ => return Ok(None),
        };

        eprintln!();
        eprintln!("  Sudo required: {reason}");
        eprintln!();

        let status = Command::new(&wrapper)
            .arg("-v")
            .status()
            .context("Failed to execute sudo")?;

        if !status.success() {
            bail!("Failed to acquire sudo privileges");
        }

        Ok(Some(Self { wrapper }))
    }
}

impl Drop for SudoSession {
    fn drop(&mut self) {
        let _ = Command::new(&self.wrapper).arg("-k").status();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;

    #[test]
    fn test_privilege_for_euid() {
        assert_eq!(privilege_for_euid(0, "sudo"), Privilege::Elevated);
        assert_eq!(
            privilege_for_euid(1000, "doas"),
            Privilege::Escalate {
                wrapper: "doas".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_invoker_prefers_sudo_user() {
        assert_eq!(
            resolve_invoker(Some("alice".into()), Some("root".into())),
            Some("alice".to_string())
        );
        assert_eq!(
            resolve_invoker(Some("root".into()), Some("root".into())),
            Some("root".to_string())
        );
        assert_eq!(
            resolve_invoker(None, Some("bob".into())),
            Some("bob".to_string())
        );
        assert_eq!(resolve_invoker(Some(String::new()), None), None);
    }

    #[test]
    fn test_parse_passwd_home() {
        assert_eq!(
            parse_passwd_home("alice:x:1000:1000:Alice:/home/alice:/bin/bash\n"),
            Some(PathBuf::from("/home/alice"))
        );
        assert_eq!(parse_passwd_home("svc:x:998:998::::\n"), None);
        assert_eq!(parse_passwd_home(""), None);
    }

    #[test]
    fn test_lookup_home() {
        let host = FakeHost::new();
        host.add_passwd("alice", "/home/alice");
        let exec = CommandExecutor::new(&host, Privilege::Elevated);

        assert_eq!(
            lookup_home(&exec, "alice").unwrap(),
            Some(PathBuf::from("/home/alice"))
        );
        assert_eq!(lookup_home(&exec, "ghost").unwrap(), None);
    }

    #[test]
    fn test_no_session_when_elevated() {
        assert!(SudoSession::acquire(&Privilege::Elevated, "test").unwrap().is_none());
    }
}
