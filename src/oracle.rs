//! Idempotency probes
//!
//! Each probe only looks at the host. They keep a re-run from failing on
//! things the previous run already created; they do not detect drift (an
//! existing account with a different shell is accepted as-is).

use provision::{CommandExecutor, CommandLine, Filesystem, Result};
use std::path::Path;

/// Whether an OS account named `name` resolves
///
/// `id -u <name>` exiting non-zero means "no such user", not an error.
pub fn user_exists(exec: &CommandExecutor, name: &str) -> Result<bool> {
    exec.probe(&CommandLine::new("id").args(["-u", name]))
}

/// Whether the enabled-site link exists (a dangling link counts)
pub fn site_enabled(fs: &dyn Filesystem, enabled_link: &Path) -> bool {
    fs.is_symlink(enabled_link) || fs.exists(enabled_link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;
    use provision::Privilege;

    #[test]
    fn test_user_exists_follows_accounts() {
        let host = FakeHost::new();
        let exec = CommandExecutor::new(&host, Privilege::Elevated);

        assert!(!user_exists(&exec, "acme").unwrap());
        host.add_user("acme");
        assert!(user_exists(&exec, "acme").unwrap());
    }

    #[test]
    fn test_user_exists_through_sudo() {
        let host = FakeHost::new();
        host.add_user("acme");
        let exec = CommandExecutor::new(&host, Privilege::sudo());

        assert!(user_exists(&exec, "acme").unwrap());
        assert!(!user_exists(&exec, "other").unwrap());
    }

    #[test]
    fn test_site_enabled_checks_link() {
        let host = FakeHost::new();
        let link = Path::new("/etc/nginx/sites-enabled/acme");

        assert!(!site_enabled(&host, link));
        host.add_symlink(link, Path::new("/etc/nginx/sites-available/acme"));
        assert!(site_enabled(&host, link));
    }
}
