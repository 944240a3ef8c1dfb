//! nginx virtual host generation
//!
//! Pure text rendering: no filesystem or process access. The domain is
//! interpolated as-is, so callers must pass a validated single token
//! (see [`crate::app::validate_domain`]).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::app::RuntimeVersion;

/// How requests are mapped to PHP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteMode {
    /// Web root is `<app>/public`; any `*.php` is executed
    DirectRoot,
    /// Web root is `<app>/current/public`; only `index.php` is executed
    FrontController,
}

impl SiteMode {
    /// Web root relative to the application directory
    pub fn web_root_suffix(self) -> &'static str {
        match self {
            Self::DirectRoot => "public",
            Self::FrontController => "current/public",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DirectRoot => "direct-root",
            Self::FrontController => "front-controller",
        }
    }
}

/// Inputs for a virtual host
#[derive(Debug, Clone)]
pub struct VhostParams<'a> {
    pub app_name: &'a str,
    pub domain: &'a str,
    pub version: RuntimeVersion,
    pub mode: SiteMode,
    pub web_root: &'a Path,
    pub socket: &'a Path,
    /// Directory for the per-site access and error logs
    pub log_dir: &'a Path,
}

/// Render the server block for `params`
pub fn generate(params: &VhostParams) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "# Managed by appsilo: {} (PHP {}, {})\n",
        params.app_name,
        params.version,
        params.mode.label()
    ));
    out.push_str("server {\n");
    out.push_str("    listen 80;\n");
    out.push_str("    listen [::]:80;\n");
    out.push_str(&format!("    server_name {};\n", params.domain));
    out.push_str(&format!("    root {};\n", params.web_root.display()));
    out.push('\n');
    out.push_str(&format!(
        "    access_log {}/{}.access.log;\n",
        params.log_dir.display(),
        params.app_name
    ));
    out.push_str(&format!(
        "    error_log {}/{}.error.log;\n",
        params.log_dir.display(),
        params.app_name
    ));
    out.push('\n');

    let pass = format!("unix:{}", params.socket.display());
    match params.mode {
        SiteMode::DirectRoot => push_direct_root(&mut out, &pass),
        SiteMode::FrontController => push_front_controller(&mut out, &pass),
    }

    out.push_str("}\n");
    out
}

fn push_direct_root(out: &mut String, pass: &str) {
    out.push_str("    index index.php index.html;\n");
    out.push('\n');
    out.push_str("    location / {\n");
    out.push_str("        try_files $uri $uri/ /index.php?$query_string;\n");
    out.push_str("    }\n");
    out.push('\n');
    out.push_str("    location ~ \\.php$ {\n");
    out.push_str("        include snippets/fastcgi-php.conf;\n");
    out.push_str(&format!("        fastcgi_pass {pass};\n"));
    out.push_str("    }\n");
    out.push('\n');
    out.push_str("    location ~ /\\.(?!well-known).* {\n");
    out.push_str("        deny all;\n");
    out.push_str("    }\n");
}

fn push_front_controller(out: &mut String, pass: &str) {
    out.push_str("    location / {\n");
    out.push_str("        try_files $uri /index.php$is_args$args;\n");
    out.push_str("    }\n");
    out.push('\n');
    out.push_str("    location ~ ^/index\\.php(/|$) {\n");
    out.push_str(&format!("        fastcgi_pass {pass};\n"));
    out.push_str("        fastcgi_split_path_info ^(.+\\.php)(/.*)$;\n");
    out.push_str("        include fastcgi_params;\n");
    out.push_str("        fastcgi_param SCRIPT_FILENAME $realpath_root$fastcgi_script_name;\n");
    out.push_str("        fastcgi_param DOCUMENT_ROOT $realpath_root;\n");
    out.push_str("        internal;\n");
    out.push_str("    }\n");
    out.push('\n');
    // Any other script is not reachable directly
    out.push_str("    location ~ \\.php$ {\n");
    out.push_str("        return 404;\n");
    out.push_str("    }\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(mode: SiteMode, web_root: &str) -> String {
        generate(&VhostParams {
            app_name: "acme",
            domain: "acme.test",
            version: RuntimeVersion::new(8, 2),
            mode,
            web_root: Path::new(web_root),
            socket: Path::new("/run/php/php8.2-fpm-acme.sock"),
            log_dir: Path::new("/var/log/nginx"),
        })
    }

    #[test]
    fn test_front_controller() {
        let text = render(SiteMode::FrontController, "/var/www/acme/current/public");

        assert!(text.contains("    server_name acme.test;\n"));
        assert!(text.contains("    root /var/www/acme/current/public;\n"));
        assert!(text.contains("fastcgi_pass unix:/run/php/php8.2-fpm-acme.sock;"));
        assert!(text.contains("location ~ ^/index\\.php(/|$) {"));
        assert!(text.contains("try_files $uri /index.php$is_args$args;"));
        assert!(text.contains("        internal;\n"));
    }

    #[test]
    fn test_front_controller_other_scripts_not_found() {
        let text = render(SiteMode::FrontController, "/var/www/acme/current/public");

        // A request for /other.php matches the generic rule, which returns 404
        assert!(text.contains("    location ~ \\.php$ {\n        return 404;\n    }\n"));
        assert_eq!(text.matches("fastcgi_pass").count(), 1);

        let front = text.find("location ~ ^/index\\.php").unwrap();
        let generic = text.find("location ~ \\.php$").unwrap();
        assert!(front < generic, "front controller must be matched first");
    }

    #[test]
    fn test_direct_root() {
        let text = render(SiteMode::DirectRoot, "/var/www/acme/public");

        assert!(text.contains("    root /var/www/acme/public;\n"));
        assert!(text.contains(concat!(
            "    location ~ \\.php$ {\n",
            "        include snippets/fastcgi-php.conf;\n",
            "        fastcgi_pass unix:/run/php/php8.2-fpm-acme.sock;\n",
        )));
        assert!(!text.contains("return 404"));
    }

    #[test]
    fn test_logs_and_header() {
        let text = render(SiteMode::DirectRoot, "/var/www/acme/public");
        assert!(text.starts_with("# Managed by appsilo: acme (PHP 8.2, direct-root)\n"));
        assert!(text.contains("access_log /var/log/nginx/acme.access.log;"));
        assert!(text.contains("error_log /var/log/nginx/acme.error.log;"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            render(SiteMode::FrontController, "/var/www/acme/current/public"),
            render(SiteMode::FrontController, "/var/www/acme/current/public")
        );
    }

    #[test]
    fn test_web_root_suffix() {
        assert_eq!(SiteMode::DirectRoot.web_root_suffix(), "public");
        assert_eq!(SiteMode::FrontController.web_root_suffix(), "current/public");
    }
}
