//! PHP-FPM pool config derivation
//!
//! A new pool is derived from the stock `www.conf` by rewriting a fixed,
//! ordered set of directives. Each rule touches the first matching line
//! only: the stock file repeats these names in comments and examples, and
//! those must stay as they are.

use regex::{NoExpand, Regex};
use std::sync::LazyLock;

/// Inputs for a derived pool
#[derive(Debug, Clone)]
pub struct PoolParams<'a> {
    pub app_name: &'a str,
    pub socket_path: &'a str,
    /// Owner of the listen socket (the reverse proxy's account)
    pub listen_owner: &'a str,
    pub listen_group: &'a str,
}

/// The directives rewritten, in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Header,
    User,
    Group,
    Listen,
}

const RULES: [Rule; 4] = [Rule::Header, Rule::User, Rule::Group, Rule::Listen];

static HEADER: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^\[www\][ \t]*$"));
static USER: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^user[ \t]*=[ \t]*www-data[ \t]*$"));
static GROUP: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^group[ \t]*=[ \t]*www-data[ \t]*$"));
// `listen` followed directly by `=`, so `listen.owner` and friends never match
static LISTEN: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^listen[ \t]*=.*$"));
static LISTEN_OWNER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^[ \t]*listen\.owner[ \t]*="));
static LISTEN_GROUP: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^[ \t]*listen\.group[ \t]*="));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pool pattern is valid")
}

impl Rule {
    fn pattern(self) -> &'static Regex {
        match self {
            Self::Header => &*HEADER,
            Self::User => &*USER,
            Self::Group => &*GROUP,
            Self::Listen => &*LISTEN,
        }
    }

    fn replacement(self, params: &PoolParams) -> String {
        match self {
            Self::Header => format!("[{}]", params.app_name),
            Self::User => format!("user = {}", params.app_name),
            Self::Group => format!("group = {}", params.app_name),
            Self::Listen => format!("listen = {}", params.socket_path),
        }
    }
}

/// Derive a pool config from `template`
///
/// Rules without a match are left out silently. Afterwards, active
/// `listen.owner` / `listen.group` directives are appended when the text
/// has none (commented-out ones don't count).
pub fn rewrite_with(template: &str, params: &PoolParams) -> String {
    let mut text = template.to_string();

    for rule in RULES {
        let replacement = rule.replacement(params);
        let rewritten = rule.pattern().replace(&text, NoExpand(&replacement));
        if rewritten == text.as_str() {
            log::debug!("Pool rule {rule:?} matched nothing");
        }
        text = rewritten.into_owned();
    }

    ensure_listen_ownership(&text, params)
}

/// Append missing `listen.owner` / `listen.group` directives
///
/// Idempotent: running it on its own output changes nothing.
pub fn ensure_listen_ownership(text: &str, params: &PoolParams) -> String {
    let mut out = text.to_string();

    for (pattern, key, value) in [
        (&*LISTEN_OWNER, "listen.owner", params.listen_owner),
        (&*LISTEN_GROUP, "listen.group", params.listen_group),
    ] {
        if pattern.is_match(&out) {
            continue;
        }
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&format!("{key} = {value}\n"));
    }

    out
}
