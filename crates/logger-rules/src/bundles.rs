//! Named rule bundles and the process-wide default rules.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::{NoExpand, Regex};

/// Rules for local debugging: plain http destinations and every session field.
pub const DEBUG_RULES: &str = "allow_http_url\ncopy_session_field /.*/\n";

/// Rules that drop cookies and mask email addresses and long digit runs.
pub const STANDARD_RULES: &str = concat!(
    "/request_header:cookie|response_header:set-cookie/ remove\n",
    r"/(request|response)_body|request_param/ replace /[a-zA-Z0-9.!#$%&’*+\/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)/, /x@y.com/",
    "\n",
    r"/request_body|request_param|response_body/ replace /[0-9\.\-\/]{9,}/, /xyxy/",
    "\n",
);

/// Rules that keep only the URL path and a small set of headers.
pub const STRICT_RULES: &str = concat!(
    r"/request_url/ replace /([^\?;]+).*/, !\1!",
    "\n",
    r"/request_body|response_body|request_param:.*|request_header:(?!user-agent).*|response_header:(?!(content-length)|(content-type)).*/ remove",
    "\n",
);

static INCLUDE_DEBUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*include debug\s*$").unwrap());

static INCLUDE_STANDARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*include standard\s*$").unwrap());

static INCLUDE_STRICT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*include strict\s*$").unwrap());

pub(crate) static INCLUDE_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*include default\s*$").unwrap());

static DEFAULT_RULES: Lazy<RwLock<String>> = Lazy::new(|| RwLock::new(STRICT_RULES.to_string()));

/// Rule text used by loggers that are not given rules of their own.
pub fn default_rules() -> String {
    DEFAULT_RULES.read().clone()
}

/// Replace the default rules.
///
/// `include default` lines are stripped so the default can never refer to
/// itself.
pub fn set_default_rules(rules: &str) {
    let normalized = INCLUDE_DEFAULT.replace_all(rules, "").into_owned();
    *DEFAULT_RULES.write() = normalized;
}

/// Substitute `include debug`, `include standard` and `include strict` lines
/// with the bundle text.
pub fn expand_bundles(rules: &str) -> String {
    let rules = INCLUDE_DEBUG.replace_all(rules, NoExpand(DEBUG_RULES));
    let rules = INCLUDE_STANDARD.replace_all(&rules, NoExpand(STANDARD_RULES));
    INCLUDE_STRICT
        .replace_all(&rules, NoExpand(STRICT_RULES))
        .into_owned()
}
