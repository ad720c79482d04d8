//! Host rewriting for extender URL prefixes
//!
//! Each node rewrites the host segment of every `urlPrefix` to its own IP so
//! the scheduler reaches the extender running locally. Scheme and port are
//! never touched.

use regex::Regex;
use std::sync::OnceLock;

fn host_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // scheme://host:port, host may not contain '/' or ':'
        Regex::new(r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.-]*://)(?P<host>[^/:]+)(?P<rest>:\d.*)$")
            .expect("host pattern is valid")
    })
}

/// Rewrite the host segment of `url` to `ip`.
///
/// A URL without a recognizable `scheme://host:port` shape is returned
/// unchanged; foreign entries may legitimately carry such values.
pub fn rewrite_host(url: &str, ip: &str) -> String {
    match host_pattern().captures(url) {
        Some(caps) => format!("{}{}{}", &caps["scheme"], ip, &caps["rest"]),
        None => url.to_string(),
    }
}
