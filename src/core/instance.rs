//! Hosting instance helpers: the default host, the environment override and
//! the hostname rules shared by remote classification and authentication.

/// The host every command targets unless told otherwise.
pub const DEFAULT_HOST: &str = "github.com";

/// Environment variable that replaces the default host.
pub const HOST_ENV: &str = "GH_HOST";

/// The default host, as overridden by `GH_HOST` when that is set and non-empty.
pub fn overridable_default() -> String {
    match std::env::var(HOST_ENV) {
        Ok(host) if !host.trim().is_empty() => host.trim().to_string(),
        _ => DEFAULT_HOST.to_string(),
    }
}

/// Computes the host override from the fixed default and the overridable one.
///
/// Returns an empty string when the two name the same host (ignoring case),
/// otherwise the overridable value exactly as given.
pub fn host_override(default: &str, overridable: &str) -> String {
    if default.eq_ignore_ascii_case(overridable) {
        String::new()
    } else {
        overridable.to_string()
    }
}

/// Lower-cases a hostname and folds aliases of the default host into it.
///
/// `www.github.com`, `ssh.github.com` and `api.github.com` all normalize to
/// `github.com`; other hosts only lose a leading `www.`.
pub fn normalize_hostname(host: &str) -> String {
    let host = host.trim().to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.ends_with(&format!(".{DEFAULT_HOST}")) {
        return DEFAULT_HOST.to_string();
    }
    host.to_string()
}

pub fn is_enterprise(host: &str) -> bool {
    normalize_hostname(host) != DEFAULT_HOST
}

/// Base URL of the REST API for a host.
pub fn rest_prefix(host: &str) -> String {
    if is_enterprise(host) {
        format!("https://{}/api/v3/", normalize_hostname(host))
    } else {
        "https://api.github.com/".to_string()
    }
}
