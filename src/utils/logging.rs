//! Process-level tracing output for the binary.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log level.
pub const LOG_ENV: &str = "GH_DEBUG";

static INIT: OnceLock<()> = OnceLock::new();

/// Maps a `GH_DEBUG` value to a filter directive. Unknown values, and the
/// truthy `1`/`true`, fall back to sensible levels.
fn parse_level(value: Option<&str>) -> &'static str {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("trace") => "trace",
        Some("debug" | "1" | "true" | "api") => "debug",
        Some("info") => "info",
        Some("error") => "error",
        _ => "warn",
    }
}

/// Installs a stderr subscriber once per process. Later calls are no-ops.
pub fn init() {
    if INIT.get().is_some() {
        return;
    }
    let level = parse_level(std::env::var(LOG_ENV).ok().as_deref());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    let _ = INIT.set(());
}
