use std::error::Error as _;

use crate::core::error::Error;
use crate::core::factory::Factory;

pub mod logging;

/// Prints what every accessor of the factory resolves to.
pub fn print_context(factory: &Factory) {
    print!("{}", render_context(factory));
}

/// Renders each accessor on its own line. Failures are shown with their
/// cause chain instead of stopping the report.
pub fn render_context(factory: &Factory) -> String {
    let mut lines = vec![format!("executable: {}", factory.executable().display())];

    let override_line = match factory.host_override() {
        "" => "(none)",
        host => host,
    };
    lines.push(format!("host override: {override_line}"));

    let hosts = match factory.config() {
        Ok(config) if config.hosts().is_empty() => "(none)".to_string(),
        Ok(config) => config.hosts().join(", "),
        Err(err) => error_chain(&err),
    };
    lines.push(format!("hosts: {hosts}"));

    match factory.remotes() {
        Ok(remotes) => {
            lines.push(format!("remotes: {}", remotes.len()));
            lines.extend(
                remotes
                    .iter()
                    .map(|repo| format!("  {} -> {} ({})", repo.remote, repo, repo.protocol)),
            );
        }
        Err(err) => lines.push(format!("remotes: {}", error_chain(&err))),
    }

    let base = match factory.base_repo() {
        Ok(repo) => repo.to_string(),
        Err(err) => error_chain(&err),
    };
    lines.push(format!("base repository: {base}"));

    let branch = match factory.branch() {
        Ok(branch) => branch.to_string(),
        Err(err) => error_chain(&err),
    };
    lines.push(format!("branch: {branch}"));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Joins an error and its sources: `outer: inner: root`.
pub fn error_chain(err: &Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
