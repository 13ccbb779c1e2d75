use std::process::Command;
use tracing::debug;

/// Environment variable naming the program used to open URLs.
pub const BROWSER_ENV: &str = "BROWSER";

/// Opens URLs with the launcher named by `BROWSER`, or the platform opener
/// when it is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Browser {
    launcher: Option<String>,
}

impl Browser {
    pub fn new(launcher: Option<String>) -> Self {
        Self {
            launcher: launcher.filter(|l| !l.trim().is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(BROWSER_ENV).ok())
    }

    pub fn launcher(&self) -> Option<&str> {
        self.launcher.as_deref()
    }

    /// The command that would open `url`. The launcher may carry its own
    /// arguments (`firefox --new-window`); the URL is appended last. Without
    /// a launcher this is the first platform opener `open` would try.
    pub fn command_for(&self, url: &str) -> Option<Command> {
        match self.launcher.as_deref() {
            Some(launcher) => {
                let mut parts = launcher.split_whitespace();
                let mut command = Command::new(parts.next()?);
                command.args(parts).arg(url);
                Some(command)
            }
            None => open::commands(url).into_iter().next(),
        }
    }

    /// Opens `url` and waits for the launcher. A launcher exiting with a
    /// failure status is an error.
    pub fn browse(&self, url: &str) -> std::io::Result<()> {
        let Some(launcher) = self.launcher.as_deref() else {
            debug!("opening browser with the platform opener");
            return open::that(url);
        };
        let mut command = self
            .command_for(url)
            .ok_or_else(|| std::io::Error::other("empty browser launcher"))?;
        debug!(launcher, "opening browser");
        let status = command.status()?;
        if !status.success() {
            return Err(std::io::Error::other(format!(
                "{launcher} exited with {status}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_with_arguments() {
        let browser = Browser::new(Some("firefox --new-window".to_string()));
        let command = browser.command_for("https://github.com/owner/repo").unwrap();

        assert_eq!(command.get_program(), "firefox");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, ["--new-window", "https://github.com/owner/repo"]);
    }

    #[test]
    fn test_blank_launcher_falls_back_to_platform() {
        let browser = Browser::new(Some("   ".to_string()));
        assert_eq!(browser.launcher(), None);

        let command = browser.command_for("https://github.com").unwrap();
        let last = command.get_args().last().unwrap();
        assert_eq!(last, "https://github.com");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_launcher_is_an_error() {
        let browser = Browser::new(Some("false".to_string()));
        let err = browser.browse("https://github.com").unwrap_err();
        assert!(err.to_string().starts_with("false exited with"));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_launcher() {
        let browser = Browser::new(Some("true".to_string()));
        assert!(browser.browse("https://github.com").is_ok());
    }
}
