use std::io::IsTerminal;

/// Terminal capabilities of the process's standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoStreams {
    stdout_tty: bool,
    stderr_tty: bool,
    color_enabled: bool,
}

impl IoStreams {
    /// Inspects the real standard streams. Color is on when stdout is a
    /// terminal and `NO_COLOR` is unset.
    pub fn system() -> Self {
        let stdout_tty = std::io::stdout().is_terminal();
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            stdout_tty,
            stderr_tty: std::io::stderr().is_terminal(),
            color_enabled: stdout_tty && !no_color,
        }
    }

    /// Streams that are not attached to a terminal, as in tests and pipes.
    pub fn detached() -> Self {
        Self {
            stdout_tty: false,
            stderr_tty: false,
            color_enabled: false,
        }
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color_enabled = enabled;
        self
    }

    pub fn is_stdout_tty(&self) -> bool {
        self.stdout_tty
    }

    pub fn is_stderr_tty(&self) -> bool {
        self.stderr_tty
    }

    pub fn color_enabled(&self) -> bool {
        self.color_enabled
    }
}
