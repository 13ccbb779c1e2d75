use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::builders::browser::Browser;
use crate::builders::http::{ClientFactory, HttpClient};
use crate::builders::io::IoStreams;
use crate::core::config::{Config, ConfigManager, ConfigProvider, ConfigResolver, EnvOverlay};
use crate::core::error::{Error, Result};
use crate::core::git::{Git2Client, GitClient};
use crate::core::instance::{self, DEFAULT_HOST};
use crate::core::memo::Memo;
use crate::core::remote::{RemoteResolver, ResolvedRepository};

/// Executable name reported when the running binary cannot be located.
pub const DEFAULT_EXECUTABLE: &str = "gh";

/// Shared runtime context for commands.
///
/// Every accessor resolves its dependencies on first use and caches the
/// outcome, value or error, for the lifetime of the factory.
pub struct Factory {
    io: IoStreams,
    app_version: String,
    config: ConfigResolver,
    git: Box<dyn GitClient>,
    host_override: String,
    executable: PathBuf,
    browser: Browser,
    remotes: Memo<Vec<ResolvedRepository>>,
    http_client: Memo<HttpClient>,
    branch: Memo<String>,
}

impl Factory {
    /// A factory wired to the real process environment: the configuration
    /// file, the repository around the working directory and `GH_HOST`.
    pub fn new(app_version: &str) -> Self {
        FactoryBuilder::new(app_version).build()
    }

    pub fn builder(app_version: &str) -> FactoryBuilder {
        FactoryBuilder::new(app_version)
    }

    pub fn io(&self) -> &IoStreams {
        &self.io
    }

    pub fn config(&self) -> Result<&Config> {
        self.config.resolve()
    }

    /// Resolved repositories for the local remotes, most preferred first.
    pub fn remotes(&self) -> Result<&[ResolvedRepository]> {
        self.remotes
            .get_or_resolve(|| {
                RemoteResolver::new(self.git.as_ref(), &self.config).resolve(&self.host_override)
            })
            .map(Vec::as_slice)
    }

    /// A client bound to the resolved configuration. A configuration error
    /// is returned as-is without building anything.
    pub fn http_client(&self) -> Result<&HttpClient> {
        self.http_client.get_or_resolve(|| {
            let config = self.config()?;
            Ok(ClientFactory::build(
                &self.io,
                config.clone(),
                &self.app_version,
                true,
            ))
        })
    }

    /// The repository commands act on by default: the first resolved remote.
    pub fn base_repo(&self) -> Result<&ResolvedRepository> {
        self.remotes()?.first().ok_or(Error::NoRepository)
    }

    pub fn branch(&self) -> Result<&str> {
        self.branch
            .get_or_resolve(|| {
                let branch = self
                    .git
                    .current_branch()
                    .map_err(|err| Error::Branch(Arc::new(err)))?;
                debug!(%branch, "resolved current branch");
                Ok(branch)
            })
            .map(String::as_str)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Empty unless `GH_HOST` names a host other than the default.
    pub fn host_override(&self) -> &str {
        &self.host_override
    }
}

/// Assembles a [`Factory`], defaulting every collaborator to the real one.
pub struct FactoryBuilder {
    app_version: String,
    io: Option<IoStreams>,
    config_provider: Option<Box<dyn ConfigProvider>>,
    env: Option<EnvOverlay>,
    git: Option<Box<dyn GitClient>>,
    overridable_host: Option<String>,
    executable: Option<std::io::Result<PathBuf>>,
    browser: Option<Browser>,
}

impl FactoryBuilder {
    pub fn new(app_version: &str) -> Self {
        Self {
            app_version: app_version.to_string(),
            io: None,
            config_provider: None,
            env: None,
            git: None,
            overridable_host: None,
            executable: None,
            browser: None,
        }
    }

    pub fn io(mut self, io: IoStreams) -> Self {
        self.io = Some(io);
        self
    }

    pub fn config_provider(mut self, provider: impl ConfigProvider + 'static) -> Self {
        self.config_provider = Some(Box::new(provider));
        self
    }

    pub fn env(mut self, env: EnvOverlay) -> Self {
        self.env = Some(env);
        self
    }

    pub fn git_client(mut self, git: impl GitClient + 'static) -> Self {
        self.git = Some(Box::new(git));
        self
    }

    /// Stands in for `GH_HOST`.
    pub fn overridable_host(mut self, host: impl Into<String>) -> Self {
        self.overridable_host = Some(host.into());
        self
    }

    /// Stands in for the process introspection result.
    pub fn current_exe(mut self, exe: std::io::Result<PathBuf>) -> Self {
        self.executable = Some(exe);
        self
    }

    pub fn browser(mut self, browser: Browser) -> Self {
        self.browser = Some(browser);
        self
    }

    pub fn build(self) -> Factory {
        let overridable = self
            .overridable_host
            .unwrap_or_else(instance::overridable_default);
        let host_override = instance::host_override(DEFAULT_HOST, &overridable);
        if !host_override.is_empty() {
            debug!(%host_override, "default host overridden");
        }

        let provider = self
            .config_provider
            .unwrap_or_else(|| Box::new(ConfigManager::new()));
        let env = self.env.unwrap_or_else(EnvOverlay::from_env);

        Factory {
            io: self.io.unwrap_or_else(IoStreams::system),
            app_version: self.app_version,
            config: ConfigResolver::new(provider, env),
            git: self
                .git
                .unwrap_or_else(|| Box::new(Git2Client::from_current_dir())),
            host_override,
            executable: executable_or_default(
                self.executable.unwrap_or_else(std::env::current_exe),
            ),
            browser: self.browser.unwrap_or_else(Browser::from_env),
            remotes: Memo::new(),
            http_client: Memo::new(),
            branch: Memo::new(),
        }
    }
}

fn executable_or_default(exe: std::io::Result<PathBuf>) -> PathBuf {
    exe.unwrap_or_else(|err| {
        debug!("cannot locate own executable: {err}");
        PathBuf::from(DEFAULT_EXECUTABLE)
    })
}
