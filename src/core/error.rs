use std::path::PathBuf;
use std::sync::Arc;

/// Result type returned by the factory accessors.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the configuration store.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No persisted configuration exists. The resolver turns this into the
    /// blank configuration instead of surfacing it.
    #[error("configuration file not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("could not locate a configuration directory; set GH_CONFIG_DIR")]
    NoConfigDir,

    #[error("failed to read configuration file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::NotFound { .. })
    }
}

/// Failures of the VCS collaborator.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("not a git repository (or any of the parent directories): {}", path.display())]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("HEAD is detached; not on any branch")]
    DetachedHead,

    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

/// Error returned by the factory accessors.
///
/// Every variant is cheap to clone so a memoized failure can be handed out on
/// each call without re-running the work that produced it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(Arc<ConfigError>),

    #[error(transparent)]
    Git(Arc<GitError>),

    #[error("could not determine current branch")]
    Branch(#[source] Arc<GitError>),

    /// No remote survived classification, so there is no base repository.
    #[error("none of the git remotes configured for this repository point to a known host")]
    NoRepository,

    #[error("failed to initialize HTTP client")]
    HttpClient(#[source] Arc<reqwest::Error>),

    #[error("invalid request URL")]
    InvalidUrl(#[source] url::ParseError),

    #[error("token configured for {host} is not a valid header value")]
    InvalidToken { host: String },
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(Arc::new(err))
    }
}

impl From<GitError> for Error {
    fn from(err: GitError) -> Self {
        Error::Git(Arc::new(err))
    }
}
