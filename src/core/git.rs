use git2::Repository;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::core::error::GitError;

/// A remote as configured in the local repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
    /// Set only when the remote has a push URL distinct from `url`.
    pub push_url: Option<String>,
}

impl Remote {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            push_url: None,
        }
    }
}

/// Trait defining the Git operations the factory depends on.
/// This abstraction lets tests substitute an in-memory repository.
pub trait GitClient: Send + Sync {
    /// Returns the remotes of the current repository in the order git reports them.
    fn remotes(&self) -> Result<Vec<Remote>, GitError>;

    /// Returns the short name of the branch HEAD points at.
    fn current_branch(&self) -> Result<String, GitError>;
}

/// Concrete implementation of GitClient using the git2 crate.
///
/// The repository is discovered on every call, starting from `path` and
/// walking up, so a missing repository surfaces from the operation that
/// needed it rather than at construction.
pub struct Git2Client {
    path: PathBuf,
}

impl Git2Client {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// A client rooted at the process working directory.
    pub fn from_current_dir() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    fn open(&self) -> Result<Repository, GitError> {
        Repository::discover(&self.path).map_err(|source| GitError::NotARepository {
            path: self.path.clone(),
            source,
        })
    }
}

impl GitClient for Git2Client {
    fn remotes(&self) -> Result<Vec<Remote>, GitError> {
        let repo = self.open()?;
        let names = repo.remotes()?;
        let mut remotes = Vec::with_capacity(names.len());

        for name in names.iter().flatten() {
            let remote = repo.find_remote(name)?;
            let Some((url, push_url)) = remote_urls(remote.url(), remote.pushurl()) else {
                debug!(remote = name, "skipping remote without a UTF-8 url");
                continue;
            };
            remotes.push(Remote {
                name: name.to_string(),
                url,
                push_url,
            });
        }

        trace!(count = remotes.len(), "listed git remotes");
        Ok(remotes)
    }

    fn current_branch(&self) -> Result<String, GitError> {
        let repo = self.open()?;
        // Read HEAD without peeling so an unborn branch still has a name.
        let head = repo.find_reference("HEAD")?;
        head.symbolic_target()
            .and_then(|target| target.strip_prefix("refs/heads/"))
            .map(str::to_string)
            .ok_or(GitError::DetachedHead)
    }
}

/// Fetch and push URLs of a remote. A remote configured with only a push URL
/// uses it as its fetch URL.
fn remote_urls(url: Option<&str>, push_url: Option<&str>) -> Option<(String, Option<String>)> {
    match (url, push_url) {
        (Some(url), push) => Some((
            url.to_string(),
            push.filter(|push| *push != url).map(str::to_string),
        )),
        (None, Some(push)) => Some((push.to_string(), None)),
        (None, None) => None,
    }
}
