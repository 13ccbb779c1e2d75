use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::core::config::{ConfigResolver, GitProtocol};
use crate::core::error::Result;
use crate::core::git::{GitClient, Remote};
use crate::core::instance::{self, DEFAULT_HOST};

/// `user@host:owner/repo`: the scp-like syntax git accepts for ssh remotes.
static SCP_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^@/:]+@)?(?P<host>[^@/:]+):(?P<path>[^/].*)$").expect("valid regex")
});

/// A remote URL reduced to the parts the resolver cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    pub host: String,
    pub owner: String,
    pub name: String,
    pub protocol: GitProtocol,
}

/// Classifies a remote URL.
///
/// Accepts scp-like addresses and `ssh`, `git+ssh`, `git`, `http` and `https`
/// URLs whose path is exactly `owner/name` (an optional `.git` suffix and
/// surrounding slashes are ignored). Returns `None` for anything else, local
/// paths and `file://` URLs included.
pub fn classify_url(raw: &str) -> Option<RepoLocation> {
    let raw = raw.trim();
    let (host, path, protocol) = if !raw.contains("://")
        && let Some(caps) = SCP_LIKE.captures(raw)
    {
        (
            caps["host"].to_string(),
            caps["path"].to_string(),
            GitProtocol::Ssh,
        )
    } else {
        let url = Url::parse(raw).ok()?;
        let protocol = match url.scheme() {
            "ssh" | "git+ssh" => GitProtocol::Ssh,
            "http" | "https" => GitProtocol::Https,
            "git" => GitProtocol::Git,
            _ => return None,
        };
        (url.host_str()?.to_string(), url.path().to_string(), protocol)
    };

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, name) = path.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }

    Some(RepoLocation {
        host: instance::normalize_hostname(&host),
        owner: owner.to_string(),
        name: name.to_string(),
        protocol,
    })
}

/// A repository handle derived from one local remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRepository {
    /// Name of the git remote this repository was derived from.
    pub remote: String,
    pub host: String,
    pub owner: String,
    pub name: String,
    /// Transport of the remote URL.
    pub protocol: GitProtocol,
    /// Transport the configuration prefers for this host.
    pub preferred_protocol: GitProtocol,
}

impl ResolvedRepository {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn is_enterprise(&self) -> bool {
        instance::is_enterprise(&self.host)
    }
}

impl fmt::Display for ResolvedRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host == DEFAULT_HOST {
            write!(f, "{}/{}", self.owner, self.name)
        } else {
            write!(f, "{}/{}/{}", self.host, self.owner, self.name)
        }
    }
}

/// Turns the local remotes into resolved repositories.
///
/// Stateless: every call lists remotes and reads configuration again.
/// Callers that need repeated access cache the result themselves.
pub struct RemoteResolver<'a> {
    git: &'a dyn GitClient,
    config: &'a ConfigResolver,
}

impl<'a> RemoteResolver<'a> {
    pub fn new(git: &'a dyn GitClient, config: &'a ConfigResolver) -> Self {
        Self { git, config }
    }

    /// Resolves remotes in the order git reports them.
    ///
    /// Remotes whose URLs cannot be classified are dropped. A non-empty
    /// `host_override` replaces the host of every surviving remote. An empty
    /// result is not an error here.
    pub fn resolve(&self, host_override: &str) -> Result<Vec<ResolvedRepository>> {
        let remotes = self.git.remotes()?;
        let config = self.config.resolve()?;

        let resolved: Vec<ResolvedRepository> = remotes
            .iter()
            .filter_map(|remote| {
                let Some(location) = locate(remote) else {
                    debug!(remote = %remote.name, url = %remote.url, "discarding unrecognized remote");
                    return None;
                };
                let host = if host_override.is_empty() {
                    location.host
                } else {
                    host_override.to_string()
                };
                Some(ResolvedRepository {
                    remote: remote.name.clone(),
                    preferred_protocol: config.git_protocol(&host),
                    host,
                    owner: location.owner,
                    name: location.name,
                    protocol: location.protocol,
                })
            })
            .collect();

        debug!(
            listed = remotes.len(),
            resolved = resolved.len(),
            "resolved git remotes"
        );
        Ok(resolved)
    }
}

fn locate(remote: &Remote) -> Option<RepoLocation> {
    classify_url(&remote.url).or_else(|| remote.push_url.as_deref().and_then(classify_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(host: &str, owner: &str, name: &str, protocol: GitProtocol) -> RepoLocation {
        RepoLocation {
            host: host.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
            protocol,
        }
    }

    #[test]
    fn test_classify_scp_like() {
        assert_eq!(
            classify_url("git@github.com:owner/repo.git"),
            Some(location("github.com", "owner", "repo", GitProtocol::Ssh))
        );
        assert_eq!(
            classify_url("git@hostA:owner/repo"),
            Some(location("hosta", "owner", "repo", GitProtocol::Ssh))
        );
        assert_eq!(
            classify_url("ghe.corp.net:team/tool"),
            Some(location("ghe.corp.net", "team", "tool", GitProtocol::Ssh))
        );
    }

    #[test]
    fn test_classify_scheme_urls() {
        assert_eq!(
            classify_url("https://www.github.com/owner/repo/"),
            Some(location("github.com", "owner", "repo", GitProtocol::Https))
        );
        assert_eq!(
            classify_url("ssh://git@ssh.github.com:443/owner/repo.git"),
            Some(location("github.com", "owner", "repo", GitProtocol::Ssh))
        );
        assert_eq!(
            classify_url("git://example.org/owner/repo"),
            Some(location("example.org", "owner", "repo", GitProtocol::Git))
        );
    }

    #[test]
    fn test_classify_rejects_unknown_shapes() {
        assert_eq!(classify_url("/srv/git/repo.git"), None);
        assert_eq!(classify_url("file:///srv/git/owner/repo.git"), None);
        assert_eq!(classify_url("https://gitlab.com/group/sub/repo"), None);
        assert_eq!(classify_url("https://github.com/owner"), None);
        assert_eq!(classify_url("C:/repos/owner/repo"), None);
    }

    #[test]
    fn test_push_url_used_when_fetch_url_unrecognized() {
        let remote = Remote {
            name: "origin".to_string(),
            url: "/mirror/repo.git".to_string(),
            push_url: Some("git@github.com:owner/repo.git".to_string()),
        };
        assert_eq!(
            locate(&remote),
            Some(location("github.com", "owner", "repo", GitProtocol::Ssh))
        );
    }

    #[test]
    fn test_display_includes_host_for_enterprise() {
        let repo = ResolvedRepository {
            remote: "origin".to_string(),
            host: "ghe.corp.net".to_string(),
            owner: "team".to_string(),
            name: "tool".to_string(),
            protocol: GitProtocol::Https,
            preferred_protocol: GitProtocol::Https,
        };
        assert_eq!(repo.to_string(), "ghe.corp.net/team/tool");
        assert_eq!(repo.full_name(), "team/tool");
        assert!(repo.is_enterprise());
    }
}
