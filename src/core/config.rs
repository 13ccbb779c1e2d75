use serde::Deserialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, trace};

use crate::core::error::{ConfigError, Result};
use crate::core::instance::{self, DEFAULT_HOST};
use crate::core::memo::Memo;

/// Environment variable pointing at the directory holding `config.toml`.
pub const CONFIG_DIR_ENV: &str = "GH_CONFIG_DIR";
const CONFIG_FILE: &str = "config.toml";

/// The transport a host prefers for git operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitProtocol {
    #[default]
    Https,
    Ssh,
    Git,
}

impl fmt::Display for GitProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitProtocol::Https => write!(f, "https"),
            GitProtocol::Ssh => write!(f, "ssh"),
            GitProtocol::Git => write!(f, "git"),
        }
    }
}

/// Settings scoped to one host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    pub user: Option<String>,
    pub oauth_token: Option<String>,
    pub git_protocol: Option<GitProtocol>,
}

/// Where a resolved token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Environment(&'static str),
    ConfigFile,
}

/// Process configuration: a mapping of host to host settings plus the
/// environment overlay applied on top of it.
///
/// A value is either fully parsed from disk or [`Config::blank`]; it is never
/// mutated after the resolver caches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub git_protocol: Option<GitProtocol>,
    #[serde(default)]
    hosts: BTreeMap<String, HostConfig>,
    #[serde(skip)]
    env: EnvOverlay,
}

/// Re-keys host entries by normalized hostname, since they are matched
/// against normalized remote hosts. When several keys fold into one host, an
/// entry already spelled in normalized form wins; otherwise the first key in
/// sorted order does.
fn normalize_hosts(hosts: BTreeMap<String, HostConfig>) -> BTreeMap<String, HostConfig> {
    let mut normalized: BTreeMap<String, (String, HostConfig)> = BTreeMap::new();
    for (key, settings) in hosts {
        let host = instance::normalize_hostname(&key);
        match normalized.entry(host) {
            Entry::Vacant(slot) => {
                slot.insert((key, settings));
            }
            Entry::Occupied(mut slot) => {
                let canonical = slot.key() == &key;
                let dropped = if canonical { &slot.get().0 } else { &key };
                debug!(host = %slot.key(), %dropped, "host keys collide after normalization");
                if canonical {
                    slot.insert((key, settings));
                }
            }
        }
    }
    normalized
        .into_iter()
        .map(|(host, (_, settings))| (host, settings))
        .collect()
}

impl Config {
    /// The configuration used when nothing is persisted.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let Config {
            git_protocol,
            hosts,
            env,
        } = toml::from_str(content)?;
        Ok(Self {
            git_protocol,
            hosts: normalize_hosts(hosts),
            env,
        })
    }

    /// Applies environment overrides. Tokens from the environment take
    /// precedence over the ones read from the file.
    pub fn inherit_env(mut self, env: EnvOverlay) -> Self {
        self.env = env;
        self
    }

    pub fn with_host(mut self, host: &str, settings: HostConfig) -> Self {
        self.hosts.insert(instance::normalize_hostname(host), settings);
        self
    }

    /// Hosts with settings, including the default host when the environment
    /// carries a token for it.
    pub fn hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self.hosts.keys().cloned().collect();
        if self.env.github_token.is_some() && !self.hosts.contains_key(DEFAULT_HOST) {
            hosts.insert(0, DEFAULT_HOST.to_string());
        }
        hosts
    }

    pub fn host(&self, host: &str) -> Option<&HostConfig> {
        self.hosts.get(&instance::normalize_hostname(host))
    }

    pub fn auth_token(&self, host: &str) -> Option<(&str, TokenSource)> {
        let host = instance::normalize_hostname(host);
        if let Some((var, token)) = self.env.token_for(&host) {
            return Some((token, TokenSource::Environment(var)));
        }
        self.hosts
            .get(&host)
            .and_then(|settings| settings.oauth_token.as_deref())
            .map(|token| (token, TokenSource::ConfigFile))
    }

    /// Protocol preference for a host: the host entry, then the top-level
    /// setting, then https.
    pub fn git_protocol(&self, host: &str) -> GitProtocol {
        self.host(host)
            .and_then(|settings| settings.git_protocol)
            .or(self.git_protocol)
            .unwrap_or_default()
    }
}

/// Credentials supplied through environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
    github_token: Option<(&'static str, String)>,
    enterprise_token: Option<(&'static str, String)>,
}

impl EnvOverlay {
    const GITHUB_TOKEN_VARS: [&'static str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];
    const ENTERPRISE_TOKEN_VARS: [&'static str; 2] =
        ["GH_ENTERPRISE_TOKEN", "GITHUB_ENTERPRISE_TOKEN"];

    pub fn from_env() -> Self {
        Self {
            github_token: first_set(&Self::GITHUB_TOKEN_VARS),
            enterprise_token: first_set(&Self::ENTERPRISE_TOKEN_VARS),
        }
    }

    pub fn with_github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some((Self::GITHUB_TOKEN_VARS[0], token.into()));
        self
    }

    pub fn with_enterprise_token(mut self, token: impl Into<String>) -> Self {
        self.enterprise_token = Some((Self::ENTERPRISE_TOKEN_VARS[0], token.into()));
        self
    }

    fn token_for(&self, normalized_host: &str) -> Option<(&'static str, &str)> {
        let entry = if normalized_host == DEFAULT_HOST {
            &self.github_token
        } else {
            &self.enterprise_token
        };
        entry.as_ref().map(|(var, token)| (*var, token.as_str()))
    }
}

fn first_set(vars: &[&'static str]) -> Option<(&'static str, String)> {
    vars.iter().find_map(|var| match std::env::var(var) {
        Ok(value) if !value.is_empty() => Some((*var, value)),
        _ => None,
    })
}

/// Read access to the persisted configuration.
pub trait ConfigProvider: Send + Sync {
    /// Loads the configuration, failing with [`ConfigError::NotFound`] when
    /// nothing is persisted.
    fn load_config(&self) -> std::result::Result<Config, ConfigError>;
    fn get_config_path(&self) -> std::result::Result<PathBuf, ConfigError>;
}

/// Reads `config.toml` from `$GH_CONFIG_DIR` or the platform config directory.
pub struct ConfigManager {
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    pub fn new() -> Self {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
            _ => dirs::config_dir().map(|dir| dir.join("gh")),
        };
        Self {
            config_path: config_dir.map(|dir| dir.join(CONFIG_FILE)),
        }
    }

    pub fn new_at(config_path: PathBuf) -> Self {
        Self {
            config_path: Some(config_path),
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigProvider for ConfigManager {
    fn load_config(&self) -> std::result::Result<Config, ConfigError> {
        let path = self.get_config_path()?;
        let content = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ConfigError::NotFound { path: path.clone() }
            } else {
                ConfigError::Read {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        Config::parse(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    fn get_config_path(&self) -> std::result::Result<PathBuf, ConfigError> {
        self.config_path.clone().ok_or(ConfigError::NoConfigDir)
    }
}

/// Loads the configuration on first use and caches the outcome, success or
/// failure, for the lifetime of the resolver.
pub struct ConfigResolver {
    provider: Box<dyn ConfigProvider>,
    env: EnvOverlay,
    cached: Memo<Config>,
}

impl ConfigResolver {
    pub fn new(provider: Box<dyn ConfigProvider>, env: EnvOverlay) -> Self {
        Self {
            provider,
            env,
            cached: Memo::new(),
        }
    }

    pub fn resolve(&self) -> Result<&Config> {
        self.cached.get_or_resolve(|| {
            let config = match self.provider.load_config() {
                Ok(config) => {
                    debug!(hosts = config.hosts.len(), "loaded configuration");
                    config
                }
                Err(err) if err.is_not_found() => {
                    debug!("{err}; using blank configuration");
                    Config::blank()
                }
                Err(err) => return Err(err.into()),
            };
            trace!("applying environment overrides");
            Ok(config.inherit_env(self.env.clone()))
        })
    }

    pub fn is_resolved(&self) -> bool {
        self.cached.is_resolved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const SAMPLE: &str = r#"
git_protocol = "ssh"

[hosts."github.com"]
user = "monalisa"
oauth_token = "file-token"

[hosts."GHE.Corp.net"]
oauth_token = "ghe-token"
git_protocol = "https"
"#;

    type Outcome = fn() -> std::result::Result<Config, ConfigError>;

    fn sample() -> std::result::Result<Config, ConfigError> {
        Ok(Config::parse(SAMPLE).unwrap())
    }

    fn blank() -> std::result::Result<Config, ConfigError> {
        Ok(Config::blank())
    }

    fn missing() -> std::result::Result<Config, ConfigError> {
        Err(ConfigError::NotFound {
            path: PathBuf::from("/missing/config.toml"),
        })
    }

    fn no_dir() -> std::result::Result<Config, ConfigError> {
        Err(ConfigError::NoConfigDir)
    }

    /// Serves a fixed sequence of outcomes, one per call.
    struct ScriptedProvider {
        calls: Arc<AtomicUsize>,
        outcomes: Vec<Outcome>,
    }

    impl ConfigProvider for ScriptedProvider {
        fn load_config(&self) -> std::result::Result<Config, ConfigError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcomes[call.min(self.outcomes.len() - 1)])()
        }

        fn get_config_path(&self) -> std::result::Result<PathBuf, ConfigError> {
            Ok(PathBuf::from("/scripted/config.toml"))
        }
    }

    fn resolver_with(outcomes: Vec<Outcome>) -> (ConfigResolver, Arc<AtomicUsize>) {
        resolver_with_env(outcomes, EnvOverlay::default())
    }

    fn resolver_with_env(
        outcomes: Vec<Outcome>,
        env: EnvOverlay,
    ) -> (ConfigResolver, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = ScriptedProvider {
            calls: Arc::clone(&calls),
            outcomes,
        };
        (ConfigResolver::new(Box::new(provider), env), calls)
    }

    #[test]
    fn test_parse_sample() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.hosts(), vec!["ghe.corp.net", "github.com"]);
        assert_eq!(
            config.auth_token("github.com"),
            Some(("file-token", TokenSource::ConfigFile))
        );
        assert_eq!(config.git_protocol("github.com"), GitProtocol::Ssh);
        assert_eq!(config.git_protocol("ghe.corp.net"), GitProtocol::Https);
        assert_eq!(config.host("github.com").unwrap().user.as_deref(), Some("monalisa"));
    }

    #[test]
    fn test_env_tokens_take_precedence() {
        let env = EnvOverlay::default()
            .with_github_token("env-token")
            .with_enterprise_token("env-ghe");
        let config = Config::parse(SAMPLE).unwrap().inherit_env(env);

        assert_eq!(
            config.auth_token("api.github.com"),
            Some(("env-token", TokenSource::Environment("GH_TOKEN")))
        );
        assert_eq!(
            config.auth_token("ghe.corp.net"),
            Some(("env-ghe", TokenSource::Environment("GH_ENTERPRISE_TOKEN")))
        );
    }

    #[test]
    fn test_colliding_host_keys_prefer_normalized_spelling() {
        let config = Config::parse(
            r#"
[hosts."API.github.com"]
oauth_token = "api-token"

[hosts."github.com"]
oauth_token = "canonical-token"

[hosts."www.github.com"]
oauth_token = "www-token"
"#,
        )
        .unwrap();
        assert_eq!(config.hosts(), vec!["github.com"]);
        assert_eq!(
            config.auth_token("github.com"),
            Some(("canonical-token", TokenSource::ConfigFile))
        );

        let config = Config::parse(
            r#"
[hosts."www.github.com"]
oauth_token = "www-token"

[hosts."API.github.com"]
oauth_token = "api-token"
"#,
        )
        .unwrap();
        assert_eq!(
            config.auth_token("github.com"),
            Some(("api-token", TokenSource::ConfigFile))
        );
    }

    #[test]
    fn test_env_token_adds_default_host() {
        let config = Config::blank().inherit_env(EnvOverlay::default().with_github_token("t"));
        assert_eq!(config.hosts(), vec![DEFAULT_HOST]);
        assert_eq!(config.git_protocol(DEFAULT_HOST), GitProtocol::Https);
    }

    #[test]
    fn test_not_found_resolves_to_blank() {
        let (resolver, _) = resolver_with(vec![missing as Outcome]);

        let config = resolver.resolve().unwrap();
        assert!(config.hosts().is_empty());
    }

    #[test]
    fn test_env_applies_to_loaded_and_blank_config() {
        let env = EnvOverlay::default().with_github_token("env-token");

        let (resolver, _) = resolver_with_env(vec![missing as Outcome], env.clone());
        let config = resolver.resolve().unwrap();
        assert_eq!(config.hosts(), vec![DEFAULT_HOST]);
        assert_eq!(
            config.auth_token(DEFAULT_HOST),
            Some(("env-token", TokenSource::Environment("GH_TOKEN")))
        );

        let (resolver, _) = resolver_with_env(vec![sample as Outcome], env);
        let config = resolver.resolve().unwrap();
        assert_eq!(config.hosts(), vec!["ghe.corp.net", "github.com"]);
        assert_eq!(
            config.auth_token(DEFAULT_HOST),
            Some(("env-token", TokenSource::Environment("GH_TOKEN")))
        );
        assert_eq!(
            config.auth_token("ghe.corp.net"),
            Some(("ghe-token", TokenSource::ConfigFile))
        );
    }

    #[test]
    fn test_success_is_memoized() {
        let (resolver, calls) = resolver_with(vec![sample as Outcome, blank as Outcome]);

        let first = resolver.resolve().unwrap();
        let second = resolver.resolve().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(second.hosts().len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_is_memoized_without_retry() {
        let (resolver, calls) = resolver_with(vec![no_dir as Outcome, blank as Outcome]);

        let first = resolver.resolve().unwrap_err();
        let second = resolver.resolve().unwrap_err();
        match (&first, &second) {
            (Error::Config(a), Error::Config(b)) => assert!(Arc::ptr_eq(a, b)),
            other => panic!("unexpected errors: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_manager_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new_at(dir.path().join("config.toml"));
        let err = manager.load_config().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_manager_reports_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "hosts = [not toml").unwrap();

        let err = ConfigManager::new_at(path).load_config().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
