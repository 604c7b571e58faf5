use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::analyzer::SeverityScope;
use crate::domain::{default_rules, ReleaseType, RuleMatcher, RuleSet, SemanticRule};
use crate::error::{ReleaseError, Result};

pub const CONFIG_FILE_NAME: &str = "monorel.toml";

/// Represents the complete configuration for monorel.
///
/// Contains package layout, classification rules, attribution policy and
/// collaborator settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_packages_dir")]
    pub packages_dir: PathBuf,

    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub severity_scope: SeverityScope,

    #[serde(default = "default_rule_configs")]
    pub rules: Vec<RuleConfig>,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub hosting: HostingConfig,

    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

fn default_packages_dir() -> PathBuf {
    PathBuf::from("packages")
}

fn default_manifest() -> String {
    "package.json".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_rule_configs() -> Vec<RuleConfig> {
    default_rules().into_iter().map(RuleConfig::from).collect()
}

/// One `[[rules]]` entry. Exactly one of `prefixes` or `keywords` is set.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RuleConfig {
    pub group: String,
    pub release_type: ReleaseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefixes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

impl From<SemanticRule> for RuleConfig {
    fn from(rule: SemanticRule) -> Self {
        let (prefixes, keywords) = match rule.matcher {
            RuleMatcher::Prefixes(p) => (Some(p), None),
            RuleMatcher::Keywords(k) => (None, Some(k)),
        };
        RuleConfig {
            group: rule.group,
            release_type: rule.release_type,
            prefixes,
            keywords,
        }
    }
}

impl TryFrom<RuleConfig> for SemanticRule {
    type Error = ReleaseError;

    fn try_from(config: RuleConfig) -> Result<Self> {
        let matcher = match (config.prefixes, config.keywords) {
            (Some(prefixes), None) => RuleMatcher::Prefixes(prefixes),
            (None, Some(keywords)) => RuleMatcher::Keywords(keywords),
            _ => {
                return Err(ReleaseError::config(format!(
                    "rule '{}' must set exactly one of `prefixes` or `keywords`",
                    config.group
                )))
            }
        };
        Ok(SemanticRule {
            group: config.group,
            release_type: config.release_type,
            matcher,
        })
    }
}

/// Package registry invocation
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_command")]
    pub command: String,
    #[serde(default = "default_registry_args")]
    pub args: Vec<String>,
}

fn default_registry_command() -> String {
    "npm".to_string()
}

fn default_registry_args() -> Vec<String> {
    vec!["publish".to_string()]
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            command: default_registry_command(),
            args: default_registry_args(),
        }
    }
}

/// Hosting API endpoint
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HostingConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

impl Default for HostingConfig {
    fn default() -> Self {
        HostingConfig {
            api_url: default_api_url(),
        }
    }
}

/// Upper bounds for collaborator calls, in seconds
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TimeoutsConfig {
    #[serde(default = "default_command_secs")]
    pub command_secs: u64,
    #[serde(default = "default_http_secs")]
    pub http_secs: u64,
}

fn default_command_secs() -> u64 {
    300
}

fn default_http_secs() -> u64 {
    30
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        TimeoutsConfig {
            command_secs: default_command_secs(),
            http_secs: default_http_secs(),
        }
    }
}

impl TimeoutsConfig {
    pub fn command(&self) -> Duration {
        Duration::from_secs(self.command_secs)
    }

    pub fn http(&self) -> Duration {
        Duration::from_secs(self.http_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            packages_dir: default_packages_dir(),
            manifest: default_manifest(),
            remote: default_remote(),
            severity_scope: SeverityScope::default(),
            rules: default_rule_configs(),
            registry: RegistryConfig::default(),
            hosting: HostingConfig::default(),
            timeouts: TimeoutsConfig::default(),
        }
    }
}

impl Config {
    /// Validate and compile the configured rules
    pub fn rule_set(&self) -> Result<RuleSet> {
        if self.rules.is_empty() {
            return Err(ReleaseError::config("at least one semantic rule is required"));
        }
        let rules = self
            .rules
            .iter()
            .cloned()
            .map(SemanticRule::try_from)
            .collect::<Result<Vec<_>>>()?;
        RuleSet::compile(rules)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `monorel.toml` in current directory
/// 3. `monorel.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path).map_err(|e| {
            ReleaseError::config(format!("cannot read config file {}: {}", path, e))
        })?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parse configuration text, surfacing TOML problems as configuration errors
pub fn parse_config(text: &str) -> Result<Config> {
    toml::from_str(text).map_err(|e| ReleaseError::config(format!("invalid configuration: {}", e)))
}

/// Identity recorded on release tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

/// Required environment inputs: committer identity and access token
#[derive(Debug, Clone)]
pub struct Credentials {
    pub committer: Committer,
    pub token: SecretString,
}

pub const ENV_COMMITTER_NAME: &str = "GIT_COMMITTER_NAME";
pub const ENV_COMMITTER_EMAIL: &str = "GIT_COMMITTER_EMAIL";
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`; values that are absent or blank
    /// are a configuration error naming every missing variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let name = read(ENV_COMMITTER_NAME);
        let email = read(ENV_COMMITTER_EMAIL);
        let token = read(ENV_TOKEN);

        match (name, email, token) {
            (Some(name), Some(email), Some(token)) => Ok(Credentials {
                committer: Committer { name, email },
                token: SecretString::from(token),
            }),
            (name, email, token) => {
                let missing: Vec<&str> = [
                    (ENV_TOKEN, token.is_none()),
                    (ENV_COMMITTER_NAME, name.is_none()),
                    (ENV_COMMITTER_EMAIL, email.is_none()),
                ]
                .iter()
                .filter(|(_, absent)| *absent)
                .map(|(key, _)| *key)
                .collect();
                Err(ReleaseError::config(format!(
                    "environment variables must be set: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}
