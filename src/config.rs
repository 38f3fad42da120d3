use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// Defaults
// =============================================================================

/// Per-request deadline for provider and registry calls in milliseconds (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Number of extensions analyzed at the same time
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Environment variables consulted when the config file leaves tokens unset
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const GITLAB_TOKEN_ENV: &str = "GITLAB_TOKEN";

/// Analyzer configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerConfig {
    pub request_timeout_ms: u64,
    pub max_concurrency: usize,
    pub providers: ProvidersConfig,
    pub registry: RegistryConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            providers: ProvidersConfig::default(),
            registry: RegistryConfig::default(),
        }
    }
}

/// Git hosting provider configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    pub github: ProviderConfig,
    pub gitlab: ProviderConfig,
}

/// Individual provider configuration
///
/// A missing `baseUrl` means the provider's public default.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    pub enabled: bool,
    pub base_url: Option<String>,
    pub token: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            token: None,
        }
    }
}

/// TER registry configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    pub enabled: bool,
    pub base_url: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file, filling tokens from the environment
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content)?
            }
            None => Self::default(),
        };

        Ok(config.with_env_tokens(
            std::env::var(GITHUB_TOKEN_ENV).ok(),
            std::env::var(GITLAB_TOKEN_ENV).ok(),
        ))
    }

    fn with_env_tokens(mut self, github: Option<String>, gitlab: Option<String>) -> Self {
        if self.providers.github.token.is_none() {
            self.providers.github.token = github.filter(|t| !t.is_empty());
        }
        if self.providers.gitlab.token.is_none() {
            self.providers.gitlab.token = gitlab.filter(|t| !t.is_empty());
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Returns the path to the data directory for typo3-upgrade-analyzer.
/// Uses $XDG_DATA_HOME/typo3-upgrade-analyzer if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/typo3-upgrade-analyzer,
/// or ./typo3-upgrade-analyzer if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default path of the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("typo3-upgrade-analyzer.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("typo3-upgrade-analyzer")
}
