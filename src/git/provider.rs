//! Provider traits for reading repository data from git hosting services

use std::sync::{Arc, LazyLock};

#[cfg(test)]
use mockall::automock;
use regex::Regex;

use crate::git::error::ProviderError;
use crate::git::types::{GitRepositoryHealth, GitTag, RepositoryMetadata};

/// `https://host/path`, `ssh://git@host:22/path`, `git://host/path`
static SCHEME_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?|ssh|git)://(?:[^@/]+@)?([^/:]+)(?::\d+)?/(.+)$").unwrap()
});

/// `git@host:path`
static SCP_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s/]+@([^:/\s]+):(.+)$").unwrap());

/// Trait for reading repository data from a git hosting service
///
/// Each call takes the repository URL as given by the extension; implementations
/// apply their own per-request deadline.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait GitProvider: Send + Sync {
    /// Returns a short name for log messages (e.g., "github")
    fn name(&self) -> &'static str;

    /// Fetches general repository information, including `composer.json` when present
    async fn get_metadata(&self, url: &str) -> Result<RepositoryMetadata, ProviderError>;

    /// Fetches the activity signals used for health scoring
    async fn get_health(&self, url: &str) -> Result<GitRepositoryHealth, ProviderError>;

    /// Fetches the repository's tags
    async fn get_tags(&self, url: &str) -> Result<Vec<GitTag>, ProviderError>;
}

/// Trait for choosing the provider responsible for a repository URL
#[cfg_attr(test, automock)]
pub trait ProviderLookup: Send + Sync {
    fn resolve_provider(&self, url: &str) -> Result<Arc<dyn GitProvider>, ProviderError>;
}

/// Host and project path of a repository URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocation {
    pub host: String,
    /// Project path without leading/trailing slashes and `.git` (e.g., "owner/repo")
    pub path: String,
}

impl RepositoryLocation {
    pub fn parse(url: &str) -> Result<Self, ProviderError> {
        let trimmed = url.trim();
        let captures = SCHEME_URL_RE
            .captures(trimmed)
            .or_else(|| SCP_URL_RE.captures(trimmed))
            .ok_or_else(|| ProviderError::InvalidUrl(url.to_string()))?;

        let host = captures[1].to_ascii_lowercase();
        let path = captures[2]
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
            return Err(ProviderError::InvalidUrl(url.to_string()));
        }

        Ok(Self {
            host,
            path: path.to_string(),
        })
    }

    /// Owner and repository name for hosts with two-level paths
    pub fn owner_and_name(&self) -> Option<(&str, &str)> {
        let (owner, name) = self.path.split_once('/')?;
        (!name.contains('/')).then_some((owner, name))
    }
}
