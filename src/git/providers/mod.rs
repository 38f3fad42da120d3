//! Git hosting provider implementations and URL-based dispatch

pub mod github;
pub mod gitlab;

pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::AnalyzerConfig;
use crate::git::error::ProviderError;
use crate::git::provider::{GitProvider, ProviderLookup, RepositoryLocation};

const GITHUB_HOSTS: &[&str] = &["github.com", "www.github.com"];

/// Chooses a provider by the host of the repository URL
#[derive(Default)]
pub struct ProviderFactory {
    github: Option<Arc<GitHubProvider>>,
    gitlab: Option<(String, Arc<GitLabProvider>)>,
}

impl ProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_github(mut self, provider: GitHubProvider) -> Self {
        self.github = Some(Arc::new(provider));
        self
    }

    /// Route repositories on `host` to the given GitLab instance
    pub fn with_gitlab(mut self, host: &str, provider: GitLabProvider) -> Self {
        self.gitlab = Some((host.to_ascii_lowercase(), Arc::new(provider)));
        self
    }

    /// Create the providers enabled in the configuration
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        let timeout = Some(config.request_timeout());
        let mut factory = Self::new();

        let github = &config.providers.github;
        if github.enabled {
            let base_url = github.base_url.as_deref().unwrap_or(github::DEFAULT_BASE_URL);
            factory = factory.with_github(GitHubProvider::with_options(
                base_url,
                github.token.clone(),
                timeout,
            ));
        }

        let gitlab = &config.providers.gitlab;
        if gitlab.enabled {
            let base_url = gitlab.base_url.as_deref().unwrap_or(gitlab::DEFAULT_BASE_URL);
            factory = factory.with_gitlab(
                host_of(base_url),
                GitLabProvider::with_options(base_url, gitlab.token.clone(), timeout),
            );
        }

        factory
    }
}

impl ProviderLookup for ProviderFactory {
    fn resolve_provider(&self, url: &str) -> Result<Arc<dyn GitProvider>, ProviderError> {
        let location = RepositoryLocation::parse(url)?;
        let host = location.host.as_str();

        let provider: Option<Arc<dyn GitProvider>> = if GITHUB_HOSTS.contains(&host) {
            self.github.clone().map(|p| p as Arc<dyn GitProvider>)
        } else {
            self.gitlab
                .as_ref()
                .filter(|(gitlab_host, _)| gitlab_host == host)
                .map(|(_, p)| p.clone() as Arc<dyn GitProvider>)
        };

        match provider {
            Some(provider) => {
                debug!("Using {} provider for {}", provider.name(), url);
                Ok(provider)
            }
            None => Err(ProviderError::Unsupported(url.to_string())),
        }
    }
}

/// Host part of a base URL such as `https://gitlab.example.com/`
fn host_of(base_url: &str) -> &str {
    let rest = base_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(base_url);
    rest.split(['/', ':']).next().unwrap_or(rest)
}

/// Map error statuses to provider errors
pub(crate) fn check_status(
    response: reqwest::Response,
    subject: &str,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ProviderError::NotFound(subject.to_string()));
    }

    let retry_after = || {
        response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    };

    let quota_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .is_some_and(|v| v.as_bytes() == b"0");

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || (status == reqwest::StatusCode::FORBIDDEN && quota_exhausted)
    {
        return Err(ProviderError::RateLimited {
            retry_after_secs: retry_after(),
        });
    }

    if !status.is_success() {
        warn!("Provider returned status {}: {}", status, response.url());
        return Err(ProviderError::InvalidResponse(format!(
            "Unexpected status: {}",
            status
        )));
    }

    Ok(response)
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let url = response.url().to_string();
    response.json().await.map_err(|e| {
        warn!("Failed to parse provider response from {}: {}", url, e);
        ProviderError::InvalidResponse(e.to_string())
    })
}

/// Parse a fetched `composer.json`; an unreadable manifest counts as absent
pub(crate) async fn read_manifest(
    response: reqwest::Response,
) -> Result<Option<serde_json::Value>, ProviderError> {
    let url = response.url().to_string();
    let body = response.text().await?;

    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(manifest) if manifest.is_object() => Ok(Some(manifest)),
        Ok(_) | Err(_) => {
            warn!("Ignoring malformed composer.json from {}", url);
            Ok(None)
        }
    }
}
