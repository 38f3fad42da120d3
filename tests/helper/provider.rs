//! Git provider test utilities

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use typo3_upgrade_analyzer::git::error::ProviderError;
use typo3_upgrade_analyzer::git::provider::{GitProvider, ProviderLookup};
use typo3_upgrade_analyzer::git::types::{GitRepositoryHealth, GitTag, RepositoryMetadata};

/// Canned data of one repository
#[derive(Clone, Default)]
pub struct FakeRepository {
    pub metadata: RepositoryMetadata,
    pub health: GitRepositoryHealth,
    pub tags: Vec<GitTag>,
}

impl FakeRepository {
    pub fn new(name: &str) -> Self {
        Self {
            metadata: RepositoryMetadata {
                name: name.to_string(),
                default_branch: "main".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_composer_json(mut self, composer_json: serde_json::Value) -> Self {
        self.metadata.composer_json = Some(composer_json);
        self
    }

    pub fn with_health(mut self, health: GitRepositoryHealth) -> Self {
        self.health = health;
        self
    }

    /// Tags as `(name, day of January 2024)` pairs
    pub fn with_tags(mut self, tags: &[(&str, u32)]) -> Self {
        self.tags = tags
            .iter()
            .map(|(name, day)| {
                GitTag::new(name, Utc.with_ymd_and_hms(2024, 1, *day, 0, 0, 0).unwrap())
            })
            .collect();
        self
    }
}

/// Provider serving canned repositories by URL
#[derive(Default)]
pub struct FakeProvider {
    repositories: HashMap<String, FakeRepository>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, url: &str, repository: FakeRepository) -> Self {
        self.repositories.insert(url.to_string(), repository);
        self
    }

    fn repository(&self, url: &str) -> Result<&FakeRepository, ProviderError> {
        self.repositories
            .get(url)
            .ok_or_else(|| ProviderError::NotFound(url.to_string()))
    }
}

#[async_trait]
impl GitProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn get_metadata(&self, url: &str) -> Result<RepositoryMetadata, ProviderError> {
        Ok(self.repository(url)?.metadata.clone())
    }

    async fn get_health(&self, url: &str) -> Result<GitRepositoryHealth, ProviderError> {
        Ok(self.repository(url)?.health.clone())
    }

    async fn get_tags(&self, url: &str) -> Result<Vec<GitTag>, ProviderError> {
        Ok(self.repository(url)?.tags.clone())
    }
}

/// Lookup that routes URLs on one host to a single provider
pub struct FakeLookup {
    host: String,
    provider: Arc<dyn GitProvider>,
}

impl FakeLookup {
    pub fn new(host: &str, provider: FakeProvider) -> Self {
        Self {
            host: host.to_string(),
            provider: Arc::new(provider),
        }
    }
}

impl ProviderLookup for FakeLookup {
    fn resolve_provider(&self, url: &str) -> Result<Arc<dyn GitProvider>, ProviderError> {
        if url.contains(&self.host) {
            Ok(self.provider.clone())
        } else {
            Err(ProviderError::Unsupported(url.to_string()))
        }
    }
}
