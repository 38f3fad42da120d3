use serde::Serialize;

use crate::git::types::{GitRepositoryHealth, GitTag, RepositoryMetadata};

/// Outcome of resolving one extension against a target version
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionAnalysisResult {
    pub repository_url: String,
    pub metadata: RepositoryMetadata,
    pub health: GitRepositoryHealth,
    pub compatible_tags: Vec<GitTag>,
}

impl ExtensionAnalysisResult {
    pub fn has_compatible_version(&self) -> bool {
        !self.compatible_tags.is_empty()
    }

    /// The most recently created compatible tag
    pub fn latest_compatible_version(&self) -> Option<&GitTag> {
        self.compatible_tags.iter().max_by_key(|tag| tag.created_at)
    }

    pub fn health_score(&self) -> f64 {
        self.health.health_score()
    }
}
