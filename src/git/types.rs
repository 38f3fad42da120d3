//! Data read from git hosting providers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::git::health::GitHealthScorer;
use crate::version::error::VersionError;
use crate::version::semver::Version;

/// A tag of a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitTag {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl GitTag {
    pub fn new(name: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            created_at,
        }
    }

    /// Interpret the tag name as a version (`v12.4.0`, `12.4.0`, ...)
    pub fn version(&self) -> Result<Version, VersionError> {
        Version::parse(&self.name)
    }
}

/// General repository information
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMetadata {
    pub name: String,
    pub description: Option<String>,
    pub is_archived: bool,
    pub is_fork: bool,
    pub star_count: u64,
    pub fork_count: u64,
    pub last_updated: Option<DateTime<Utc>>,
    pub default_branch: String,
    /// `composer.json` of the default branch, when the repository has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer_json: Option<serde_json::Value>,
}

/// Activity signals used to judge repository health
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositoryHealth {
    pub last_commit_date: Option<DateTime<Utc>>,
    pub star_count: u64,
    pub fork_count: u64,
    pub open_issues_count: u64,
    pub closed_issues_count: u64,
    pub is_archived: bool,
    pub has_readme: bool,
    pub has_license: bool,
    pub contributor_count: u64,
}

impl GitRepositoryHealth {
    /// Open plus closed issues, saturating at `u64::MAX`
    pub fn total_issues_count(&self) -> u64 {
        self.open_issues_count
            .saturating_add(self.closed_issues_count)
    }

    /// Share of closed issues; 1.0 when there are no issues at all
    pub fn issue_resolution_rate(&self) -> f64 {
        if self.open_issues_count == 0 && self.closed_issues_count == 0 {
            return 1.0;
        }
        let closed = self.closed_issues_count as f64;
        closed / (self.open_issues_count as f64 + closed)
    }

    pub fn health_score(&self) -> f64 {
        GitHealthScorer::default().score(self)
    }
}
