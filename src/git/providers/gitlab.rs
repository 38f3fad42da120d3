//! GitLab REST API (v4) provider implementation

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::git::error::ProviderError;
use crate::git::provider::{GitProvider, RepositoryLocation};
use crate::git::providers::{check_status, read_json, read_manifest};
use crate::git::types::{GitRepositoryHealth, GitTag, RepositoryMetadata};

/// Default base URL for GitLab
pub const DEFAULT_BASE_URL: &str = "https://gitlab.com";

const PER_PAGE: &str = "100";

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    name: String,
    description: Option<String>,
    #[serde(default)]
    archived: bool,
    forked_from_project: Option<serde_json::Value>,
    #[serde(default)]
    star_count: u64,
    #[serde(default)]
    forks_count: u64,
    last_activity_at: Option<DateTime<Utc>>,
    default_branch: Option<String>,
    readme_url: Option<String>,
    license: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct IssuesStatisticsResponse {
    statistics: IssuesStatistics,
}

#[derive(Debug, Deserialize)]
struct IssuesStatistics {
    counts: IssueCounts,
}

#[derive(Debug, Default, Deserialize)]
struct IssueCounts {
    #[serde(default)]
    opened: u64,
    #[serde(default)]
    closed: u64,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    committed_date: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct TagResponse {
    name: String,
    created_at: Option<DateTime<Utc>>,
    commit: Option<CommitResponse>,
}

/// Provider implementation for GitLab and self-hosted GitLab instances
pub struct GitLabProvider {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitLabProvider {
    /// Creates a new GitLabProvider with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self::with_options(base_url, None, None)
    }

    pub fn with_options(base_url: &str, token: Option<String>, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder().user_agent("typo3-upgrade-analyzer");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            client: builder.build().expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Project id as used by the API: the full path with `/` encoded
    fn project_id(url: &str) -> Result<String, ProviderError> {
        let location = RepositoryLocation::parse(url)?;
        Ok(location.path.replace('/', "%2F"))
    }

    fn get(&self, project_id: &str, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(format!(
            "{}/api/v4/projects/{}{}",
            self.base_url, project_id, path
        ));
        match &self.token {
            Some(token) => request.header("PRIVATE-TOKEN", token),
            None => request,
        }
    }

    async fn fetch_project(&self, project_id: &str) -> Result<ProjectResponse, ProviderError> {
        let response = self
            .get(project_id, "")
            .query(&[("license", "true")])
            .send()
            .await?;
        read_json(check_status(response, project_id)?).await
    }

    async fn fetch_composer_json(
        &self,
        project_id: &str,
        branch: &str,
    ) -> Result<Option<serde_json::Value>, ProviderError> {
        let response = self
            .get(project_id, "/repository/files/composer.json/raw")
            .query(&[("ref", branch)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("{} has no composer.json on {}", project_id, branch);
            return Ok(None);
        }

        read_manifest(check_status(response, project_id)?).await
    }

    async fn issue_counts(&self, project_id: &str) -> Result<IssueCounts, ProviderError> {
        let response = self.get(project_id, "/issues_statistics").send().await?;

        // projects with issues disabled answer 403
        if response.status() == reqwest::StatusCode::FORBIDDEN {
            return Ok(IssueCounts::default());
        }

        let stats: IssuesStatisticsResponse =
            read_json(check_status(response, project_id)?).await?;
        Ok(stats.statistics.counts)
    }

    async fn count_contributors(&self, project_id: &str) -> Result<u64, ProviderError> {
        let response = self
            .get(project_id, "/repository/contributors")
            .query(&[("per_page", PER_PAGE)])
            .send()
            .await?;

        // empty repositories have no repository tree
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(0);
        }

        let contributors: Vec<serde_json::Value> =
            read_json(check_status(response, project_id)?).await?;
        Ok(contributors.len() as u64)
    }

    async fn last_commit_date(&self, project_id: &str) -> Result<Option<DateTime<Utc>>, ProviderError> {
        let response = self
            .get(project_id, "/repository/commits")
            .query(&[("per_page", "1")])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let commits: Vec<CommitResponse> = read_json(check_status(response, project_id)?).await?;
        Ok(commits
            .into_iter()
            .next()
            .and_then(|commit| commit.committed_date.or(commit.created_at)))
    }
}

impl Default for GitLabProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl GitProvider for GitLabProvider {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    async fn get_metadata(&self, url: &str) -> Result<RepositoryMetadata, ProviderError> {
        let project_id = Self::project_id(url)?;
        let project = self.fetch_project(&project_id).await?;
        let default_branch = project.default_branch.unwrap_or_else(|| "main".to_string());
        let composer_json = self.fetch_composer_json(&project_id, &default_branch).await?;

        Ok(RepositoryMetadata {
            name: project.name,
            description: project.description.filter(|d| !d.is_empty()),
            is_archived: project.archived,
            is_fork: project.forked_from_project.is_some(),
            star_count: project.star_count,
            fork_count: project.forks_count,
            last_updated: project.last_activity_at,
            default_branch,
            composer_json,
        })
    }

    async fn get_health(&self, url: &str) -> Result<GitRepositoryHealth, ProviderError> {
        let project_id = Self::project_id(url)?;

        let (project, issues, contributors, last_commit) = futures::try_join!(
            self.fetch_project(&project_id),
            self.issue_counts(&project_id),
            self.count_contributors(&project_id),
            self.last_commit_date(&project_id),
        )?;

        Ok(GitRepositoryHealth {
            last_commit_date: last_commit.or(project.last_activity_at),
            star_count: project.star_count,
            fork_count: project.forks_count,
            open_issues_count: issues.opened,
            closed_issues_count: issues.closed,
            is_archived: project.archived,
            has_readme: project.readme_url.is_some(),
            has_license: project.license.is_some_and(|l| !l.is_null()),
            contributor_count: contributors,
        })
    }

    async fn get_tags(&self, url: &str) -> Result<Vec<GitTag>, ProviderError> {
        let project_id = Self::project_id(url)?;
        let response = self
            .get(&project_id, "/repository/tags")
            .query(&[("per_page", PER_PAGE)])
            .send()
            .await?;

        let tags: Vec<TagResponse> = read_json(check_status(response, &project_id)?).await?;

        Ok(tags
            .into_iter()
            .filter_map(|tag| {
                let commit_date = tag
                    .commit
                    .and_then(|commit| commit.committed_date.or(commit.created_at));
                let created_at = tag.created_at.or(commit_date)?;
                Some(GitTag::new(&tag.name, created_at))
            })
            .collect())
    }
}
