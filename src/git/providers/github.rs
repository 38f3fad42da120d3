//! GitHub REST API provider implementation

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt, stream};
use serde::Deserialize;
use tracing::debug;

use crate::git::error::ProviderError;
use crate::git::provider::{GitProvider, RepositoryLocation};
use crate::git::providers::{check_status, read_json, read_manifest};
use crate::git::types::{GitRepositoryHealth, GitTag, RepositoryMetadata};

/// Default base URL for GitHub API
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Page size for list endpoints; GitHub's maximum
const PER_PAGE: &str = "100";

/// Commit lookups in flight while dating tags without a release
const TAG_DATE_CONCURRENCY: usize = 8;

/// Response from the repository endpoint
#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    description: Option<String>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    pushed_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    default_branch: Option<String>,
    license: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    draft: bool,
    published_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
    commit: TaggedCommit,
}

#[derive(Debug, Deserialize)]
struct TaggedCommit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

impl CommitEntry {
    fn date(self) -> Option<DateTime<Utc>> {
        self.commit
            .committer
            .and_then(|s| s.date)
            .or_else(|| self.commit.author.and_then(|s| s.date))
    }
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: Option<Signature>,
    author: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: Option<DateTime<Utc>>,
}

/// Issue state used in search queries
#[derive(Debug, Clone, Copy)]
enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

/// Provider implementation for GitHub
pub struct GitHubProvider {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubProvider {
    /// Creates a new GitHubProvider with a custom base URL
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

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// `owner/repo` of a GitHub repository URL
    fn full_name(url: &str) -> Result<String, ProviderError> {
        let location = RepositoryLocation::parse(url)?;
        let (owner, name) = location
            .owner_and_name()
            .ok_or_else(|| ProviderError::InvalidUrl(url.to_string()))?;
        Ok(format!("{}/{}", owner, name))
    }

    async fn fetch_repo(&self, full_name: &str) -> Result<RepoResponse, ProviderError> {
        let response = self.get(&format!("/repos/{}", full_name)).send().await?;
        read_json(check_status(response, full_name)?).await
    }

    async fn fetch_composer_json(
        &self,
        full_name: &str,
        branch: &str,
    ) -> Result<Option<serde_json::Value>, ProviderError> {
        let response = self
            .get(&format!("/repos/{}/contents/composer.json", full_name))
            .header("Accept", "application/vnd.github.raw+json")
            .query(&[("ref", branch)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("{} has no composer.json on {}", full_name, branch);
            return Ok(None);
        }

        read_manifest(check_status(response, full_name)?).await
    }

    async fn count_issues(&self, full_name: &str, state: IssueState) -> Result<u64, ProviderError> {
        let query = format!("repo:{} type:issue state:{}", full_name, state.as_str());
        let response = self
            .get("/search/issues")
            .query(&[("q", query.as_str()), ("per_page", "1")])
            .send()
            .await?;

        let search: SearchResponse = read_json(check_status(response, full_name)?).await?;
        Ok(search.total_count)
    }

    async fn has_readme(&self, full_name: &str) -> Result<bool, ProviderError> {
        let response = self.get(&format!("/repos/{}/readme", full_name)).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }

        check_status(response, full_name)?;
        Ok(true)
    }

    async fn count_contributors(&self, full_name: &str) -> Result<u64, ProviderError> {
        let response = self
            .get(&format!("/repos/{}/contributors", full_name))
            .query(&[("per_page", PER_PAGE), ("anon", "1")])
            .send()
            .await?;

        // empty repositories answer 204 without a body
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(0);
        }

        let contributors: Vec<serde_json::Value> =
            read_json(check_status(response, full_name)?).await?;
        Ok(contributors.len() as u64)
    }

    async fn last_commit_date(&self, full_name: &str) -> Result<Option<DateTime<Utc>>, ProviderError> {
        let response = self
            .get(&format!("/repos/{}/commits", full_name))
            .query(&[("per_page", "1")])
            .send()
            .await?;

        // empty repositories answer 409
        if response.status() == reqwest::StatusCode::CONFLICT {
            return Ok(None);
        }

        let commits: Vec<CommitEntry> = read_json(check_status(response, full_name)?).await?;
        Ok(commits.into_iter().next().and_then(CommitEntry::date))
    }

    async fn list_tags(&self, full_name: &str) -> Result<Vec<TagEntry>, ProviderError> {
        let response = self
            .get(&format!("/repos/{}/tags", full_name))
            .query(&[("per_page", PER_PAGE)])
            .send()
            .await?;

        read_json(check_status(response, full_name)?).await
    }

    /// Publication date of each non-draft release, keyed by tag name
    async fn release_dates(
        &self,
        full_name: &str,
    ) -> Result<HashMap<String, DateTime<Utc>>, ProviderError> {
        let response = self
            .get(&format!("/repos/{}/releases", full_name))
            .query(&[("per_page", PER_PAGE)])
            .send()
            .await?;

        let releases: Vec<Release> = read_json(check_status(response, full_name)?).await?;

        Ok(releases
            .into_iter()
            .filter(|release| !release.draft)
            .filter_map(|release| {
                let date = release.published_at.or(release.created_at)?;
                Some((release.tag_name, date))
            })
            .collect())
    }

    async fn commit_date(
        &self,
        full_name: &str,
        sha: &str,
    ) -> Result<Option<DateTime<Utc>>, ProviderError> {
        let response = self
            .get(&format!("/repos/{}/commits/{}", full_name, sha))
            .send()
            .await?;

        let commit: CommitEntry = read_json(check_status(response, full_name)?).await?;
        Ok(commit.date())
    }
}

impl Default for GitHubProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl GitProvider for GitHubProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn get_metadata(&self, url: &str) -> Result<RepositoryMetadata, ProviderError> {
        let full_name = Self::full_name(url)?;
        let repo = self.fetch_repo(&full_name).await?;
        let default_branch = repo.default_branch.unwrap_or_else(|| "main".to_string());
        let composer_json = self.fetch_composer_json(&full_name, &default_branch).await?;

        Ok(RepositoryMetadata {
            name: repo.name,
            description: repo.description,
            is_archived: repo.archived,
            is_fork: repo.fork,
            star_count: repo.stargazers_count,
            fork_count: repo.forks_count,
            last_updated: repo.pushed_at.or(repo.updated_at),
            default_branch,
            composer_json,
        })
    }

    async fn get_health(&self, url: &str) -> Result<GitRepositoryHealth, ProviderError> {
        let full_name = Self::full_name(url)?;
        let repo = self.fetch_repo(&full_name).await?;

        let (open_issues, closed_issues, has_readme, contributors, last_commit) = futures::try_join!(
            self.count_issues(&full_name, IssueState::Open),
            self.count_issues(&full_name, IssueState::Closed),
            self.has_readme(&full_name),
            self.count_contributors(&full_name),
            self.last_commit_date(&full_name),
        )?;

        Ok(GitRepositoryHealth {
            last_commit_date: last_commit.or(repo.pushed_at),
            star_count: repo.stargazers_count,
            fork_count: repo.forks_count,
            open_issues_count: open_issues,
            closed_issues_count: closed_issues,
            is_archived: repo.archived,
            has_readme,
            has_license: repo.license.is_some_and(|l| !l.is_null()),
            contributor_count: contributors,
        })
    }

    /// Tags of the repository, dated by their release or else by the tagged commit
    async fn get_tags(&self, url: &str) -> Result<Vec<GitTag>, ProviderError> {
        let full_name = Self::full_name(url)?;
        let full_name = full_name.as_str();

        let (tags, release_dates) =
            futures::try_join!(self.list_tags(full_name), self.release_dates(full_name))?;

        debug!(
            "{}: {} tags, {} releases",
            full_name,
            tags.len(),
            release_dates.len()
        );

        let dated: Vec<Option<GitTag>> = stream::iter(tags)
            .map(|tag| {
                let release_date = release_dates.get(&tag.name).copied();
                async move {
                    let created_at = match release_date {
                        Some(date) => Some(date),
                        None => self.commit_date(full_name, &tag.commit.sha).await?,
                    };
                    Ok::<_, ProviderError>(created_at.map(|date| GitTag::new(&tag.name, date)))
                }
            })
            .buffered(TAG_DATE_CONCURRENCY)
            .try_collect()
            .await?;

        Ok(dated.into_iter().flatten().collect())
    }
}
