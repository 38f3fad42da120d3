//! TYPO3 Extension Repository (TER) API implementation

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::version::error::RegistryError;
use crate::version::registry::ExtensionRegistry;
use crate::version::registry_compat::RegistryReleaseEntry;

/// Default base URL for the TER
pub const DEFAULT_BASE_URL: &str = "https://extensions.typo3.org";

/// The versions endpoint either returns a bare list or wraps it
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VersionsResponse {
    List(Vec<RegistryReleaseEntry>),
    Wrapped { versions: Vec<RegistryReleaseEntry> },
}

/// Registry implementation for the TER REST API
pub struct TerRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl TerRegistry {
    /// Creates a new TerRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder().user_agent("typo3-upgrade-analyzer");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            client: builder.build().expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for TerRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl ExtensionRegistry for TerRegistry {
    async fn fetch_releases(
        &self,
        extension_key: &str,
    ) -> Result<Vec<RegistryReleaseEntry>, RegistryError> {
        let url = format!(
            "{}/api/v1/extension/{}/versions",
            self.base_url, extension_key
        );
        debug!("Fetching TER releases: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(extension_key.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(RegistryError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("TER returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body: VersionsResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse TER versions response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        Ok(match body {
            VersionsResponse::List(entries) => entries,
            VersionsResponse::Wrapped { versions } => versions,
        })
    }
}
