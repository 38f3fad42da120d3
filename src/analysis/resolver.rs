//! Per-extension compatibility resolution
//!
//! One resolution is a linear pipeline:
//!
//! 1. Find the repository URL of the extension
//! 2. Pick the provider for that URL
//! 3. Read metadata, health and tags (fail-fast, no partial results)
//! 4. Gate the tags with the repository's `composer.json`

use std::sync::Arc;

use tracing::debug;

use crate::analysis::error::AnalysisError;
use crate::analysis::extension::Extension;
use crate::analysis::result::ExtensionAnalysisResult;
use crate::git::provider::ProviderLookup;
use crate::git::tag_filter::GitTagFilter;
use crate::version::semver::Version;

pub struct ExtensionCompatibilityResolver {
    lookup: Arc<dyn ProviderLookup>,
    tag_filter: GitTagFilter,
}

impl ExtensionCompatibilityResolver {
    pub fn new(lookup: Arc<dyn ProviderLookup>) -> Self {
        Self::with_tag_filter(lookup, GitTagFilter::default())
    }

    pub fn with_tag_filter(lookup: Arc<dyn ProviderLookup>, tag_filter: GitTagFilter) -> Self {
        Self { lookup, tag_filter }
    }

    pub async fn resolve(
        &self,
        extension: &Extension,
        target: &Version,
    ) -> Result<ExtensionAnalysisResult, AnalysisError> {
        let url = extension
            .repository_url()
            .ok_or_else(|| AnalysisError::NoRepositoryUrl {
                extension_key: extension.key.clone(),
            })?;

        let provider = self.lookup.resolve_provider(url).map_err(|source| {
            AnalysisError::UnsupportedRepository {
                extension_key: extension.key.clone(),
                url: url.to_string(),
                source,
            }
        })?;

        debug!("Reading repository {} for {}", url, extension.key);

        let (metadata, health, tags) = futures::try_join!(
            provider.get_metadata(url),
            provider.get_health(url),
            provider.get_tags(url),
        )
        .map_err(|source| AnalysisError::AnalysisFailed {
            extension_key: extension.key.clone(),
            source,
        })?;

        let compatible_tags =
            self.tag_filter
                .filter_compatible(&tags, target, metadata.composer_json.as_ref());

        debug!(
            "{}: {} of {} tags compatible with {}",
            extension.key,
            compatible_tags.len(),
            tags.len(),
            target
        );

        Ok(ExtensionAnalysisResult {
            repository_url: url.to_string(),
            metadata,
            health,
            compatible_tags,
        })
    }
}
