//! Batch analysis of many extensions
//!
//! Every extension gets its own report. Registry and repository failures
//! are recorded in the report and never abort the other extensions.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::extension::Extension;
use crate::analysis::resolver::ExtensionCompatibilityResolver;
use crate::analysis::result::ExtensionAnalysisResult;
use crate::config::DEFAULT_MAX_CONCURRENCY;
use crate::version::error::RegistryError;
use crate::version::registry::ExtensionRegistry;
use crate::version::registry_compat::RegistryCompatibilityChecker;
use crate::version::semver::Version;

/// Compatibility according to the extension registry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryVerdict {
    pub compatible_versions: Vec<String>,
    pub latest_compatible: Option<String>,
}

/// Condensed repository analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    pub repository_url: String,
    pub name: String,
    pub is_archived: bool,
    pub health_score: f64,
    pub has_compatible_version: bool,
    pub latest_compatible_version: Option<String>,
    pub compatible_tags: Vec<String>,
}

impl From<&ExtensionAnalysisResult> for RepositorySummary {
    fn from(result: &ExtensionAnalysisResult) -> Self {
        Self {
            repository_url: result.repository_url.clone(),
            name: result.metadata.name.clone(),
            is_archived: result.metadata.is_archived || result.health.is_archived,
            health_score: result.health_score(),
            has_compatible_version: result.has_compatible_version(),
            latest_compatible_version: result.latest_compatible_version().map(|t| t.name.clone()),
            compatible_tags: result.compatible_tags.iter().map(|t| t.name.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionReport {
    pub extension_key: String,
    pub registry: Option<RegistryVerdict>,
    pub repository: Option<RepositorySummary>,
    pub errors: Vec<String>,
}

impl ExtensionReport {
    /// True if either source proves a compatible release
    pub fn is_compatible(&self) -> bool {
        self.registry
            .as_ref()
            .is_some_and(|r| !r.compatible_versions.is_empty())
            || self
                .repository
                .as_ref()
                .is_some_and(|r| r.has_compatible_version)
    }
}

pub struct BatchAnalyzer {
    resolver: ExtensionCompatibilityResolver,
    registry: Option<Arc<dyn ExtensionRegistry>>,
    registry_checker: RegistryCompatibilityChecker,
    max_concurrency: usize,
}

impl BatchAnalyzer {
    pub fn new(resolver: ExtensionCompatibilityResolver) -> Self {
        Self {
            resolver,
            registry: None,
            registry_checker: RegistryCompatibilityChecker::new(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn with_registry(mut self, registry: Arc<dyn ExtensionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Number of extensions analyzed at the same time (at least one)
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Analyze all extensions; reports are returned in input order
    pub async fn analyze(&self, extensions: &[Extension], target: &Version) -> Vec<ExtensionReport> {
        info!(
            "Analyzing {} extensions against TYPO3 {}",
            extensions.len(),
            target
        );

        stream::iter(extensions)
            .map(|extension| self.analyze_extension(extension, target))
            .buffered(self.max_concurrency)
            .collect()
            .await
    }

    async fn analyze_extension(&self, extension: &Extension, target: &Version) -> ExtensionReport {
        let (registry, repository) = futures::join!(
            self.check_registry(extension, target),
            self.resolver.resolve(extension, target),
        );

        let mut errors = Vec::new();

        let registry = match registry {
            Some(Ok(verdict)) => Some(verdict),
            Some(Err(e)) => {
                warn!("Registry lookup failed for {}: {}", extension.key, e);
                errors.push(format!("Registry: {}", e));
                None
            }
            None => None,
        };

        let repository = match repository {
            Ok(result) => Some(RepositorySummary::from(&result)),
            Err(e) => {
                warn!("{}", e);
                errors.push(e.to_string());
                None
            }
        };

        let report = ExtensionReport {
            extension_key: extension.key.clone(),
            registry,
            repository,
            errors,
        };

        info!(
            "{}: {}",
            report.extension_key,
            if report.is_compatible() {
                "compatible"
            } else {
                "no compatible release found"
            }
        );

        report
    }

    async fn check_registry(
        &self,
        extension: &Extension,
        target: &Version,
    ) -> Option<Result<RegistryVerdict, RegistryError>> {
        let registry = self.registry.as_ref()?;

        Some(
            registry
                .fetch_releases(&extension.key)
                .await
                .map(|releases| RegistryVerdict {
                    compatible_versions: self
                        .registry_checker
                        .find_compatible_versions(&releases, target),
                    latest_compatible: self
                        .registry_checker
                        .get_latest_compatible_version(&releases, target),
                }),
        )
    }
}
