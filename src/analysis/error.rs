use thiserror::Error;

use crate::git::error::ProviderError;

/// Failure of a single extension's resolution
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No repository URL found for extension {extension_key}")]
    NoRepositoryUrl { extension_key: String },

    #[error("Unsupported repository {url} for extension {extension_key}")]
    UnsupportedRepository {
        extension_key: String,
        url: String,
        #[source]
        source: ProviderError,
    },

    #[error("Analysis failed for extension {extension_key}: {source}")]
    AnalysisFailed {
        extension_key: String,
        #[source]
        source: ProviderError,
    },
}

impl AnalysisError {
    pub fn extension_key(&self) -> &str {
        match self {
            AnalysisError::NoRepositoryUrl { extension_key }
            | AnalysisError::UnsupportedRepository { extension_key, .. }
            | AnalysisError::AnalysisFailed { extension_key, .. } => extension_key,
        }
    }
}
