//! Registry trait for fetching extension releases from the TYPO3 Extension Repository

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;
use crate::version::registry_compat::RegistryReleaseEntry;

/// Trait for fetching the release list of an extension
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ExtensionRegistry: Send + Sync {
    /// Fetches all releases for an extension
    ///
    /// # Arguments
    /// * `extension_key` - The extension key (e.g., "news")
    ///
    /// # Returns
    /// * `Ok(Vec<RegistryReleaseEntry>)` - Releases in registry order
    /// * `Err(RegistryError)` - If the fetch fails
    async fn fetch_releases(
        &self,
        extension_key: &str,
    ) -> Result<Vec<RegistryReleaseEntry>, RegistryError>;
}
