//! Registry test utilities

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tempfile::TempDir;

use typo3_upgrade_analyzer::version::error::RegistryError;
use typo3_upgrade_analyzer::version::registry::ExtensionRegistry;
use typo3_upgrade_analyzer::version::registry_compat::RegistryReleaseEntry;

/// Mock registry for testing
#[derive(Default)]
pub struct MockRegistry {
    releases: HashMap<String, Vec<RegistryReleaseEntry>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register releases given as `(number, typo3_versions)` JSON pairs
    pub fn with_releases(mut self, extension_key: &str, releases: serde_json::Value) -> Self {
        self.releases.insert(
            extension_key.to_string(),
            serde_json::from_value(releases).unwrap(),
        );
        self
    }
}

#[async_trait]
impl ExtensionRegistry for MockRegistry {
    async fn fetch_releases(
        &self,
        extension_key: &str,
    ) -> Result<Vec<RegistryReleaseEntry>, RegistryError> {
        match self.releases.get(extension_key) {
            Some(releases) => Ok(releases.clone()),
            None => Err(RegistryError::NotFound(extension_key.to_string())),
        }
    }
}

/// Write `content` to a file in a fresh temporary directory
pub fn write_temp_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    (temp_dir, path)
}
