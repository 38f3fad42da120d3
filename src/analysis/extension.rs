//! Extension descriptors

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata keys that may carry the repository URL, in lookup order
const REPOSITORY_URL_KEYS: &[&str] = &[
    "repository_url",
    "repositoryUrl",
    "repository",
    "source",
    "vcs_url",
];

/// An installed extension to be analyzed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    pub key: String,
    #[serde(default)]
    pub repository_url: Option<String>,
    /// Free-form metadata, e.g. the extension's `composer.json` or TER record
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl Extension {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn with_repository_url(mut self, url: &str) -> Self {
        self.repository_url = Some(url.to_string());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// The repository URL: the explicit field first, then known metadata keys,
    /// then `support.source` as found in `composer.json`
    pub fn repository_url(&self) -> Option<&str> {
        if let Some(url) = non_empty(self.repository_url.as_deref()) {
            return Some(url);
        }

        let metadata = self.metadata.as_ref()?;
        REPOSITORY_URL_KEYS
            .iter()
            .find_map(|key| non_empty(metadata.get(*key).and_then(Value::as_str)))
            .or_else(|| {
                non_empty(
                    metadata
                        .get("support")
                        .and_then(|support| support.get("source"))
                        .and_then(Value::as_str),
                )
            })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
