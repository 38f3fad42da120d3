//! TER release compatibility checker
//!
//! The TYPO3 Extension Repository advertises the supported core generations
//! of each release as a loosely typed list:
//! - `12` - any 12.x target
//! - `"12.4"` - 12.4.x targets
//! - `"12.*"` - any 12.x target
//! - `"*"` - any target

use serde::{Deserialize, Serialize};

use crate::version::semver::Version;

/// One entry of a release's `typo3_versions` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompatibilityToken {
    Integer(i64),
    Text(String),
    /// Any other JSON shape; never matches
    Other(serde_json::Value),
}

impl CompatibilityToken {
    fn matches(&self, target: &Version) -> bool {
        match self {
            CompatibilityToken::Integer(major) => {
                u64::try_from(*major).is_ok_and(|major| target.major() == major)
            }
            CompatibilityToken::Text(text) => text_matches(text.trim(), target),
            CompatibilityToken::Other(_) => false,
        }
    }
}

fn text_matches(text: &str, target: &Version) -> bool {
    if text == "*" {
        return true;
    }

    let parts: Vec<&str> = text.split('.').collect();
    match parts.as_slice() {
        [major] => parse_component(major).is_some_and(|m| target.major() == m),
        [major, "*"] => parse_component(major).is_some_and(|m| target.major() == m),
        [major, minor] => match (parse_component(major), parse_component(minor)) {
            (Some(major), Some(minor)) => target.major() == major && target.minor() == minor,
            _ => false,
        },
        _ => false,
    }
}

fn parse_component(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// A single release as listed by the registry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegistryReleaseEntry {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default, rename = "typo3_versions")]
    pub compatible_targets: Option<Vec<CompatibilityToken>>,
}

impl RegistryReleaseEntry {
    pub fn new(number: &str, compatible_targets: Vec<CompatibilityToken>) -> Self {
        Self {
            number: Some(number.to_string()),
            compatible_targets: Some(compatible_targets),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryCompatibilityChecker;

impl RegistryCompatibilityChecker {
    pub fn new() -> Self {
        Self
    }

    /// A release is compatible iff any of its tokens matches `target`
    pub fn is_version_compatible(&self, entry: &RegistryReleaseEntry, target: &Version) -> bool {
        entry
            .compatible_targets
            .as_deref()
            .is_some_and(|tokens| tokens.iter().any(|token| token.matches(target)))
    }

    /// Release numbers of all compatible entries, in input order
    pub fn find_compatible_versions(
        &self,
        entries: &[RegistryReleaseEntry],
        target: &Version,
    ) -> Vec<String> {
        entries
            .iter()
            .filter(|entry| self.is_version_compatible(entry, target))
            .filter_map(|entry| entry.number.clone())
            .collect()
    }

    /// The compatible release whose number is the greatest version
    ///
    /// Release numbers that do not parse as versions are skipped.
    pub fn get_latest_compatible_version(
        &self,
        entries: &[RegistryReleaseEntry],
        target: &Version,
    ) -> Option<String> {
        entries
            .iter()
            .filter(|entry| self.is_version_compatible(entry, target))
            .filter_map(|entry| {
                let number = entry.number.as_ref()?;
                Version::parse(number).ok().map(|parsed| (number, parsed))
            })
            .max_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(number, _)| number.clone())
    }
}
