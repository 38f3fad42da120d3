//! Tag filtering for git-hosted extensions
//!
//! A tag can only be proven compatible through constraint evidence, so the
//! filter is a single gate: the repository's `composer.json` is checked once
//! against the target, and on success every stable version tag passes.
//! Per-tag manifests are not inspected.

use serde_json::Value;
use tracing::debug;

use crate::git::types::GitTag;
use crate::version::constraint::ConstraintChecker;
use crate::version::semver::Version;

#[derive(Debug, Clone, Copy, Default)]
pub struct GitTagFilter {
    constraint_checker: ConstraintChecker,
}

impl GitTagFilter {
    pub fn new(constraint_checker: ConstraintChecker) -> Self {
        Self { constraint_checker }
    }

    /// Keep the stable version tags of a repository whose manifest accepts `target`
    ///
    /// Without a manifest nothing is returned. Pre-release tags and tags that
    /// are not versions are always dropped.
    pub fn filter_compatible(
        &self,
        tags: &[GitTag],
        target: &Version,
        manifest: Option<&Value>,
    ) -> Vec<GitTag> {
        let Some(manifest) = manifest else {
            debug!("No composer.json available, no tag can be proven compatible");
            return Vec::new();
        };

        if !self
            .constraint_checker
            .is_composer_json_compatible(manifest, target)
        {
            debug!("composer.json does not accept target {}", target);
            return Vec::new();
        }

        tags.iter()
            .filter(|tag| tag.version().is_ok_and(|version| version.is_stable()))
            .cloned()
            .collect()
    }
}
