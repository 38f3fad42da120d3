//! Git hosting access and repository evaluation
//!
//! - [`provider`]: `GitProvider` / `ProviderLookup` traits and URL parsing
//! - [`providers`]: GitHub and GitLab clients plus host-based dispatch
//! - [`tag_filter`]: Manifest-gated selection of compatible tags
//! - [`health`]: Repository health scoring
//! - [`types`]: Tags, metadata and health signals

pub mod error;
pub mod health;
pub mod provider;
pub mod providers;
pub mod tag_filter;
pub mod types;

pub use error::ProviderError;
pub use health::{GitHealthScorer, HealthWeights};
pub use provider::{GitProvider, ProviderLookup, RepositoryLocation};
pub use providers::ProviderFactory;
pub use tag_filter::GitTagFilter;
pub use types::{GitRepositoryHealth, GitTag, RepositoryMetadata};
