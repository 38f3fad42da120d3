//! Version model and compatibility checkers
//!
//! This module provides the comparison algebra and the per-source checkers
//! that decide whether something is compatible with a target TYPO3 version.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐   ┌───────────────────┐
//! │ ConstraintChecker│   │ ExtensionRegistry│──▶│ RegistryCompat-   │
//! │ (composer.json)  │   │   (TER fetch)    │   │ ibilityChecker    │
//! └────────┬─────────┘   └──────────────────┘   └─────────┬─────────┘
//!          │                                              │
//!          └──────────────▶ Version (compare) ◀───────────┘
//! ```
//!
//! # Modules
//!
//! - [`semver`]: `Version` value type and ordering
//! - [`constraint`]: Composer constraint evaluation
//! - [`registry_compat`]: TER release list evaluation
//! - [`registry`]: Registry trait for fetching releases
//! - [`registries`]: Concrete registry implementations (TER)
//! - [`error`]: Error types for parsing and registry operations

pub mod constraint;
pub mod error;
pub mod registries;
pub mod registry;
pub mod registry_compat;
pub mod semver;

pub use constraint::ConstraintChecker;
pub use error::{RegistryError, VersionError};
pub use registry_compat::{CompatibilityToken, RegistryCompatibilityChecker, RegistryReleaseEntry};
pub use semver::Version;
