//! Extension analysis
//!
//! - [`resolver`]: Resolves one extension against a target version
//! - [`batch`]: Runs resolutions for many extensions, combined with the registry verdict
//! - [`extension`]: Extension descriptors and repository URL discovery
//! - [`result`]: Resolution results
//! - [`error`]: Resolution errors

pub mod batch;
pub mod error;
pub mod extension;
pub mod resolver;
pub mod result;

pub use batch::{BatchAnalyzer, ExtensionReport, RegistryVerdict, RepositorySummary};
pub use error::AnalysisError;
pub use extension::Extension;
pub use resolver::ExtensionCompatibilityResolver;
pub use result::ExtensionAnalysisResult;
