pub mod analysis;
pub mod config;
pub mod git;
pub mod version;
