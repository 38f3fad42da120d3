//! Registry implementations for fetching extension releases

pub mod ter;

pub use ter::TerRegistry;
