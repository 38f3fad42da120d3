#![allow(dead_code)]

pub mod provider;
pub mod registry;

pub use provider::{FakeLookup, FakeProvider, FakeRepository};
pub use registry::{MockRegistry, write_temp_file};
