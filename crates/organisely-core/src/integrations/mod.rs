//! Integration registry and one-level extension resolver.

pub mod registry;

pub use registry::{IntegrationRegistry, ValidationReport};
