//! Common test utilities and infrastructure
//!
//! Shared fixtures, builders and gated capability doubles used across the
//! workflow test suites.

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{GatedLoader, GatedPicker, TestHelpers, WorkflowBuilder};
