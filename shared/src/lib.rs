//! Shared types for the image classification workflow
//!
//! Contains the value types exchanged between the workflow core and its
//! capabilities (model, image picker), the shared error type, and the
//! logging utilities used by every crate in the workspace.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
