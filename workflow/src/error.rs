//! Workflow-specific error types

use std::path::PathBuf;
use thiserror::Error;

use crate::core::machine::{WorkflowAction, WorkflowState};

/// Failure reported by one of the external capabilities
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("Model failed to load: {reason}")]
    ModelLoad { reason: String },

    #[error("Classification failed: {reason}")]
    Classify { reason: String },

    #[error("Cannot read image {path}: {source}")]
    ImageAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CapabilityError {
    pub fn model_load(reason: impl Into<String>) -> Self {
        Self::ModelLoad { reason: reason.into() }
    }

    pub fn classify(reason: impl Into<String>) -> Self {
        Self::Classify { reason: reason.into() }
    }
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Action '{action}' is not available in state {state}")]
    ActionNotAvailable { action: WorkflowAction, state: WorkflowState },

    #[error("Action '{action}' rejected: '{in_flight}' is still in flight")]
    Busy { action: WorkflowAction, in_flight: WorkflowAction },

    #[error("Action '{action}' cancelled; workflow was torn down")]
    Cancelled { action: WorkflowAction },

    #[error("Result of '{action}' discarded: workflow moved on to {state}")]
    Superseded { action: WorkflowAction, state: WorkflowState },

    #[error("Model capability error: {0}")]
    ModelLoad(#[source] CapabilityError),

    #[error("Classification capability error: {0}")]
    Classify(#[source] CapabilityError),

    #[error("Image picker error: {0}")]
    ImagePicker(#[source] CapabilityError),

    #[error("No model handle stored")]
    ModelMissing,

    #[error("No image selected")]
    ImageMissing,

    #[error("Configuration error: {field}")]
    Config { field: String },
}

impl WorkflowError {
    pub fn config(field: impl Into<String>) -> Self {
        Self::Config { field: field.into() }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
pub type CapabilityResult<T> = Result<T, CapabilityError>;
