//! Capability traits with mockall annotations for testing
//!
//! The workflow core never talks to a model or a file picker directly. It is
//! handed implementations of these traits, which keeps the orchestrator
//! testable with generated mocks.

use std::sync::Arc;

use shared::{ClassificationResult, ImageReference, SelectedFile};

use crate::error::CapabilityResult;

/// A loaded model, shared between the session and in-flight classifications
pub type ModelHandle = Arc<dyn ImageClassifier>;

/// Model capability: produces a classifier once the model is available
///
/// Loading may download weights or contact a remote service, so it can fail
/// with [`CapabilityError::ModelLoad`](crate::error::CapabilityError::ModelLoad).
#[mockall::automock]
#[async_trait::async_trait]
pub trait ModelLoader: Send + Sync {
    /// Load the model and return a handle to it
    async fn load(&self) -> CapabilityResult<ModelHandle>;
}

/// Classification operation exposed by a loaded model
#[mockall::automock]
#[async_trait::async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Classify one image
    ///
    /// # Returns
    /// Label/probability pairs in the model's own ranking order
    async fn classify(&self, image: &ImageReference) -> CapabilityResult<Vec<ClassificationResult>>;
}

/// Image-acquisition capability (file picker, camera, scripted list)
#[mockall::automock]
#[async_trait::async_trait]
pub trait ImagePicker: Send + Sync {
    /// Present the selection surface and return what the user picked
    ///
    /// # Returns
    /// Zero or more files; an empty list means nothing was selected
    async fn pick(&self) -> CapabilityResult<Vec<SelectedFile>>;
}
