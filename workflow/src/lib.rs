//! Image classification workflow
//!
//! A finite-state controller that loads a classification model, accepts an
//! image, classifies it and shows the results, then loops back for the next
//! image. The model and the image picker are injected capabilities; the core
//! owns the state machine, the session data and the view derivation.

pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::{Args, FailurePolicy, Locale, ModelProvider, WorkflowConfig};
pub use core::{
    ActionLabels, ControlAction, ViewModel, Visibility, WorkflowAction, WorkflowEvent, WorkflowSession,
    WorkflowState,
};
pub use error::{CapabilityError, CapabilityResult, WorkflowError, WorkflowResult};
pub use orchestrator::Orchestrator;
pub use traits::{
    ImageClassifier, ImagePicker, MockImageClassifier, MockImagePicker, MockModelLoader, ModelHandle, ModelLoader,
};
