//! Service implementations
//!
//! Production implementations of the capability traits: the model
//! providers, the image pickers and the terminal they share.

pub mod console;
pub mod http_model;
pub mod image_picker;
pub mod random_model;

// Re-export all service implementations
pub use console::Console;
pub use http_model::{HttpClassifier, HttpModelLoader};
pub use image_picker::{ConsoleImagePicker, ScriptedImagePicker};
pub use random_model::{RandomClassifier, RandomModelLoader};
