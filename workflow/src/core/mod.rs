//! Core workflow logic
//!
//! Pure state machine, session state and view derivation. No I/O; every
//! function here is deterministic and testable without capabilities.

pub mod machine;
pub mod session;
pub mod view;

pub use machine::{WorkflowAction, WorkflowEvent, WorkflowState, reduce, successor};
pub use session::{Transition, Visibility, WorkflowFailure, WorkflowSession};
pub use view::{ActionLabels, ControlAction, ViewModel, current_action, format_result, visibility};
