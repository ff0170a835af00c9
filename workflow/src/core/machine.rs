//! Workflow state machine
//!
//! The transition table is an exhaustive match over [`WorkflowState`]: every
//! state names its `next` successor, its optional `fail` recovery target and
//! its two display flags. [`reduce`] is the only way the current state moves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The six stages of the classification workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowState {
    Initial,
    LoadingModel,
    ModelReady,
    ImageReady,
    Identifying,
    Complete,
}

impl WorkflowState {
    /// All states in chain order
    pub const ALL: [WorkflowState; 6] = [
        WorkflowState::Initial,
        WorkflowState::LoadingModel,
        WorkflowState::ModelReady,
        WorkflowState::ImageReady,
        WorkflowState::Identifying,
        WorkflowState::Complete,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WorkflowState::Initial => "initial",
            WorkflowState::LoadingModel => "loadingModel",
            WorkflowState::ModelReady => "modelReady",
            WorkflowState::ImageReady => "imageReady",
            WorkflowState::Identifying => "identifying",
            WorkflowState::Complete => "complete",
        }
    }

    /// States in which a capability call is pending and no action is offered
    pub fn is_transient(self) -> bool {
        matches!(self, WorkflowState::LoadingModel | WorkflowState::Identifying)
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        INITIAL_STATE
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signals fed to the reducer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkflowEvent {
    /// Advance along the chain
    Next,
    /// A capability call failed; return to the last stable state
    Fail,
    /// Anything else, kept verbatim for logging
    Other(String),
}

impl WorkflowEvent {
    pub fn parse(name: &str) -> Self {
        match name {
            "next" => WorkflowEvent::Next,
            "fail" => WorkflowEvent::Fail,
            other => WorkflowEvent::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            WorkflowEvent::Next => "next",
            WorkflowEvent::Fail => "fail",
            WorkflowEvent::Other(name) => name,
        }
    }
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The single user-triggerable operation bound to a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowAction {
    LoadModel,
    RequestImage,
    Identify,
    Reset,
}

impl WorkflowAction {
    /// Action table: which operation the control surface exposes per state
    pub fn for_state(state: WorkflowState) -> Option<WorkflowAction> {
        match state {
            WorkflowState::Initial => Some(WorkflowAction::LoadModel),
            WorkflowState::LoadingModel => None,
            WorkflowState::ModelReady => Some(WorkflowAction::RequestImage),
            WorkflowState::ImageReady => Some(WorkflowAction::Identify),
            WorkflowState::Identifying => None,
            WorkflowState::Complete => Some(WorkflowAction::Reset),
        }
    }

    /// The state in which this action is valid
    pub fn required_state(self) -> WorkflowState {
        match self {
            WorkflowAction::LoadModel => WorkflowState::Initial,
            WorkflowAction::RequestImage => WorkflowState::ModelReady,
            WorkflowAction::Identify => WorkflowState::ImageReady,
            WorkflowAction::Reset => WorkflowState::Complete,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WorkflowAction::LoadModel => "loadModel",
            WorkflowAction::RequestImage => "requestImage",
            WorkflowAction::Identify => "identify",
            WorkflowAction::Reset => "reset",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSpec {
    pub on_next: WorkflowState,
    pub on_fail: Option<WorkflowState>,
    pub show_image: bool,
    pub show_results: bool,
}

pub const INITIAL_STATE: WorkflowState = WorkflowState::Initial;

/// Target of every event a state does not accept.
///
/// Unknown events reset the whole workflow instead of being ignored. This is
/// kept as an explicit, named behaviour; see `reduce`.
pub const FALLBACK_STATE: WorkflowState = WorkflowState::Initial;

/// Transition table lookup
pub const fn state_spec(state: WorkflowState) -> StateSpec {
    match state {
        WorkflowState::Initial => StateSpec {
            on_next: WorkflowState::LoadingModel,
            on_fail: None,
            show_image: false,
            show_results: false,
        },
        WorkflowState::LoadingModel => StateSpec {
            on_next: WorkflowState::ModelReady,
            on_fail: Some(WorkflowState::Initial),
            show_image: false,
            show_results: false,
        },
        WorkflowState::ModelReady => StateSpec {
            on_next: WorkflowState::ImageReady,
            on_fail: None,
            show_image: false,
            show_results: false,
        },
        WorkflowState::ImageReady => StateSpec {
            on_next: WorkflowState::Identifying,
            on_fail: None,
            show_image: true,
            show_results: false,
        },
        WorkflowState::Identifying => StateSpec {
            on_next: WorkflowState::Complete,
            on_fail: Some(WorkflowState::ImageReady),
            show_image: false,
            show_results: false,
        },
        // The cycle re-enters at ModelReady; the model is never reloaded
        WorkflowState::Complete => StateSpec {
            on_next: WorkflowState::ModelReady,
            on_fail: None,
            show_image: true,
            show_results: true,
        },
    }
}

/// Successor of `state` under `event`, if the state accepts the event
pub fn successor(state: WorkflowState, event: &WorkflowEvent) -> Option<WorkflowState> {
    let spec = state_spec(state);
    match event {
        WorkflowEvent::Next => Some(spec.on_next),
        WorkflowEvent::Fail => spec.on_fail,
        WorkflowEvent::Other(_) => None,
    }
}

/// Pure reducer: `(state, event) -> state`
///
/// Events the current state does not accept land on [`FALLBACK_STATE`].
pub fn reduce(state: WorkflowState, event: &WorkflowEvent) -> WorkflowState {
    match successor(state, event) {
        Some(next) => next,
        None => FALLBACK_STATE,
    }
}
