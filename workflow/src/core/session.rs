//! Consolidated workflow session state
//!
//! The current state, the model handle, the selected image and the results
//! live together in one struct so display flags and data cannot drift apart.
//! Pure state management; no I/O.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use shared::{ClassificationResult, ImageReference};

use super::machine::{self, WorkflowAction, WorkflowEvent, WorkflowState};
use crate::error::{WorkflowError, WorkflowResult};
use crate::traits::ModelHandle;

/// Outcome of applying one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: WorkflowState,
    pub event: WorkflowEvent,
    pub to: WorkflowState,
    /// The event was not accepted and the reducer used the fallback state
    pub fell_back: bool,
}

/// Record of the most recent capability failure
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowFailure {
    pub action: WorkflowAction,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl WorkflowFailure {
    pub fn new(action: WorkflowAction, message: impl Into<String>) -> Self {
        Self {
            action,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Derived display flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Visibility {
    pub show_image: bool,
    pub show_results: bool,
}

impl Visibility {
    pub fn for_state(state: WorkflowState) -> Self {
        let spec = machine::state_spec(state);
        Self {
            show_image: spec.show_image,
            show_results: spec.show_results,
        }
    }
}

/// Slot naming the action currently awaiting a capability
#[derive(Clone, Default)]
struct InFlightSlot(Arc<Mutex<Option<WorkflowAction>>>);

impl InFlightSlot {
    fn lock(&self) -> MutexGuard<'_, Option<WorkflowAction>> {
        // The slot holds a plain Option, so a poisoned lock still has valid data
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current(&self) -> Option<WorkflowAction> {
        *self.lock()
    }
}

/// Claim on the busy slot; releases it when dropped
///
/// Held for the whole operation, so an operation future dropped mid-await
/// (timeout, `select!`, torn-down caller) frees the slot too.
#[must_use = "the busy slot is released as soon as the guard is dropped"]
pub struct InFlightGuard {
    slot: InFlightSlot,
    action: WorkflowAction,
}

impl InFlightGuard {
    pub fn action(&self) -> WorkflowAction {
        self.action
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut current = self.slot.lock();
        if *current == Some(self.action) {
            *current = None;
        }
    }
}

impl fmt::Debug for InFlightGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InFlightGuard").field(&self.action).finish()
    }
}

pub struct WorkflowSession {
    state: WorkflowState,
    model: Option<ModelHandle>,
    image: Option<ImageReference>,
    results: Vec<ClassificationResult>,
    last_error: Option<WorkflowFailure>,
    in_flight: InFlightSlot,
}

impl WorkflowSession {
    pub fn new() -> Self {
        Self {
            state: machine::INITIAL_STATE,
            model: None,
            image: None,
            results: Vec::new(),
            last_error: None,
            in_flight: InFlightSlot::default(),
        }
    }

    /// Run the reducer and keep the session data consistent with the result
    pub fn apply(&mut self, event: WorkflowEvent) -> Transition {
        let from = self.state;
        let fell_back = machine::successor(from, &event).is_none();
        let to = machine::reduce(from, &event);

        if fell_back {
            // Back to the start: nothing loaded, nothing selected
            self.model = None;
            self.image = None;
        }
        if to != WorkflowState::Complete {
            self.results.clear();
        }
        self.state = to;

        Transition {
            from,
            event,
            to,
            fell_back,
        }
    }

    /// Mark `action` as in flight until the returned guard is dropped;
    /// fails if another action is pending or the action is not bound to the
    /// current state
    pub fn begin(&mut self, action: WorkflowAction) -> WorkflowResult<InFlightGuard> {
        let mut current = self.in_flight.lock();
        if let Some(in_flight) = *current {
            return Err(WorkflowError::Busy { action, in_flight });
        }
        if self.state != action.required_state() {
            return Err(WorkflowError::ActionNotAvailable {
                action,
                state: self.state,
            });
        }
        *current = Some(action);
        Ok(InFlightGuard {
            slot: self.in_flight.clone(),
            action,
        })
    }

    pub fn store_model(&mut self, model: ModelHandle) {
        self.model = Some(model);
    }

    /// Replace the current image, handing back the one it displaces
    pub fn replace_image(&mut self, image: ImageReference) -> Option<ImageReference> {
        self.image.replace(image)
    }

    pub fn store_results(&mut self, results: Vec<ClassificationResult>) {
        self.results = results;
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
    }

    pub fn record_failure(&mut self, failure: WorkflowFailure) {
        self.last_error = Some(failure);
    }

    pub fn clear_failure(&mut self) {
        self.last_error = None;
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::for_state(self.state)
    }

    // Accessors
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn model(&self) -> Option<&ModelHandle> {
        self.model.as_ref()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn image(&self) -> Option<&ImageReference> {
        self.image.as_ref()
    }

    pub fn results(&self) -> &[ClassificationResult] {
        &self.results
    }

    pub fn last_error(&self) -> Option<&WorkflowFailure> {
        self.last_error.as_ref()
    }

    pub fn in_flight(&self) -> Option<WorkflowAction> {
        self.in_flight.current()
    }
}

impl Default for WorkflowSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WorkflowSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowSession")
            .field("state", &self.state)
            .field("has_model", &self.model.is_some())
            .field("image", &self.image)
            .field("results", &self.results)
            .field("last_error", &self.last_error)
            .field("in_flight", &self.in_flight.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockImageClassifier;
    use shared::SelectedFile;

    fn session_in(state: WorkflowState) -> WorkflowSession {
        let mut session = WorkflowSession::new();
        while session.state() != state {
            session.apply(WorkflowEvent::Next);
        }
        session
    }

    fn image() -> ImageReference {
        ImageReference::from_file(&SelectedFile::from_path("/tmp/cat.jpg"))
    }

    #[test]
    fn test_new_session_is_initial_and_empty() {
        let session = WorkflowSession::new();
        assert_eq!(session.state(), WorkflowState::Initial);
        assert!(!session.has_model());
        assert!(session.image().is_none());
        assert!(session.results().is_empty());
        assert_eq!(session.visibility(), Visibility::default());
    }

    #[test]
    fn test_results_cleared_when_leaving_complete() {
        let mut session = session_in(WorkflowState::Complete);
        session.store_results(vec![ClassificationResult::new("cat", 0.97).unwrap()]);

        let transition = session.apply(WorkflowEvent::Next);

        assert_eq!(transition.to, WorkflowState::ModelReady);
        assert!(!transition.fell_back);
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_fallback_drops_session_data() {
        let mut session = session_in(WorkflowState::ImageReady);
        session.store_model(Arc::new(MockImageClassifier::new()));
        session.replace_image(image());

        let transition = session.apply(WorkflowEvent::parse("bogus"));

        assert!(transition.fell_back);
        assert_eq!(transition.to, WorkflowState::Initial);
        assert!(!session.has_model());
        assert!(session.image().is_none());
    }

    #[test]
    fn test_begin_enforces_state_and_single_flight() {
        let mut session = WorkflowSession::new();

        let err = session.begin(WorkflowAction::Identify).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::ActionNotAvailable {
                action: WorkflowAction::Identify,
                state: WorkflowState::Initial
            }
        ));

        let guard = session.begin(WorkflowAction::LoadModel).unwrap();
        assert_eq!(guard.action(), WorkflowAction::LoadModel);
        assert_eq!(session.in_flight(), Some(WorkflowAction::LoadModel));

        let err = session.begin(WorkflowAction::LoadModel).unwrap_err();
        assert!(matches!(err, WorkflowError::Busy { .. }));

        drop(guard);
        assert_eq!(session.in_flight(), None);
        drop(session.begin(WorkflowAction::LoadModel).unwrap());
        assert_eq!(session.in_flight(), None);
    }

    #[test]
    fn test_guard_outlives_session_borrow() {
        let mut session = WorkflowSession::new();
        let guard = session.begin(WorkflowAction::LoadModel).unwrap();

        // The guard is independent of the session borrow that created it
        session.apply(WorkflowEvent::Next);
        assert_eq!(session.in_flight(), Some(WorkflowAction::LoadModel));

        drop(guard);
        assert!(session.in_flight().is_none());
    }

    #[test]
    fn test_replace_image_returns_previous() {
        let mut session = WorkflowSession::new();
        assert!(session.replace_image(image()).is_none());

        let second = image();
        let previous = session.replace_image(second.clone());
        assert!(previous.is_some());
        assert_eq!(session.image(), Some(&second));
    }

    #[test]
    fn test_visibility_tracks_state() {
        let session = session_in(WorkflowState::ImageReady);
        assert_eq!(
            session.visibility(),
            Visibility {
                show_image: true,
                show_results: false
            }
        );

        let session = session_in(WorkflowState::Complete);
        assert!(session.visibility().show_results);
    }
}
