//! Workflow orchestrator
//!
//! Pairs each state with the one operation it permits. Every operation calls
//! an injected capability, stores what came back in the session and advances
//! the state through the reducer. The session lock is never held across a
//! capability await.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use shared::{
    ClassificationResult, ImageReference, SelectedFile, SessionId, logging, session_debug, session_error,
    session_info, session_warn,
};

use crate::{
    config::FailurePolicy,
    core::{
        ActionLabels, Transition, ViewModel, WorkflowAction, WorkflowEvent, WorkflowFailure, WorkflowSession,
        WorkflowState,
    },
    error::{CapabilityError, CapabilityResult, WorkflowError, WorkflowResult},
    traits::{ImagePicker, ModelHandle, ModelLoader},
};

/// Drives one classification session
pub struct Orchestrator<L, P>
where
    L: ModelLoader + 'static,
    P: ImagePicker + 'static,
{
    session_id: SessionId,

    /// Consolidated session state
    session: Arc<Mutex<WorkflowSession>>,

    /// Injected capabilities
    loader: L,
    picker: P,

    policy: FailurePolicy,

    /// Cancelled on teardown; each capability await runs under a child token
    cancel: CancellationToken,
}

impl<L, P> Orchestrator<L, P>
where
    L: ModelLoader + 'static,
    P: ImagePicker + 'static,
{
    /// Create new orchestrator with injected capabilities
    pub fn new(loader: L, picker: P) -> Self {
        Self {
            session_id: SessionId::new(),
            session: Arc::new(Mutex::new(WorkflowSession::new())),
            loader,
            picker,
            policy: FailurePolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Shared handle to the session, for view binding
    pub fn session(&self) -> Arc<Mutex<WorkflowSession>> {
        Arc::clone(&self.session)
    }

    pub async fn state(&self) -> WorkflowState {
        self.session.lock().await.state()
    }

    pub async fn results(&self) -> Vec<ClassificationResult> {
        self.session.lock().await.results().to_vec()
    }

    pub async fn image(&self) -> Option<ImageReference> {
        self.session.lock().await.image().cloned()
    }

    pub async fn view(&self, labels: &ActionLabels) -> ViewModel {
        let session = self.session.lock().await;
        ViewModel::from_session(&session, labels)
    }

    /// Cancel pending capability calls; their results will be discarded
    pub fn teardown(&self) {
        if !self.cancel.is_cancelled() {
            session_debug!(self.session_id, "🛑 Tearing down workflow");
            self.cancel.cancel();
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Feed an external event straight to the reducer
    pub async fn dispatch(&self, event: WorkflowEvent) -> WorkflowState {
        let mut session = self.session.lock().await;
        self.apply(&mut session, event).to
    }

    /// Perform whatever action the current state exposes ("click the control")
    ///
    /// # Returns
    /// The action performed, or `None` when the state offers no action
    pub async fn activate(&self) -> WorkflowResult<Option<WorkflowAction>> {
        let state = self.state().await;
        let Some(action) = WorkflowAction::for_state(state) else {
            session_debug!(self.session_id, "⏳ No action available in state {}", state);
            return Ok(None);
        };

        self.perform(action).await?;
        Ok(Some(action))
    }

    pub async fn perform(&self, action: WorkflowAction) -> WorkflowResult<()> {
        match action {
            WorkflowAction::LoadModel => self.load_model().await,
            WorkflowAction::RequestImage => self.request_image().await.map(|_| ()),
            WorkflowAction::Identify => self.identify().await.map(|_| ()),
            WorkflowAction::Reset => self.reset().await,
        }
    }

    /// `Initial`: load the model and keep the handle for the rest of the session
    pub async fn load_model(&self) -> WorkflowResult<()> {
        let action = WorkflowAction::LoadModel;
        self.ensure_live(action)?;

        let guard = {
            let mut session = self.session.lock().await;
            let guard = session.begin(action)?;
            self.apply(&mut session, WorkflowEvent::Next);
            guard
        };
        session_info!(self.session_id, "📦 Loading model...");

        let outcome = self.await_capability(action, self.loader.load()).await;

        let mut session = self.session.lock().await;
        drop(guard);
        let loaded = self.settle(&session, action, WorkflowState::LoadingModel, outcome)?;

        match loaded {
            Ok(model) => {
                session.store_model(model);
                session.clear_failure();
                self.apply(&mut session, WorkflowEvent::Next);
                logging::log_success(&self.session_id, "Model loaded");
                Ok(())
            }
            Err(e) => {
                self.fail(&mut session, action, &e);
                Err(WorkflowError::ModelLoad(e))
            }
        }
    }

    /// `ModelReady`: ask the picker for an image and hand the selection to
    /// [`handle_upload`](Self::handle_upload)
    pub async fn request_image(&self) -> WorkflowResult<Option<ImageReference>> {
        let action = WorkflowAction::RequestImage;
        self.ensure_live(action)?;

        let guard = self.session.lock().await.begin(action)?;

        let outcome = self.await_capability(action, self.picker.pick()).await;
        drop(guard);

        match outcome? {
            Ok(files) => self.handle_upload(files).await,
            Err(e) => {
                session_warn!(self.session_id, "⚠️ Image picker failed: {}", e);
                Err(WorkflowError::ImagePicker(e))
            }
        }
    }

    /// Selection callback from the image-acquisition capability
    ///
    /// An empty selection is a no-op. Otherwise the first file becomes the
    /// current image, replacing (and releasing) the previous one.
    pub async fn handle_upload(&self, files: Vec<SelectedFile>) -> WorkflowResult<Option<ImageReference>> {
        self.ensure_live(WorkflowAction::RequestImage)?;

        let Some(file) = files.first() else {
            session_debug!(self.session_id, "📭 No file selected; staying in current state");
            return Ok(None);
        };

        let mut session = self.session.lock().await;
        if session.state() != WorkflowState::ModelReady {
            session_warn!(
                self.session_id,
                "⚠️ Ignoring upload of {} in state {}",
                file.name,
                session.state()
            );
            return Ok(None);
        }

        let image = ImageReference::from_file(file);
        if let Some(previous) = session.replace_image(image.clone()) {
            session_debug!(self.session_id, "🗑️ Released previous image {}", previous);
        }
        if files.len() > 1 {
            session_debug!(self.session_id, "Using first of {} selected files", files.len());
        }
        self.apply(&mut session, WorkflowEvent::Next);
        session_info!(self.session_id, "🖼️ Image selected: {}", image);

        Ok(Some(image))
    }

    /// `ImageReady`: classify the current image with the stored model
    pub async fn identify(&self) -> WorkflowResult<Vec<ClassificationResult>> {
        let action = WorkflowAction::Identify;
        self.ensure_live(action)?;

        let (guard, model, image) = {
            let mut session = self.session.lock().await;
            let guard = session.begin(action)?;

            let model = session.model().cloned();
            let image = session.image().cloned();
            let (Some(model), Some(image)) = (model, image) else {
                let missing = if session.has_model() {
                    WorkflowError::ImageMissing
                } else {
                    WorkflowError::ModelMissing
                };
                return Err(missing);
            };

            self.apply(&mut session, WorkflowEvent::Next);
            (guard, model, image)
        };
        session_info!(self.session_id, "🔍 Classifying {}", image.name);

        let outcome = self.classify_with(action, &model, &image).await;

        let mut session = self.session.lock().await;
        drop(guard);
        let classified = self.settle(&session, action, WorkflowState::Identifying, outcome)?;

        match classified {
            Ok(results) => {
                session.store_results(results.clone());
                session.clear_failure();
                self.apply(&mut session, WorkflowEvent::Next);
                session_info!(self.session_id, "✅ {} labels for {}", results.len(), image.name);
                Ok(results)
            }
            Err(e) => {
                self.fail(&mut session, action, &e);
                Err(WorkflowError::Classify(e))
            }
        }
    }

    /// `Complete`: clear the results and go back to `ModelReady`
    pub async fn reset(&self) -> WorkflowResult<()> {
        let action = WorkflowAction::Reset;
        self.ensure_live(action)?;

        let mut session = self.session.lock().await;
        let _guard = session.begin(action)?;
        session.clear_results();
        self.apply(&mut session, WorkflowEvent::Next);
        Ok(())
    }

    async fn classify_with(
        &self,
        action: WorkflowAction,
        model: &ModelHandle,
        image: &ImageReference,
    ) -> WorkflowResult<CapabilityResult<Vec<ClassificationResult>>> {
        self.await_capability(action, model.classify(image)).await
    }

    /// Await a capability call unless the workflow is torn down first
    async fn await_capability<T, F>(&self, action: WorkflowAction, call: F) -> WorkflowResult<T>
    where
        F: Future<Output = T>,
    {
        let token = self.cancel.child_token();
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(WorkflowError::Cancelled { action }),
            output = call => {
                if token.is_cancelled() {
                    Err(WorkflowError::Cancelled { action })
                } else {
                    Ok(output)
                }
            }
        }
    }

    /// Decide whether a settled capability result may still be applied
    fn settle<T>(
        &self,
        session: &WorkflowSession,
        action: WorkflowAction,
        expected: WorkflowState,
        outcome: WorkflowResult<T>,
    ) -> WorkflowResult<T> {
        let output = match outcome {
            Ok(output) => output,
            Err(e) => {
                session_warn!(self.session_id, "🚫 Discarding result of {}: {}", action, e);
                return Err(e);
            }
        };
        if self.cancel.is_cancelled() {
            session_warn!(self.session_id, "🚫 Discarding result of {} after teardown", action);
            return Err(WorkflowError::Cancelled { action });
        }
        if session.state() != expected {
            session_warn!(
                self.session_id,
                "🚫 Discarding result of {}: state moved on to {}",
                action,
                session.state()
            );
            return Err(WorkflowError::Superseded {
                action,
                state: session.state(),
            });
        }
        Ok(output)
    }

    fn fail(&self, session: &mut WorkflowSession, action: WorkflowAction, error: &CapabilityError) {
        logging::log_error(&self.session_id, action.name(), error);
        session.record_failure(WorkflowFailure::new(action, error.to_string()));

        match self.policy {
            FailurePolicy::Stall => {
                session_error!(
                    self.session_id,
                    "⛔ Workflow stalled in {} after failed {}",
                    session.state(),
                    action
                );
            }
            FailurePolicy::Recover => {
                let transition = self.apply(session, WorkflowEvent::Fail);
                session_info!(self.session_id, "↩️ Recovered to {} after failed {}", transition.to, action);
            }
        }
    }

    fn ensure_live(&self, action: WorkflowAction) -> WorkflowResult<()> {
        if self.cancel.is_cancelled() {
            return Err(WorkflowError::Cancelled { action });
        }
        Ok(())
    }

    fn apply(&self, session: &mut WorkflowSession, event: WorkflowEvent) -> Transition {
        let transition = session.apply(event);
        logging::log_transition(&self.session_id, &transition.from, &transition.event, &transition.to);
        if transition.fell_back {
            session_warn!(
                self.session_id,
                "⚠️ Event '{}' not accepted in {}; workflow reset to {}",
                transition.event,
                transition.from,
                transition.to
            );
        }
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockImageClassifier, MockImagePicker, MockModelLoader};

    fn idle_orchestrator() -> Orchestrator<MockModelLoader, MockImagePicker> {
        Orchestrator::new(MockModelLoader::new(), MockImagePicker::new())
    }

    #[tokio::test]
    async fn test_new_orchestrator_starts_initial() {
        let orchestrator = idle_orchestrator();
        assert_eq!(orchestrator.state().await, WorkflowState::Initial);
        assert_eq!(orchestrator.failure_policy(), FailurePolicy::Stall);
        assert!(!orchestrator.is_torn_down());
    }

    #[tokio::test]
    async fn test_out_of_state_action_is_rejected_without_effect() {
        let orchestrator = idle_orchestrator();

        let err = orchestrator.identify().await.unwrap_err();
        assert!(matches!(err, WorkflowError::ActionNotAvailable { .. }));

        let err = orchestrator.reset().await.unwrap_err();
        assert!(matches!(err, WorkflowError::ActionNotAvailable { .. }));

        assert_eq!(orchestrator.state().await, WorkflowState::Initial);
        assert!(orchestrator.session().lock().await.in_flight().is_none());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_event_resets() {
        let orchestrator = idle_orchestrator();
        assert_eq!(orchestrator.dispatch(WorkflowEvent::Next).await, WorkflowState::LoadingModel);
        assert_eq!(
            orchestrator.dispatch(WorkflowEvent::parse("bogus")).await,
            WorkflowState::Initial
        );
    }

    #[tokio::test]
    async fn test_empty_upload_is_noop() {
        let orchestrator = idle_orchestrator();
        let uploaded = orchestrator.handle_upload(vec![]).await.unwrap();
        assert!(uploaded.is_none());
        assert_eq!(orchestrator.state().await, WorkflowState::Initial);
    }

    #[tokio::test]
    async fn test_upload_outside_model_ready_is_ignored() {
        let orchestrator = idle_orchestrator();
        let uploaded = orchestrator
            .handle_upload(vec![SelectedFile::from_path("/tmp/cat.jpg")])
            .await
            .unwrap();
        assert!(uploaded.is_none());
        assert!(orchestrator.image().await.is_none());
        assert_eq!(orchestrator.state().await, WorkflowState::Initial);
    }

    #[tokio::test]
    async fn test_stalled_load_keeps_loading_state() {
        let mut loader = MockModelLoader::new();
        loader
            .expect_load()
            .times(1)
            .returning(|| Err(CapabilityError::model_load("network down")));
        let orchestrator = Orchestrator::new(loader, MockImagePicker::new());

        let err = orchestrator.load_model().await.unwrap_err();
        assert!(matches!(err, WorkflowError::ModelLoad(_)));

        let session = orchestrator.session();
        let session = session.lock().await;
        assert_eq!(session.state(), WorkflowState::LoadingModel);
        assert!(!session.has_model());
        assert_eq!(session.last_error().map(|f| f.action), Some(WorkflowAction::LoadModel));
    }

    #[tokio::test]
    async fn test_recovered_load_returns_to_initial() {
        let mut loader = MockModelLoader::new();
        loader
            .expect_load()
            .times(1)
            .returning(|| Err(CapabilityError::model_load("network down")));
        let orchestrator =
            Orchestrator::new(loader, MockImagePicker::new()).with_failure_policy(FailurePolicy::Recover);

        assert!(orchestrator.load_model().await.is_err());
        assert_eq!(orchestrator.state().await, WorkflowState::Initial);
    }

    #[tokio::test]
    async fn test_teardown_blocks_new_operations() {
        let orchestrator = idle_orchestrator();
        orchestrator.teardown();
        orchestrator.teardown();

        let err = orchestrator.load_model().await.unwrap_err();
        assert!(matches!(err, WorkflowError::Cancelled { action: WorkflowAction::LoadModel }));
        assert_eq!(orchestrator.state().await, WorkflowState::Initial);
    }

    #[tokio::test]
    async fn test_load_stores_handle() {
        let mut loader = MockModelLoader::new();
        loader
            .expect_load()
            .times(1)
            .return_once(|| Ok(Arc::new(MockImageClassifier::new()) as ModelHandle));
        let orchestrator = Orchestrator::new(loader, MockImagePicker::new());

        assert_eq!(orchestrator.activate().await.unwrap(), Some(WorkflowAction::LoadModel));
        assert_eq!(orchestrator.state().await, WorkflowState::ModelReady);
        assert!(orchestrator.session().lock().await.has_model());
    }
}
