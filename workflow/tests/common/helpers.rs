//! Test helpers and builder patterns for workflow tests
//!
//! mockall expectations answer immediately, so scenarios that need an
//! operation to stay pending (busy guard, teardown, superseded results) use
//! the gated doubles at the bottom of this file instead.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

use shared::{ClassificationResult, SelectedFile};
use workflow::*;

use super::fixtures::TestFixtures;

/// Orchestrator wired with mockall doubles only
pub type TestWorkflow = Orchestrator<MockModelLoader, MockImagePicker>;

/// Builder for test orchestrators with sensible defaults
pub struct WorkflowBuilder {
    loader: MockModelLoader,
    picker: MockImagePicker,
    policy: FailurePolicy,
}

impl WorkflowBuilder {
    /// Mocks without expectations; any capability call fails the test
    pub fn new() -> Self {
        Self {
            loader: MockModelLoader::new(),
            picker: MockImagePicker::new(),
            policy: FailurePolicy::Stall,
        }
    }

    /// Configure the loader mock with a setup function
    pub fn with_loader<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockModelLoader),
    {
        setup(&mut self.loader);
        self
    }

    /// Configure the picker mock with a setup function
    pub fn with_picker<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockImagePicker),
    {
        setup(&mut self.picker);
        self
    }

    /// Loader that hands out `classifier` and may be called exactly once
    pub fn with_model(mut self, classifier: MockImageClassifier) -> Self {
        self.loader
            .expect_load()
            .times(1)
            .return_once(move || Ok(Arc::new(classifier) as ModelHandle));
        self
    }

    /// Picker that selects `file` every time it is asked
    pub fn with_selection(mut self, file: SelectedFile) -> Self {
        self.picker
            .expect_pick()
            .returning(move || Ok(vec![file.clone()]));
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> TestWorkflow {
        Orchestrator::new(self.loader, self.picker).with_failure_policy(self.policy)
    }
}

/// Collection of test helper functions
pub struct TestHelpers;

impl TestHelpers {
    /// Classifier that always answers `results`
    pub fn classifier_returning(results: Vec<ClassificationResult>) -> MockImageClassifier {
        let mut classifier = MockImageClassifier::new();
        classifier
            .expect_classify()
            .returning(move |_| Ok(results.clone()));
        classifier
    }

    /// Classifier that fails `failures` times before answering `results`
    pub fn flaky_classifier(failures: usize, results: Vec<ClassificationResult>) -> MockImageClassifier {
        let calls = AtomicUsize::new(0);
        let mut classifier = MockImageClassifier::new();
        classifier.expect_classify().returning(move |_| {
            if calls.fetch_add(1, Ordering::SeqCst) < failures {
                Err(CapabilityError::classify("inference backend unavailable"))
            } else {
                Ok(results.clone())
            }
        });
        classifier
    }

    /// Orchestrator with a cat-answering model and a picker selecting the cat photo
    pub fn cat_workflow() -> TestWorkflow {
        WorkflowBuilder::new()
            .with_model(Self::classifier_returning(TestFixtures::cat_results()))
            .with_selection(TestFixtures::selected_image())
            .build()
    }

    /// Load the model and pick an image
    pub async fn drive_to_image_ready<L, P>(orchestrator: &Orchestrator<L, P>)
    where
        L: ModelLoader + 'static,
        P: ImagePicker + 'static,
    {
        orchestrator.load_model().await.unwrap();
        assert!(orchestrator.request_image().await.unwrap().is_some());
        assert_eq!(orchestrator.state().await, WorkflowState::ImageReady);
    }

    /// Wait until some operation has claimed the session
    pub async fn wait_until_in_flight<L, P>(orchestrator: &Orchestrator<L, P>) -> WorkflowAction
    where
        L: ModelLoader + 'static,
        P: ImagePicker + 'static,
    {
        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                if let Some(action) = orchestrator.session().lock().await.in_flight() {
                    return action;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("operation never started")
    }
}

/// One-shot release for a pending capability call
#[derive(Clone, Default)]
pub struct Gate(Arc<Notify>);

impl Gate {
    pub fn open(&self) {
        self.0.notify_one();
    }

    async fn wait(&self) {
        self.0.notified().await;
    }
}

/// Loader whose `load` stays pending until its gate opens
pub struct GatedLoader {
    gate: Gate,
    handle: ModelHandle,
    calls: Arc<AtomicUsize>,
}

impl GatedLoader {
    pub fn new(classifier: MockImageClassifier) -> (Self, Gate) {
        let gate = Gate::default();
        let loader = Self {
            gate: gate.clone(),
            handle: Arc::new(classifier),
            calls: Arc::new(AtomicUsize::new(0)),
        };
        (loader, gate)
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ModelLoader for GatedLoader {
    async fn load(&self) -> CapabilityResult<ModelHandle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.wait().await;
        Ok(Arc::clone(&self.handle))
    }
}

/// Picker whose `pick` stays pending until its gate opens
pub struct GatedPicker {
    gate: Gate,
    files: Vec<SelectedFile>,
}

impl GatedPicker {
    pub fn new(files: Vec<SelectedFile>) -> (Self, Gate) {
        let gate = Gate::default();
        (
            Self {
                gate: gate.clone(),
                files,
            },
            gate,
        )
    }
}

#[async_trait]
impl ImagePicker for GatedPicker {
    async fn pick(&self) -> CapabilityResult<Vec<SelectedFile>> {
        self.gate.wait().await;
        Ok(self.files.clone())
    }
}
