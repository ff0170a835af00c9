//! View binding: what the control surface shows for a given state
//!
//! Everything here is derived from the session on demand; nothing is cached.

use shared::ClassificationResult;

use super::machine::{WorkflowAction, WorkflowState};
use super::session::{Visibility, WorkflowSession};
use crate::config::Locale;

/// Control labels, one per state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLabels {
    pub load_model: String,
    pub loading_model: String,
    pub request_image: String,
    pub identify: String,
    pub identifying: String,
    pub reset: String,
}

impl ActionLabels {
    pub fn english() -> Self {
        Self {
            load_model: "Load model".to_string(),
            loading_model: "Loading model...".to_string(),
            request_image: "Upload photo".to_string(),
            identify: "Identify".to_string(),
            identifying: "Identifying...".to_string(),
            reset: "Reset".to_string(),
        }
    }

    pub fn turkish() -> Self {
        Self {
            load_model: "Modeli Yükle".to_string(),
            loading_model: "Model Yükleniyor...".to_string(),
            request_image: "Fotoğraf yükle".to_string(),
            identify: "Sınıflandır".to_string(),
            identifying: "Sınıflandırılıyor...".to_string(),
            reset: "Tekrar".to_string(),
        }
    }

    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self::english(),
            Locale::Tr => Self::turkish(),
        }
    }

    pub fn label_for(&self, state: WorkflowState) -> &str {
        match state {
            WorkflowState::Initial => &self.load_model,
            WorkflowState::LoadingModel => &self.loading_model,
            WorkflowState::ModelReady => &self.request_image,
            WorkflowState::ImageReady => &self.identify,
            WorkflowState::Identifying => &self.identifying,
            WorkflowState::Complete => &self.reset,
        }
    }
}

impl Default for ActionLabels {
    fn default() -> Self {
        Self::english()
    }
}

/// The single control exposed to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlAction {
    pub action: Option<WorkflowAction>,
    pub label: String,
}

impl ControlAction {
    pub fn is_enabled(&self) -> bool {
        self.action.is_some()
    }
}

pub fn visibility(state: WorkflowState) -> Visibility {
    Visibility::for_state(state)
}

pub fn current_action(state: WorkflowState, labels: &ActionLabels) -> ControlAction {
    ControlAction {
        action: WorkflowAction::for_state(state),
        label: labels.label_for(state).to_string(),
    }
}

/// `label: %NN.NN`, ties rounded away from zero
pub fn format_result(result: &ClassificationResult) -> String {
    // `{:.2}` alone would round exact ties to even (0.125 -> 0.12)
    let percentage = (result.percentage() * 100.0).round() / 100.0;
    format!("{}: %{:.2}", result.label, percentage)
}

/// Render-ready snapshot of a session
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub state: WorkflowState,
    pub image_url: Option<String>,
    pub image_name: Option<String>,
    pub result_lines: Vec<String>,
    pub control: ControlAction,
    pub error: Option<String>,
}

impl ViewModel {
    pub fn from_session(session: &WorkflowSession, labels: &ActionLabels) -> Self {
        let state = session.state();
        let shown = visibility(state);

        let image = session.image().filter(|_| shown.show_image);
        let result_lines = if shown.show_results {
            session.results().iter().map(format_result).collect()
        } else {
            Vec::new()
        };

        Self {
            state,
            image_url: image.map(|i| i.url.clone()),
            image_name: image.map(|i| i.name.clone()),
            result_lines,
            control: current_action(state, labels),
            error: session
                .last_error()
                .map(|f| format!("{} failed: {}", f.action, f.message)),
        }
    }

    /// Plain-text rendering for terminal front-ends
    pub fn render(&self) -> String {
        let mut out = String::new();

        if let (Some(name), Some(url)) = (&self.image_name, &self.image_url) {
            out.push_str(&format!("🖼  {name} <{url}>\n"));
        }
        for line in &self.result_lines {
            out.push_str(&format!("  • {line}\n"));
        }
        if let Some(error) = &self.error {
            out.push_str(&format!("⚠️  {error}\n"));
        }

        if self.control.is_enabled() {
            out.push_str(&format!("[ {} ]", self.control.label));
        } else {
            out.push_str(&format!("( {} )", self.control.label));
        }
        out
    }
}
