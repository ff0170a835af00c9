//! Model capability backed by a remote classification service
//!
//! Protocol:
//! - `GET  {endpoint}/health` must answer 2xx before the model counts as loaded
//! - `POST {endpoint}/classify` with the raw image bytes answers a JSON array
//!   of `{"className": ..., "probability": ...}` in ranking order

use async_trait::async_trait;
use std::sync::Arc;

use shared::{ClassificationResult, ImageReference};
use tracing::debug;

use crate::error::{CapabilityError, CapabilityResult};
use crate::traits::{ImageClassifier, ModelHandle, ModelLoader};

pub struct HttpModelLoader {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpModelLoader {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ModelLoader for HttpModelLoader {
    async fn load(&self) -> CapabilityResult<ModelHandle> {
        let url = format!("{}/health", self.endpoint);
        debug!("Checking classifier health at {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CapabilityError::model_load(format!("{url}: {e}")))?;

        if !response.status().is_success() {
            return Err(CapabilityError::model_load(format!(
                "{url} answered HTTP {}",
                response.status()
            )));
        }

        Ok(Arc::new(HttpClassifier {
            classify_url: format!("{}/classify", self.endpoint),
            client: self.client.clone(),
        }))
    }
}

/// Handle to a reachable classification service
pub struct HttpClassifier {
    classify_url: String,
    client: reqwest::Client,
}

#[async_trait]
impl ImageClassifier for HttpClassifier {
    async fn classify(&self, image: &ImageReference) -> CapabilityResult<Vec<ClassificationResult>> {
        let bytes = tokio::fs::read(&image.path)
            .await
            .map_err(|source| CapabilityError::ImageAccess {
                path: image.path.clone(),
                source,
            })?;
        debug!("Posting {} bytes of {} to {}", bytes.len(), image.name, self.classify_url);

        let response = self
            .client
            .post(&self.classify_url)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| CapabilityError::classify(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CapabilityError::classify(format!("HTTP {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CapabilityError::classify(format!("Failed to read response: {e}")))?;

        parse_results(&body)
    }
}

/// Decode and validate a `/classify` response body
pub fn parse_results(body: &str) -> CapabilityResult<Vec<ClassificationResult>> {
    let results: Vec<ClassificationResult> = serde_json::from_str(body)
        .map_err(|e| CapabilityError::classify(format!("Failed to parse response: {e}")))?;

    for result in &results {
        result
            .validate()
            .map_err(|e| CapabilityError::classify(e.to_string()))?;
    }

    Ok(results)
}
