//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};

/// Unique identifier for one workflow session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> SharedResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SharedError::InvalidSessionId { input: s.to_string() })
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session_{}", &self.0.simple().to_string()[..8])
    }
}

/// One label/probability pair produced by a classification model
///
/// The serialized field name is `className`, which is what classification
/// services emit; `label` is accepted on input as well.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "className", alias = "label")]
    pub label: String,
    pub probability: f64,
}

impl ClassificationResult {
    /// Build a validated result
    pub fn new(label: impl Into<String>, probability: f64) -> SharedResult<Self> {
        let result = Self {
            label: label.into(),
            probability,
        };
        result.validate()?;
        Ok(result)
    }

    /// Check that the label is non-empty and the probability lies in `[0, 1]`
    pub fn validate(&self) -> SharedResult<()> {
        if self.label.trim().is_empty() {
            return Err(SharedError::EmptyLabel);
        }
        if !self.probability.is_finite() || !(0.0..=1.0).contains(&self.probability) {
            return Err(SharedError::InvalidProbability {
                label: self.label.clone(),
                value: self.probability,
            });
        }
        Ok(())
    }

    /// Probability on the percentage scale
    pub fn percentage(&self) -> f64 {
        self.probability * 100.0
    }
}

/// A file handed over by the image-acquisition capability
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: Option<u64>,
}

impl SelectedFile {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let size_bytes = std::fs::metadata(&path).ok().map(|m| m.len());

        Self {
            path,
            name,
            size_bytes,
        }
    }
}

/// Transient handle to the image currently shown to the user
///
/// Every upload mints a fresh `blob:` URL, so two uploads of the same file
/// never compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    pub url: String,
    pub path: PathBuf,
    pub name: String,
}

impl ImageReference {
    pub fn from_file(file: &SelectedFile) -> Self {
        Self {
            url: format!("blob:{}", Uuid::new_v4()),
            path: file.path.clone(),
            name: file.name.clone(),
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}
