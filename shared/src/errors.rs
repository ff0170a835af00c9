//! Shared error types for the classification workflow

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SharedError {
    #[error("Invalid probability for '{label}': {value} (expected 0.0..=1.0)")]
    InvalidProbability { label: String, value: f64 },

    #[error("Empty classification label")]
    EmptyLabel,

    #[error("Invalid session id: {input}")]
    InvalidSessionId { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
