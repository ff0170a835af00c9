//! Command line and runtime configuration
//!
//! `Args` is what clap parses (flags, env fallbacks, `.env` values loaded by
//! the binary beforehand). `WorkflowConfig` is the validated form the rest of
//! the crate consumes.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::error::{WorkflowError, WorkflowResult};

/// What happens when the model fails to load or to classify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FailurePolicy {
    /// Stay in the pending state; the failure is recorded and returned
    #[default]
    Stall,
    /// Also fire `fail`, returning to the last stable state so the action can be retried
    Recover,
}

/// Which model capability backs the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelProvider {
    /// Remote classification service over HTTP
    Http,
    /// Offline model producing random rankings
    Random,
}

/// Language of the control labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Locale {
    #[default]
    En,
    Tr,
}

/// Image classification workflow: load a model, pick an image, classify it
#[derive(Parser, Debug, Clone)]
#[command(name = "workflow")]
#[command(about = "Interactive image classification workflow")]
pub struct Args {
    /// Model provider
    #[arg(long, value_enum, default_value = "random")]
    pub provider: ModelProvider,

    /// Base URL of the classification service (required with --provider http)
    #[arg(long, env = "CLASSIFIER_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Image to classify; repeat for several images. Enables batch mode
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,

    /// Number of labels the random provider returns per image
    #[arg(long, default_value = "5")]
    pub top_k: usize,

    /// Control label language
    #[arg(long, value_enum, default_value = "en")]
    pub locale: Locale,

    /// Behaviour when a model call fails
    #[arg(long = "on-failure", value_enum, default_value = "recover")]
    pub failure_policy: FailurePolicy,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Validated runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    pub provider: ModelProvider,
    pub endpoint: Option<String>,
    pub images: Vec<PathBuf>,
    pub top_k: usize,
    pub locale: Locale,
    pub failure_policy: FailurePolicy,
    pub log_level: String,
}

impl WorkflowConfig {
    /// Batch mode runs every `--image` through one full cycle without prompting
    pub fn is_batch(&self) -> bool {
        !self.images.is_empty()
    }

    fn validate(self) -> WorkflowResult<Self> {
        if self.provider == ModelProvider::Http {
            match self.endpoint.as_deref() {
                None => {
                    return Err(WorkflowError::config(
                        "--endpoint (or CLASSIFIER_ENDPOINT) is required with --provider http",
                    ));
                }
                Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                    return Err(WorkflowError::config(format!("endpoint must be an http(s) URL: {url}")));
                }
                Some(_) => {}
            }
        }
        if self.top_k == 0 {
            return Err(WorkflowError::config("--top-k must be at least 1"));
        }
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.as_str()) {
            return Err(WorkflowError::config(format!("unknown log level: {}", self.log_level)));
        }
        Ok(self)
    }
}

impl TryFrom<Args> for WorkflowConfig {
    type Error = WorkflowError;

    fn try_from(args: Args) -> WorkflowResult<Self> {
        WorkflowConfig {
            provider: args.provider,
            endpoint: args.endpoint.map(|e| e.trim_end_matches('/').to_string()),
            images: args.images,
            top_k: args.top_k,
            locale: args.locale,
            failure_policy: args.failure_policy,
            log_level: args.log_level.to_ascii_lowercase(),
        }
        .validate()
    }
}
