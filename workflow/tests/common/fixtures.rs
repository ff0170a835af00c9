//! Test fixtures and data for workflow tests

#![allow(dead_code)]

use shared::{ClassificationResult, SelectedFile};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const CAT_LABEL: &'static str = "cat";
    pub const CAT_PROBABILITY: f64 = 0.97;
    pub const CAT_LINE: &'static str = "cat: %97.00";

    pub const IMAGE_PATH: &'static str = "/photos/cat.jpg";
    pub const SECOND_IMAGE_PATH: &'static str = "/photos/dog.png";

    /// The single-label answer most scenarios expect from the model
    pub fn cat_results() -> Vec<ClassificationResult> {
        vec![ClassificationResult::new(Self::CAT_LABEL, Self::CAT_PROBABILITY).unwrap()]
    }

    /// A ranked answer with several labels
    pub fn ranked_results() -> Vec<ClassificationResult> {
        vec![
            ClassificationResult::new("tabby cat", 0.62).unwrap(),
            ClassificationResult::new("tiger cat", 0.21).unwrap(),
            ClassificationResult::new("lynx", 0.05).unwrap(),
        ]
    }

    pub fn selected_image() -> SelectedFile {
        SelectedFile {
            path: Self::IMAGE_PATH.into(),
            name: "cat.jpg".to_string(),
            size_bytes: Some(2048),
        }
    }

    pub fn second_image() -> SelectedFile {
        SelectedFile {
            path: Self::SECOND_IMAGE_PATH.into(),
            name: "dog.png".to_string(),
            size_bytes: Some(4096),
        }
    }
}
