//! Offline model capability that produces plausible random rankings

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

use shared::{ClassificationResult, ImageReference};
use tracing::debug;

use crate::error::{CapabilityError, CapabilityResult};
use crate::traits::{ImageClassifier, ModelHandle, ModelLoader};

const VOCABULARY: &[&str] = &[
    "tabby cat",
    "tiger cat",
    "Egyptian cat",
    "golden retriever",
    "beagle",
    "red fox",
    "lynx",
    "goldfinch",
    "sports car",
    "mountain bike",
    "espresso",
    "pizza",
    "banana",
    "teapot",
    "lighthouse",
    "volcano",
];

pub struct RandomModelLoader {
    top_k: usize,
    seed: Option<u64>,
}

impl RandomModelLoader {
    pub fn new(top_k: usize) -> Self {
        Self { top_k, seed: None }
    }

    /// Deterministic rankings for tests and demos
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[async_trait]
impl ModelLoader for RandomModelLoader {
    async fn load(&self) -> CapabilityResult<ModelHandle> {
        if self.top_k == 0 {
            return Err(CapabilityError::model_load("top_k must be at least 1"));
        }

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!("Random model ready (top_k={}, seeded={})", self.top_k, self.seed.is_some());

        Ok(Arc::new(RandomClassifier {
            top_k: self.top_k.min(VOCABULARY.len()),
            rng: Mutex::new(rng),
        }))
    }
}

pub struct RandomClassifier {
    top_k: usize,
    rng: Mutex<StdRng>,
}

impl RandomClassifier {
    fn rank(&self) -> CapabilityResult<Vec<ClassificationResult>> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| CapabilityError::classify("random source poisoned"))?;

        let labels: Vec<&str> = VOCABULARY.choose_multiple(&mut *rng, self.top_k).copied().collect();
        let weights: Vec<f64> = labels.iter().map(|_| rng.gen_range(0.05..1.0)).collect();
        // The rest of the vocabulary keeps some mass so the top-k never sums past 1
        let rest: f64 = rng.gen_range(0.0..0.5);
        let total: f64 = weights.iter().sum::<f64>() + rest;

        let mut results = labels
            .into_iter()
            .zip(weights)
            .map(|(label, weight)| ClassificationResult::new(label, weight / total))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CapabilityError::classify(e.to_string()))?;

        results.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        Ok(results)
    }
}

#[async_trait]
impl ImageClassifier for RandomClassifier {
    async fn classify(&self, image: &ImageReference) -> CapabilityResult<Vec<ClassificationResult>> {
        debug!("Ranking {} at random", image.name);
        self.rank()
    }
}
