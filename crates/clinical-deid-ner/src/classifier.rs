//! Token-classification seam and test doubles.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::aggregation::{TokenPrediction, OUTSIDE};

/// NER errors.
#[derive(Error, Debug)]
pub enum NerError {
    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("No model directory configured")]
    NotConfigured,

    #[error("Model initialization failed: {0}")]
    ModelInit(String),

    #[error("Invalid label configuration: {0}")]
    LabelConfig(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}

pub type NerResult<T> = Result<T, NerError>;

/// A loaded sequence-labelling model.
pub trait TokenClassifier: Send + Sync {
    /// Predict one label per token of `text`. Offsets are character indices.
    fn classify(&self, text: &str) -> NerResult<Vec<TokenPrediction>>;
}

/// Acquires a [`TokenClassifier`]. Called at most once per detector.
pub trait ModelLoader: Send + Sync {
    /// Human-readable description of what is being loaded (for logs).
    fn describe(&self) -> String;

    fn load(&self) -> NerResult<Box<dyn TokenClassifier>>;
}

/// Mock classifier for testing without model inference.
///
/// Splits on whitespace and tags every word found in its vocabulary. Runs of
/// words with the same entity type get `B-` then `I-` tags, like a real model
/// would emit for a multi-word name.
#[derive(Debug, Clone, Default)]
pub struct MockTokenClassifier {
    vocabulary: HashMap<String, String>,
    fail_on: Option<String>,
}

impl MockTokenClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag `word` (exact match, punctuation stripped) with `entity`.
    pub fn with_entity(mut self, word: &str, entity: &str) -> Self {
        self.vocabulary.insert(word.to_string(), entity.to_string());
        self
    }

    /// Fail inference for any input containing `needle`.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }
}

impl TokenClassifier for MockTokenClassifier {
    fn classify(&self, text: &str) -> NerResult<Vec<TokenPrediction>> {
        if let Some(needle) = &self.fail_on {
            if text.contains(needle.as_str()) {
                return Err(NerError::Inference(format!("mock failure on {needle:?}")));
            }
        }

        let mut predictions = vec![TokenPrediction::special(0, 0)];
        let mut previous: Option<&str> = None;
        let mut word_start: Option<usize> = None;

        let chars: Vec<char> = text.chars().collect();
        for idx in 0..=chars.len() {
            let at_boundary = idx == chars.len() || chars[idx].is_whitespace();
            match (at_boundary, word_start) {
                (false, None) => word_start = Some(idx),
                (true, Some(start)) => {
                    let raw: String = chars[start..idx].iter().collect();
                    let word = raw.trim_end_matches(|c: char| c.is_ascii_punctuation());
                    let end = start + word.chars().count();

                    let entity = self.vocabulary.get(word).map(String::as_str);
                    let label = match entity {
                        Some(e) if previous == Some(e) => format!("I-{e}"),
                        Some(e) => format!("B-{e}"),
                        None => OUTSIDE.to_string(),
                    };
                    predictions.push(TokenPrediction::new(label, 0.9, start, end));

                    previous = entity;
                    word_start = None;
                }
                _ => {}
            }
        }

        let len = chars.len();
        predictions.push(TokenPrediction::special(len, len));
        Ok(predictions)
    }
}

/// Mock loader that counts how often it is asked to load.
#[derive(Debug, Clone)]
pub struct MockModelLoader {
    outcome: Result<MockTokenClassifier, String>,
    delay: Duration,
    loads: Arc<AtomicUsize>,
}

impl MockModelLoader {
    /// Loader that succeeds with `classifier`.
    pub fn ready(classifier: MockTokenClassifier) -> Self {
        Self {
            outcome: Ok(classifier),
            delay: Duration::ZERO,
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Loader that always fails with `reason`.
    pub fn failing(reason: &str) -> Self {
        Self {
            outcome: Err(reason.to_string()),
            delay: Duration::ZERO,
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep for `delay` inside every load.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of load attempts so far. Shared between clones.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ModelLoader for MockModelLoader {
    fn describe(&self) -> String {
        "mock model".to_string()
    }

    fn load(&self) -> NerResult<Box<dyn TokenClassifier>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        match &self.outcome {
            Ok(classifier) => Ok(Box::new(classifier.clone())),
            Err(reason) => Err(NerError::ModelInit(reason.clone())),
        }
    }
}
