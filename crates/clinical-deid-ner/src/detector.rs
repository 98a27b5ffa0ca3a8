//! Model-based span detector with lazy, single-flight loading.
//!
//! The model is not touched until the first call that needs it. Whatever that
//! first load produces (a ready classifier or a failure reason) is kept for the
//! life of the detector: a failed load is never retried.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

use clinical_deid_core::{DetectError, DetectResult, Span, SpanDetector};
use serde::Serialize;

use crate::aggregation::{aggregate_simple, EntityGroup};
use crate::classifier::{ModelLoader, NerError, TokenClassifier};

enum ModelState {
    Ready(Box<dyn TokenClassifier>),
    Unavailable(String),
}

/// Load state as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ModelStatus {
    NotLoaded,
    Ready,
    Unavailable(String),
}

/// Span detector backed by a token-classification model.
pub struct ModelDetector<L: ModelLoader> {
    loader: L,
    state: OnceLock<ModelState>,
}

impl<L: ModelLoader> ModelDetector<L> {
    /// Create a detector. Nothing is loaded yet.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            state: OnceLock::new(),
        }
    }

    /// Current load state without triggering a load.
    pub fn status(&self) -> ModelStatus {
        match self.state.get() {
            None => ModelStatus::NotLoaded,
            Some(ModelState::Ready(_)) => ModelStatus::Ready,
            Some(ModelState::Unavailable(reason)) => ModelStatus::Unavailable(reason.clone()),
        }
    }

    /// Force the one-time load and report the outcome.
    pub fn warm_up(&self) -> ModelStatus {
        self.state();
        self.status()
    }

    /// Run the model and aggregate its predictions.
    pub fn predict(&self, text: &str) -> DetectResult<Vec<EntityGroup>> {
        let classifier = match self.state() {
            ModelState::Ready(classifier) => classifier,
            ModelState::Unavailable(reason) => return Err(DetectError::Unavailable(reason.clone())),
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| classifier.classify(text)))
            .unwrap_or_else(|_| Err(NerError::Inference("classifier panicked".to_string())));

        match outcome {
            Ok(tokens) => Ok(aggregate_simple(&tokens)),
            Err(e) => Err(DetectError::Inference(e.to_string())),
        }
    }

    /// The loader's state, loading on first use.
    ///
    /// `OnceLock::get_or_init` runs the initializer once; concurrent first
    /// callers block until it finishes and then read the same state.
    fn state(&self) -> &ModelState {
        self.state.get_or_init(|| {
            let description = self.loader.describe();
            tracing::info!(model = %description, "Loading de-identification model");

            let loaded = catch_unwind(AssertUnwindSafe(|| self.loader.load()))
                .unwrap_or_else(|_| Err(NerError::ModelInit("loader panicked".to_string())));

            match loaded {
                Ok(classifier) => {
                    tracing::info!(model = %description, "De-identification model ready");
                    ModelState::Ready(classifier)
                }
                Err(e) => {
                    tracing::warn!(
                        model = %description,
                        error = %e,
                        "Could not load de-identification model, continuing without it"
                    );
                    ModelState::Unavailable(e.to_string())
                }
            }
        })
    }
}

impl<L: ModelLoader> SpanDetector for ModelDetector<L> {
    fn name(&self) -> &'static str {
        "model"
    }

    fn detect(&self, text: &str) -> DetectResult<Vec<Span>> {
        let groups = self.predict(text)?;
        Ok(groups.into_iter().map(EntityGroup::into_span).collect())
    }
}

/// Type-erased view of a model detector's load state.
pub trait ModelHandle: Send + Sync {
    fn status(&self) -> ModelStatus;

    fn warm_up(&self) -> ModelStatus;
}

impl<L: ModelLoader> ModelHandle for ModelDetector<L> {
    fn status(&self) -> ModelStatus {
        ModelDetector::status(self)
    }

    fn warm_up(&self) -> ModelStatus {
        ModelDetector::warm_up(self)
    }
}
