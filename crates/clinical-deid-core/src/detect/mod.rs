//! Span detectors.
//!
//! A detector turns text into typed character spans. Detectors never rewrite
//! text and never reconcile their output with anyone else's.

mod rules;

pub use rules::*;

use std::sync::Arc;

use thiserror::Error;

use crate::models::Span;

/// Detector errors.
///
/// The two variants are handled differently by the facade: an unavailable
/// detector stays unavailable for the life of the process, while an inference
/// failure only costs the current call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    #[error("Detector unavailable: {0}")]
    Unavailable(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}

pub type DetectResult<T> = Result<T, DetectError>;

/// Anything that can find sensitive spans in text.
pub trait SpanDetector: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Detect spans in `text`. Offsets are character indices.
    fn detect(&self, text: &str) -> DetectResult<Vec<Span>>;
}

impl<T: SpanDetector + ?Sized> SpanDetector for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn detect(&self, text: &str) -> DetectResult<Vec<Span>> {
        (**self).detect(text)
    }
}

impl<T: SpanDetector + ?Sized> SpanDetector for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn detect(&self, text: &str) -> DetectResult<Vec<Span>> {
        (**self).detect(text)
    }
}

/// Detector that reports a fixed set of spans regardless of input.
///
/// Useful for tests and for replaying spans produced elsewhere.
#[derive(Debug, Clone)]
pub struct StaticDetector {
    name: &'static str,
    outcome: DetectResult<Vec<Span>>,
}

impl StaticDetector {
    /// Always return `spans`.
    pub fn new(name: &'static str, spans: Vec<Span>) -> Self {
        Self {
            name,
            outcome: Ok(spans),
        }
    }

    /// Always fail with `error`.
    pub fn failing(name: &'static str, error: DetectError) -> Self {
        Self {
            name,
            outcome: Err(error),
        }
    }
}

impl SpanDetector for StaticDetector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn detect(&self, _text: &str) -> DetectResult<Vec<Span>> {
        self.outcome.clone()
    }
}
