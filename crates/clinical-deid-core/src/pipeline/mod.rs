//! De-identification pipeline.
//!
//! Pipeline: Detectors (model + regex) → Reconciler → Redactor → Result

mod reconciler;
mod redactor;
mod report;

pub use reconciler::*;
pub use redactor::*;
pub use report::*;

use crate::detect::{DetectError, RegexDetector, RuleSet, SpanDetector};
use crate::models::{DeidentificationResult, Span};

/// Single entry point combining detection, reconciliation and redaction.
///
/// Holds no per-call state; one instance can serve any number of threads.
pub struct Deidentifier {
    detectors: Vec<Box<dyn SpanDetector>>,
    reconciler: Reconciler,
    redactor: Redactor,
}

impl Default for Deidentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Deidentifier {
    /// Regex-only de-identifier with the standard rule set.
    pub fn new() -> Self {
        Self::with_rule_set(RuleSet::Standard)
    }

    /// Regex-only de-identifier with the given rule set.
    pub fn with_rule_set(rule_set: RuleSet) -> Self {
        Self::without_detectors().with_detector(RegexDetector::new(rule_set))
    }

    /// De-identifier with no detectors; add them with [`Deidentifier::with_detector`].
    pub fn without_detectors() -> Self {
        Self {
            detectors: Vec::new(),
            reconciler: Reconciler::new(),
            redactor: Redactor::new(),
        }
    }

    /// Add a detector. Spans are concatenated in the order detectors were added.
    pub fn with_detector(mut self, detector: impl SpanDetector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    /// Names of the registered detectors, in run order.
    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// De-identify `text`.
    pub fn deidentify(&self, text: &str) -> DeidentificationResult {
        self.deidentify_with_report(text).0
    }

    /// De-identify `text` and report how each detector fared.
    ///
    /// Detector failures never escape: an unavailable or failing detector
    /// contributes no spans and the others still apply.
    pub fn deidentify_with_report(&self, text: &str) -> (DeidentificationResult, DetectionReport) {
        if text.is_empty() {
            return (DeidentificationResult::unchanged(text), DetectionReport::default());
        }

        let mut report = DetectionReport::default();
        let mut batches: Vec<Vec<Span>> = Vec::with_capacity(self.detectors.len());

        for detector in &self.detectors {
            let status = match detector.detect(text) {
                Ok(spans) => {
                    let status = DetectorStatus::Detected { spans: spans.len() };
                    batches.push(spans);
                    status
                }
                Err(DetectError::Unavailable(reason)) => {
                    tracing::debug!(detector = detector.name(), %reason, "Detector unavailable, skipping");
                    DetectorStatus::Unavailable { reason }
                }
                Err(DetectError::Inference(reason)) => {
                    tracing::warn!(detector = detector.name(), %reason, "Detector failed for this input, skipping");
                    DetectorStatus::Failed { reason }
                }
            };
            report.detectors.push(DetectorOutcome {
                detector: detector.name(),
                status,
            });
        }

        let spans = self.reconciler.reconcile(text, batches);
        let redaction = self.redactor.redact(text, &spans);

        tracing::debug!(
            text_chars = text.chars().count(),
            redactions = redaction.records.len(),
            "De-identified text"
        );

        let result = DeidentificationResult {
            input_text: text.to_string(),
            deidentified_text: redaction.text,
            entities: redaction.records,
        };

        (result, report)
    }
}
