//! Clinical DeID Core Library
//!
//! De-identification of unstructured clinical text: detect personally identifying
//! spans, fold their labels into a closed taxonomy, and rewrite the text with
//! `[REDACTED:<LABEL>]` placeholders while keeping an audit trail.
//!
//! # Architecture
//!
//! ```text
//!                            text
//!                             │
//!               ┌─────────────┴─────────────┐
//!               ▼                           ▼
//!       Model detector (NER)          Regex detector
//!    (clinical-deid-ner crate)     EMAIL / PHONE / ADDRESS
//!               │                           │
//!               └─────────────┬─────────────┘
//!                             ▼
//!                        Reconciler
//!          concatenate → remap labels → sort start desc
//!                             │
//!                             ▼
//!                         Redactor
//!         splice right-to-left, audit records ascending
//!                             │
//!                             ▼
//!         { input_text, deidentified_text, entities }
//! ```
//!
//! # Core Principle
//!
//! **Detector failures never fail the call.** A detector that cannot load or that
//! errors on one input contributes no spans; the rest of the pipeline still runs.
//!
//! # Modules
//!
//! - [`models`]: Span, canonical taxonomy, redaction records, results
//! - [`detect`]: `SpanDetector` trait and the regex detector
//! - [`pipeline`]: Reconciler, redactor and the `Deidentifier` facade
//! - [`text`]: Character-offset helpers

pub mod detect;
pub mod models;
pub mod pipeline;
pub mod text;

// Re-export commonly used types
pub use detect::{DetectError, DetectResult, RegexDetector, RegexRule, RuleSet, SpanDetector};
pub use models::{CanonicalLabel, DeidentificationResult, RedactionRecord, ResolvedSpan, Span};
pub use pipeline::{
    placeholder, replay, Deidentifier, DetectionReport, DetectorOutcome, DetectorStatus,
    Reconciler, Redactor, PLACEHOLDER_PREFIX,
};
