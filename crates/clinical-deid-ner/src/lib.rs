//! Model-based span detection for clinical de-identification.
//!
//! This crate wraps a pretrained token-classification model (by default
//! `StanfordAIMI/stanford-deidentifier-base`, exported to ONNX) as a
//! [`SpanDetector`](clinical_deid_core::SpanDetector). The model is loaded lazily
//! on first use; if it cannot be loaded the detector reports itself unavailable
//! and the pipeline carries on with regex detection only.

pub mod aggregation;
pub mod classifier;
pub mod detector;
pub mod onnx;

pub use aggregation::*;
pub use classifier::*;
pub use detector::*;
pub use onnx::{LabelConfig, OnnxModelLoader, DEFAULT_MODEL_NAME};
