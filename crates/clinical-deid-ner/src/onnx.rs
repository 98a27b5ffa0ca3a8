//! ONNX Runtime backend for the pretrained de-identification model.
//!
//! A model directory holds three files exported from the HuggingFace checkpoint:
//! - `model.onnx`: token-classification weights (BERT family: input ids,
//!   attention mask, token type ids → logits `[1, seq_len, num_labels]`)
//! - `tokenizer.json`: HuggingFace tokenizer definition
//! - `config.json`: model config carrying the `id2label` table
//!
//! Inference itself is behind the `onnx` feature. Without it the loader still
//! validates the directory and then reports the backend as unsupported, so the
//! detector degrades to empty output.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::classifier::{ModelLoader, NerError, NerResult, TokenClassifier};

/// Default checkpoint this backend is built around.
pub const DEFAULT_MODEL_NAME: &str = "StanfordAIMI/stanford-deidentifier-base";

pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const CONFIG_FILE: &str = "config.json";

/// Label table of a token-classification model, indexed by class id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelConfig {
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct RawModelConfig {
    id2label: HashMap<String, String>,
}

impl LabelConfig {
    /// Parse the `id2label` table out of a model `config.json`.
    ///
    /// Ids must be exactly `0..n`.
    pub fn from_json(json: &str) -> NerResult<Self> {
        let raw: RawModelConfig =
            serde_json::from_str(json).map_err(|e| NerError::LabelConfig(e.to_string()))?;

        let mut indexed = Vec::with_capacity(raw.id2label.len());
        for (id, label) in raw.id2label {
            let id: usize = id
                .parse()
                .map_err(|_| NerError::LabelConfig(format!("non-numeric label id {id:?}")))?;
            indexed.push((id, label));
        }
        indexed.sort_by_key(|(id, _)| *id);

        if indexed.is_empty() {
            return Err(NerError::LabelConfig("id2label is empty".into()));
        }
        for (expected, (id, _)) in indexed.iter().enumerate() {
            if *id != expected {
                return Err(NerError::LabelConfig(format!(
                    "label ids are not contiguous: expected {expected}, found {id}"
                )));
            }
        }

        Ok(Self {
            labels: indexed.into_iter().map(|(_, label)| label).collect(),
        })
    }

    pub fn from_file(path: &Path) -> NerResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| NerError::LabelConfig(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn label(&self, id: usize) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Loads the ONNX model from a directory on first use.
#[derive(Debug, Clone)]
pub struct OnnxModelLoader {
    model_dir: Option<PathBuf>,
    intra_threads: usize,
}

impl OnnxModelLoader {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: Some(model_dir.into()),
            intra_threads: 2,
        }
    }

    /// Loader with no model directory; every load fails with `NotConfigured`.
    pub fn unconfigured() -> Self {
        Self {
            model_dir: None,
            intra_threads: 2,
        }
    }

    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = threads.max(1);
        self
    }

    pub fn model_dir(&self) -> Option<&Path> {
        self.model_dir.as_deref()
    }

    /// Check that all three model files are present.
    fn required_files(model_dir: &Path) -> NerResult<(PathBuf, PathBuf, PathBuf)> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);
        let config_path = model_dir.join(CONFIG_FILE);

        for path in [&model_path, &tokenizer_path, &config_path] {
            if !path.exists() {
                return Err(NerError::ModelNotFound(path.clone()));
            }
        }

        Ok((model_path, tokenizer_path, config_path))
    }
}

impl ModelLoader for OnnxModelLoader {
    fn describe(&self) -> String {
        match &self.model_dir {
            Some(dir) => format!("onnx:{}", dir.display()),
            None => "onnx:<unconfigured>".to_string(),
        }
    }

    fn load(&self) -> NerResult<Box<dyn TokenClassifier>> {
        let model_dir = self.model_dir.as_deref().ok_or(NerError::NotConfigured)?;
        let (model_path, tokenizer_path, config_path) = Self::required_files(model_dir)?;

        build_classifier(&model_path, &tokenizer_path, &config_path, self.intra_threads)
    }
}

#[cfg(feature = "onnx")]
fn build_classifier(
    model_path: &Path,
    tokenizer_path: &Path,
    config_path: &Path,
    intra_threads: usize,
) -> NerResult<Box<dyn TokenClassifier>> {
    let classifier =
        backend::OnnxTokenClassifier::load(model_path, tokenizer_path, config_path, intra_threads)?;
    Ok(Box::new(classifier))
}

#[cfg(not(feature = "onnx"))]
fn build_classifier(
    _model_path: &Path,
    _tokenizer_path: &Path,
    _config_path: &Path,
    _intra_threads: usize,
) -> NerResult<Box<dyn TokenClassifier>> {
    Err(NerError::Unsupported(
        "built without the `onnx` feature".to_string(),
    ))
}

#[cfg(feature = "onnx")]
mod backend {
    use std::path::Path;
    use std::sync::{Mutex, PoisonError};

    use ort::session::Session;

    use super::LabelConfig;
    use crate::aggregation::TokenPrediction;
    use crate::classifier::{NerError, NerResult, TokenClassifier};

    /// Token classifier running on ONNX Runtime.
    ///
    /// `Session::run` needs `&mut self`, hence the Mutex.
    pub struct OnnxTokenClassifier {
        session: Mutex<Session>,
        tokenizer: tokenizers::Tokenizer,
        labels: LabelConfig,
    }

    impl OnnxTokenClassifier {
        pub fn load(
            model_path: &Path,
            tokenizer_path: &Path,
            config_path: &Path,
            intra_threads: usize,
        ) -> NerResult<Self> {
            let labels = LabelConfig::from_file(config_path)?;

            let session = Session::builder()
                .map_err(|e: ort::Error| NerError::ModelInit(e.to_string()))?
                .with_intra_threads(intra_threads)
                .map_err(|e: ort::Error| NerError::ModelInit(e.to_string()))?
                .commit_from_file(model_path)
                .map_err(|e: ort::Error| NerError::ModelInit(format!("ONNX load failed: {e}")))?;

            let tokenizer = tokenizers::Tokenizer::from_file(tokenizer_path)
                .map_err(|e| NerError::ModelInit(format!("Tokenizer load failed: {e}")))?;

            tracing::info!(
                labels = labels.len(),
                "ONNX token classifier loaded from {}",
                model_path.display()
            );

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
                labels,
            })
        }
    }

    impl TokenClassifier for OnnxTokenClassifier {
        fn classify(&self, text: &str) -> NerResult<Vec<TokenPrediction>> {
            use ort::value::TensorRef;

            let encoding = self
                .tokenizer
                .encode_char_offsets(text, true)
                .map_err(|e| NerError::Tokenization(e.to_string()))?;

            let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
            let attention_mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();
            let token_type_ids: Vec<i64> = encoding
                .get_type_ids()
                .iter()
                .map(|&t| t as i64)
                .collect();

            let seq_len = input_ids.len();
            let num_labels = self.labels.len();

            let ids_array = ndarray::Array2::from_shape_vec((1, seq_len), input_ids)
                .map_err(|e| NerError::Inference(e.to_string()))?;
            let mask_array = ndarray::Array2::from_shape_vec((1, seq_len), attention_mask)
                .map_err(|e| NerError::Inference(e.to_string()))?;
            let type_array = ndarray::Array2::from_shape_vec((1, seq_len), token_type_ids)
                .map_err(|e| NerError::Inference(e.to_string()))?;

            let ids_tensor = TensorRef::from_array_view(&ids_array)
                .map_err(|e| NerError::Inference(e.to_string()))?;
            let mask_tensor = TensorRef::from_array_view(&mask_array)
                .map_err(|e| NerError::Inference(e.to_string()))?;
            let type_tensor = TensorRef::from_array_view(&type_array)
                .map_err(|e| NerError::Inference(e.to_string()))?;

            // A panic during an earlier run leaves the session usable
            let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);

            let outputs = session
                .run(ort::inputs![ids_tensor, mask_tensor, type_tensor])
                .map_err(|e| NerError::Inference(format!("ONNX inference failed: {e}")))?;

            // Output shape: [1, seq_len, num_labels]
            let (shape, logits) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| NerError::Inference(format!("Output extraction: {e}")))?;

            if shape.len() != 3 || shape[1] as usize != seq_len || shape[2] as usize != num_labels {
                return Err(NerError::Inference(format!(
                    "Unexpected output shape: {shape:?}, expected [1, {seq_len}, {num_labels}]"
                )));
            }

            let offsets = encoding.get_offsets();
            let special = encoding.get_special_tokens_mask();

            let mut predictions = Vec::with_capacity(seq_len);
            for token_idx in 0..seq_len {
                let row = &logits[token_idx * num_labels..(token_idx + 1) * num_labels];
                let (class_id, score) = softmax_argmax(row);
                let label = self
                    .labels
                    .label(class_id)
                    .ok_or_else(|| NerError::Inference(format!("class id {class_id} has no label")))?;
                let (start, end) = offsets[token_idx];

                predictions.push(TokenPrediction {
                    label: label.to_string(),
                    score,
                    start,
                    end,
                    is_special: special[token_idx] == 1,
                });
            }

            Ok(predictions)
        }
    }

    /// Index and probability of the most likely class.
    fn softmax_argmax(logits: &[f32]) -> (usize, f32) {
        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let denom: f32 = logits.iter().map(|&l| (l - max).exp()).sum();

        let mut best = (0, f32::NEG_INFINITY);
        for (idx, &logit) in logits.iter().enumerate() {
            if logit > best.1 {
                best = (idx, logit);
            }
        }

        (best.0, (best.1 - max).exp() / denom)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    const STANFORD_CONFIG: &str = r#"{
        "architectures": ["BertForTokenClassification"],
        "id2label": {
            "0": "O",
            "1": "B-VENDOR", "2": "I-VENDOR",
            "3": "B-DATE", "4": "I-DATE",
            "5": "B-HCW", "6": "I-HCW",
            "7": "B-HOSPITAL", "8": "I-HOSPITAL",
            "9": "B-ID", "10": "I-ID",
            "11": "B-PATIENT", "12": "I-PATIENT",
            "13": "B-PHONE", "14": "I-PHONE"
        }
    }"#;

    #[test]
    fn test_label_config_orders_by_id() {
        let config = LabelConfig::from_json(STANFORD_CONFIG).unwrap();

        assert_eq!(config.len(), 15);
        assert_eq!(config.label(0), Some("O"));
        assert_eq!(config.label(10), Some("I-ID"));
        assert_eq!(config.label(14), Some("I-PHONE"));
        assert_eq!(config.label(15), None);
    }

    #[test]
    fn test_label_config_rejects_gaps() {
        let json = r#"{"id2label": {"0": "O", "2": "B-ID"}}"#;
        assert!(matches!(
            LabelConfig::from_json(json),
            Err(NerError::LabelConfig(_))
        ));
    }

    #[test]
    fn test_label_config_rejects_bad_ids() {
        let json = r#"{"id2label": {"zero": "O"}}"#;
        assert!(LabelConfig::from_json(json).is_err());
        assert!(LabelConfig::from_json(r#"{"id2label": {}}"#).is_err());
        assert!(LabelConfig::from_json("{}").is_err());
    }

    #[test]
    fn test_label_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, STANFORD_CONFIG).unwrap();

        assert_eq!(LabelConfig::from_file(&path).unwrap().len(), 15);
        assert!(LabelConfig::from_file(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_unconfigured_loader() {
        let loader = OnnxModelLoader::unconfigured();
        assert!(matches!(loader.load(), Err(NerError::NotConfigured)));
    }

    #[test]
    fn test_missing_model_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), STANFORD_CONFIG).unwrap();

        let loader = OnnxModelLoader::new(dir.path());
        match loader.load() {
            Err(NerError::ModelNotFound(path)) => assert!(path.ends_with(MODEL_FILE)),
            other => panic!("expected ModelNotFound, got {:?}", other.err()),
        }
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn test_without_onnx_feature_reports_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        for file in [MODEL_FILE, TOKENIZER_FILE, CONFIG_FILE] {
            std::fs::write(dir.path().join(file), "{}").unwrap();
        }

        let loader = OnnxModelLoader::new(dir.path());
        assert!(matches!(loader.load(), Err(NerError::Unsupported(_))));
    }
}
