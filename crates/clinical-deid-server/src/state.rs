use std::sync::Arc;

use clinical_deid_core::{Deidentifier, RegexDetector};
use clinical_deid_ner::{ModelDetector, ModelHandle, OnnxModelLoader};

use crate::config::Config;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub deidentifier: Arc<Deidentifier>,
    pub model: Arc<dyn ModelHandle>,
    pub model_name: String,
}

impl AppState {
    pub fn new(deidentifier: Deidentifier, model: Arc<dyn ModelHandle>, model_name: String) -> Self {
        Self {
            deidentifier: Arc::new(deidentifier),
            model,
            model_name,
        }
    }

    /// Wire the model detector and the regex detector from configuration.
    ///
    /// The model runs first so that its spans precede regex spans with the same
    /// start. Nothing is loaded until the first request (or `/ping`).
    pub fn from_config(config: &Config) -> Self {
        let loader = match &config.model_dir {
            Some(dir) => OnnxModelLoader::new(dir).with_intra_threads(config.intra_threads),
            None => OnnxModelLoader::unconfigured(),
        };
        let model = Arc::new(ModelDetector::new(loader));

        let deidentifier = Deidentifier::without_detectors()
            .with_detector(Arc::clone(&model))
            .with_detector(RegexDetector::new(config.rule_set));

        Self::new(deidentifier, model, config.model_name.clone())
    }
}
