use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clinical_deid_core::RuleSet;
use clinical_deid_ner::DEFAULT_MODEL_NAME;
use dotenvy::dotenv;

/// Service configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory with model.onnx, tokenizer.json and config.json
    pub model_dir: Option<PathBuf>,
    pub model_name: String,
    pub rule_set: RuleSet,
    pub intra_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_dir: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            rule_set: RuleSet::Standard,
            intra_threads: 2,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .context("PORT must be a valid number")?,
            model_dir: env::var("DEID_MODEL_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            model_name: env::var("DEID_MODEL_NAME").unwrap_or(defaults.model_name),
            rule_set: match env::var("DEID_RULESET") {
                Ok(value) => RuleSet::parse(&value)
                    .ok_or_else(|| anyhow!("DEID_RULESET must be `standard` or `extended`, got {value:?}"))?,
                Err(_) => defaults.rule_set,
            },
            intra_threads: env::var("DEID_INTRA_THREADS")
                .unwrap_or_else(|_| defaults.intra_threads.to_string())
                .parse()
                .context("DEID_INTRA_THREADS must be a valid number")?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
