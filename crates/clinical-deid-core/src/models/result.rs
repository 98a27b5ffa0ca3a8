//! De-identification results and their audit trail.

use serde::{Deserialize, Serialize};

use super::CanonicalLabel;

/// Audit entry for one redacted span.
///
/// Field names on the wire follow the service's JSON contract
/// (`original_tag` / `remapped_tag`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionRecord {
    /// Substring of the input text that was replaced
    pub original: String,
    /// Start character offset in the input text
    pub start: usize,
    /// End character offset (exclusive) in the input text
    pub end: usize,
    /// Label as reported by the detector
    #[serde(rename = "original_tag")]
    pub source_label: String,
    /// Label written into the placeholder
    #[serde(rename = "remapped_tag")]
    pub canonical_label: CanonicalLabel,
}

/// Output of a single de-identification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeidentificationResult {
    /// Text as received
    pub input_text: String,
    /// Text with every detected span replaced by a placeholder
    pub deidentified_text: String,
    /// Audit records in ascending order of `start`
    pub entities: Vec<RedactionRecord>,
}

impl DeidentificationResult {
    /// Result for text in which nothing was found.
    pub fn unchanged(text: &str) -> Self {
        Self {
            input_text: text.to_string(),
            deidentified_text: text.to_string(),
            entities: Vec::new(),
        }
    }

    /// Whether anything was redacted.
    pub fn has_redactions(&self) -> bool {
        !self.entities.is_empty()
    }

    /// Count of records per canonical label.
    pub fn count_by_label(&self, label: CanonicalLabel) -> usize {
        self.entities
            .iter()
            .filter(|e| e.canonical_label == label)
            .count()
    }

    /// Serialize to the JSON shape returned by the HTTP endpoint.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
