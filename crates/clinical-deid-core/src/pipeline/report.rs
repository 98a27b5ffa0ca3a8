//! Per-call detector outcomes.

use serde::{Deserialize, Serialize};

/// What happened to one detector during a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetectorStatus {
    /// Ran and produced this many spans
    Detected { spans: usize },
    /// Permanently unavailable; contributed nothing
    Unavailable { reason: String },
    /// Failed on this input only; contributed nothing
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectorOutcome {
    pub detector: &'static str,
    #[serde(flatten)]
    pub status: DetectorStatus,
}

/// Outcome of every detector for one call, in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectionReport {
    pub detectors: Vec<DetectorOutcome>,
}

impl DetectionReport {
    /// Outcome for the named detector.
    pub fn outcome(&self, detector: &str) -> Option<&DetectorOutcome> {
        self.detectors.iter().find(|o| o.detector == detector)
    }

    /// True if any detector contributed nothing because of an error.
    pub fn is_degraded(&self) -> bool {
        self.detectors
            .iter()
            .any(|o| !matches!(o.status, DetectorStatus::Detected { .. }))
    }
}
