//! Canonical redaction taxonomy.
//!
//! Every detector speaks its own label vocabulary. The model reports tags such as
//! `PATIENT`, `HCW` (health-care worker) or `HOSPITAL`; the regex rules report
//! `EMAIL`, `PHONE`, `ADDRESS` and friends. All of them are folded into the closed
//! set below before anything is written into redacted text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of redaction categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CanonicalLabel {
    Name,
    Address,
    Phone,
    Email,
    Id,
    Date,
    /// Catch-all for any label the table does not know
    Other,
}

impl CanonicalLabel {
    /// All members of the taxonomy.
    pub const ALL: [CanonicalLabel; 7] = [
        CanonicalLabel::Name,
        CanonicalLabel::Address,
        CanonicalLabel::Phone,
        CanonicalLabel::Email,
        CanonicalLabel::Id,
        CanonicalLabel::Date,
        CanonicalLabel::Other,
    ];

    /// Remap a detector-specific label onto the taxonomy.
    ///
    /// Total: unknown labels land in [`CanonicalLabel::Other`]. Matching is exact,
    /// so `"patient"` is unknown while `"PATIENT"` is a name.
    pub fn from_source_label(label: &str) -> Self {
        match label {
            // Model vocabulary
            "PATIENT" | "HCW" => CanonicalLabel::Name,
            "HOSPITAL" => CanonicalLabel::Address,
            "VENDOR" => CanonicalLabel::Other,

            // Shared between model and regex rules
            "ID" => CanonicalLabel::Id,
            "PHONE" => CanonicalLabel::Phone,
            "EMAIL" => CanonicalLabel::Email,
            "DATE" => CanonicalLabel::Date,

            // Regex rule vocabulary
            "NAME" => CanonicalLabel::Name,
            "ADDRESS" => CanonicalLabel::Address,

            _ => CanonicalLabel::Other,
        }
    }

    /// Uppercase form used inside placeholders.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalLabel::Name => "NAME",
            CanonicalLabel::Address => "ADDRESS",
            CanonicalLabel::Phone => "PHONE",
            CanonicalLabel::Email => "EMAIL",
            CanonicalLabel::Id => "ID",
            CanonicalLabel::Date => "DATE",
            CanonicalLabel::Other => "OTHER",
        }
    }

    /// Parse the uppercase form back. Only exact taxonomy names are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|label| label.as_str() == s)
    }
}

impl fmt::Display for CanonicalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
