//! Detected spans of sensitive content.

use serde::{Deserialize, Serialize};

use super::CanonicalLabel;

/// A detected occurrence of sensitive content, exactly as a detector reported it.
///
/// Offsets are half-open `[start, end)` character (Unicode scalar) indices into
/// the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// First character covered by the span
    pub start: usize,
    /// One past the last character covered by the span
    pub end: usize,
    /// Raw label in the producing detector's vocabulary (e.g. "PATIENT", "EMAIL")
    pub source_label: String,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize, source_label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            source_label: source_label.into(),
        }
    }

    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True for zero-length spans (`start == end`).
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether the span fits inside a text of `char_len` characters.
    pub fn is_within(&self, char_len: usize) -> bool {
        self.start <= self.end && self.end <= char_len
    }

    /// Derive the resolved form of this span by remapping its label.
    ///
    /// The detector output is left untouched.
    pub fn resolve(&self) -> ResolvedSpan {
        ResolvedSpan {
            span: self.clone(),
            canonical_label: CanonicalLabel::from_source_label(&self.source_label),
        }
    }
}

/// A span paired with its canonical label, ready for redaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSpan {
    /// The detector output this was derived from
    pub span: Span,
    /// Label after remapping through the taxonomy
    pub canonical_label: CanonicalLabel,
}

impl ResolvedSpan {
    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn source_label(&self) -> &str {
        &self.span.source_label
    }
}
