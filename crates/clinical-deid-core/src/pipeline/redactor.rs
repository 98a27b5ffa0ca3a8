//! Redactor: rewrites text and records what it replaced.

use crate::models::{CanonicalLabel, RedactionRecord, ResolvedSpan};
use crate::text::{char_to_byte, slice_chars};

/// Opening part of every placeholder.
pub const PLACEHOLDER_PREFIX: &str = "[REDACTED:";

/// Placeholder written in place of a span, e.g. `[REDACTED:EMAIL]`.
pub fn placeholder(label: CanonicalLabel) -> String {
    format!("{}{}]", PLACEHOLDER_PREFIX, label.as_str())
}

/// Rewritten text plus its audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    pub text: String,
    /// Ascending by `start`
    pub records: Vec<RedactionRecord>,
}

/// Redactor that splices placeholders into text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Redactor;

impl Redactor {
    /// Create a new redactor.
    pub fn new() -> Self {
        Self
    }

    /// Apply `spans` to `text`.
    ///
    /// `spans` must be sorted by `start`, descending (see
    /// [`Reconciler`](super::Reconciler)). Each span slices the text as it stands
    /// at that point, so a span overlapping one already applied lands on top of
    /// the earlier placeholder. Audit records quote the input text and are
    /// returned in ascending order. Zero-length spans are skipped.
    pub fn redact(&self, text: &str, spans: &[ResolvedSpan]) -> Redaction {
        debug_assert!(
            spans.windows(2).all(|w| w[0].start() >= w[1].start()),
            "spans must be sorted descending by start"
        );

        let mut redacted = text.to_string();
        let mut records = Vec::with_capacity(spans.len());

        for span in spans {
            if span.span.is_empty() {
                continue;
            }

            splice(&mut redacted, span.start(), span.end(), span.canonical_label);
            records.push(RedactionRecord {
                original: slice_chars(text, span.start(), span.end()).to_string(),
                start: span.start(),
                end: span.end(),
                source_label: span.source_label().to_string(),
                canonical_label: span.canonical_label,
            });
        }

        records.reverse();

        Redaction {
            text: redacted,
            records,
        }
    }
}

/// Re-apply an audit trail to its input text.
///
/// Records are replayed in the order they were originally applied (the reverse
/// of the returned order), so the output equals the `deidentified_text` of the
/// result the records came from.
pub fn replay(input_text: &str, entities: &[RedactionRecord]) -> String {
    let mut redacted = input_text.to_string();
    for record in entities.iter().rev() {
        if record.start >= record.end {
            continue;
        }
        splice(&mut redacted, record.start, record.end, record.canonical_label);
    }
    redacted
}

/// Replace characters `[start, end)` of the current text with a placeholder.
/// Offsets past the end clamp, so the placeholder is appended.
fn splice(redacted: &mut String, start: usize, end: usize, label: CanonicalLabel) {
    let from = char_to_byte(redacted, start);
    let to = char_to_byte(redacted, end).max(from);
    redacted.replace_range(from..to, &placeholder(label));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Span;

    fn resolved(start: usize, end: usize, label: &str) -> ResolvedSpan {
        Span::new(start, end, label).resolve()
    }

    #[test]
    fn test_placeholder_format() {
        assert_eq!(placeholder(CanonicalLabel::Email), "[REDACTED:EMAIL]");
        assert_eq!(placeholder(CanonicalLabel::Other), "[REDACTED:OTHER]");
    }

    #[test]
    fn test_redact_disjoint_spans() {
        let text = "Contact John at john@example.com or 5551234567";
        let spans = vec![resolved(36, 46, "PHONE"), resolved(16, 32, "EMAIL")];

        let redaction = Redactor::new().redact(text, &spans);

        assert_eq!(
            redaction.text,
            "Contact John at [REDACTED:EMAIL] or [REDACTED:PHONE]"
        );
        assert_eq!(redaction.records.len(), 2);
        assert_eq!(redaction.records[0].original, "john@example.com");
        assert_eq!(redaction.records[0].start, 16);
        assert_eq!(redaction.records[1].original, "5551234567");
        assert_eq!(redaction.records[1].canonical_label, CanonicalLabel::Phone);
    }

    #[test]
    fn test_overlap_applies_later_span_first() {
        let text = "abc 1234567890 xyz";
        let spans = vec![resolved(4, 14, "PHONE"), resolved(2, 8, "PATIENT")];

        let redaction = Redactor::new().redact(text, &spans);

        // PHONE rewrites first; PATIENT then cuts into the PHONE placeholder
        assert_eq!(redaction.text, "ab[REDACTED:NAME]ACTED:PHONE] xyz");
        assert_eq!(redaction.records[0].original, "c 1234");
        assert_eq!(redaction.records[0].canonical_label, CanonicalLabel::Name);
        assert_eq!(redaction.records[1].original, "1234567890");
    }

    #[test]
    fn test_zero_length_span_is_skipped() {
        let text = "abc def";
        let spans = vec![resolved(4, 7, "NAME"), resolved(2, 2, "ID")];

        let redaction = Redactor::new().redact(text, &spans);

        assert_eq!(redaction.text, "abc [REDACTED:NAME]");
        assert_eq!(redaction.records.len(), 1);
    }

    #[test]
    fn test_multibyte_text() {
        let text = "Zoë Müller, zoe@example.org";
        let spans = vec![resolved(12, 27, "EMAIL"), resolved(0, 10, "PATIENT")];

        let redaction = Redactor::new().redact(text, &spans);

        assert_eq!(redaction.text, "[REDACTED:NAME], [REDACTED:EMAIL]");
        assert_eq!(redaction.records[0].original, "Zoë Müller");
    }

    #[test]
    fn test_replay_reproduces_overlap() {
        let text = "Call 5551234567 now";
        let spans = vec![resolved(5, 12, "ID"), resolved(5, 15, "PHONE")];

        let redaction = Redactor::new().redact(text, &spans);

        assert_eq!(redaction.text, "Call [REDACTED:PHONE]ID]567 now");
        assert_eq!(replay(text, &redaction.records), redaction.text);
    }

    #[test]
    fn test_no_spans() {
        let redaction = Redactor::new().redact("unchanged", &[]);
        assert_eq!(redaction.text, "unchanged");
        assert!(redaction.records.is_empty());
    }
}
