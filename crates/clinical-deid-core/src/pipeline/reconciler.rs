//! Span reconciler.
//!
//! Merges detector output into one sequence that can be applied as sequential
//! text replacements:
//! 1. concatenate batches in detector order (no deduplication)
//! 2. remap every label onto the canonical taxonomy
//! 3. stable-sort by `start`, descending
//!
//! Rewriting right to left means a replacement never moves the offsets of a
//! span that is still pending. Overlapping spans are not merged: both are
//! applied, and the one starting later is rewritten first.

use crate::models::{ResolvedSpan, Span};
use crate::text::char_len;

/// Reconciler for spans from several detectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler;

impl Reconciler {
    /// Create a new reconciler.
    pub fn new() -> Self {
        Self
    }

    /// Reconcile detector batches against `text`.
    ///
    /// Spans that run backwards or past the end of the text are dropped.
    /// Spans with equal `start` keep their concatenation order.
    pub fn reconcile<I>(&self, text: &str, batches: I) -> Vec<ResolvedSpan>
    where
        I: IntoIterator<Item = Vec<Span>>,
    {
        let text_len = char_len(text);

        let mut resolved: Vec<ResolvedSpan> = batches
            .into_iter()
            .flatten()
            .filter(|span| {
                let ok = span.is_within(text_len);
                if !ok {
                    tracing::warn!(
                        start = span.start,
                        end = span.end,
                        text_len,
                        label = %span.source_label,
                        "Discarding out-of-range span"
                    );
                }
                ok
            })
            .map(|span| span.resolve())
            .collect();

        // sort_by is stable, so ties stay in concatenation order
        resolved.sort_by(|a, b| b.start().cmp(&a.start()));
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CanonicalLabel;

    #[test]
    fn test_sorts_descending_by_start() {
        let text = "0123456789012345678901234567890";
        let model = vec![Span::new(2, 5, "PATIENT"), Span::new(20, 25, "DATE")];
        let regex = vec![Span::new(10, 15, "PHONE")];

        let resolved = Reconciler::new().reconcile(text, vec![model, regex]);
        let starts: Vec<usize> = resolved.iter().map(|s| s.start()).collect();

        assert_eq!(starts, vec![20, 10, 2]);
    }

    #[test]
    fn test_remaps_labels() {
        let text = "0123456789";
        let resolved = Reconciler::new().reconcile(
            text,
            vec![vec![Span::new(0, 2, "HCW"), Span::new(3, 5, "SOMETHING_NEW")]],
        );

        assert_eq!(resolved[0].canonical_label, CanonicalLabel::Other);
        assert_eq!(resolved[0].source_label(), "SOMETHING_NEW");
        assert_eq!(resolved[1].canonical_label, CanonicalLabel::Name);
        assert_eq!(resolved[1].source_label(), "HCW");
    }

    #[test]
    fn test_keeps_duplicates_in_concatenation_order() {
        let text = "Call 5551234567 now";
        let model = vec![Span::new(5, 15, "ID")];
        let regex = vec![Span::new(5, 15, "PHONE")];

        let resolved = Reconciler::new().reconcile(text, vec![model, regex]);

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].source_label(), "ID");
        assert_eq!(resolved[1].source_label(), "PHONE");
    }

    #[test]
    fn test_discards_out_of_range_spans() {
        let text = "short";
        let resolved = Reconciler::new().reconcile(
            text,
            vec![vec![
                Span::new(0, 5, "ID"),
                Span::new(3, 9, "ID"),
                Span::new(4, 2, "ID"),
            ]],
        );

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].end(), 5);
    }

    #[test]
    fn test_keeps_zero_length_spans() {
        let resolved = Reconciler::new().reconcile("abc", vec![vec![Span::new(1, 1, "ID")]]);
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_empty_batches() {
        let resolved = Reconciler::new().reconcile("text", Vec::<Vec<Span>>::new());
        assert!(resolved.is_empty());
    }
}
