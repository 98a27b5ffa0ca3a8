//! Property tests for the de-identification pipeline.

use clinical_deid_core::detect::StaticDetector;
use clinical_deid_core::{
    replay, CanonicalLabel, DetectError, Deidentifier, RegexDetector, Span,
};
use proptest::prelude::*;

const KNOWN_LABELS: [&str; 9] = [
    "PATIENT", "HCW", "HOSPITAL", "VENDOR", "ID", "PHONE", "EMAIL", "DATE", "ADDRESS",
];

fn spans_for(len: usize) -> impl Strategy<Value = Vec<Span>> {
    prop::collection::vec((0..=len, 0..=len, "[A-Z]{2,8}"), 0..6).prop_map(|raw| {
        raw.into_iter()
            .map(|(a, b, label)| Span::new(a.min(b), a.max(b), label))
            .collect()
    })
}

fn text_and_spans() -> impl Strategy<Value = (String, Vec<Span>)> {
    "[a-z0-9@. ]{1,40}".prop_flat_map(|text| {
        let len = text.chars().count();
        (Just(text), spans_for(len))
    })
}

// ── Text without identifiers passes through untouched ─────────────────────

proptest! {
    #[test]
    fn text_without_matches_is_unchanged(text in "[A-Za-z ,.;:!?]{0,80}") {
        let result = Deidentifier::new().deidentify(&text);
        prop_assert_eq!(&result.deidentified_text, &text);
        prop_assert!(result.entities.is_empty());
    }
}

// ── Replaying the audit trail reproduces the output ───────────────────────

proptest! {
    #[test]
    fn replay_reproduces_output((text, spans) in text_and_spans()) {
        let deid = Deidentifier::without_detectors()
            .with_detector(StaticDetector::new("model", spans))
            .with_detector(RegexDetector::default());

        let result = deid.deidentify(&text);
        prop_assert_eq!(replay(&result.input_text, &result.entities), result.deidentified_text);
    }
}

// ── Entities come back in reading order ───────────────────────────────────

proptest! {
    #[test]
    fn entities_ascend_by_start((text, spans) in text_and_spans()) {
        let deid = Deidentifier::without_detectors()
            .with_detector(StaticDetector::new("model", spans))
            .with_detector(RegexDetector::default());

        let result = deid.deidentify(&text);
        for pair in result.entities.windows(2) {
            prop_assert!(pair[0].start <= pair[1].start);
        }
        for entity in &result.entities {
            let original: String = text
                .chars()
                .skip(entity.start)
                .take(entity.end - entity.start)
                .collect();
            prop_assert_eq!(&entity.original, &original);
        }
    }
}

// ── Source labels never leak into canonical labels ────────────────────────

proptest! {
    #[test]
    fn canonical_labels_stay_in_taxonomy((text, spans) in text_and_spans()) {
        let deid = Deidentifier::without_detectors()
            .with_detector(StaticDetector::new("model", spans));

        let result = deid.deidentify(&text);
        for entity in &result.entities {
            prop_assert!(CanonicalLabel::ALL.contains(&entity.canonical_label));
            if !KNOWN_LABELS.contains(&entity.source_label.as_str()) {
                prop_assert_eq!(entity.canonical_label, CanonicalLabel::Other);
            }
        }
    }
}

// ── Model unavailability falls back to regex-only output ──────────────────

proptest! {
    #[test]
    fn unavailable_model_matches_regex_only(text in "[a-z0-9@. ]{0,60}") {
        let degraded = Deidentifier::without_detectors()
            .with_detector(StaticDetector::failing(
                "model",
                DetectError::Unavailable("not loaded".into()),
            ))
            .with_detector(RegexDetector::default());

        let degraded_result = degraded.deidentify(&text);
        let regex_result = Deidentifier::new().deidentify(&text);
        prop_assert_eq!(degraded_result, regex_result);
    }
}
