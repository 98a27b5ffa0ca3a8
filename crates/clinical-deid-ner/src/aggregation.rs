//! "Simple" aggregation of token-level predictions into entity spans.
//!
//! Adjacent tokens that share an entity type are merged into one group. A `B-`
//! tag always opens a new group; `I-` (or an unprefixed tag) continues the
//! current group when the type matches. Groups of type `O` are dropped and
//! special tokens (`[CLS]`, `[SEP]`, padding) are ignored.

use clinical_deid_core::Span;
use serde::{Deserialize, Serialize};

/// Outside-of-entity tag.
pub const OUTSIDE: &str = "O";

/// Prediction for a single sub-word token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPrediction {
    /// BIO tag, e.g. "B-PATIENT", "I-HCW", "O"
    pub label: String,
    /// Probability of `label`
    pub score: f32,
    /// Character offsets of the token in the input text
    pub start: usize,
    pub end: usize,
    /// True for tokens the tokenizer added (CLS, SEP, padding)
    pub is_special: bool,
}

impl TokenPrediction {
    pub fn new(label: impl Into<String>, score: f32, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            score,
            start,
            end,
            is_special: false,
        }
    }

    pub fn special(start: usize, end: usize) -> Self {
        Self {
            label: OUTSIDE.to_string(),
            score: 1.0,
            start,
            end,
            is_special: true,
        }
    }
}

/// A merged run of tokens sharing one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityGroup {
    /// Entity type without the BIO prefix, e.g. "PATIENT"
    pub entity_group: String,
    /// Mean score of the member tokens
    pub score: f32,
    pub start: usize,
    pub end: usize,
}

impl EntityGroup {
    /// Convert into a detector span.
    pub fn into_span(self) -> Span {
        Span::new(self.start, self.end, self.entity_group)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bio {
    Begin,
    Inside,
}

fn split_tag(label: &str) -> (Bio, &str) {
    if let Some(tag) = label.strip_prefix("B-") {
        (Bio::Begin, tag)
    } else if let Some(tag) = label.strip_prefix("I-") {
        (Bio::Inside, tag)
    } else {
        (Bio::Inside, label)
    }
}

/// Merge token predictions into entity groups.
pub fn aggregate_simple(tokens: &[TokenPrediction]) -> Vec<EntityGroup> {
    let mut groups = Vec::new();
    let mut current: Vec<&TokenPrediction> = Vec::new();
    let mut current_tag: Option<&str> = None;

    for token in tokens.iter().filter(|t| !t.is_special) {
        let (bio, tag) = split_tag(&token.label);

        match current_tag {
            Some(last) if last == tag && bio != Bio::Begin => current.push(token),
            _ => {
                flush_group(&mut groups, current_tag, &current);
                current.clear();
                current.push(token);
                current_tag = Some(tag);
            }
        }
    }
    flush_group(&mut groups, current_tag, &current);

    groups
}

fn flush_group(groups: &mut Vec<EntityGroup>, tag: Option<&str>, members: &[&TokenPrediction]) {
    let (Some(tag), Some(first), Some(last)) = (tag, members.first(), members.last()) else {
        return;
    };
    if tag == OUTSIDE {
        return;
    }

    let score = members.iter().map(|t| t.score).sum::<f32>() / members.len() as f32;
    groups.push(EntityGroup {
        entity_group: tag.to_string(),
        score,
        start: first.start,
        end: last.end,
    });
}
