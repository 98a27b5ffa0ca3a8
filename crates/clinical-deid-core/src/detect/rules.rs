//! Rule-based span detector.
//!
//! Each rule is a `(label, pattern)` pair applied independently over the whole
//! text. Matches from different rules may overlap; that is resolved later.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{DetectResult, SpanDetector};
use crate::models::Span;
use crate::text::byte_to_char;

/// A single detection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegexRule {
    pub label: &'static str,
    pub pattern: &'static str,
}

pub const EMAIL_RULE: RegexRule = RegexRule {
    label: "EMAIL",
    pattern: r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
};

pub const PHONE_RULE: RegexRule = RegexRule {
    label: "PHONE",
    pattern: r"\b\d{10,}\b",
};

pub const ADDRESS_RULE: RegexRule = RegexRule {
    label: "ADDRESS",
    pattern: r"\d+\s[\w\s]+(?:Street|St|Avenue|Ave|Road|Rd|Lane|Ln|Blvd|Boulevard|Drive|Dr)\b",
};

pub const NAME_RULE: RegexRule = RegexRule {
    label: "NAME",
    pattern: r"\b[A-Z][a-z]+\s[A-Z][a-z]+\b",
};

pub const DATE_RULE: RegexRule = RegexRule {
    label: "DATE",
    pattern: r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b",
};

pub const ID_RULE: RegexRule = RegexRule {
    label: "ID",
    pattern: r"\b\d{6,}\b",
};

/// Which rules a [`RegexDetector`] runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    /// Email, phone and street address
    #[default]
    Standard,
    /// Standard rules plus name, date and numeric ID heuristics.
    /// Much noisier; meant for deployments that run without the model.
    Extended,
}

impl RuleSet {
    pub fn rules(&self) -> &'static [RegexRule] {
        match self {
            RuleSet::Standard => &[EMAIL_RULE, PHONE_RULE, ADDRESS_RULE],
            RuleSet::Extended => &[
                EMAIL_RULE,
                PHONE_RULE,
                ADDRESS_RULE,
                NAME_RULE,
                DATE_RULE,
                ID_RULE,
            ],
        }
    }

    /// Parse a rule set name (`standard` / `extended`), case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Some(RuleSet::Standard),
            "extended" => Some(RuleSet::Extended),
            _ => None,
        }
    }
}

struct CompiledRule {
    label: &'static str,
    regex: Regex,
}

/// Regex span detector. Stateless between calls.
pub struct RegexDetector {
    rules: Vec<CompiledRule>,
    failed: Vec<&'static str>,
}

impl Default for RegexDetector {
    fn default() -> Self {
        Self::new(RuleSet::Standard)
    }
}

impl RegexDetector {
    /// Create a detector for one of the built-in rule sets.
    pub fn new(rule_set: RuleSet) -> Self {
        Self::from_rules(rule_set.rules())
    }

    /// Create a detector from arbitrary rules.
    ///
    /// Rules whose pattern does not compile are skipped and reported through
    /// [`RegexDetector::failed_rules`]; the remaining rules still run.
    pub fn from_rules(rules: &[RegexRule]) -> Self {
        let mut compiled = Vec::with_capacity(rules.len());
        let mut failed = Vec::new();

        for rule in rules {
            match Regex::new(rule.pattern) {
                Ok(regex) => compiled.push(CompiledRule {
                    label: rule.label,
                    regex,
                }),
                Err(e) => {
                    tracing::warn!(rule = rule.label, error = %e, "Skipping regex rule that failed to compile");
                    failed.push(rule.label);
                }
            }
        }

        Self {
            rules: compiled,
            failed,
        }
    }

    /// Labels of rules that failed to compile.
    pub fn failed_rules(&self) -> &[&'static str] {
        &self.failed
    }

    /// Labels of rules that are active, in evaluation order.
    pub fn active_rules(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.label).collect()
    }

    /// Run every rule over `text`, in rule order.
    pub fn find_spans(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();

        for rule in &self.rules {
            for m in rule.regex.find_iter(text) {
                spans.push(Span::new(
                    byte_to_char(text, m.start()),
                    byte_to_char(text, m.end()),
                    rule.label,
                ));
            }
        }

        spans
    }
}

impl SpanDetector for RegexDetector {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn detect(&self, text: &str) -> DetectResult<Vec<Span>> {
        Ok(self.find_spans(text))
    }
}
