//! Trait extraction from free-form model output
//!
//! Looks for `<Trait>: <integer>` anywhere in the text, case-insensitively.
//! The model is not guaranteed to follow the requested format, so the
//! extractor either fills gaps from [`TraitDefaults`] or reports the first
//! failing trait, depending on [`OnMissing`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::num::IntErrorKind;
use serde::{Deserialize, Serialize};

use super::{PersonalityRecord, Trait, TraitDefaults};
use crate::error::ExtractionError;

static TRAIT_PATTERNS: Lazy<Vec<(Trait, Regex)>> = Lazy::new(|| {
    Trait::ALL
        .iter()
        .map(|t| {
            let pattern = format!(r"(?i){}\s*:\s*(-?[0-9]+)", t.label());
            (*t, Regex::new(&pattern).unwrap())
        })
        .collect()
});

/// What to do when a trait is absent or unparsable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnMissing {
    /// Fail the whole extraction
    Fail,
    /// Substitute the trait's default score
    #[default]
    Default,
}

/// Extraction result with the traits that fell back to defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub record: PersonalityRecord,
    pub defaulted: Vec<Trait>,
}

#[derive(Debug, Clone)]
pub struct TraitExtractor {
    policy: OnMissing,
    defaults: TraitDefaults,
}

impl TraitExtractor {
    pub fn new(policy: OnMissing, defaults: TraitDefaults) -> Self {
        Self { policy, defaults }
    }

    pub fn policy(&self) -> OnMissing {
        self.policy
    }

    /// Parse a personality record out of `text`
    pub fn extract(&self, text: &str) -> Result<PersonalityRecord, ExtractionError> {
        self.extract_report(text).map(|extraction| extraction.record)
    }

    pub fn extract_report(&self, text: &str) -> Result<Extraction, ExtractionError> {
        let mut scores = [0i64; 5];
        let mut defaulted = Vec::new();

        for (idx, (name, regex)) in TRAIT_PATTERNS.iter().enumerate() {
            let found = regex.captures(text).and_then(|caps| caps.get(1)).map(|m| m.as_str());

            let parsed = match found {
                Some(raw) => parse_score(*name, raw),
                None => Err(ExtractionError::Missing(*name)),
            };

            scores[idx] = match (parsed, self.policy) {
                (Ok(value), _) => value,
                (Err(e), OnMissing::Fail) => return Err(e),
                (Err(e), OnMissing::Default) => {
                    let fallback = self.defaults.get(*name);
                    log::warn!("{}; using default {}", e, fallback);
                    defaulted.push(*name);
                    fallback as i64
                }
            };
        }

        let record = PersonalityRecord::new(scores[0], scores[1], scores[2], scores[3], scores[4]);
        log::debug!("Extracted personality: {}", record);

        Ok(Extraction { record, defaulted })
    }
}

/// Parse a matched digit run, saturating on overflow so clamping still applies
fn parse_score(name: Trait, raw: &str) -> Result<i64, ExtractionError> {
    match raw.parse::<i64>() {
        Ok(value) => Ok(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(ExtractionError::Unparsable {
                name,
                value: raw.to_string(),
            }),
        },
    }
}

impl Default for TraitExtractor {
    fn default() -> Self {
        Self::new(OnMissing::Default, TraitDefaults::default())
    }
}
