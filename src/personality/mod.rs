//! Five-factor NPC personality
//!
//! A [`PersonalityRecord`] holds one score per [`Trait`], always within
//! `0..=100`. Records come from the extractor, from the configured roster, or
//! from manual entry; all three paths clamp at construction.

pub mod extract;

use serde::{Deserialize, Serialize};

use crate::error::InvalidInputError;

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;
pub const DEFAULT_SCORE: u8 = 50;

/// One personality dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trait {
    Openness,
    Conscientiousness,
    Agreeableness,
    Neuroticism,
    Extraversion,
}

impl Trait {
    /// Canonical order, shared by prompts and extraction
    pub const ALL: [Trait; 5] = [
        Trait::Openness,
        Trait::Conscientiousness,
        Trait::Agreeableness,
        Trait::Neuroticism,
        Trait::Extraversion,
    ];

    /// Label as it appears in prompts and in model output (`Openness: 70`)
    pub fn label(&self) -> &'static str {
        match self {
            Trait::Openness => "Openness",
            Trait::Conscientiousness => "Conscientiousness",
            Trait::Agreeableness => "Agreeableness",
            Trait::Neuroticism => "Neuroticism",
            Trait::Extraversion => "Extraversion",
        }
    }

    /// Lowercase key used in config files and JSON output
    pub fn key(&self) -> &'static str {
        match self {
            Trait::Openness => "openness",
            Trait::Conscientiousness => "conscientiousness",
            Trait::Agreeableness => "agreeableness",
            Trait::Neuroticism => "neuroticism",
            Trait::Extraversion => "extraversion",
        }
    }

    /// One-line meaning of a high score
    pub fn gloss(&self) -> &'static str {
        match self {
            Trait::Openness => "Higher means more creative, curious and open to new experiences",
            Trait::Conscientiousness => "Higher means more organized, careful and dependable",
            Trait::Agreeableness => "Higher means more friendly, trusting and cooperative",
            Trait::Neuroticism => "Higher means more anxious, moody and easily upset",
            Trait::Extraversion => "Higher means more outgoing, talkative and energetic",
        }
    }
}

impl std::fmt::Display for Trait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Trait {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Trait::ALL
            .into_iter()
            .find(|t| t.key() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown trait: {}", s))
    }
}

/// Clamp any integer into the valid score range
pub fn clamp_score(value: i64) -> u8 {
    value.clamp(MIN_SCORE, MAX_SCORE) as u8
}

/// Immutable set of five trait scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScoreSheet")]
pub struct PersonalityRecord {
    openness: u8,
    conscientiousness: u8,
    agreeableness: u8,
    neuroticism: u8,
    extraversion: u8,
}

/// Unchecked scores as written in a config file
#[derive(Debug, Deserialize)]
struct ScoreSheet {
    openness: i64,
    conscientiousness: i64,
    agreeableness: i64,
    neuroticism: i64,
    extraversion: i64,
}

impl From<ScoreSheet> for PersonalityRecord {
    fn from(sheet: ScoreSheet) -> Self {
        PersonalityRecord::new(
            sheet.openness,
            sheet.conscientiousness,
            sheet.agreeableness,
            sheet.neuroticism,
            sheet.extraversion,
        )
    }
}

impl PersonalityRecord {
    /// Build a record, clamping every score into `0..=100`
    pub fn new(openness: i64, conscientiousness: i64, agreeableness: i64, neuroticism: i64, extraversion: i64) -> Self {
        Self {
            openness: clamp_score(openness),
            conscientiousness: clamp_score(conscientiousness),
            agreeableness: clamp_score(agreeableness),
            neuroticism: clamp_score(neuroticism),
            extraversion: clamp_score(extraversion),
        }
    }

    /// Build a record by asking `score` for each trait in canonical order
    pub fn from_fn<F>(mut score: F) -> Self
    where
        F: FnMut(Trait) -> i64,
    {
        Self::new(
            score(Trait::Openness),
            score(Trait::Conscientiousness),
            score(Trait::Agreeableness),
            score(Trait::Neuroticism),
            score(Trait::Extraversion),
        )
    }

    pub fn get(&self, name: Trait) -> u8 {
        match name {
            Trait::Openness => self.openness,
            Trait::Conscientiousness => self.conscientiousness,
            Trait::Agreeableness => self.agreeableness,
            Trait::Neuroticism => self.neuroticism,
            Trait::Extraversion => self.extraversion,
        }
    }

    /// Format-stable rendering consumed by the dialogue prompt
    ///
    /// One line per trait: `- Openness: 70/100 (Higher means ...)`.
    pub fn to_prompt_fragment(&self) -> String {
        Trait::ALL
            .iter()
            .map(|t| format!("- {}: {}/100 ({})", t.label(), self.get(*t), t.gloss()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Coarse behavioral hint for display
    pub fn demeanor(&self) -> &'static str {
        if self.extraversion < 30 {
            "Hesitant; tends to give short responses."
        } else {
            "Enthusiastic; happy to engage in long conversations."
        }
    }
}

impl std::fmt::Display for PersonalityRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = Trait::ALL.iter().map(|t| format!("{} {}", t.label(), self.get(*t))).collect();
        write!(f, "{}", parts.join(" · "))
    }
}

/// Fallback score per trait when extraction finds nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitDefaults {
    pub openness: u8,
    pub conscientiousness: u8,
    pub agreeableness: u8,
    pub neuroticism: u8,
    pub extraversion: u8,
}

impl Default for TraitDefaults {
    fn default() -> Self {
        Self {
            openness: DEFAULT_SCORE,
            conscientiousness: DEFAULT_SCORE,
            agreeableness: DEFAULT_SCORE,
            neuroticism: DEFAULT_SCORE,
            extraversion: DEFAULT_SCORE,
        }
    }
}

impl TraitDefaults {
    pub fn get(&self, name: Trait) -> u8 {
        let value = match name {
            Trait::Openness => self.openness,
            Trait::Conscientiousness => self.conscientiousness,
            Trait::Agreeableness => self.agreeableness,
            Trait::Neuroticism => self.neuroticism,
            Trait::Extraversion => self.extraversion,
        };
        clamp_score(value as i64)
    }
}

/// How manual trait entry treats values outside `0..=100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManualEntry {
    /// Clamp into range and continue
    #[default]
    Clamp,
    /// Reject so the caller can re-prompt
    Reject,
}

/// Parse one manually typed trait score
pub fn parse_manual_score(name: Trait, input: &str, policy: ManualEntry) -> Result<u8, InvalidInputError> {
    let trimmed = input.trim();
    let value: i64 = trimmed.parse().map_err(|_| InvalidInputError::NotAnInteger {
        name,
        input: trimmed.to_string(),
    })?;

    if (MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Ok(value as u8);
    }

    match policy {
        ManualEntry::Clamp => {
            let clamped = clamp_score(value);
            log::warn!("{} value {} out of range, clamped to {}", name, value, clamped);
            Ok(clamped)
        }
        ManualEntry::Reject => Err(InvalidInputError::OutOfRange { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_out_of_range() {
        let record = PersonalityRecord::new(-5, 150, 40, 100, 0);
        assert_eq!(record.get(Trait::Openness), 0);
        assert_eq!(record.get(Trait::Conscientiousness), 100);
        assert_eq!(record.get(Trait::Agreeableness), 40);
        assert_eq!(record.get(Trait::Neuroticism), 100);
        assert_eq!(record.get(Trait::Extraversion), 0);
    }

    #[test]
    fn test_trait_from_str() {
        assert_eq!("openness".parse::<Trait>().unwrap(), Trait::Openness);
        assert_eq!("EXTRAVERSION".parse::<Trait>().unwrap(), Trait::Extraversion);
        assert!("charisma".parse::<Trait>().is_err());
    }

    #[test]
    fn test_display_is_not_prompt_fragment() {
        let record = PersonalityRecord::new(70, 50, 60, 40, 80);
        assert_eq!(
            record.to_string(),
            "Openness 70 · Conscientiousness 50 · Agreeableness 60 · Neuroticism 40 · Extraversion 80"
        );
        let fragment = record.to_prompt_fragment();
        assert_eq!(fragment.lines().count(), 5);
        assert!(fragment.starts_with("- Openness: 70/100 (Higher means more creative"));
        assert!(fragment.contains("- Extraversion: 80/100 ("));
    }

    #[test]
    fn test_demeanor_threshold() {
        assert!(PersonalityRecord::new(50, 50, 50, 50, 29).demeanor().starts_with("Hesitant"));
        assert!(PersonalityRecord::new(50, 50, 50, 50, 30).demeanor().starts_with("Enthusiastic"));
    }

    #[test]
    fn test_deserialize_clamps() {
        let yaml = "openness: 120\nconscientiousness: -3\nagreeableness: 60\nneuroticism: 40\nextraversion: 80\n";
        let record: PersonalityRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record, PersonalityRecord::new(100, 0, 60, 40, 80));
    }

    #[test]
    fn test_serialize_uses_lowercase_keys() {
        let record = PersonalityRecord::new(1, 2, 3, 4, 5);
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["openness"], 1);
        assert_eq!(json["extraversion"], 5);
    }

    #[test]
    fn test_defaults_are_fifty() {
        let defaults = TraitDefaults::default();
        for t in Trait::ALL {
            assert_eq!(defaults.get(t), 50);
        }
    }

    #[test]
    fn test_parse_manual_score_in_range() {
        assert_eq!(parse_manual_score(Trait::Openness, " 42 ", ManualEntry::Reject), Ok(42));
    }

    #[test]
    fn test_parse_manual_score_not_integer() {
        let err = parse_manual_score(Trait::Openness, "lots", ManualEntry::Clamp).unwrap_err();
        assert_eq!(
            err,
            InvalidInputError::NotAnInteger {
                name: Trait::Openness,
                input: "lots".to_string()
            }
        );
    }

    #[test]
    fn test_parse_manual_score_clamp_and_reject() {
        assert_eq!(parse_manual_score(Trait::Neuroticism, "250", ManualEntry::Clamp), Ok(100));
        assert_eq!(parse_manual_score(Trait::Neuroticism, "-1", ManualEntry::Clamp), Ok(0));
        assert_eq!(
            parse_manual_score(Trait::Neuroticism, "250", ManualEntry::Reject),
            Err(InvalidInputError::OutOfRange {
                name: Trait::Neuroticism,
                value: 250
            })
        );
    }
}
