//! Profile value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::coercion::ProfileDraft;
use super::Stance;
use crate::domain::foundation::ValidationError;

/// Upper bound on list-valued fields (key values, guidance entries).
pub const MAX_LIST_ITEMS: usize = 8;

/// Upper bound on the length of a single short phrase, in characters.
pub const MAX_PHRASE_LENGTH: usize = 120;

const DEFAULT_STYLE: &str = "neutral";
const DEFAULT_EMOTIONAL_STATE: &str = "neutral";

/// Confidence in the detected stance, always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f32);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0.0);
    pub const NEUTRAL: Confidence = Confidence(0.5);

    /// Creates a confidence, rejecting values outside [0, 1].
    pub fn new(value: f32) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::invalid_format(
                "confidence",
                format!("expected a value in [0, 1], got {}", value),
            ));
        }
        Ok(Self(value))
    }

    /// Creates a confidence, clamping into [0, 1]. NaN becomes neutral.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::NEUTRAL;
        }
        Self(value.clamp(0.0, 1.0) as f32)
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::ZERO
    }
}

/// How open the counterpart appears to shifting position, 0-10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Readiness(u8);

impl Readiness {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 10;

    /// Mid-scale readiness used when nothing better is known.
    pub const MIDPOINT: Readiness = Readiness(5);

    /// Creates a readiness, rejecting values above 10.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if value > Self::MAX {
            return Err(ValidationError::out_of_range(
                "change_readiness",
                Self::MIN as i64,
                Self::MAX as i64,
                value as i64,
            ));
        }
        Ok(Self(value))
    }

    /// Creates a readiness from any number, rounding and clamping into 0-10.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIDPOINT;
        }
        Self(value.round().clamp(Self::MIN as f64, Self::MAX as f64) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::MIDPOINT
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/10", self.0)
    }
}

/// Paired advice for the next reply: moves that work, moves to avoid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guidance {
    pub effective: Vec<String>,
    pub avoid: Vec<String>,
}

impl Guidance {
    pub fn new(effective: Vec<String>, avoid: Vec<String>) -> Self {
        Self {
            effective: normalize_phrases(effective),
            avoid: normalize_phrases(avoid),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effective.is_empty() && self.avoid.is_empty()
    }
}

/// Current belief about the counterpart.
///
/// Every field is always populated. Profiles are replaced wholesale each
/// turn; nothing is merged field by field. Deserializing goes through the
/// same tolerant coercion the profilers use, so any JSON object becomes a
/// complete profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct Profile {
    stance: Stance,
    confidence: Confidence,
    style: String,
    emotional_state: String,
    change_readiness: Readiness,
    key_values: Vec<String>,
    guidance: Guidance,
}

impl Profile {
    /// Creates a profile for `stance` with every other field at its default.
    pub fn new(stance: Stance) -> Self {
        Self {
            stance,
            confidence: Confidence::ZERO,
            style: DEFAULT_STYLE.to_string(),
            emotional_state: DEFAULT_EMOTIONAL_STATE.to_string(),
            change_readiness: Readiness::MIDPOINT,
            key_values: Vec::new(),
            guidance: Guidance::default(),
        }
    }

    /// Default substituted when the survey elaboration fails: the derived
    /// stance with neutral confidence.
    pub fn survey_default(stance: Stance) -> Self {
        Self::new(stance).with_confidence(Confidence::NEUTRAL)
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_stance(mut self, stance: Stance) -> Self {
        self.stance = stance;
        self
    }

    /// Sets the register label; blank input keeps the default.
    pub fn with_style(mut self, style: impl AsRef<str>) -> Self {
        self.style = normalize_label(style.as_ref(), DEFAULT_STYLE);
        self
    }

    pub fn with_emotional_state(mut self, state: impl AsRef<str>) -> Self {
        self.emotional_state = normalize_label(state.as_ref(), DEFAULT_EMOTIONAL_STATE);
        self
    }

    pub fn with_readiness(mut self, readiness: Readiness) -> Self {
        self.change_readiness = readiness;
        self
    }

    pub fn with_key_values(mut self, values: Vec<String>) -> Self {
        self.key_values = normalize_phrases(values);
        self
    }

    pub fn with_guidance(mut self, guidance: Guidance) -> Self {
        self.guidance = Guidance::new(guidance.effective, guidance.avoid);
        self
    }

    pub fn stance(&self) -> Stance {
        self.stance
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn emotional_state(&self) -> &str {
        &self.emotional_state
    }

    pub fn change_readiness(&self) -> Readiness {
        self.change_readiness
    }

    pub fn key_values(&self) -> &[String] {
        &self.key_values
    }

    pub fn guidance(&self) -> &Guidance {
        &self.guidance
    }

    /// One-paragraph rendering for prompts.
    pub fn summary(&self) -> String {
        let values = if self.key_values.is_empty() {
            "none identified yet".to_string()
        } else {
            self.key_values.join(", ")
        };
        format!(
            "Stance: {} (confidence {:.2}). Style: {}. Emotional state: {}. \
             Readiness to change: {}. Cares about: {}.",
            self.stance.description(),
            self.confidence.value(),
            self.style,
            self.emotional_state,
            self.change_readiness,
            values
        )
    }
}

impl Default for Profile {
    /// Unknown stance, zero confidence, neutral register, mid-scale
    /// readiness, no key values.
    fn default() -> Self {
        Self::new(Stance::Unknown)
    }
}

impl TryFrom<serde_json::Value> for Profile {
    type Error = String;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        ProfileDraft::from_json(&value)
            .map(|draft| draft.into_profile(&Profile::default()))
            .ok_or_else(|| "profile must be a JSON object".to_string())
    }
}

fn normalize_label(raw: &str, default: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        truncate_chars(trimmed, MAX_PHRASE_LENGTH)
    }
}

fn normalize_phrases(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        let phrase = truncate_chars(trimmed, MAX_PHRASE_LENGTH);
        if !out.iter().any(|existing| existing.eq_ignore_ascii_case(&phrase)) {
            out.push(phrase);
        }
        if out.len() == MAX_LIST_ITEMS {
            break;
        }
    }
    out
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
